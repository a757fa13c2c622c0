//! Subcommand handlers for render, formats and config actions.

use std::io::{IsTerminal, Write};
use std::path::Path;

use super::args::{ConfigAction, RenderArgs};
use crate::ascii::{Attr, Context, Region};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG};
use crate::error::{AaError, Result};
use crate::input;
use crate::sink::{FileExport, FormatFlags, LiveDisplay, SaveFormat};

/// Fill the image with the diagonal demo gradient, `127*x/w + 127*y/h`.
pub fn draw_diagonal_gradient(ctx: &mut Context) {
    let width = ctx.imgwidth() as f32;
    let height = ctx.imgheight() as f32;
    ctx.image_mut()
        .fill_with(|x, y| (127.0 * (x as f32 / width) + 127.0 * (y as f32 / height)) as u8);
}

/// Draw `msg` centered on the screen, framed by a blank row above and below.
pub fn put_banner(ctx: &mut Context, msg: &str, attr: Attr) {
    let padded = format!("  {}  ", msg);
    let len = padded.chars().count();
    let blank = " ".repeat(len);
    let col = ctx.scrwidth().saturating_sub(len) / 2;
    let row = ctx.scrheight() / 2;
    if row > 0 {
        ctx.puts(col, row - 1, attr, &blank);
    }
    ctx.puts(col, row, attr, &padded);
    ctx.puts(col, row + 1, attr, &blank);
}

/// Render an image (or the gradient demo) and print or export it.
pub fn run_render(args: &RenderArgs, config: &Config) -> Result<()> {
    let mut params = config.render_params();
    if let Some(bright) = args.bright {
        params.bright = bright;
    }
    if let Some(contrast) = args.contrast {
        params.contrast = contrast;
    }
    if let Some(gamma) = args.gamma {
        params.gamma = gamma;
    }
    if let Some(dither) = args.dither {
        params.dither = dither.into();
    }
    if let Some(random) = args.random {
        params.randomval = random;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    params.inversion |= args.invert;

    let mut hardware = config.hardware_params()?;
    if let Some(width) = args.width {
        hardware.width = width as usize;
    }
    if let Some(height) = args.height {
        hardware.height = height as usize;
    }

    let mut ctx = Context::open(hardware)?;
    match &args.input {
        Some(path) => input::resample_into(&input::load(path)?, ctx.image_mut()),
        None => draw_diagonal_gradient(&mut ctx),
    }

    if args.fast {
        ctx.fastrender(Region::full(ctx.scrwidth(), ctx.scrheight()))?;
    } else {
        ctx.render_all(&params)?;
    }
    if let Some(msg) = &args.message {
        put_banner(&mut ctx, msg, args.message_attr.into());
    }

    match &args.output {
        Some(path) => {
            let pattern = args.format.as_deref().unwrap_or(&config.export.format);
            let mut flags = config.format_flags();
            flags.set(FormatFlags::USE_PAGES, flags.contains(FormatFlags::USE_PAGES) || args.pages);
            let mut export = FileExport::with_format_name(path, pattern, flags)?;
            ctx.flush(&mut export)?;
            println!(
                "Saved {} as '{}'",
                path.display(),
                export.format().name()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let styled = stdout.is_terminal();
            print_screen(&ctx, stdout.lock(), styled)?;
        }
    }
    Ok(())
}

/// Print the screen: repainted with attributes on a terminal, plain rows
/// when redirected.
fn print_screen<W: Write>(ctx: &Context, mut out: W, styled: bool) -> Result<()> {
    let written = if styled {
        {
            let mut display = LiveDisplay::new(&mut out)
                .with_clear(false)
                .with_supported(ctx.hardware_params().supported);
            ctx.flush(&mut display)?;
        }
        out.write_all(b"\n")
    } else {
        (0..ctx.scrheight()).try_for_each(|y| {
            out.write_all(ctx.text().row(y).0)?;
            out.write_all(b"\n")
        })
    };
    written
        .and_then(|_| out.flush())
        .map_err(|e| AaError::io("stdout", e))
}

/// List the save formats in lookup order.
pub fn list_formats() {
    println!("Available formats:");
    for format in SaveFormat::all() {
        let pages = if format.page_height() > 0 {
            format!("{}x{} pages", format.page_width(), format.page_height())
        } else {
            "unpaged".to_string()
        };
        println!("  {:<34} {:<6} {}", format.name(), format.extension(), pages);
    }
    println!();
    println!("Use --format <name> with any part of a name, e.g. --format html.");
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = match Config::load(Some(&config_path)) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            match config.to_toml() {
                Ok(text) => {
                    println!("Current configuration:");
                    println!();
                    print!("{}", text);
                    println!();
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'aa-render config show' to view current settings.");
                std::process::exit(1);
            }

            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&config_path, DEFAULT_CONFIG) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::{HardwareParams, RenderParams};

    fn ctx(width: usize, height: usize) -> Context {
        Context::open(HardwareParams {
            width,
            height,
            ..HardwareParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_gradient_corners() {
        let mut ctx = ctx(50, 50);
        draw_diagonal_gradient(&mut ctx);
        assert_eq!(ctx.image().get(0, 0), Some(0));
        assert_eq!(ctx.image().get(50, 0), Some(63));
        let last = ctx.image().get(99, 99).unwrap();
        assert!(last >= 250);
    }

    #[test]
    fn test_banner_is_centered() {
        let mut ctx = ctx(20, 5);
        put_banner(&mut ctx, "hi", Attr::Bold);
        let (row, attrs) = ctx.text().row(2);
        assert_eq!(row, b"         hi         ");
        assert_eq!(attrs[9], Attr::Bold);
        assert_eq!(ctx.text().get(7, 1), Some((b' ', Attr::Bold)));
        assert_eq!(ctx.text().get(7, 3), Some((b' ', Attr::Bold)));
        assert_eq!(ctx.text().get(5, 2), Some((b' ', Attr::Normal)));
    }

    #[test]
    fn test_run_render_exports_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.txt");
        let args = RenderArgs {
            width: Some(30),
            height: Some(10),
            message: Some("hello".into()),
            output: Some(path.clone()),
            ..RenderArgs::default()
        };
        run_render(&args, &Config::default()).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(saved.lines().count(), 10);
        assert!(saved.contains("  hello  "));

        let err = run_render(&args, &Config::default()).unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_redirected_output_has_no_escapes() {
        let mut ctx = ctx(12, 3);
        ctx.render_all(&RenderParams::default()).unwrap();
        put_banner(&mut ctx, "hi", Attr::Bold);

        let mut plain = Vec::new();
        print_screen(&ctx, &mut plain, false).unwrap();
        assert!(!plain.contains(&0x1b));
        assert_eq!(plain.iter().filter(|&&b| b == b'\n').count(), 3);
        assert_eq!(&plain[13..25], ctx.text().row(1).0);

        let mut styled = Vec::new();
        print_screen(&ctx, &mut styled, true).unwrap();
        assert!(styled.starts_with(b"\x1b[H"));
        assert!(styled.windows(6).any(|w| w == b"\x1b[0;1m"));
    }

    #[test]
    fn test_config_params_reach_render() {
        let mut config = Config::default();
        config.render.contrast = 150;
        let mut ctx = ctx(4, 4);
        ctx.render_all(&config.render_params()).unwrap();
        assert_eq!(ctx.table().unwrap().params().contrast, 150);
        assert_ne!(config.render_params(), RenderParams::default());
    }
}
