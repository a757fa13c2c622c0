//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{DitherMode, TextAttr};

/// Render greyscale images as attributed ASCII art
#[derive(Parser, Debug)]
#[command(name = "aa-render")]
#[command(version, about = "Greyscale image to ASCII art renderer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render an image (default: a diagonal gradient)
    Render(RenderArgs),
    /// List available save formats
    Formats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Options of the render subcommand. Unset values come from the config file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct RenderArgs {
    /// Image to render (PNG, JPEG, PGM, ...); converted to greyscale
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Screen width in text cells
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub width: Option<u16>,

    /// Screen height in text cells
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub height: Option<u16>,

    /// Brightness offset
    #[arg(long, allow_hyphen_values = true, value_parser = clap::value_parser!(i32).range(-255..=255))]
    pub bright: Option<i32>,

    /// Contrast (100 is neutral)
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..))]
    pub contrast: Option<i32>,

    /// Gamma correction
    #[arg(long, value_parser = parse_gamma)]
    pub gamma: Option<f32>,

    /// Dithering method
    #[arg(long)]
    pub dither: Option<DitherMode>,

    /// Invert brightness (for light terminals)
    #[arg(long)]
    pub invert: bool,

    /// Random jitter amplitude (0-255)
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=255))]
    pub random: Option<i32>,

    /// Seed for the jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Banner text drawn over the middle of the image
    #[arg(long, short)]
    pub message: Option<String>,

    /// Attribute of the banner text
    #[arg(long, default_value = "bold")]
    pub message_attr: TextAttr,

    /// Render without dithering or jitter
    #[arg(long)]
    pub fast: bool,

    /// Export to this file instead of printing (never overwrites)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Save format, matched against format names (see `formats`)
    #[arg(long, short)]
    pub format: Option<String>,

    /// Split the export into pages
    #[arg(long)]
    pub pages: bool,
}

/// Parse and validate gamma (positive, finite)
fn parse_gamma(s: &str) -> Result<f32, String> {
    let gamma: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(gamma > 0.0) || !gamma.is_finite() {
        return Err(format!("Gamma must be a positive number, got {}", gamma));
    }
    Ok(gamma)
}
