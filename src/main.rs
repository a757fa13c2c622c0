use clap::Parser;

use aa_render::cli::{self, Args, Command, RenderArgs};
use aa_render::config::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match args.command {
        Some(Command::Formats) => cli::list_formats(),
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, args.config.as_deref());
        }
        Some(Command::Render(render)) => render_or_exit(&render, args.config.as_deref()),
        None => render_or_exit(&RenderArgs::default(), args.config.as_deref()),
    }
}

fn render_or_exit(render: &RenderArgs, config_path: Option<&std::path::Path>) {
    let config = match Config::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run_render(render, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
