use std::path::PathBuf;

use clap::{Parser, Subcommand};
use switchtrack_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;
mod repl;

#[derive(Parser)]
#[command(name = "switchtrack", version, about = "Context switch tracker")]
struct Cli {
    /// Config file to use instead of ~/.config/switchtrack/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a focus session interactively (commands are read from stdin)
    Session(commands::session::SessionArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("SWITCHTRACK_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let loaded = Config::load_from(&path);
    let level = loaded
        .as_ref()
        .map(|cfg| cfg.logging.level.clone())
        .unwrap_or_else(|_| "warn".to_string());
    init_logging(&level);

    match cli.command {
        Commands::Session(args) => {
            let config = loaded.unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "using default configuration");
                Config::default()
            });
            commands::session::run(args, &config)
        }
        Commands::Config { action } => commands::config::run(action, &path),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
