use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedsync_infrastructure::ConfigService;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "feedsync")]
#[command(about = "feedsync - profile edits reconciled into cached feed pages", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a profile edit against a seeded in-memory feed cache
    Simulate(commands::simulate::SimulateArgs),
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if no file exists yet
    Init,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::with_default_path().context("Failed to resolve config path")?,
    };
    let config = config_service
        .get_config()
        .await
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    init_tracing(&config.log_level);
    tracing::debug!(
        "[feedsync] Using configuration from {}",
        config_service.path().display()
    );

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args, &config).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service, &config)?,
            ConfigAction::Init => commands::config::init(&config_service).await?,
        },
    }

    Ok(())
}
