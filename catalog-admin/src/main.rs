use anyhow::Result;
use catalog_core::{init_logging, CatalogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error};

mod commands;
mod context;

use commands::*;
use context::CatalogContext;

#[derive(Parser)]
#[command(name = "catalog-admin")]
#[command(about = "Browse the microdata dataset catalog")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "catalog.toml", env = "CATALOG_CONFIG")]
    config: PathBuf,

    /// Simulated latency per query in milliseconds (overrides the config file)
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and search datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetCommands,
    },
    /// Catalog statistics
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
    /// Render illustrative API requests
    Request {
        #[command(subcommand)]
        action: RequestCommands,
    },
    /// Display theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = CatalogConfig::load(&cli.config)?;
    if cli.verbose {
        config.logging.level = "DEBUG".to_string();
    }
    if cli.json_logs {
        config.logging.json_format = true;
    }
    if let Some(latency_ms) = cli.latency_ms {
        config.engine.simulated_latency_ms = latency_ms;
        config.validate()?;
    }

    // Initialize logging
    let slow_queries = init_logging(&config.logging)?;

    debug!(config = %cli.config.display(), "Catalog admin starting");

    let ctx = CatalogContext::new(config, slow_queries)?;

    // Execute command
    let result = match cli.command {
        Commands::Datasets { action } => execute_dataset_command(&ctx, action).await,
        Commands::Stats { action } => execute_stats_command(&ctx, action).await,
        Commands::Request { action } => execute_request_command(&ctx, action).await,
        Commands::Theme { action } => execute_theme_command(&ctx, action).await,
    };

    match result {
        Ok(_) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
