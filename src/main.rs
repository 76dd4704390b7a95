//! verse-timeline
//!
//! Builds frame timelines for recitation videos.
//!
//! # Usage
//!
//! ```bash
//! verse-timeline compute --verses verses.json --mode full --durations durations.json
//! verse-timeline durations --verses verses.json --json
//! verse-timeline fixup --props props.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use verse_timeline::adapters::TracingLogAdapter;
use verse_timeline::app::DefaultAppContainer;
use verse_timeline::cli::{commands, Cli, Commands};
use verse_timeline::config_initialization::initialize_configuration;

/// Main entry point for the verse-timeline CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    TracingLogAdapter::init(&config.logging);

    info!("Starting verse-timeline");
    let container = DefaultAppContainer::new(config);

    let result = match cli.command {
        Commands::Compute(args) => {
            info!("Executing compute command");
            commands::compute(&container, args).await
        }
        Commands::Durations(args) => {
            info!("Executing durations command");
            commands::durations(&container, args).await
        }
        Commands::Fixup(args) => {
            info!("Executing fixup command");
            commands::fixup(&container, args).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
