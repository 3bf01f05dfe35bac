//! scc-core - inspect and exercise SC-Controller profiles

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::{Args, Settings};
use scc_core::config::AppConfig;

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = AppConfig::load_or_default(&args.config)?;
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    init_logging(&log_level)?;

    info!("scc-core {}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration file: {}", args.config.display());

    let settings = Settings::new(&args, config);
    cli::run(&args.command, &settings)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
