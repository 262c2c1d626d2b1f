//! Binary crate for the `luma` command-line weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Driving refreshes and location/preference changes
//! - Human-friendly output formatting

use clap::Parser;
use luma_core::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config = Config::load()?;
    init_tracing(cmd.verbose, &config);
    cmd.run(config).await
}

/// `RUST_LOG` wins, then `--verbose`, then the configured filter.
fn init_tracing(verbose: bool, config: &Config) {
    let fallback = if verbose { "debug" } else { config.log_filter.as_deref().unwrap_or("warn") };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
