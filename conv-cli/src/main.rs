//! Binary crate for the `conv` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Configuration commands
//! - Human-friendly output formatting

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod output;

/// Environment variable holding a `tracing` filter directive, e.g. `conv_core=debug`.
const LOG_ENV: &str = "CONV_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse_args();
    init_tracing(cmd.verbose);
    cmd.run().await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    tracing_subscriber::registry().with(filter).with(layer).init();
}
