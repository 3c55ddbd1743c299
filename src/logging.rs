//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins, then `--verbose`, then the configured level
fn build_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Logs go to stderr so stdout only carries results.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = build_filter(config, verbose);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
