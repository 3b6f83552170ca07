//! Logging initialization.
//!
//! Installs a global `tracing` subscriber writing to stderr. `RUST_LOG`
//! takes precedence over the configured filter.

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
            eprintln!(
                "Invalid log filter '{}' ({}), falling back to 'info'",
                config.filter, e
            );
            EnvFilter::new("info")
        })
    })
}

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
