//! Logging initialization

use crate::config::LoggerConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter applied when RUST_LOG is unset
fn default_filter(debug: bool, config: &LoggerConfig) -> EnvFilter {
    let level = if debug { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize logging.
///
/// Logs go to stderr so graph output on stdout stays machine readable. With
/// `logger.file` set they go to a temporary file instead, whose path is
/// returned.
pub fn init_logging(debug: bool, config: &LoggerConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug, config));

    if !config.file {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(debug)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        return Ok(None);
    }

    let (file, path) = tempfile::Builder::new()
        .prefix("kubelens-")
        .suffix(".log")
        .tempfile()
        .context("Failed to create log file")?
        .keep()
        .context("Failed to persist log file")?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(Some(path))
}
