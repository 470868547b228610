//! Configuration system for kubelens
//!
//! A single YAML file under the user config directory, overridable through
//! `KUBELENS_*` environment variables.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, GraphConfig, LoggerConfig, StoreConfig};

use anyhow::Context;

/// Keys accepted by [`get_config_value`] and [`set_config_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "defaultNamespace",
    "graph.podGroupThreshold",
    "graph.maxConcurrency",
    "graph.maxObjects",
    "store.loadingRetries",
    "store.loadingIntervalMs",
    "logger.level",
    "logger.file",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone().unwrap_or_default()),
        "graph.podGroupThreshold" => Ok(config.graph.pod_group_threshold.to_string()),
        "graph.maxConcurrency" => Ok(config.graph.max_concurrency.to_string()),
        "graph.maxObjects" => Ok(config.graph.max_objects.to_string()),
        "store.loadingRetries" => Ok(config.store.loading_retries.to_string()),
        "store.loadingIntervalMs" => Ok(config.store.loading_interval_ms.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        "logger.file" => Ok(config.logger.file.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
///
/// The result is validated; an out-of-range value leaves `config` unchanged.
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let mut updated = config.clone();
    match key {
        "defaultNamespace" => {
            updated.default_namespace = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "graph.podGroupThreshold" => {
            updated.graph.pod_group_threshold = value
                .parse()
                .context("graph.podGroupThreshold must be a number")?;
        }
        "graph.maxConcurrency" => {
            updated.graph.max_concurrency = value
                .parse()
                .context("graph.maxConcurrency must be a number")?;
        }
        "graph.maxObjects" => {
            updated.graph.max_objects = value
                .parse()
                .context("graph.maxObjects must be a number")?;
        }
        "store.loadingRetries" => {
            updated.store.loading_retries = value
                .parse()
                .context("store.loadingRetries must be a number")?;
        }
        "store.loadingIntervalMs" => {
            updated.store.loading_interval_ms = value
                .parse()
                .context("store.loadingIntervalMs must be a number")?;
        }
        "logger.level" => {
            updated.logger.level = value.to_string();
        }
        "logger.file" => {
            updated.logger.file = value
                .parse()
                .context("logger.file must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    ConfigLoader::validate(&updated)?;
    *config = updated;
    Ok(())
}
