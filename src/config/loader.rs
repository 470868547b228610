//! Configuration loading
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Config file
//! 3. Built-in defaults

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the root configuration with environment overrides applied
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration from `path`, using defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check value ranges serde cannot express
    pub fn validate(config: &Config) -> Result<()> {
        if config.graph.pod_group_threshold < 2 {
            return Err(anyhow::anyhow!(
                "graph.podGroupThreshold must be at least 2, got {}",
                config.graph.pod_group_threshold
            ));
        }
        if config.graph.max_concurrency == 0 {
            return Err(anyhow::anyhow!("graph.maxConcurrency must be greater than 0"));
        }
        if config.graph.max_objects == 0 {
            return Err(anyhow::anyhow!("graph.maxObjects must be greater than 0"));
        }
        if config
            .default_namespace
            .as_deref()
            .is_some_and(|ns| ns.trim().is_empty())
        {
            return Err(anyhow::anyhow!("defaultNamespace must not be blank"));
        }
        Ok(())
    }

    fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply `KUBELENS_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides(
        mut config: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Config {
        if let Some(namespace) = lookup("KUBELENS_DEFAULT_NAMESPACE") {
            config.default_namespace = Some(namespace);
        }

        if let Some(value) = lookup("KUBELENS_POD_GROUP_THRESHOLD") {
            match value.parse() {
                Ok(threshold) => config.graph.pod_group_threshold = threshold,
                Err(_) => tracing::warn!("Ignoring KUBELENS_POD_GROUP_THRESHOLD={}", value),
            }
        }

        if let Some(value) = lookup("KUBELENS_MAX_CONCURRENCY") {
            match value.parse() {
                Ok(limit) => config.graph.max_concurrency = limit,
                Err(_) => tracing::warn!("Ignoring KUBELENS_MAX_CONCURRENCY={}", value),
            }
        }

        if let Some(level) = lookup("KUBELENS_LOG_LEVEL") {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
