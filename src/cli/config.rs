//! Config command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{CONFIG_KEYS, ConfigLoader, get_config_value, paths, set_config_value};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "graph.podGroupThreshold")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "defaultNamespace")
        key: String,
        /// Configuration value; empty clears optional keys
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key: Some(key) } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            println!("{}", get_config_value(&config, &key)?);
        }
        ConfigSubcommand::Get { key: None } | ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Set { key, value } => {
            let path = paths::root_config_path();
            // Env overrides must not leak into the saved file
            let mut config = if path.exists() {
                ConfigLoader::load_file(&path)?
            } else {
                Default::default()
            };

            set_config_value(&mut config, &key, &value).with_context(|| {
                format!(
                    "Failed to set {} = {} (known keys: {})",
                    key,
                    value,
                    CONFIG_KEYS.join(", ")
                )
            })?;

            ConfigLoader::save(&config, &path).context("Failed to save configuration")?;
            println!("Configuration saved to {}", path.display());
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load().context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
