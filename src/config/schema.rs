//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace used when none is given on the command line.
    /// Falls back to the kubeconfig context namespace when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,

    /// Graph building configuration
    #[serde(default)]
    pub graph: GraphConfig,

    /// Object store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Graph building configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    /// Pods sharing a controller collapse into one node at this count
    #[serde(default = "default_pod_group_threshold")]
    pub pod_group_threshold: usize,

    /// Related objects expanded in parallel per object
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Traversal stops with an error past this many objects
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Times a list is retried while the store reports it is still loading
    #[serde(default = "default_loading_retries")]
    pub loading_retries: u32,

    /// Pause between loading retries, in milliseconds
    #[serde(default = "default_loading_interval_ms")]
    pub loading_interval_ms: u64,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a temporary file instead of stderr
    #[serde(default = "default_false")]
    pub file: bool,
}

// Default value functions
fn default_pod_group_threshold() -> usize {
    2
}

fn default_max_concurrency() -> usize {
    16
}

fn default_max_objects() -> usize {
    5000
}

fn default_loading_retries() -> u32 {
    10
}

fn default_loading_interval_ms() -> u64 {
    250
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_false() -> bool {
    false
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            pod_group_threshold: default_pod_group_threshold(),
            max_concurrency: default_max_concurrency(),
            max_objects: default_max_objects(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            loading_retries: default_loading_retries(),
            loading_interval_ms: default_loading_interval_ms(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_false(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.default_namespace, None);
        assert_eq!(config.graph.pod_group_threshold, 2);
        assert_eq!(config.graph.max_concurrency, 16);
        assert_eq!(config.store.loading_retries, 10);
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("podGroupThreshold"));
        assert!(yaml.contains("loadingIntervalMs"));
        assert!(!yaml.contains("defaultNamespace"));
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let yaml = r#"
defaultNamespace: shop
graph:
  podGroupThreshold: 5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_namespace.as_deref(), Some("shop"));
        assert_eq!(config.graph.pod_group_threshold, 5);
        assert_eq!(config.graph.max_objects, 5000);
        assert_eq!(config.store, StoreConfig::default());
    }
}
