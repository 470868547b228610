//! Object store abstraction
//!
//! The graph builder reads cluster state through the [`Store`] trait only.
//! [`MemoryStore`] holds objects in memory (tests, manifest snapshots) and
//! [`KubeStore`] reads a live cluster through the kube-rs dynamic API.

mod kube_store;
mod memory;

pub use kube_store::KubeStore;
pub use memory::{MemoryStore, parse_manifests};

use crate::models::{KnownKind, ObjectKey};
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::collections::BTreeMap;
use std::fmt;

/// Lookup key for get and list calls.
///
/// `namespace: None` lists across namespaces; `name` is required for `get`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey {
    pub api_version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub selector: Option<BTreeMap<String, String>>,
}

impl StoreKey {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: None,
            name: None,
            selector: None,
        }
    }

    pub fn for_kind(kind: KnownKind) -> Self {
        Self::new(kind.api_version(), kind.as_str())
    }

    pub fn for_object(key: &ObjectKey) -> Self {
        let store_key = Self::new(key.api_version.clone(), key.kind.clone()).named(&key.name);
        if key.namespace.is_empty() {
            store_key
        } else {
            store_key.in_namespace(&key.namespace)
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_selector(mut self, selector: BTreeMap<String, String>) -> Self {
        self.selector = Some(selector);
        self
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)?;
        if let Some(ns) = &self.namespace {
            write!(f, " namespace={}", ns)?;
        }
        if let Some(name) = &self.name {
            write!(f, " name={}", name)?;
        }
        if let Some(selector) = &self.selector {
            write!(f, " selector={}", crate::models::labels::selector_string(selector))?;
        }
        Ok(())
    }
}

/// Result of a list call
#[derive(Debug, Clone, Default)]
pub struct ObjectList {
    pub items: Vec<DynamicObject>,
    /// The store is still populating its cache for this key
    pub loading: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store key {0} has no name")]
    MissingName(String),

    #[error("resource {0} is not served by the cluster")]
    UnknownResource(String),

    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to decode object: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to parse manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

/// Key-based object store
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a single named object; `Ok(None)` when it doesn't exist
    async fn get(&self, key: &StoreKey) -> Result<Option<DynamicObject>, StoreError>;

    /// List objects matching the key
    async fn list(&self, key: &StoreKey) -> Result<ObjectList, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_key_for_object() {
        let namespaced = StoreKey::for_object(&ObjectKey::new("v1", "Pod", "default", "web"));
        assert_eq!(namespaced.namespace.as_deref(), Some("default"));
        assert_eq!(namespaced.name.as_deref(), Some("web"));

        let cluster = StoreKey::for_object(&ObjectKey::new("v1", "Namespace", "", "default"));
        assert_eq!(cluster.namespace, None);
    }

    #[test]
    fn test_store_key_display() {
        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "web".to_string());
        let key = StoreKey::for_kind(KnownKind::Pod)
            .in_namespace("shop")
            .with_selector(selector);
        assert_eq!(key.to_string(), "v1/Pod namespace=shop selector=app=web");
    }
}
