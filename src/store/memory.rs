//! In-memory object store
//!
//! Thread-safe map of objects keyed by [`ObjectKey`]. Used for tests and for
//! building graphs from manifest snapshots without a cluster.

use super::{ObjectList, Store, StoreError, StoreKey};
use crate::models::{ObjectKey, selector_matches};
use async_trait::async_trait;
use kube::core::DynamicObject;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Thread-safe in-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<ObjectKey, DynamicObject>>>,
    loading: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = DynamicObject>) -> Self {
        let objects = objects
            .into_iter()
            .map(|object| (ObjectKey::from_object(&object), object))
            .collect();
        Self {
            objects: Arc::new(RwLock::new(objects)),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a store from multi-document YAML (or JSON) manifests
    pub fn from_manifests(manifests: &str) -> Result<Self, StoreError> {
        Ok(Self::from_objects(parse_manifests(manifests)?))
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Mark the store as still populating; list results carry the flag
    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<DynamicObject>, StoreError> {
        let name = key
            .name
            .as_ref()
            .ok_or_else(|| StoreError::MissingName(key.to_string()))?;
        let object_key = ObjectKey::new(
            key.api_version.clone(),
            key.kind.clone(),
            key.namespace.clone().unwrap_or_default(),
            name.clone(),
        );
        Ok(self.objects.read().await.get(&object_key).cloned())
    }

    async fn list(&self, key: &StoreKey) -> Result<ObjectList, StoreError> {
        let objects = self.objects.read().await;
        let items = objects
            .iter()
            .filter(|(object_key, _)| {
                object_key.api_version == key.api_version
                    && object_key.kind == key.kind
                    && key
                        .namespace
                        .as_ref()
                        .is_none_or(|ns| &object_key.namespace == ns)
                    && key.name.as_ref().is_none_or(|name| &object_key.name == name)
            })
            .filter(|(_, object)| {
                key.selector.as_ref().is_none_or(|selector| {
                    selector.is_empty()
                        || selector_matches(selector, object.metadata.labels.as_ref())
                })
            })
            .map(|(_, object)| object.clone())
            .collect();

        Ok(ObjectList {
            items,
            loading: self.loading.load(Ordering::SeqCst),
        })
    }
}

/// Parse multi-document manifests into dynamic objects.
///
/// `List` documents (as printed by `kubectl get -o yaml`) are expanded into
/// their items; empty documents are skipped.
pub fn parse_manifests(manifests: &str) -> Result<Vec<DynamicObject>, StoreError> {
    let mut objects = Vec::new();

    for document in serde_yaml::Deserializer::from_str(manifests) {
        let value = serde_json::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let is_list = value
            .get("kind")
            .and_then(|k| k.as_str())
            .is_some_and(|k| k.ends_with("List"));

        match value.get("items").and_then(|i| i.as_array()) {
            Some(items) if is_list => {
                for item in items {
                    objects.push(serde_json::from_value(item.clone())?);
                }
            }
            _ => objects.push(serde_json::from_value(value)?),
        }
    }

    tracing::debug!("Parsed {} objects from manifests", objects.len());
    Ok(objects)
}
