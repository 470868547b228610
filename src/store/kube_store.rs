//! Live cluster store
//!
//! Reads objects through the kube-rs dynamic API. Resource discovery results
//! are cached per `(apiVersion, kind)` for the lifetime of the store.

use super::{ObjectList, Store, StoreError, StoreKey};
use crate::models::GroupVersionKind;
use crate::models::labels::selector_string;
use async_trait::async_trait;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use kube::discovery::Scope;
use kube::{Api, Client};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct Discovered {
    resource: ApiResource,
    namespaced: bool,
}

/// Store backed by a Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    discovered: Arc<RwLock<HashMap<(String, String), Discovered>>>,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            discovered: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn discover(&self, api_version: &str, kind: &str) -> Result<Discovered, StoreError> {
        let cache_key = (api_version.to_string(), kind.to_string());
        if let Some(found) = self.discovered.read().await.get(&cache_key) {
            return Ok(found.clone());
        }

        let gvk = GroupVersionKind::from_api_version(api_version, kind);
        let kube_gvk = kube::core::GroupVersionKind::gvk(&gvk.group, &gvk.version, &gvk.kind);
        let (resource, capabilities) =
            match kube::discovery::pinned_kind(&self.client, &kube_gvk).await {
                Ok(found) => found,
                Err(kube::Error::Discovery(e)) => {
                    tracing::debug!("Discovery failed for {}: {}", gvk, e);
                    return Err(StoreError::UnknownResource(gvk.to_string()));
                }
                Err(e) => return Err(e.into()),
            };

        let found = Discovered {
            resource,
            namespaced: capabilities.scope == Scope::Namespaced,
        };
        self.discovered
            .write()
            .await
            .insert(cache_key, found.clone());
        Ok(found)
    }

    fn api(&self, discovered: &Discovered, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if discovered.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &discovered.resource)
            }
            _ => Api::all_with(self.client.clone(), &discovered.resource),
        }
    }
}

/// List responses omit per-item type information; restore it from discovery
fn with_types(mut object: DynamicObject, resource: &ApiResource) -> DynamicObject {
    if object.types.is_none() {
        object.types = Some(TypeMeta {
            api_version: resource.api_version.clone(),
            kind: resource.kind.clone(),
        });
    }
    object
}

#[async_trait]
impl Store for KubeStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<DynamicObject>, StoreError> {
        let name = key
            .name
            .as_ref()
            .ok_or_else(|| StoreError::MissingName(key.to_string()))?;
        let discovered = self.discover(&key.api_version, &key.kind).await?;
        let api = self.api(&discovered, key.namespace.as_deref());

        tracing::debug!("Fetching {}", key);
        let object = api.get_opt(name).await?;
        Ok(object.map(|o| with_types(o, &discovered.resource)))
    }

    async fn list(&self, key: &StoreKey) -> Result<ObjectList, StoreError> {
        let discovered = self.discover(&key.api_version, &key.kind).await?;
        let api = self.api(&discovered, key.namespace.as_deref());

        let mut params = ListParams::default();
        if let Some(selector) = key.selector.as_ref().filter(|s| !s.is_empty()) {
            params = params.labels(&selector_string(selector));
        }
        if let Some(name) = &key.name {
            params = params.fields(&format!("metadata.name={}", name));
        }

        tracing::debug!("Listing {}", key);
        let list = api.list(&params).await?;
        let items = list
            .items
            .into_iter()
            .map(|o| with_types(o, &discovered.resource))
            .collect();

        Ok(ObjectList {
            items,
            loading: false,
        })
    }
}
