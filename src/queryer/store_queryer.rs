//! Store-backed queryer with per-request memoization

use super::{QueryError, Queryer};
use crate::models::{KnownKind, parse_object, selector_matches};
use crate::store::{Store, StoreKey};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::core::DynamicObject;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_SERVICE_ACCOUNT: &str = "default";

/// Queryer answering from a [`Store`].
///
/// List and get results are cached by [`StoreKey`]; create one instance per
/// graph request so the cache never outlives the snapshot it describes.
pub struct StoreQueryer {
    store: Arc<dyn Store>,
    lists: RwLock<HashMap<StoreKey, Arc<Vec<DynamicObject>>>>,
    gets: RwLock<HashMap<StoreKey, Option<DynamicObject>>>,
    loading_retries: u32,
    loading_interval: Duration,
}

impl StoreQueryer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            lists: RwLock::new(HashMap::new()),
            gets: RwLock::new(HashMap::new()),
            loading_retries: 0,
            loading_interval: Duration::ZERO,
        }
    }

    /// Re-list up to `retries` times while the store reports it is loading
    pub fn with_loading_wait(mut self, retries: u32, interval: Duration) -> Self {
        self.loading_retries = retries;
        self.loading_interval = interval;
        self
    }

    async fn list(&self, key: StoreKey) -> Result<Arc<Vec<DynamicObject>>, QueryError> {
        if let Some(items) = self.lists.read().await.get(&key) {
            return Ok(items.clone());
        }

        let mut list = self.store.list(&key).await?;
        let mut attempts = 0;
        while list.loading && attempts < self.loading_retries {
            attempts += 1;
            tracing::debug!(
                "Store is loading {}, retrying ({}/{})",
                key,
                attempts,
                self.loading_retries
            );
            tokio::time::sleep(self.loading_interval).await;
            list = self.store.list(&key).await?;
        }
        if list.loading {
            tracing::warn!("Store still loading {}, using partial results", key);
        }

        let items = Arc::new(list.items);
        self.lists.write().await.insert(key, items.clone());
        Ok(items)
    }

    async fn get(&self, key: StoreKey) -> Result<Option<DynamicObject>, QueryError> {
        if let Some(object) = self.gets.read().await.get(&key) {
            return Ok(object.clone());
        }

        let object = self.store.get(&key).await?;
        self.gets.write().await.insert(key, object.clone());
        Ok(object)
    }

    async fn services_in(&self, namespace: &str) -> Result<Vec<Service>, QueryError> {
        let objects = self
            .list(StoreKey::for_kind(KnownKind::Service).in_namespace(namespace))
            .await?;
        objects
            .iter()
            .map(|o| parse_object::<Service>(o).map_err(QueryError::from))
            .collect()
    }

    async fn get_owner(
        &self,
        reference: &OwnerReference,
        namespace: &str,
    ) -> Result<Option<DynamicObject>, QueryError> {
        let key = StoreKey::new(reference.api_version.clone(), reference.kind.clone())
            .named(&reference.name);

        let mut owner = self.get(key.clone().in_namespace(namespace)).await?;
        if owner.is_none() && !namespace.is_empty() {
            // Owner may be cluster-scoped
            owner = self.get(key).await?;
        }

        Ok(owner.filter(|o| {
            let matches = o.metadata.uid.as_deref().is_none_or(|uid| uid == reference.uid);
            if !matches {
                tracing::debug!(
                    "Owner {}/{} has a different uid than referenced, ignoring",
                    reference.kind,
                    reference.name
                );
            }
            matches
        }))
    }
}

fn is_owned_by(object: &DynamicObject, owner: &DynamicObject) -> bool {
    let owner_kind = owner.types.as_ref().map(|t| t.kind.as_str());
    object
        .metadata
        .owner_references
        .iter()
        .flatten()
        .any(|reference| match owner.metadata.uid.as_deref() {
            Some(uid) => reference.uid == uid,
            None => {
                Some(reference.kind.as_str()) == owner_kind
                    && owner.metadata.name.as_deref() == Some(reference.name.as_str())
            }
        })
}

/// Service names referenced by the default backend and rule paths
fn backend_service_names(ingress: &Ingress) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Some(spec) = ingress.spec.as_ref() else {
        return names;
    };

    if let Some(service) = spec
        .default_backend
        .as_ref()
        .and_then(|backend| backend.service.as_ref())
    {
        names.insert(service.name.clone());
    }
    for rule in spec.rules.iter().flatten() {
        for path in rule.http.iter().flat_map(|http| http.paths.iter()) {
            if let Some(service) = path.backend.service.as_ref() {
                names.insert(service.name.clone());
            }
        }
    }
    names
}

#[async_trait]
impl Queryer for StoreQueryer {
    async fn services_for_pod(&self, pod: &Pod) -> Result<Vec<Service>, QueryError> {
        let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
        let services = self.services_in(namespace).await?;

        Ok(services
            .into_iter()
            .filter(|service| {
                service
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.selector.as_ref())
                    .is_some_and(|selector| {
                        selector_matches(selector, pod.metadata.labels.as_ref())
                    })
            })
            .collect())
    }

    async fn service_account_for_pod(
        &self,
        pod: &Pod,
    ) -> Result<Option<ServiceAccount>, QueryError> {
        let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
        let name = pod
            .spec
            .as_ref()
            .and_then(|spec| {
                spec.service_account_name
                    .as_deref()
                    .or(spec.service_account.as_deref())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SERVICE_ACCOUNT);

        let key = StoreKey::for_kind(KnownKind::ServiceAccount)
            .in_namespace(namespace)
            .named(name);
        match self.get(key).await? {
            Some(object) => Ok(Some(parse_object(&object)?)),
            None => Ok(None),
        }
    }

    async fn owner_reference_for_object(
        &self,
        object: &DynamicObject,
    ) -> Result<Option<DynamicObject>, QueryError> {
        let references = object.metadata.owner_references.as_deref().unwrap_or_default();
        let reference = references
            .iter()
            .find(|r| r.controller == Some(true))
            .or_else(|| references.first());

        let Some(reference) = reference else {
            return Ok(None);
        };

        let namespace = object.metadata.namespace.as_deref().unwrap_or_default();
        self.get_owner(reference, namespace).await
    }

    async fn owned_objects(
        &self,
        owner: &DynamicObject,
        api_version: &str,
        kind: &str,
    ) -> Result<Vec<DynamicObject>, QueryError> {
        let mut key = StoreKey::new(api_version, kind);
        if let Some(namespace) = owner.metadata.namespace.as_deref() {
            key = key.in_namespace(namespace);
        }

        let objects = self.list(key).await?;
        Ok(objects
            .iter()
            .filter(|object| is_owned_by(object, owner))
            .cloned()
            .collect())
    }

    async fn pods_for_service(&self, service: &Service) -> Result<Vec<Pod>, QueryError> {
        let Some(selector) = service
            .spec
            .as_ref()
            .and_then(|spec| spec.selector.clone())
            .filter(|selector| !selector.is_empty())
        else {
            return Ok(Vec::new());
        };

        let namespace = service.metadata.namespace.as_deref().unwrap_or_default();
        let key = StoreKey::for_kind(KnownKind::Pod)
            .in_namespace(namespace)
            .with_selector(selector);
        let objects = self.list(key).await?;
        objects
            .iter()
            .map(|o| parse_object::<Pod>(o).map_err(QueryError::from))
            .collect()
    }

    async fn services_for_ingress(&self, ingress: &Ingress) -> Result<Vec<Service>, QueryError> {
        let namespace = ingress.metadata.namespace.as_deref().unwrap_or_default();
        let names = backend_service_names(ingress);

        let mut services = Vec::new();
        for name in names {
            let key = StoreKey::for_kind(KnownKind::Service)
                .in_namespace(namespace)
                .named(&name);
            match self.get(key).await? {
                Some(object) => services.push(parse_object(&object)?),
                None => tracing::debug!("Ingress backend service {}/{} not found", namespace, name),
            }
        }
        Ok(services)
    }

    async fn ingresses_for_service(&self, service: &Service) -> Result<Vec<Ingress>, QueryError> {
        let Some(name) = service.metadata.name.as_deref() else {
            return Ok(Vec::new());
        };
        let namespace = service.metadata.namespace.as_deref().unwrap_or_default();

        let objects = self
            .list(StoreKey::for_kind(KnownKind::Ingress).in_namespace(namespace))
            .await?;
        let mut ingresses = Vec::new();
        for object in objects.iter() {
            let ingress: Ingress = parse_object(object)?;
            if backend_service_names(&ingress).contains(name) {
                ingresses.push(ingress);
            }
        }
        Ok(ingresses)
    }
}
