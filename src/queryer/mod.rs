//! Relationship queries
//!
//! A [`Queryer`] answers kind-specific questions about an object ("which
//! services select this pod", "who owns this replica set"). Visitors depend on
//! the trait only; [`StoreQueryer`] answers from a [`Store`](crate::store::Store)
//! and memoizes results for the lifetime of one graph request.

mod store_queryer;

pub use store_queryer::StoreQueryer;

use crate::models::ConversionError;
use crate::store::StoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use kube::core::DynamicObject;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Relationship lookups backed by cluster state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Queryer: Send + Sync {
    /// Services in the pod's namespace whose selector matches the pod's labels
    async fn services_for_pod(&self, pod: &Pod) -> Result<Vec<Service>, QueryError>;

    /// Service account named by the pod spec (`default` when unset)
    async fn service_account_for_pod(
        &self,
        pod: &Pod,
    ) -> Result<Option<ServiceAccount>, QueryError>;

    /// The object's controlling owner, or its first owner when none controls it
    async fn owner_reference_for_object(
        &self,
        object: &DynamicObject,
    ) -> Result<Option<DynamicObject>, QueryError>;

    /// Objects of `api_version`/`kind` in the owner's namespace that list it
    /// as an owner
    async fn owned_objects(
        &self,
        owner: &DynamicObject,
        api_version: &str,
        kind: &str,
    ) -> Result<Vec<DynamicObject>, QueryError>;

    /// Pods selected by the service's selector
    async fn pods_for_service(&self, service: &Service) -> Result<Vec<Pod>, QueryError>;

    /// Services referenced by the ingress default backend and rule paths
    async fn services_for_ingress(&self, ingress: &Ingress) -> Result<Vec<Service>, QueryError>;

    /// Ingresses in the service's namespace that route to it
    async fn ingresses_for_service(&self, service: &Service) -> Result<Vec<Ingress>, QueryError>;
}
