//! Kind-to-visitor dispatch table
//!
//! To teach the traversal a new kind, register a [`KindVisitor`] for its
//! group/version/kind. Kinds without an entry still get owner reference edges
//! from the owner visitor, which runs for every object.

use super::{
    ControllerVisitor, IngressVisitor, KindVisitor, ObjectVisitor, PodVisitor, ServiceVisitor,
};
use crate::models::{GroupVersionKind, KnownKind};
use crate::queryer::Queryer;
use std::collections::HashMap;
use std::sync::Arc;

/// Controllers and the kind of object each one owns
const CONTROLLED_KINDS: &[(KnownKind, KnownKind)] = &[
    (KnownKind::Deployment, KnownKind::ReplicaSet),
    (KnownKind::ReplicaSet, KnownKind::Pod),
    (KnownKind::ReplicationController, KnownKind::Pod),
    (KnownKind::StatefulSet, KnownKind::Pod),
    (KnownKind::DaemonSet, KnownKind::Pod),
    (KnownKind::Job, KnownKind::Pod),
    (KnownKind::CronJob, KnownKind::Job),
];

pub struct VisitorRegistry {
    visitors: HashMap<GroupVersionKind, Arc<dyn KindVisitor>>,
    owners: Arc<dyn KindVisitor>,
}

impl VisitorRegistry {
    /// Empty registry with the visitor applied to every object
    pub fn new(owners: Arc<dyn KindVisitor>) -> Self {
        Self {
            visitors: HashMap::new(),
            owners,
        }
    }

    /// Registry for the built-in kinds
    pub fn with_defaults(queryer: Arc<dyn Queryer>) -> Self {
        let mut registry = Self::new(Arc::new(ObjectVisitor::new(queryer.clone())));

        registry.register(
            KnownKind::Pod.gvk(),
            Arc::new(PodVisitor::new(queryer.clone())),
        );
        for (controller, owned) in CONTROLLED_KINDS {
            registry.register(
                controller.gvk(),
                Arc::new(ControllerVisitor::new(queryer.clone(), *owned)),
            );
        }
        registry.register(
            KnownKind::Service.gvk(),
            Arc::new(ServiceVisitor::new(queryer.clone())),
        );
        registry.register(
            KnownKind::Ingress.gvk(),
            Arc::new(IngressVisitor::new(queryer)),
        );

        tracing::debug!("Registered visitors for {} kinds", registry.len());
        registry
    }

    /// Add or replace the visitor for a kind
    pub fn register(&mut self, gvk: GroupVersionKind, visitor: Arc<dyn KindVisitor>) {
        self.visitors.insert(gvk, visitor);
    }

    pub fn get(&self, gvk: &GroupVersionKind) -> Option<Arc<dyn KindVisitor>> {
        self.visitors.get(gvk).cloned()
    }

    pub fn owners(&self) -> Arc<dyn KindVisitor> {
        self.owners.clone()
    }

    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.visitors.contains_key(gvk)
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}
