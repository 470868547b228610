//! Object health evaluation
//!
//! Each supported kind has a [`StatusRule`]: a pure function from the object
//! (plus optional dependents read from the store) to an [`ObjectStatus`].
//! [`RuleEvaluator`] dispatches by group/version/kind; kinds without a rule
//! are `Unknown`, which is not an error.

mod daemon_set;
mod deployment;
mod job;
mod pod;
mod replica_set;
mod service;
mod stateful_set;

use crate::models::{ConversionError, GroupVersionKind, KnownKind};
use crate::store::{Store, StoreError, StoreKey};
use async_trait::async_trait;
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Health of a node.
///
/// Variants are declared in severity order so `Ord` ranks them for rollups:
/// `Error > Warning > Unknown > OK`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Ok,
    #[default]
    Unknown,
    Warning,
    Error,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Ok => "OK",
            NodeStatus::Unknown => "Unknown",
            NodeStatus::Warning => "Warning",
            NodeStatus::Error => "Error",
        }
    }

    /// Worst status of a set; `Unknown` when the set is empty
    pub fn worst(statuses: impl IntoIterator<Item = NodeStatus>) -> NodeStatus {
        statuses.into_iter().max().unwrap_or_default()
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus the human-readable explanation shown with it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectStatus {
    pub status: NodeStatus,
    pub details: Vec<String>,
}

impl ObjectStatus {
    pub fn new(status: NodeStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            details: vec![detail.into()],
        }
    }

    pub fn ok(detail: impl Into<String>) -> Self {
        Self::new(NodeStatus::Ok, detail)
    }

    pub fn warning(detail: impl Into<String>) -> Self {
        Self::new(NodeStatus::Warning, detail)
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(NodeStatus::Error, detail)
    }

    /// `Unknown` with no details
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Raise the status to at least `status`, appending a detail line
    pub fn degrade(&mut self, status: NodeStatus, detail: impl Into<String>) {
        self.status = self.status.max(status);
        self.details.push(detail.into());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("cannot evaluate status: {0}")]
    Conversion(#[from] ConversionError),

    #[error("failed to load dependents {key}: {source}")]
    Dependents {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Selects the dependents a rule needs, if any
pub type DependentsFn = fn(&DynamicObject) -> Option<StoreKey>;

/// Computes a status from the object and its dependents
pub type EvaluateFn = fn(&DynamicObject, &[DynamicObject]) -> Result<ObjectStatus, StatusError>;

#[derive(Clone, Copy)]
pub struct StatusRule {
    pub dependents: Option<DependentsFn>,
    pub evaluate: EvaluateFn,
}

impl StatusRule {
    pub fn new(evaluate: EvaluateFn) -> Self {
        Self {
            dependents: None,
            evaluate,
        }
    }

    pub fn with_dependents(mut self, dependents: DependentsFn) -> Self {
        self.dependents = Some(dependents);
        self
    }
}

/// Kind-to-rule dispatch table
#[derive(Clone, Default)]
pub struct StatusRegistry {
    rules: HashMap<GroupVersionKind, StatusRule>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(KnownKind::Deployment.gvk(), deployment::rule());
        registry.register(KnownKind::ReplicaSet.gvk(), replica_set::replica_set_rule());
        registry.register(
            KnownKind::ReplicationController.gvk(),
            replica_set::replication_controller_rule(),
        );
        registry.register(KnownKind::StatefulSet.gvk(), stateful_set::rule());
        registry.register(KnownKind::DaemonSet.gvk(), daemon_set::rule());
        registry.register(KnownKind::Pod.gvk(), pod::rule());
        registry.register(KnownKind::Job.gvk(), job::rule());
        registry.register(KnownKind::Service.gvk(), service::rule());
        registry
    }

    pub fn register(&mut self, gvk: GroupVersionKind, rule: StatusRule) {
        self.rules.insert(gvk, rule);
    }

    pub fn get(&self, gvk: &GroupVersionKind) -> Option<&StatusRule> {
        self.rules.get(gvk)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Health lookup for a single object
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusEvaluator: Send + Sync {
    async fn status(&self, object: &DynamicObject) -> Result<ObjectStatus, StatusError>;
}

/// Evaluator that applies registered rules, reading dependents from a store
pub struct RuleEvaluator {
    store: Arc<dyn Store>,
    rules: Arc<StatusRegistry>,
}

impl RuleEvaluator {
    pub fn new(store: Arc<dyn Store>, rules: Arc<StatusRegistry>) -> Self {
        Self { store, rules }
    }

    pub fn with_defaults(store: Arc<dyn Store>) -> Self {
        Self::new(store, Arc::new(StatusRegistry::with_defaults()))
    }

    async fn dependents(&self, key: StoreKey) -> Result<Vec<DynamicObject>, StatusError> {
        let result = if key.name.is_some() {
            self.store.get(&key).await.map(|o| o.into_iter().collect())
        } else {
            self.store.list(&key).await.map(|list| list.items)
        };

        result.map_err(|source| StatusError::Dependents {
            key: key.to_string(),
            source,
        })
    }
}

#[async_trait]
impl StatusEvaluator for RuleEvaluator {
    async fn status(&self, object: &DynamicObject) -> Result<ObjectStatus, StatusError> {
        let gvk = GroupVersionKind::from_object(object).ok_or(ConversionError::MissingTypeMeta)?;

        let Some(rule) = self.rules.get(&gvk).copied() else {
            return Ok(ObjectStatus::unknown());
        };

        let dependents = match rule.dependents.and_then(|select| select(object)) {
            Some(key) => self.dependents(key).await?,
            None => Vec::new(),
        };

        (rule.evaluate)(object, &dependents)
    }
}
