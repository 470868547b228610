//! Pod group nodes

use super::AssembleError;
use super::collector::{LookupErrors, NO_LOOKUP_ERRORS};
use super::graph::Node;
use super::object_node::resolve_status;
use crate::models::{KnownKind, ObjectKey};
use crate::objectstatus::StatusEvaluator;
use crate::view::{Component, PodStatus};
use kube::core::DynamicObject;

/// Collapses pods sharing an owner into one node whose status is the worst
/// member status. Details carry every member's own status.
pub struct PodGroupNode<'a> {
    evaluator: &'a dyn StatusEvaluator,
    lookup_errors: &'a LookupErrors,
}

impl<'a> PodGroupNode<'a> {
    pub fn new(evaluator: &'a dyn StatusEvaluator) -> Self {
        Self {
            evaluator,
            lookup_errors: &NO_LOOKUP_ERRORS,
        }
    }

    pub fn with_lookup_errors(mut self, lookup_errors: &'a LookupErrors) -> Self {
        self.lookup_errors = lookup_errors;
        self
    }

    pub async fn create(&self, name: &str, members: &[DynamicObject]) -> Result<Node, AssembleError> {
        if members.is_empty() {
            return Err(AssembleError::EmptyGroup(name.to_string()));
        }

        let mut pod_status = PodStatus::new();
        let mut keys = Vec::with_capacity(members.len());
        for member in members {
            let key = ObjectKey::from_object(member);
            let status = resolve_status(self.evaluator, member, self.lookup_errors).await;
            pod_status.add_summary(key.name.clone(), status.details, status.status);
            keys.push(key);
        }
        keys.sort();

        Ok(Node {
            name: name.to_string(),
            api_version: KnownKind::Pod.api_version().to_string(),
            kind: KnownKind::Pod.as_str().to_string(),
            status: pod_status.status(),
            details: vec![Component::PodStatus(pod_status)],
            path: None,
            is_group: true,
            members: keys,
        })
    }
}
