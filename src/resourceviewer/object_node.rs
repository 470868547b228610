//! Single-object nodes

use super::AssembleError;
use super::collector::{LookupErrors, NO_LOOKUP_ERRORS};
use super::graph::Node;
use crate::link::LinkGenerator;
use crate::models::ObjectKey;
use crate::objectstatus::{NodeStatus, ObjectStatus, StatusEvaluator};
use crate::view::Component;
use kube::core::DynamicObject;
use std::collections::BTreeMap;

/// Status of one object with its lookup errors folded in.
///
/// Evaluator failures degrade to `Unknown` instead of failing the graph.
pub(crate) async fn resolve_status(
    evaluator: &dyn StatusEvaluator,
    object: &DynamicObject,
    lookup_errors: &LookupErrors,
) -> ObjectStatus {
    let key = ObjectKey::from_object(object);
    let mut status = match evaluator.status(object).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("Status evaluation failed for {}: {}", key, e);
            ObjectStatus::new(NodeStatus::Unknown, e.to_string())
        }
    };

    for error in lookup_errors.get(&key).into_iter().flatten() {
        status.degrade(NodeStatus::Unknown, error.clone());
    }
    status
}

pub struct ObjectNode<'a> {
    link: &'a dyn LinkGenerator,
    evaluator: &'a dyn StatusEvaluator,
    lookup_errors: &'a LookupErrors,
}

impl<'a> ObjectNode<'a> {
    pub fn new(link: &'a dyn LinkGenerator, evaluator: &'a dyn StatusEvaluator) -> Self {
        Self {
            link,
            evaluator,
            lookup_errors: &NO_LOOKUP_ERRORS,
        }
    }

    pub fn with_lookup_errors(mut self, lookup_errors: &'a LookupErrors) -> Self {
        self.lookup_errors = lookup_errors;
        self
    }

    pub async fn create(&self, object: &DynamicObject) -> Result<Node, AssembleError> {
        let key = ObjectKey::from_object(object);
        let path = self.link.for_object_with_query(object, &BTreeMap::new())?;
        let status = resolve_status(self.evaluator, object, self.lookup_errors).await;

        Ok(Node {
            name: key.name,
            api_version: key.api_version,
            kind: key.kind,
            status: status.status,
            details: status.details.into_iter().map(Component::text).collect(),
            path: Some(path),
            is_group: false,
            members: Vec::new(),
        })
    }
}
