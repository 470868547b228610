//! View components attached to graph nodes
//!
//! Only the small vocabulary the graph assembler emits. Serialized as
//! `{"type": ..., "config": ...}` for the rendering layer.

use crate::objectstatus::NodeStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum Component {
    Text { value: String },
    PodStatus(PodStatus),
}

impl Component {
    pub fn text(value: impl Into<String>) -> Self {
        Component::Text {
            value: value.into(),
        }
    }
}

/// One member's status inside a pod status summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSummary {
    pub status: NodeStatus,
    pub details: Vec<String>,
}

/// Per-pod status summary shown on a pod group node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PodStatus {
    pub pods: BTreeMap<String, PodSummary>,
}

impl PodStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_summary(&mut self, name: impl Into<String>, details: Vec<String>, status: NodeStatus) {
        self.pods.insert(name.into(), PodSummary { status, details });
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }

    /// Worst member status
    pub fn status(&self) -> NodeStatus {
        NodeStatus::worst(self.pods.values().map(|p| p.status))
    }
}
