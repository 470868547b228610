//! Typed, directed relationships between objects

use super::ObjectKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship tag carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// `from` owns `to` through an owner reference
    Owner,
    /// `from` selects `to` with a label selector (Service -> Pod)
    SelectorMatch,
    /// `from` names `to` explicitly (Pod -> ServiceAccount)
    Reference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Owner => "owner",
            EdgeKind::SelectorMatch => "selector-match",
            EdgeKind::Reference => "reference",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two objects.
///
/// Ordered and hashable so an edge set deduplicates on `(from, to, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: ObjectKey,
    pub to: ObjectKey,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from: ObjectKey, to: ObjectKey, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }
}
