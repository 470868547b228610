//! Assembled graph structures
//!
//! Nodes are keyed by [`NodeKey`] in a sorted map and edges are kept sorted,
//! so two builds over the same snapshot serialize identically.

use crate::link::Link;
use crate::models::{EdgeKind, ObjectKey};
use crate::objectstatus::NodeStatus;
use crate::view::Component;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Key of a node in the assembled graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    /// A single object
    Object(ObjectKey),
    /// Pods collapsed under their owning controller
    PodGroup(ObjectKey),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Object(key) => write!(f, "{}", key),
            NodeKey::PodGroup(owner) => write!(f, "pods:{}", owner),
        }
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Presentation unit of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    pub api_version: String,
    pub kind: String,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Link>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_group: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ObjectKey>,
}

impl Node {
    /// Short label used in text output
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: BTreeMap<NodeKey, Node>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn object_node(&self, key: &ObjectKey) -> Option<&Node> {
        self.nodes.get(&NodeKey::Object(key.clone()))
    }

    /// Edges leaving `key`
    pub fn edges_from<'a>(&'a self, key: &'a NodeKey) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| &e.from == key)
    }

    pub fn group_nodes(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_group)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn label(&self, key: &NodeKey) -> String {
        self.nodes
            .get(key)
            .map(Node::label)
            .unwrap_or_else(|| key.to_string())
    }

    /// Plain-text rendering for terminals and snapshots
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "nodes:");
        for node in self.nodes.values() {
            let _ = write!(out, "  [{}] {}", node.status, node.label());
            if node.is_group {
                let _ = write!(out, " ({} members)", node.members.len());
            }
            let _ = writeln!(out);

            for detail in &node.details {
                match detail {
                    Component::Text { value } => {
                        let _ = writeln!(out, "      {}", value);
                    }
                    Component::PodStatus(pods) => {
                        for (name, summary) in &pods.pods {
                            let _ = writeln!(out, "      {}: {}", name, summary.status);
                        }
                    }
                }
            }
        }

        let _ = writeln!(out, "edges:");
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  {} -> {} ({})",
                self.label(&edge.from),
                self.label(&edge.to),
                edge.kind
            );
        }

        out
    }
}

/// Event payload announcing a finished graph
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "resourceViewer")]
pub struct GraphReady {
    pub graph: Graph,
}

impl GraphReady {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }
}
