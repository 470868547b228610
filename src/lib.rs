//! kubelens library
//!
//! Builds the relationship graph around a Kubernetes object: a concurrent
//! traversal over owners, owned objects, selectors and references, per-kind
//! health rules, and an assembler that collapses sibling pods into groups.
//!
//! The binary is a thin wrapper over [`cli`]; everything else is usable as a
//! library against any [`store::Store`].

pub mod cli;
pub mod cluster;
pub mod config;
pub mod link;
pub mod models;
pub mod objectstatus;
pub mod objectvisitor;
pub mod queryer;
pub mod resourceviewer;
pub mod store;
pub mod view;

#[cfg(test)]
mod testutil;

pub use models::{Edge, EdgeKind, GroupVersionKind, ObjectKey};
pub use resourceviewer::{Graph, GraphReady, ResourceViewer, ViewerError, ViewerOptions};
pub use store::{MemoryStore, Store, StoreKey};
