//! Object relationship traversal
//!
//! The [`DefaultVisitor`] walks from a root object through every related
//! object it can discover, reporting edges to an [`ObjectHandler`]. How edges
//! are discovered for a given kind is delegated to a [`KindVisitor`] looked up
//! in the [`VisitorRegistry`].
//!
//! Each object is expanded at most once per traversal. Lookup failures are
//! attached to the object they concern; handler failures abort the walk.

mod controller;
mod engine;
mod ingress;
mod object;
mod pod;
mod registry;
mod relations;
mod service;

pub use controller::ControllerVisitor;
pub use engine::DefaultVisitor;
pub use ingress::IngressVisitor;
pub use object::ObjectVisitor;
pub use pod::PodVisitor;
pub use registry::VisitorRegistry;
pub use relations::{Direction, Relation, Relations};
pub use service::ServiceVisitor;

use crate::models::EdgeKind;
use async_trait::async_trait;
use kube::core::DynamicObject;

/// Default bound on concurrently visited children of one object
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Errors raised by an [`ObjectHandler`]; these end the traversal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("graph exceeds the limit of {limit} objects")]
    TooManyObjects { limit: usize },

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    #[error("traversal was cancelled")]
    Cancelled,

    #[error("object handler failed: {0}")]
    Handler(#[from] HandlerError),
}

/// Graph accumulator fed by the traversal
#[cfg_attr(test, mockall::automock)]
pub trait ObjectHandler: Send + Sync {
    /// Record an object as a graph member (called for the root)
    fn process(&self, object: &DynamicObject) -> Result<(), HandlerError>;

    /// Record a directed edge; both endpoints become graph members
    fn add_edge(
        &self,
        from: &DynamicObject,
        to: &DynamicObject,
        kind: EdgeKind,
    ) -> Result<(), HandlerError>;

    /// Attach a failed relationship lookup to the object it concerns
    fn add_lookup_error(&self, object: &DynamicObject, error: String);
}

/// Recursive traversal entry point
#[async_trait]
pub trait Visitor: Send + Sync {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        is_root: bool,
    ) -> Result<(), TraversalError>;

    /// Fan-out bound for children of a single object
    fn max_concurrency(&self) -> usize {
        DEFAULT_MAX_CONCURRENCY
    }
}

/// Discovers the edges of one kind and hands related objects back to the
/// traversal
#[async_trait]
pub trait KindVisitor: Send + Sync {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Visitor that records what it was asked to visit without recursing
    #[derive(Default)]
    pub struct RecordingVisitor {
        pub visited: Mutex<Vec<DynamicObject>>,
    }

    impl RecordingVisitor {
        pub fn visited_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self
                .visited
                .lock()
                .unwrap()
                .iter()
                .filter_map(|o| o.metadata.name.clone())
                .collect();
            names.sort();
            names
        }
    }

    #[async_trait]
    impl Visitor for RecordingVisitor {
        async fn visit(
            &self,
            object: &DynamicObject,
            _handler: &dyn ObjectHandler,
            is_root: bool,
        ) -> Result<(), TraversalError> {
            assert!(!is_root);
            self.visited.lock().unwrap().push(object.clone());
            Ok(())
        }
    }

    pub fn name_of(object: &DynamicObject) -> &str {
        object.metadata.name.as_deref().unwrap_or_default()
    }
}
