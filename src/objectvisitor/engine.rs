//! Traversal engine

use super::{
    DEFAULT_MAX_CONCURRENCY, ObjectHandler, TraversalError, Visitor, VisitorRegistry,
};
use crate::models::{GroupVersionKind, ObjectKey};
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Objects seen during one traversal
#[derive(Debug, Default)]
struct VisitState {
    visited: HashSet<ObjectKey>,
    in_flight: HashSet<ObjectKey>,
}

impl VisitState {
    /// Claim an object; false when it was already claimed
    fn begin(&mut self, key: &ObjectKey) -> bool {
        if !self.visited.insert(key.clone()) {
            return false;
        }
        self.in_flight.insert(key.clone());
        true
    }

    fn finish(&mut self, key: &ObjectKey) {
        self.in_flight.remove(key);
    }
}

/// Registry-driven visitor with a per-traversal visited set.
///
/// Create one instance per traversal; the visited set is never reset.
pub struct DefaultVisitor {
    registry: Arc<VisitorRegistry>,
    state: Mutex<VisitState>,
    cancel: CancellationToken,
    max_concurrency: usize,
}

impl DefaultVisitor {
    pub fn new(registry: Arc<VisitorRegistry>, cancel: CancellationToken) -> Self {
        Self {
            registry,
            state: Mutex::new(VisitState::default()),
            cancel,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Number of objects expanded so far
    pub fn visited_count(&self) -> usize {
        self.state().visited.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.state().in_flight.len()
    }

    fn state(&self) -> MutexGuard<'_, VisitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn dispatch(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
    ) -> Result<(), TraversalError> {
        let owners = self.registry.owners();
        let typed = GroupVersionKind::from_object(object).and_then(|gvk| self.registry.get(&gvk));

        match typed {
            Some(kind_visitor) => {
                futures::try_join!(
                    owners.visit(object, handler, self),
                    kind_visitor.visit(object, handler, self)
                )?;
                Ok(())
            }
            None => owners.visit(object, handler, self).await,
        }
    }
}

#[async_trait]
impl Visitor for DefaultVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        is_root: bool,
    ) -> Result<(), TraversalError> {
        if self.cancel.is_cancelled() {
            return Err(TraversalError::Cancelled);
        }

        let key = ObjectKey::from_object(object);
        if !self.state().begin(&key) {
            tracing::trace!("Already visited {}", key);
            return Ok(());
        }

        tracing::debug!("Visiting {}", key);
        if is_root {
            handler.process(object)?;
        }

        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(TraversalError::Cancelled),
            result = self.dispatch(object, handler) => result,
        };

        self.state().finish(&key);
        result
    }

    fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}
