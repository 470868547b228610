//! Resource viewer: builds the relationship graph for one object
//!
//! Per request the viewer wires a fresh queryer, visitor registry, traversal
//! engine and collector over the shared store, walks from the root, then
//! evaluates statuses and assembles the graph. Nothing is shared between
//! requests except the store.

mod assembler;
mod collector;
mod graph;
mod object_node;
mod pod_group_node;

pub use assembler::{DEFAULT_POD_GROUP_THRESHOLD, GraphAssembler};
pub use collector::{Collector, LookupErrors, Snapshot};
pub use graph::{Graph, GraphEdge, GraphReady, Node, NodeKey};
pub use object_node::ObjectNode;
pub use pod_group_node::PodGroupNode;

use crate::config::Config;
use crate::link::{LinkError, LinkGenerator};
use crate::models::ObjectKey;
use crate::objectstatus::{RuleEvaluator, StatusRegistry};
use crate::objectvisitor::{
    DEFAULT_MAX_CONCURRENCY, DefaultVisitor, TraversalError, Visitor, VisitorRegistry,
};
use crate::queryer::StoreQueryer;
use crate::store::{Store, StoreError, StoreKey};
use kube::core::DynamicObject;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default cap on distinct objects in one graph
pub const DEFAULT_MAX_OBJECTS: usize = 5000;

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("failed to link node: {0}")]
    Link(#[from] LinkError),

    #[error("pod group {0} has no members")]
    EmptyGroup(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("graph request was cancelled")]
    Cancelled,

    #[error("object {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Traversal(TraversalError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

impl From<TraversalError> for ViewerError {
    fn from(error: TraversalError) -> Self {
        match error {
            TraversalError::Cancelled => ViewerError::Cancelled,
            other => ViewerError::Traversal(other),
        }
    }
}

/// Tuning for one graph build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOptions {
    pub pod_group_threshold: usize,
    pub max_concurrency: usize,
    pub max_objects: usize,
    pub loading_retries: u32,
    pub loading_interval: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            pod_group_threshold: DEFAULT_POD_GROUP_THRESHOLD,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_objects: DEFAULT_MAX_OBJECTS,
            loading_retries: 0,
            loading_interval: Duration::ZERO,
        }
    }
}

impl From<&Config> for ViewerOptions {
    fn from(config: &Config) -> Self {
        Self {
            pod_group_threshold: config.graph.pod_group_threshold,
            max_concurrency: config.graph.max_concurrency,
            max_objects: config.graph.max_objects,
            loading_retries: config.store.loading_retries,
            loading_interval: Duration::from_millis(config.store.loading_interval_ms),
        }
    }
}

pub struct ResourceViewer {
    store: Arc<dyn Store>,
    link: Arc<dyn LinkGenerator>,
    status_rules: Arc<StatusRegistry>,
    options: ViewerOptions,
}

impl ResourceViewer {
    pub fn new(store: Arc<dyn Store>, link: Arc<dyn LinkGenerator>) -> Self {
        Self {
            store,
            link,
            status_rules: Arc::new(StatusRegistry::with_defaults()),
            options: ViewerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_status_rules(mut self, rules: StatusRegistry) -> Self {
        self.status_rules = Arc::new(rules);
        self
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Build the graph rooted at a stored object
    pub async fn visit_key(
        &self,
        key: &ObjectKey,
        cancel: CancellationToken,
    ) -> Result<Graph, ViewerError> {
        let root = self
            .store
            .get(&StoreKey::for_object(key))
            .await?
            .ok_or_else(|| ViewerError::NotFound(key.to_string()))?;
        self.visit(&root, cancel).await
    }

    /// Build the graph rooted at `root`.
    ///
    /// A cancelled token yields [`ViewerError::Cancelled`] and no graph.
    pub async fn visit(
        &self,
        root: &DynamicObject,
        cancel: CancellationToken,
    ) -> Result<Graph, ViewerError> {
        let root_key = ObjectKey::from_object(root);
        tracing::info!("Building resource graph for {}", root_key);

        let queryer = Arc::new(StoreQueryer::new(self.store.clone()).with_loading_wait(
            self.options.loading_retries,
            self.options.loading_interval,
        ));
        let registry = Arc::new(VisitorRegistry::with_defaults(queryer));
        let visitor = DefaultVisitor::new(registry, cancel.clone())
            .with_max_concurrency(self.options.max_concurrency);
        let collector = Collector::new(self.options.max_objects);

        visitor.visit(root, &collector, true).await?;
        if cancel.is_cancelled() {
            return Err(ViewerError::Cancelled);
        }

        let snapshot = collector.into_snapshot();
        tracing::debug!(
            "Traversal of {} found {} objects and {} edges",
            root_key,
            snapshot.objects.len(),
            snapshot.edges.len()
        );

        let evaluator = RuleEvaluator::new(self.store.clone(), self.status_rules.clone());
        let assembler = GraphAssembler::new(self.link.as_ref(), &evaluator)
            .with_pod_group_threshold(self.options.pod_group_threshold);

        let graph = tokio::select! {
            _ = cancel.cancelled() => return Err(ViewerError::Cancelled),
            graph = assembler.assemble(&snapshot) => graph?,
        };

        tracing::info!(
            "Resource graph for {} has {} nodes and {} edges",
            root_key,
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }
}
