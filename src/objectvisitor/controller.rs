//! Controller to owned-object edges
//!
//! One visitor type serves every controller kind; it is parameterized by the
//! kind of object the controller creates (ReplicaSet -> Pod,
//! Deployment -> ReplicaSet, CronJob -> Job).

use super::{KindVisitor, ObjectHandler, Relations, TraversalError, Visitor};
use crate::models::{EdgeKind, KnownKind};
use crate::queryer::Queryer;
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::sync::Arc;

pub struct ControllerVisitor {
    queryer: Arc<dyn Queryer>,
    owned: KnownKind,
}

impl ControllerVisitor {
    pub fn new(queryer: Arc<dyn Queryer>, owned: KnownKind) -> Self {
        Self { queryer, owned }
    }
}

#[async_trait]
impl KindVisitor for ControllerVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let mut relations = Relations::new(object);

        let owned = self
            .queryer
            .owned_objects(object, self.owned.api_version(), self.owned.as_str())
            .await;
        for child in relations.record(owned).unwrap_or_default() {
            relations.outgoing(child, EdgeKind::Owner);
        }

        relations.follow(handler, visitor).await
    }
}
