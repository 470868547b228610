//! Owner reference edges, applied to every object

use super::{KindVisitor, ObjectHandler, Relations, TraversalError, Visitor};
use crate::models::EdgeKind;
use crate::queryer::Queryer;
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::sync::Arc;

/// Links an object to the object that owns it
pub struct ObjectVisitor {
    queryer: Arc<dyn Queryer>,
}

impl ObjectVisitor {
    pub fn new(queryer: Arc<dyn Queryer>) -> Self {
        Self { queryer }
    }
}

#[async_trait]
impl KindVisitor for ObjectVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let mut relations = Relations::new(object);

        let owner = self.queryer.owner_reference_for_object(object).await;
        if let Some(Some(owner)) = relations.record(owner) {
            relations.incoming(owner, EdgeKind::Owner);
        }

        relations.follow(handler, visitor).await
    }
}
