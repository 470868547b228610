//! Ingress to backend service edges

use super::{KindVisitor, ObjectHandler, Relations, TraversalError, Visitor};
use crate::models::{EdgeKind, parse_object};
use crate::queryer::Queryer;
use async_trait::async_trait;
use k8s_openapi::api::networking::v1::Ingress;
use kube::core::DynamicObject;
use std::sync::Arc;

pub struct IngressVisitor {
    queryer: Arc<dyn Queryer>,
}

impl IngressVisitor {
    pub fn new(queryer: Arc<dyn Queryer>) -> Self {
        Self { queryer }
    }
}

#[async_trait]
impl KindVisitor for IngressVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let mut relations = Relations::new(object);

        if let Some(ingress) = relations.record(parse_object::<Ingress>(object)) {
            let services = self.queryer.services_for_ingress(&ingress).await;
            for service in relations.record(services).unwrap_or_default() {
                relations.outgoing_typed(&service, EdgeKind::Reference);
            }
        }

        relations.follow(handler, visitor).await
    }
}
