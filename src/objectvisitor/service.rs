//! Service to selected pod edges, and ingress to service edges

use super::{KindVisitor, ObjectHandler, Relations, TraversalError, Visitor};
use crate::models::{EdgeKind, parse_object};
use crate::queryer::Queryer;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::core::DynamicObject;
use std::sync::Arc;

pub struct ServiceVisitor {
    queryer: Arc<dyn Queryer>,
}

impl ServiceVisitor {
    pub fn new(queryer: Arc<dyn Queryer>) -> Self {
        Self { queryer }
    }
}

#[async_trait]
impl KindVisitor for ServiceVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let mut relations = Relations::new(object);

        if let Some(service) = relations.record(parse_object::<Service>(object)) {
            let pods = self.queryer.pods_for_service(&service).await;
            for pod in relations.record(pods).unwrap_or_default() {
                relations.outgoing_typed(&pod, EdgeKind::SelectorMatch);
            }

            let ingresses = self.queryer.ingresses_for_service(&service).await;
            for ingress in relations.record(ingresses).unwrap_or_default() {
                relations.incoming_typed(&ingress, EdgeKind::Reference);
            }
        }

        relations.follow(handler, visitor).await
    }
}
