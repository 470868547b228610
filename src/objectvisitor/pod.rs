//! Pod relationships: selecting services and the pod's service account

use super::{KindVisitor, ObjectHandler, Relations, TraversalError, Visitor};
use crate::models::{EdgeKind, parse_object};
use crate::queryer::Queryer;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::core::DynamicObject;
use std::sync::Arc;

pub struct PodVisitor {
    queryer: Arc<dyn Queryer>,
}

impl PodVisitor {
    pub fn new(queryer: Arc<dyn Queryer>) -> Self {
        Self { queryer }
    }
}

#[async_trait]
impl KindVisitor for PodVisitor {
    async fn visit(
        &self,
        object: &DynamicObject,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let mut relations = Relations::new(object);

        if let Some(pod) = relations.record(parse_object::<Pod>(object)) {
            let (services, service_account) = tokio::join!(
                self.queryer.services_for_pod(&pod),
                self.queryer.service_account_for_pod(&pod)
            );

            for service in relations.record(services).unwrap_or_default() {
                relations.incoming_typed(&service, EdgeKind::SelectorMatch);
            }

            match relations.record(service_account) {
                Some(Some(service_account)) => {
                    relations.outgoing_typed(&service_account, EdgeKind::Reference)
                }
                Some(None) => tracing::debug!(
                    "Service account for pod {} not found",
                    pod.metadata.name.as_deref().unwrap_or_default()
                ),
                None => {}
            }
        }

        relations.follow(handler, visitor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objectvisitor::MockObjectHandler;
    use crate::objectvisitor::test_support::{RecordingVisitor, name_of};
    use crate::queryer::MockQueryer;
    use k8s_openapi::api::core::v1::{PodSpec, Service, ServiceAccount};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn meta(name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pod_visit() {
        let pod = Pod {
            metadata: meta("pod"),
            spec: Some(PodSpec {
                service_account_name: Some("service-account".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let object = crate::models::to_dynamic(&pod).unwrap();

        let mut queryer = MockQueryer::new();
        queryer
            .expect_services_for_pod()
            .withf(|p| p.metadata.name.as_deref() == Some("pod"))
            .times(1)
            .returning(|_| {
                Ok(vec![Service {
                    metadata: meta("service"),
                    ..Default::default()
                }])
            });
        queryer
            .expect_service_account_for_pod()
            .times(1)
            .returning(|_| {
                Ok(Some(ServiceAccount {
                    metadata: meta("service-account"),
                    ..Default::default()
                }))
            });

        let mut handler = MockObjectHandler::new();
        handler
            .expect_add_edge()
            .withf(|from, to, kind| {
                name_of(from) == "service" && name_of(to) == "pod" && *kind == EdgeKind::SelectorMatch
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        handler
            .expect_add_edge()
            .withf(|from, to, kind| {
                name_of(from) == "pod"
                    && name_of(to) == "service-account"
                    && *kind == EdgeKind::Reference
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let visitor = RecordingVisitor::default();
        PodVisitor::new(Arc::new(queryer))
            .visit(&object, &handler, &visitor)
            .await
            .unwrap();

        assert_eq!(visitor.visited_names(), vec!["service", "service-account"]);
        let kinds: Vec<_> = visitor
            .visited
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.types.as_ref().unwrap().kind.clone())
            .collect();
        assert!(kinds.contains(&"Service".to_string()));
        assert!(kinds.contains(&"ServiceAccount".to_string()));
    }

    #[tokio::test]
    async fn test_missing_service_account_is_not_an_error() {
        let object = crate::testutil::pod("default", "pod");

        let mut queryer = MockQueryer::new();
        queryer.expect_services_for_pod().returning(|_| Ok(Vec::new()));
        queryer
            .expect_service_account_for_pod()
            .returning(|_| Ok(None));

        let mut handler = MockObjectHandler::new();
        handler.expect_add_edge().never();
        handler.expect_add_lookup_error().never();

        let visitor = RecordingVisitor::default();
        PodVisitor::new(Arc::new(queryer))
            .visit(&object, &handler, &visitor)
            .await
            .unwrap();
        assert!(visitor.visited_names().is_empty());
    }

    #[tokio::test]
    async fn test_non_pod_object_reports_conversion_error() {
        let object = crate::testutil::typed("apps/v1", "Deployment", "default", "web");

        let mut queryer = MockQueryer::new();
        queryer.expect_services_for_pod().never();
        queryer.expect_service_account_for_pod().never();

        let mut handler = MockObjectHandler::new();
        handler
            .expect_add_lookup_error()
            .times(1)
            .return_const(());

        let visitor = RecordingVisitor::default();
        PodVisitor::new(Arc::new(queryer))
            .visit(&object, &handler, &visitor)
            .await
            .unwrap();
    }
}
