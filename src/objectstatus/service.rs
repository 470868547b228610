//! Service health from the ready addresses of its Endpoints

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::{KnownKind, parse_object};
use crate::store::StoreKey;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::core::DynamicObject;

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate).with_dependents(endpoints_key)
}

/// Endpoints share the service's name and namespace
fn endpoints_key(object: &DynamicObject) -> Option<StoreKey> {
    let name = object.metadata.name.as_ref()?;
    let namespace = object.metadata.namespace.as_ref()?;
    Some(
        StoreKey::for_kind(KnownKind::Endpoints)
            .in_namespace(namespace)
            .named(name),
    )
}

fn evaluate(
    object: &DynamicObject,
    dependents: &[DynamicObject],
) -> Result<ObjectStatus, StatusError> {
    let service: Service = parse_object(object)?;

    let has_selector = service
        .spec
        .as_ref()
        .and_then(|s| s.selector.as_ref())
        .is_some_and(|s| !s.is_empty());
    if !has_selector {
        return Ok(ObjectStatus::ok("Service is OK"));
    }

    let mut ready_addresses = 0;
    for dependent in dependents {
        let endpoints: Endpoints = parse_object(dependent)?;
        ready_addresses += endpoints
            .subsets
            .iter()
            .flatten()
            .map(|subset| subset.addresses.as_ref().map_or(0, |a| a.len()))
            .sum::<usize>();
    }

    if ready_addresses == 0 {
        Ok(ObjectStatus::warning("Service has no ready endpoints"))
    } else {
        Ok(ObjectStatus::ok("Service is OK"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;

    fn service(selector: serde_json::Value) -> DynamicObject {
        testutil::object(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "web", "namespace": "default" },
            "spec": { "selector": selector }
        }))
    }

    fn endpoints(addresses: serde_json::Value) -> DynamicObject {
        testutil::object(json!({
            "apiVersion": "v1",
            "kind": "Endpoints",
            "metadata": { "name": "web", "namespace": "default" },
            "subsets": [{ "addresses": addresses, "notReadyAddresses": [{ "ip": "10.0.0.9" }] }]
        }))
    }

    #[test]
    fn test_endpoints_key() {
        let key = endpoints_key(&service(json!({ "app": "web" }))).unwrap();
        assert_eq!(key.kind, "Endpoints");
        assert_eq!(key.name.as_deref(), Some("web"));
        assert_eq!(key.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_service_status() {
        let selected = service(json!({ "app": "web" }));

        assert_eq!(
            evaluate(&selected, &[endpoints(json!([{ "ip": "10.0.0.1" }]))]).unwrap(),
            ObjectStatus::ok("Service is OK")
        );
        assert_eq!(
            evaluate(&selected, &[endpoints(json!([]))]).unwrap(),
            ObjectStatus::warning("Service has no ready endpoints")
        );
        assert_eq!(
            evaluate(&selected, &[]).unwrap(),
            ObjectStatus::warning("Service has no ready endpoints")
        );

        // Services without a selector manage their endpoints by hand
        assert_eq!(
            evaluate(&service(json!({})), &[]).unwrap(),
            ObjectStatus::ok("Service is OK")
        );
    }
}
