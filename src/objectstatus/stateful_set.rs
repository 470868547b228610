//! StatefulSet health

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::core::DynamicObject;

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate)
}

fn evaluate(object: &DynamicObject, _: &[DynamicObject]) -> Result<ObjectStatus, StatusError> {
    let stateful_set: StatefulSet = parse_object(object)?;

    // Unset replicas defaults to one on the API server
    let desired = stateful_set
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let ready = stateful_set
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    if ready < desired {
        Ok(ObjectStatus::warning("Stateful Set pods are not ready"))
    } else {
        Ok(ObjectStatus::ok("Stateful Set is OK"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;

    fn stateful_set(replicas: i32, ready: i32) -> DynamicObject {
        testutil::object(json!({
            "apiVersion": "apps/v1",
            "kind": "StatefulSet",
            "metadata": { "name": "db", "namespace": "default" },
            "spec": {
                "replicas": replicas,
                "serviceName": "db",
                "selector": { "matchLabels": { "app": "db" } },
                "template": {}
            },
            "status": { "replicas": replicas, "readyReplicas": ready }
        }))
    }

    #[test]
    fn test_stateful_set_status() {
        let cases = [
            ("in general", stateful_set(3, 3), Some(ObjectStatus::ok("Stateful Set is OK"))),
            (
                "not ready",
                stateful_set(3, 1),
                Some(ObjectStatus::warning("Stateful Set pods are not ready")),
            ),
            (
                "object is not a stateful set",
                testutil::typed("v1", "ReplicationController", "default", "db"),
                None,
            ),
            ("object has no type", testutil::object(json!({ "metadata": {} })), None),
        ];

        for (name, object, expected) in cases {
            let result = evaluate(&object, &[]);
            match expected {
                Some(expected) => assert_eq!(result.unwrap(), expected, "{}", name),
                None => assert!(result.is_err(), "{}", name),
            }
        }
    }
}
