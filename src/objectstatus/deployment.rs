//! Deployment health

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::apps::v1::Deployment;
use kube::core::DynamicObject;

/// Conditions that mark an otherwise healthy rollout as degraded
const WATCHED_CONDITIONS: &[&str] = &["Available", "Progressing"];

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate)
}

fn evaluate(object: &DynamicObject, _: &[DynamicObject]) -> Result<ObjectStatus, StatusError> {
    let deployment: Deployment = parse_object(object)?;
    Ok(deployment_status(&deployment))
}

pub fn deployment_status(deployment: &Deployment) -> ObjectStatus {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(0);
    let status = deployment.status.as_ref();
    let available = status.and_then(|s| s.available_replicas).unwrap_or(0);

    if desired == 0 {
        return ObjectStatus::error("No replicas exist for this deployment");
    }
    if available < desired {
        return ObjectStatus::warning(format!(
            "Expected {} replicas, but {} are available",
            desired, available
        ));
    }

    let failing = status
        .and_then(|s| s.conditions.as_ref())
        .into_iter()
        .flatten()
        .find(|c| WATCHED_CONDITIONS.contains(&c.type_.as_str()) && c.status == "False");
    if let Some(condition) = failing {
        return ObjectStatus::warning(format!(
            "Deployment condition {} is False: {}",
            condition.type_,
            condition.message.as_deref().unwrap_or_default()
        ));
    }

    ObjectStatus::ok("Deployment is OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objectstatus::NodeStatus;
    use crate::testutil;
    use serde_json::json;

    fn deployment(replicas: Option<i32>, status: serde_json::Value) -> DynamicObject {
        let mut spec = json!({ "selector": { "matchLabels": { "app": "web" } }, "template": {} });
        if let Some(replicas) = replicas {
            spec["replicas"] = json!(replicas);
        }
        testutil::object(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "web", "namespace": "default" },
            "spec": spec,
            "status": status
        }))
    }

    #[test]
    fn test_deployment_status() {
        struct Case {
            name: &'static str,
            object: DynamicObject,
            expected: Option<ObjectStatus>,
        }

        let cases = vec![
            Case {
                name: "in general",
                object: deployment(Some(1), json!({ "replicas": 1, "availableReplicas": 1 })),
                expected: Some(ObjectStatus::ok("Deployment is OK")),
            },
            Case {
                name: "no replicas",
                object: deployment(Some(0), json!({})),
                expected: Some(ObjectStatus::error("No replicas exist for this deployment")),
            },
            Case {
                name: "replicas unset",
                object: deployment(None, json!({})),
                expected: Some(ObjectStatus::error("No replicas exist for this deployment")),
            },
            Case {
                name: "not available",
                object: deployment(Some(1), json!({ "replicas": 1, "availableReplicas": 0 })),
                expected: Some(ObjectStatus::warning(
                    "Expected 1 replicas, but 0 are available",
                )),
            },
            Case {
                name: "progress deadline exceeded",
                object: deployment(
                    Some(2),
                    json!({
                        "availableReplicas": 2,
                        "conditions": [
                            { "type": "Available", "status": "True" },
                            {
                                "type": "Progressing",
                                "status": "False",
                                "reason": "ProgressDeadlineExceeded",
                                "message": "ReplicaSet web-7d9 has timed out progressing."
                            }
                        ]
                    }),
                ),
                expected: Some(ObjectStatus::warning(
                    "Deployment condition Progressing is False: ReplicaSet web-7d9 has timed out progressing.",
                )),
            },
            Case {
                name: "object is not a deployment",
                object: testutil::typed("apps/v1", "StatefulSet", "default", "web"),
                expected: None,
            },
            Case {
                name: "object has no type",
                object: testutil::object(json!({ "metadata": {} })),
                expected: None,
            },
        ];

        for case in cases {
            let result = evaluate(&case.object, &[]);
            match case.expected {
                Some(expected) => assert_eq!(result.unwrap(), expected, "{}", case.name),
                None => assert!(result.is_err(), "{}", case.name),
            }
        }
    }

    #[test]
    fn test_rule_has_no_dependents() {
        let rule = rule();
        assert!(rule.dependents.is_none());
        let status = (rule.evaluate)(&deployment(Some(1), json!({ "availableReplicas": 1 })), &[])
            .unwrap();
        assert_eq!(status.status, NodeStatus::Ok);
    }
}
