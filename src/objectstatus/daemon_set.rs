//! DaemonSet health

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::core::DynamicObject;

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate)
}

fn evaluate(object: &DynamicObject, _: &[DynamicObject]) -> Result<ObjectStatus, StatusError> {
    let daemon_set: DaemonSet = parse_object(object)?;
    let (desired, ready) = daemon_set
        .status
        .as_ref()
        .map(|s| (s.desired_number_scheduled, s.number_ready))
        .unwrap_or_default();

    if ready < desired {
        Ok(ObjectStatus::warning("Daemon Set pods are not ready"))
    } else {
        Ok(ObjectStatus::ok("Daemon Set is OK"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;

    fn daemon_set(desired: i32, ready: i32) -> DynamicObject {
        testutil::object(json!({
            "apiVersion": "apps/v1",
            "kind": "DaemonSet",
            "metadata": { "name": "agent", "namespace": "kube-system" },
            "spec": { "selector": { "matchLabels": { "app": "agent" } }, "template": {} },
            "status": {
                "currentNumberScheduled": desired,
                "desiredNumberScheduled": desired,
                "numberMisscheduled": 0,
                "numberReady": ready
            }
        }))
    }

    #[test]
    fn test_daemon_set_status() {
        assert_eq!(
            evaluate(&daemon_set(3, 3), &[]).unwrap(),
            ObjectStatus::ok("Daemon Set is OK")
        );
        assert_eq!(
            evaluate(&daemon_set(3, 2), &[]).unwrap(),
            ObjectStatus::warning("Daemon Set pods are not ready")
        );
        assert!(evaluate(&testutil::pod("default", "agent"), &[]).is_err());
    }
}
