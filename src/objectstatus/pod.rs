//! Pod health derived from phase and container readiness

use super::{NodeStatus, ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::core::v1::Pod;
use kube::core::DynamicObject;

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate)
}

fn evaluate(object: &DynamicObject, _: &[DynamicObject]) -> Result<ObjectStatus, StatusError> {
    let pod: Pod = parse_object(object)?;
    Ok(pod_status(&pod))
}

pub fn pod_status(pod: &Pod) -> ObjectStatus {
    let status = pod.status.as_ref();
    let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or("Pending");

    match phase {
        "Failed" => ObjectStatus::error("Pod has failed"),
        "Pending" => ObjectStatus::warning("Pod is pending"),
        "Unknown" => ObjectStatus::new(NodeStatus::Unknown, "Pod phase is unknown"),
        "Running" => {
            let unready = status
                .and_then(|s| s.container_statuses.as_ref())
                .into_iter()
                .flatten()
                .any(|c| !c.ready);
            if unready {
                ObjectStatus::warning("Pod containers are not ready")
            } else {
                ObjectStatus::ok("Pod is OK")
            }
        }
        _ => ObjectStatus::ok("Pod is OK"),
    }
}
