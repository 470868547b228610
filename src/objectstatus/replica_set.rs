//! ReplicaSet and ReplicationController health
//!
//! Both kinds share the three-way replica rule and differ only in wording.

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::ReplicationController;
use kube::core::DynamicObject;

pub(super) fn replica_set_rule() -> StatusRule {
    StatusRule::new(evaluate_replica_set)
}

pub(super) fn replication_controller_rule() -> StatusRule {
    StatusRule::new(evaluate_replication_controller)
}

fn evaluate_replica_set(
    object: &DynamicObject,
    _: &[DynamicObject],
) -> Result<ObjectStatus, StatusError> {
    let replica_set: ReplicaSet = parse_object(object)?;
    let desired = replica_set.spec.as_ref().and_then(|s| s.replicas);
    let available = replica_set.status.as_ref().and_then(|s| s.available_replicas);
    Ok(replica_status("Replica Set", desired, available))
}

fn evaluate_replication_controller(
    object: &DynamicObject,
    _: &[DynamicObject],
) -> Result<ObjectStatus, StatusError> {
    let controller: ReplicationController = parse_object(object)?;
    let desired = controller.spec.as_ref().and_then(|s| s.replicas);
    let available = controller.status.as_ref().and_then(|s| s.available_replicas);
    Ok(replica_status("Replication Controller", desired, available))
}

fn replica_status(noun: &str, desired: Option<i32>, available: Option<i32>) -> ObjectStatus {
    let desired = desired.unwrap_or(0);
    let available = available.unwrap_or(0);

    if desired == 0 {
        ObjectStatus::error(format!("{} has no replicas available", noun))
    } else if available < desired {
        ObjectStatus::warning(format!(
            "Expected {} replicas, but {} are available",
            desired, available
        ))
    } else {
        ObjectStatus::ok(format!("{} is OK", noun))
    }
}
