//! Job health

use super::{ObjectStatus, StatusError, StatusRule};
use crate::models::parse_object;
use k8s_openapi::api::batch::v1::Job;
use kube::core::DynamicObject;

pub(super) fn rule() -> StatusRule {
    StatusRule::new(evaluate)
}

fn evaluate(object: &DynamicObject, _: &[DynamicObject]) -> Result<ObjectStatus, StatusError> {
    let job: Job = parse_object(object)?;
    let failed = job
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .into_iter()
        .flatten()
        .any(|c| c.type_ == "Failed" && c.status == "True");

    if failed {
        Ok(ObjectStatus::error("Job has failed"))
    } else {
        Ok(ObjectStatus::ok("Job is OK"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;

    fn job(conditions: serde_json::Value) -> DynamicObject {
        testutil::object(json!({
            "apiVersion": "batch/v1",
            "kind": "Job",
            "metadata": { "name": "migrate", "namespace": "default" },
            "spec": { "template": {} },
            "status": { "conditions": conditions }
        }))
    }

    #[test]
    fn test_job_status() {
        let failed = job(json!([
            { "type": "Failed", "status": "True", "reason": "BackoffLimitExceeded" }
        ]));
        assert_eq!(evaluate(&failed, &[]).unwrap(), ObjectStatus::error("Job has failed"));

        let complete = job(json!([{ "type": "Complete", "status": "True" }]));
        assert_eq!(evaluate(&complete, &[]).unwrap(), ObjectStatus::ok("Job is OK"));

        let running = job(json!([]));
        assert_eq!(evaluate(&running, &[]).unwrap(), ObjectStatus::ok("Job is OK"));
    }
}
