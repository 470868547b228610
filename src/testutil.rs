//! Shared helpers for unit tests

use crate::store::parse_manifests;
use kube::core::DynamicObject;

/// Build a dynamic object from a JSON literal
pub fn object(value: serde_json::Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

/// Find one object in multi-document manifests by kind and name
pub fn find_object(manifests: &str, kind: &str, name: &str) -> DynamicObject {
    parse_manifests(manifests)
        .unwrap()
        .into_iter()
        .find(|o| {
            o.types.as_ref().is_some_and(|t| t.kind == kind)
                && o.metadata.name.as_deref() == Some(name)
        })
        .unwrap_or_else(|| panic!("no {} named {} in manifests", kind, name))
}

pub fn pod(namespace: &str, name: &str) -> DynamicObject {
    object(serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace, "uid": format!("{}-uid", name) },
        "spec": { "containers": [] }
    }))
}

pub fn typed(api_version: &str, kind: &str, namespace: &str, name: &str) -> DynamicObject {
    object(serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "name": name, "namespace": namespace, "uid": format!("{}-uid", name) }
    }))
}
