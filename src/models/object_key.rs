//! Object identity types

use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of a cluster object within a graph.
///
/// Two objects with equal keys are the same node. `namespace` is empty for
/// cluster-scoped kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectKey {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build the key for a dynamic object.
    ///
    /// Missing type information or names produce empty fields rather than an
    /// error; such objects still get a stable (if degenerate) identity.
    pub fn from_object(object: &DynamicObject) -> Self {
        let (api_version, kind) = object
            .types
            .as_ref()
            .map(|t| (t.api_version.clone(), t.kind.clone()))
            .unwrap_or_default();

        Self {
            api_version,
            kind,
            namespace: object.metadata.namespace.clone().unwrap_or_default(),
            name: object.metadata.name.clone().unwrap_or_default(),
        }
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(&self.api_version, &self.kind)
    }

    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

/// Registry key for kind-based dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionKind {
    /// API group, empty for the core group
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Split an `apiVersion` string (`apps/v1`, `v1`) into group and version
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    /// GVK of a typed k8s-openapi resource
    pub fn of<K: k8s_openapi::Resource>() -> Self {
        Self::new(K::GROUP, K::VERSION, K::KIND)
    }

    pub fn from_object(object: &DynamicObject) -> Option<Self> {
        object
            .types
            .as_ref()
            .map(|t| Self::from_api_version(&t.api_version, &t.kind))
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::Pod;

    #[test]
    fn test_gvk_from_api_version() {
        let gvk = GroupVersionKind::from_api_version("apps/v1", "Deployment");
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk, GroupVersionKind::of::<Deployment>());

        let core = GroupVersionKind::from_api_version("v1", "Pod");
        assert_eq!(core.group, "");
        assert_eq!(core.api_version(), "v1");
        assert_eq!(core, GroupVersionKind::of::<Pod>());
    }

    #[test]
    fn test_object_key_from_object() {
        let object: DynamicObject = serde_json::from_value(serde_json::json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "web", "namespace": "shop" }
        }))
        .unwrap();

        let key = ObjectKey::from_object(&object);
        assert_eq!(key, ObjectKey::new("apps/v1", "Deployment", "shop", "web"));
        assert_eq!(key.to_string(), "apps/v1:Deployment:shop:web");
        assert!(!key.is_cluster_scoped());
    }

    #[test]
    fn test_object_key_ordering_is_total() {
        let a = ObjectKey::new("v1", "Pod", "default", "a");
        let b = ObjectKey::new("v1", "Pod", "default", "b");
        let ns = ObjectKey::new("v1", "Namespace", "", "default");
        let mut keys = vec![b.clone(), a.clone(), ns.clone()];
        keys.sort();
        assert_eq!(keys, vec![ns, a, b]);
    }
}
