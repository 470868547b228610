//! Content path links for graph nodes

use crate::models::{KnownKind, ObjectKey};
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Navigable link to an object's content page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("object has no name")]
    MissingName,

    #[error("object has no type information")]
    MissingTypeMeta,
}

/// Builds links for objects
#[cfg_attr(test, mockall::automock)]
pub trait LinkGenerator: Send + Sync {
    fn for_object_with_query(
        &self,
        object: &DynamicObject,
        query: &BTreeMap<String, String>,
    ) -> Result<Link, LinkError>;

    fn for_object(&self, object: &DynamicObject) -> Result<Link, LinkError> {
        self.for_object_with_query(object, &BTreeMap::new())
    }
}

/// Dashboard-style paths.
///
/// Namespaced objects resolve to
/// `{prefix}/overview/namespace/{ns}/{section}/{plural}/{name}` and
/// cluster-scoped ones to `{prefix}/cluster-overview/{section}/{plural}/{name}`.
/// Kinds without a known section land under `custom-resources/{kind}`.
#[derive(Debug, Clone, Default)]
pub struct PathLinkGenerator {
    prefix: String,
}

impl PathLinkGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, key: &ObjectKey) -> String {
        let (section, resource) = match KnownKind::from_type(&key.api_version, &key.kind) {
            Some(kind) => (kind.section(), kind.plural().to_string()),
            None => ("custom-resources", key.kind.to_lowercase()),
        };

        if key.is_cluster_scoped() {
            format!(
                "{}/cluster-overview/{}/{}/{}",
                self.prefix, section, resource, key.name
            )
        } else {
            format!(
                "{}/overview/namespace/{}/{}/{}/{}",
                self.prefix, key.namespace, section, resource, key.name
            )
        }
    }
}

impl LinkGenerator for PathLinkGenerator {
    fn for_object_with_query(
        &self,
        object: &DynamicObject,
        query: &BTreeMap<String, String>,
    ) -> Result<Link, LinkError> {
        if object.types.is_none() {
            return Err(LinkError::MissingTypeMeta);
        }
        let key = ObjectKey::from_object(object);
        if key.name.is_empty() {
            return Err(LinkError::MissingName);
        }

        let mut path = self.object_path(&key);
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter())
                .finish();
            path.push('?');
            path.push_str(&encoded);
        }

        Ok(Link {
            text: key.name,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_namespaced_workload_path() {
        let link = PathLinkGenerator::new()
            .for_object(&testutil::typed("apps/v1", "Deployment", "shop", "web"))
            .unwrap();
        assert_eq!(link.text, "web");
        assert_eq!(link.path, "/overview/namespace/shop/workloads/deployments/web");
    }

    #[test]
    fn test_cluster_scoped_and_custom_paths() {
        let generator = PathLinkGenerator::with_prefix("/content/");
        let namespace = testutil::object(serde_json::json!({
            "apiVersion": "example.com/v1",
            "kind": "Tenant",
            "metadata": { "name": "acme" }
        }));
        assert_eq!(
            generator.for_object(&namespace).unwrap().path,
            "/content/cluster-overview/custom-resources/tenant/acme"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let mut query = BTreeMap::new();
        query.insert("tab".to_string(), "resource viewer".to_string());
        query.insert("a".to_string(), "1&2".to_string());

        let link = PathLinkGenerator::new()
            .for_object_with_query(&testutil::typed("v1", "Service", "shop", "web"), &query)
            .unwrap();
        assert_eq!(
            link.path,
            "/overview/namespace/shop/discovery-and-load-balancing/services/web?a=1%262&tab=resource+viewer"
        );
    }

    #[test]
    fn test_untyped_or_unnamed_objects_fail() {
        let generator = PathLinkGenerator::new();
        let unnamed = testutil::object(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "namespace": "shop" }
        }));
        assert!(matches!(
            generator.for_object(&unnamed),
            Err(LinkError::MissingName)
        ));

        let untyped = testutil::object(serde_json::json!({ "metadata": { "name": "x" } }));
        assert!(matches!(
            generator.for_object(&untyped),
            Err(LinkError::MissingTypeMeta)
        ));
    }
}
