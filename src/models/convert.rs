//! Conversion between dynamic objects and typed k8s-openapi resources

use kube::core::DynamicObject;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("object has no type information")]
    MissingTypeMeta,

    #[error("expected {expected}, got {actual}")]
    KindMismatch { expected: String, actual: String },

    #[error("failed to convert object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a dynamic object into a typed resource.
///
/// Refuses objects without type information and objects of another kind;
/// callers never get a silently mis-typed value.
pub fn parse_object<K>(object: &DynamicObject) -> Result<K, ConversionError>
where
    K: k8s_openapi::Resource + DeserializeOwned,
{
    let types = object
        .types
        .as_ref()
        .ok_or(ConversionError::MissingTypeMeta)?;

    if types.api_version != K::API_VERSION || types.kind != K::KIND {
        return Err(ConversionError::KindMismatch {
            expected: format!("{}/{}", K::API_VERSION, K::KIND),
            actual: format!("{}/{}", types.api_version, types.kind),
        });
    }

    let value = serde_json::to_value(object)?;
    Ok(serde_json::from_value(value)?)
}

/// Convert a typed resource into a dynamic object
pub fn to_dynamic<K>(resource: &K) -> Result<DynamicObject, ConversionError>
where
    K: k8s_openapi::Resource + Serialize,
{
    let value = serde_json::to_value(resource)?;
    Ok(serde_json::from_value(value)?)
}
