//! Equality-based label selector matching

use std::collections::BTreeMap;

/// True when every selector pair is present in `labels`.
///
/// An empty selector matches nothing; Kubernetes treats a Service without a
/// selector as selecting no pods.
pub fn selector_matches(
    selector: &BTreeMap<String, String>,
    labels: Option<&BTreeMap<String, String>>,
) -> bool {
    if selector.is_empty() {
        return false;
    }
    let Some(labels) = labels else {
        return false;
    };
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Render a selector in the `k=v,k2=v2` form used by list calls
pub fn selector_string(selector: &BTreeMap<String, String>) -> String {
    selector
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
