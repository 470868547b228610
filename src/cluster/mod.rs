//! Kubernetes client construction
//!
//! Uses the standard kubeconfig loading strategy:
//! 1. In-cluster config (if running in a pod)
//! 2. KUBECONFIG environment variable
//! 3. ~/.kube/config
//!
//! Proxy settings come from `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY`.

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// Connected client plus the namespace the kubeconfig context points at
pub struct ClusterConnection {
    pub client: Client,
    pub default_namespace: String,
}

/// Build a client, optionally for a named kubeconfig context
pub async fn connect(context: Option<&str>) -> Result<ClusterConnection> {
    let config = match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context {}", context))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    tracing::info!("Connecting to cluster at {}", config.cluster_url);
    let default_namespace = config.default_namespace.clone();
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

    Ok(ClusterConnection {
        client,
        default_namespace,
    })
}

/// Resolve the namespace for a lookup.
///
/// An explicit flag wins, then the configured default, then the kubeconfig
/// context namespace.
pub fn resolve_namespace(
    flag: Option<&str>,
    configured: Option<&str>,
    context_namespace: &str,
) -> String {
    flag.or(configured)
        .filter(|ns| !ns.is_empty())
        .unwrap_or(context_namespace)
        .to_string()
}
