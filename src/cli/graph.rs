//! Graph command handler

use crate::cluster;
use crate::config::Config;
use crate::link::PathLinkGenerator;
use crate::models::{KnownKind, ObjectKey};
use crate::resourceviewer::{Graph, GraphReady, ResourceViewer, ViewerOptions};
use crate::store::{KubeStore, MemoryStore, Store};
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Graph output encodings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `resourceViewer` payload as JSON
    #[default]
    Json,
    /// `resourceViewer` payload as YAML
    Yaml,
    /// Human-readable node and edge listing
    Text,
}

#[derive(clap::Args, Debug)]
pub struct GraphArgs {
    /// API version of the root object (e.g., "apps/v1")
    pub api_version: String,

    /// Kind of the root object (e.g., "Deployment", "deploy", "svc")
    pub kind: String,

    /// Name of the root object
    pub name: String,

    /// Namespace of the root object
    #[arg(long, short = 'n', conflicts_with = "cluster_scoped")]
    pub namespace: Option<String>,

    /// The root object is cluster-scoped
    #[arg(long)]
    pub cluster_scoped: bool,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Read objects from manifest files instead of a cluster
    #[arg(long = "manifests", short = 'f')]
    pub manifests: Vec<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Prefix for node content paths
    #[arg(long, default_value = "")]
    pub link_prefix: String,

    /// Override graph.podGroupThreshold
    #[arg(long)]
    pub pod_group_threshold: Option<usize>,
}

/// Encode a graph for output
pub fn render(graph: Graph, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&GraphReady::new(graph))
            .context("Failed to serialize graph as JSON"),
        OutputFormat::Yaml => serde_yaml::to_string(&GraphReady::new(graph))
            .context("Failed to serialize graph as YAML"),
        OutputFormat::Text => Ok(graph.render_text()),
    }
}

fn load_manifests(paths: &[PathBuf]) -> Result<MemoryStore> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
        documents.push(contents);
    }

    // Separate files so a trailing document in one cannot swallow the next
    let store = MemoryStore::from_manifests(&documents.join("\n---\n"))
        .context("Failed to parse manifests")?;
    Ok(store)
}

/// Build and print the graph rooted at the requested object
pub async fn handle_graph_command(args: GraphArgs, config: &Config) -> Result<()> {
    let (store, context_namespace): (Arc<dyn Store>, String) = if args.manifests.is_empty() {
        let connection = cluster::connect(args.context.as_deref()).await?;
        (
            Arc::new(KubeStore::new(connection.client)),
            connection.default_namespace,
        )
    } else {
        let store = load_manifests(&args.manifests)?;
        tracing::debug!("Loaded {} objects from manifests", store.len().await);
        (Arc::new(store), "default".to_string())
    };

    let namespace = if args.cluster_scoped {
        String::new()
    } else {
        cluster::resolve_namespace(
            args.namespace.as_deref(),
            config.default_namespace.as_deref(),
            &context_namespace,
        )
    };

    let mut options = ViewerOptions::from(config);
    if let Some(threshold) = args.pod_group_threshold {
        options.pod_group_threshold = threshold;
    }

    let viewer = ResourceViewer::new(
        store,
        Arc::new(PathLinkGenerator::with_prefix(args.link_prefix)),
    )
    .with_options(options);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling graph build");
            interrupt.cancel();
        }
    });

    let key = ObjectKey::new(args.api_version, root_kind(&args.kind), namespace, args.name);
    let graph = viewer
        .visit_key(&key, cancel)
        .await
        .with_context(|| format!("Failed to build graph for {}", key))?;

    print!("{}", render(graph, args.output)?);
    if args.output == OutputFormat::Json {
        println!();
    }
    Ok(())
}

/// Resolve kubectl-style aliases of known kinds; other kinds pass through
fn root_kind(kind: &str) -> String {
    KnownKind::from_str_case_insensitive(kind)
        .map(|known| known.as_str().to_string())
        .unwrap_or_else(|| kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_kind_aliases() {
        assert_eq!(root_kind("deploy"), "Deployment");
        assert_eq!(root_kind("SVC"), "Service");
        assert_eq!(root_kind("Ingress"), "Ingress");
        assert_eq!(root_kind("HelmRelease"), "HelmRelease");
    }

    #[test]
    fn test_load_manifests_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.yaml");
        let second = dir.path().join("b.yaml");
        std::fs::write(
            &first,
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n  namespace: default\n",
        )
        .unwrap();
        std::fs::write(
            &second,
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n  namespace: default\n",
        )
        .unwrap();

        let store = load_manifests(&[first, second]).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        assert_eq!(runtime.block_on(store.len()), 2);
    }

    #[test]
    fn test_missing_manifest_file_is_reported() {
        let err = load_manifests(&[PathBuf::from("/nonexistent/kubelens.yaml")]).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest file"));
    }

    #[test]
    fn test_render_empty_graph_json() {
        let rendered = render(Graph::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["type"], "resourceViewer");
    }
}
