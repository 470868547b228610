//! Snapshot tests for graph output
//!
//! These tests use insta to pin the rendered graph formats.
//! Run `cargo insta review` to review and accept snapshot changes.

use insta::assert_snapshot;
use kubelens::cli::{OutputFormat, render};
use kubelens::link::PathLinkGenerator;
use kubelens::models::{KnownKind, ObjectKey};
use kubelens::resourceviewer::{Graph, ResourceViewer};
use kubelens::store::MemoryStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SHOP: &str = include_str!("fixtures/shop.yaml");

async fn shop_graph(kind: KnownKind, name: &str) -> Graph {
    let store = Arc::new(MemoryStore::from_manifests(SHOP).unwrap());
    ResourceViewer::new(store, Arc::new(PathLinkGenerator::new()))
        .visit_key(
            &ObjectKey::new(kind.api_version(), kind.as_str(), "shop", name),
            CancellationToken::new(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_deployment_graph_text() {
    let graph = shop_graph(KnownKind::Deployment, "web").await;

    assert_snapshot!(render(graph, OutputFormat::Text).unwrap(), @r"
nodes:
  [OK] Deployment/web
      Deployment is OK
  [OK] ReplicaSet/web-7d9
      Replica Set is OK
  [Unknown] Ingress/web
  [OK] Service/web
      Service is OK
  [Unknown] ServiceAccount/default
  [Warning] Pod/web-7d9 pods (3 members)
      web-7d9-a: OK
      web-7d9-b: Warning
      web-7d9-c: OK
edges:
  Deployment/web -> ReplicaSet/web-7d9 (owner)
  ReplicaSet/web-7d9 -> Pod/web-7d9 pods (owner)
  Ingress/web -> Service/web (reference)
  Service/web -> Pod/web-7d9 pods (selector-match)
  Pod/web-7d9 pods -> ServiceAccount/default (reference)
");
}

#[tokio::test]
async fn test_single_node_graph_ready_json() {
    let graph = shop_graph(KnownKind::ConfigMap, "unrelated").await;

    assert_snapshot!(render(graph, OutputFormat::Json).unwrap(), @r#"
{
  "type": "resourceViewer",
  "graph": {
    "nodes": {
      "v1:ConfigMap:shop:unrelated": {
        "name": "unrelated",
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "status": "unknown",
        "path": {
          "text": "unrelated",
          "path": "/overview/namespace/shop/config-and-storage/configmaps/unrelated"
        }
      }
    },
    "edges": []
  }
}
"#);
}
