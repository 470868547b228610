//! Snapshot to graph assembly
//!
//! Pods owned by the same controller collapse into one group node once the
//! group reaches the threshold. Edge endpoints inside a group are rewritten
//! to the group key; rewritten duplicates and self-loops are dropped. The
//! traversal root always keeps its own node.

use super::AssembleError;
use super::collector::Snapshot;
use super::graph::{Graph, GraphEdge, NodeKey};
use super::object_node::ObjectNode;
use super::pod_group_node::PodGroupNode;
use crate::link::LinkGenerator;
use crate::models::{KnownKind, ObjectKey};
use crate::objectstatus::StatusEvaluator;
use futures::future::try_join_all;
use kube::core::DynamicObject;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Default minimum number of sibling pods that collapse into a group
pub const DEFAULT_POD_GROUP_THRESHOLD: usize = 2;

pub struct GraphAssembler<'a> {
    link: &'a dyn LinkGenerator,
    evaluator: &'a dyn StatusEvaluator,
    pod_group_threshold: usize,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(link: &'a dyn LinkGenerator, evaluator: &'a dyn StatusEvaluator) -> Self {
        Self {
            link,
            evaluator,
            pod_group_threshold: DEFAULT_POD_GROUP_THRESHOLD,
        }
    }

    pub fn with_pod_group_threshold(mut self, threshold: usize) -> Self {
        self.pod_group_threshold = threshold.max(DEFAULT_POD_GROUP_THRESHOLD);
        self
    }

    pub async fn assemble(&self, snapshot: &Snapshot) -> Result<Graph, AssembleError> {
        let groups = pod_groups(snapshot, self.pod_group_threshold);
        let membership: HashMap<&ObjectKey, NodeKey> = groups
            .iter()
            .flat_map(|(owner, pods)| {
                pods.iter()
                    .map(move |pod| (pod, NodeKey::PodGroup(owner.clone())))
            })
            .collect();

        let object_node =
            ObjectNode::new(self.link, self.evaluator).with_lookup_errors(&snapshot.lookup_errors);
        let singles = snapshot
            .objects
            .iter()
            .filter(|(key, _)| !membership.contains_key(key))
            .map(|(key, object)| {
                let object_node = &object_node;
                async move {
                    let node = object_node.create(object).await?;
                    Ok::<_, AssembleError>((NodeKey::Object(key.clone()), node))
                }
            });
        let mut nodes: BTreeMap<NodeKey, _> = try_join_all(singles).await?.into_iter().collect();

        let pod_group =
            PodGroupNode::new(self.evaluator).with_lookup_errors(&snapshot.lookup_errors);
        for (owner, pods) in &groups {
            let members: Vec<DynamicObject> = pods
                .iter()
                .filter_map(|key| snapshot.objects.get(key).cloned())
                .collect();
            let node = pod_group
                .create(&format!("{} pods", owner.name), &members)
                .await?;
            tracing::debug!("Grouped {} pods under {}", members.len(), owner);
            nodes.insert(NodeKey::PodGroup(owner.clone()), node);
        }

        let rewrite = |key: &ObjectKey| {
            membership
                .get(key)
                .cloned()
                .unwrap_or_else(|| NodeKey::Object(key.clone()))
        };
        let edges: BTreeSet<GraphEdge> = snapshot
            .edges
            .iter()
            .filter_map(|edge| {
                let from = rewrite(&edge.from);
                let to = rewrite(&edge.to);
                (from != to).then_some(GraphEdge {
                    from,
                    to,
                    kind: edge.kind,
                })
            })
            .collect();

        Ok(Graph {
            nodes,
            edges: edges.into_iter().collect(),
        })
    }
}

/// Non-root pods by controlling owner, keeping only groups at the threshold
fn pod_groups(snapshot: &Snapshot, threshold: usize) -> BTreeMap<ObjectKey, Vec<ObjectKey>> {
    let mut groups: BTreeMap<ObjectKey, Vec<ObjectKey>> = BTreeMap::new();

    for (key, object) in &snapshot.objects {
        if snapshot.root.as_ref() == Some(key)
            || key.api_version != KnownKind::Pod.api_version()
            || key.kind != KnownKind::Pod.as_str()
        {
            continue;
        }

        let controller = object
            .metadata
            .owner_references
            .iter()
            .flatten()
            .find(|r| r.controller == Some(true));
        if let Some(owner) = controller {
            let owner_key = ObjectKey::new(
                owner.api_version.clone(),
                owner.kind.clone(),
                key.namespace.clone(),
                owner.name.clone(),
            );
            groups.entry(owner_key).or_default().push(key.clone());
        }
    }

    groups.retain(|_, pods| pods.len() >= threshold);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::PathLinkGenerator;
    use crate::models::{Edge, EdgeKind};
    use crate::objectstatus::{MockStatusEvaluator, NodeStatus, ObjectStatus};
    use crate::testutil;

    fn owned_pod(name: &str, owner: &str) -> DynamicObject {
        testutil::object(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": name,
                "namespace": "shop",
                "ownerReferences": [{
                    "apiVersion": "apps/v1",
                    "kind": "ReplicaSet",
                    "name": owner,
                    "uid": format!("{}-uid", owner),
                    "controller": true
                }]
            },
            "spec": { "containers": [] }
        }))
    }

    fn snapshot(root: &DynamicObject, pods: &[DynamicObject]) -> Snapshot {
        let mut snapshot = Snapshot {
            root: Some(ObjectKey::from_object(root)),
            ..Default::default()
        };
        snapshot
            .objects
            .insert(ObjectKey::from_object(root), root.clone());
        for pod in pods {
            snapshot.objects.insert(ObjectKey::from_object(pod), pod.clone());
            snapshot.edges.insert(Edge::new(
                ObjectKey::from_object(root),
                ObjectKey::from_object(pod),
                EdgeKind::Owner,
            ));
        }
        snapshot
    }

    fn ok_evaluator() -> MockStatusEvaluator {
        let mut evaluator = MockStatusEvaluator::new();
        evaluator
            .expect_status()
            .returning(|_| Ok(ObjectStatus::ok("fine")));
        evaluator
    }

    #[tokio::test]
    async fn test_pods_collapse_at_threshold() {
        let rs = testutil::typed("apps/v1", "ReplicaSet", "shop", "web");
        let snapshot = snapshot(&rs, &[owned_pod("web-1", "web"), owned_pod("web-2", "web")]);
        let link = PathLinkGenerator::new();
        let evaluator = ok_evaluator();

        let graph = GraphAssembler::new(&link, &evaluator)
            .assemble(&snapshot)
            .await
            .unwrap();

        let group_key = NodeKey::PodGroup(ObjectKey::from_object(&rs));
        assert_eq!(graph.nodes.len(), 2);
        let group = graph.node(&group_key).unwrap();
        assert_eq!(group.name, "web pods");
        assert!(group.is_group);
        assert_eq!(group.members.len(), 2);
        assert_eq!(
            graph.edges,
            vec![GraphEdge {
                from: NodeKey::Object(ObjectKey::from_object(&rs)),
                to: group_key,
                kind: EdgeKind::Owner,
            }]
        );
    }

    #[tokio::test]
    async fn test_pods_below_threshold_stay_individual() {
        let rs = testutil::typed("apps/v1", "ReplicaSet", "shop", "web");
        let snapshot = snapshot(&rs, &[owned_pod("web-1", "web"), owned_pod("web-2", "web")]);
        let link = PathLinkGenerator::new();
        let evaluator = ok_evaluator();

        let graph = GraphAssembler::new(&link, &evaluator)
            .with_pod_group_threshold(3)
            .assemble(&snapshot)
            .await
            .unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.group_nodes().count(), 0);
        assert_eq!(graph.edges.len(), 2);
    }

    #[tokio::test]
    async fn test_root_pod_is_never_grouped() {
        let root = owned_pod("web-1", "web");
        let sibling = owned_pod("web-2", "web");
        let mut snapshot = snapshot(&root, &[]);
        snapshot
            .objects
            .insert(ObjectKey::from_object(&sibling), sibling.clone());
        let link = PathLinkGenerator::new();
        let evaluator = ok_evaluator();

        let graph = GraphAssembler::new(&link, &evaluator)
            .assemble(&snapshot)
            .await
            .unwrap();
        assert!(graph.object_node(&ObjectKey::from_object(&root)).is_some());
        assert_eq!(graph.group_nodes().count(), 0);
    }

    #[tokio::test]
    async fn test_edges_inside_group_are_dropped() {
        let rs = testutil::typed("apps/v1", "ReplicaSet", "shop", "web");
        let a = owned_pod("web-1", "web");
        let b = owned_pod("web-2", "web");
        let mut snapshot = snapshot(&rs, &[a.clone(), b.clone()]);
        snapshot.edges.insert(Edge::new(
            ObjectKey::from_object(&a),
            ObjectKey::from_object(&b),
            EdgeKind::Reference,
        ));
        let link = PathLinkGenerator::new();
        let evaluator = ok_evaluator();

        let graph = GraphAssembler::new(&link, &evaluator)
            .assemble(&snapshot)
            .await
            .unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].kind, EdgeKind::Owner);
    }

    #[tokio::test]
    async fn test_assembly_is_idempotent() {
        let rs = testutil::typed("apps/v1", "ReplicaSet", "shop", "web");
        let snapshot = snapshot(
            &rs,
            &[
                owned_pod("web-1", "web"),
                owned_pod("web-2", "web"),
                owned_pod("api-1", "api"),
            ],
        );
        let link = PathLinkGenerator::new();
        let evaluator = ok_evaluator();
        let assembler = GraphAssembler::new(&link, &evaluator);

        let first = assembler.assemble(&snapshot).await.unwrap();
        let second = assembler.assemble(&snapshot).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        // web pods collapse, the lone api pod does not
        assert_eq!(first.group_nodes().count(), 1);
        assert_eq!(first.nodes.len(), 3);
        assert!(first.nodes.values().all(|n| n.status == NodeStatus::Ok));
    }
}
