//! Topology snapshots and the builder that preloads a tree from one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::arena::{NodeId, TopologyArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::{can_be_child_of, NodeKind};

/// Nested, serializable view of a whole topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Informational only; the builder assigns fresh ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SnapshotNode>) -> Self {
        self.children = children;
        self
    }
}

impl TopologySnapshot {
    /// Captures the current state of `tree`, ids included.
    pub fn capture(tree: &TopologyArena) -> Self {
        fn capture_node(tree: &TopologyArena, id: NodeId) -> Option<SnapshotNode> {
            let node = tree.get(id)?;
            Some(SnapshotNode {
                id: Some(node.id),
                kind: node.kind,
                label: node.label.clone(),
                children: node
                    .children
                    .iter()
                    .filter_map(|&child| capture_node(tree, child))
                    .collect(),
            })
        }

        Self {
            nodes: tree
                .top_level()
                .iter()
                .filter_map(|&id| capture_node(tree, id))
                .collect(),
        }
    }

    pub fn from_json(content: &str) -> DomainResult<Self> {
        serde_json::from_str(content).map_err(|e| DomainError::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::InvalidSnapshot(e.to_string()))
    }
}

/// Builds a validated [`TopologyArena`] from a snapshot.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    tree: TopologyArena,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the whole snapshot before inserting anything.
    pub fn build(mut self, snapshot: &TopologySnapshot) -> DomainResult<TopologyArena> {
        validate_level(&snapshot.nodes, None, "root")?;

        // (parent, node) pairs; reversed so siblings keep their order
        let mut stack: Vec<(Option<NodeId>, &SnapshotNode)> =
            snapshot.nodes.iter().rev().map(|n| (None, n)).collect();
        while let Some((parent, node)) = stack.pop() {
            let id = self
                .tree
                .add_child_labeled(parent, node.kind, node.label.clone())?;
            stack.extend(node.children.iter().rev().map(|c| (Some(id), c)));
        }

        debug!("built topology with {} node(s)", self.tree.len());
        Ok(self.tree)
    }
}

fn validate_level(nodes: &[SnapshotNode], parent: Option<NodeKind>, path: &str) -> DomainResult<()> {
    for (position, node) in nodes.iter().enumerate() {
        let here = format!("{path}/{position}");
        if !can_be_child_of(node.kind, parent) {
            let under = parent.map_or("top level".to_string(), |p| p.to_string());
            return Err(DomainError::InvalidSnapshot(format!(
                "{here}: {} cannot be placed under {under}",
                node.kind
            )));
        }
        validate_level(&node.children, Some(node.kind), &here)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::ParentRef;

    fn sample_snapshot() -> TopologySnapshot {
        TopologySnapshot {
            nodes: vec![
                SnapshotNode::new(NodeKind::Cluster, "east").with_children(vec![
                    SnapshotNode::new(NodeKind::Server, "10.1.0.1").with_children(vec![
                        SnapshotNode::new(NodeKind::Bucket, "default"),
                        SnapshotNode::new(NodeKind::Bucket, "sessions"),
                    ]),
                ]),
                SnapshotNode::new(NodeKind::Cluster, "west"),
            ],
        }
    }

    #[test]
    fn test_build_preserves_order_and_labels() {
        let tree = TopologyBuilder::new().build(&sample_snapshot()).unwrap();
        tree.check_invariants().unwrap();

        let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["east", "10.1.0.1", "default", "sessions", "west"]);
        assert_eq!(tree.top_level().len(), 2);
    }

    #[test]
    fn test_build_rejects_misplaced_kind_without_partial_tree() {
        let snapshot = TopologySnapshot {
            nodes: vec![SnapshotNode::new(NodeKind::Cluster, "east")
                .with_children(vec![SnapshotNode::new(NodeKind::Bucket, "orphan")])],
        };
        let err = TopologyBuilder::new().build(&snapshot).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSnapshot(msg) if msg.contains("/0/0")));
    }

    #[test]
    fn test_capture_matches_built_tree() {
        let snapshot = sample_snapshot();
        let tree = TopologyBuilder::new().build(&snapshot).unwrap();
        let captured = TopologySnapshot::capture(&tree);

        assert_eq!(captured.nodes.len(), 2);
        let east = &captured.nodes[0];
        assert_eq!(east.id, Some(tree.top_level()[0]));
        assert_eq!(east.children[0].children.len(), 2);
        assert_eq!(
            tree.children_of(ParentRef::Container).unwrap().len(),
            captured.nodes.len()
        );
    }

    #[test]
    fn test_snapshot_json_ignores_missing_optional_fields() {
        let json = r#"{"nodes":[{"kind":"cluster","label":"c","children":[{"kind":"server"}]}]}"#;
        let snapshot = TopologySnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes[0].children[0].label, "");

        let tree = TopologyBuilder::new().build(&snapshot).unwrap();
        assert_eq!(tree.len(), 2);
    }
}
