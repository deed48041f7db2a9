//! Node kinds and the parent/child compatibility rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// The closed set of topology node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Cluster,
    Server,
    Bucket,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Cluster, NodeKind::Server, NodeKind::Bucket];

    /// The only kind that may be placed directly below this one.
    pub fn child_kind(self) -> Option<NodeKind> {
        match self {
            NodeKind::Cluster => Some(NodeKind::Server),
            NodeKind::Server => Some(NodeKind::Bucket),
            NodeKind::Bucket => None,
        }
    }

    /// Depth below the implicit container (clusters are at depth 1).
    pub fn depth(self) -> usize {
        match self {
            NodeKind::Cluster => 1,
            NodeKind::Server => 2,
            NodeKind::Bucket => 3,
        }
    }

    pub fn is_leaf(self) -> bool {
        self.child_kind().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Cluster => "cluster",
            NodeKind::Server => "server",
            NodeKind::Bucket => "bucket",
        }
    }
}

/// Whether a node of `child` kind may live directly under `parent`.
///
/// `None` stands for the implicit top-level container. The legal pairs are
/// container→Cluster, Cluster→Server and Server→Bucket; nothing else.
pub fn can_be_child_of(child: NodeKind, parent: Option<NodeKind>) -> bool {
    matches!(
        (parent, child),
        (None, NodeKind::Cluster)
            | (Some(NodeKind::Cluster), NodeKind::Server)
            | (Some(NodeKind::Server), NodeKind::Bucket)
    )
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" => Ok(NodeKind::Cluster),
            "server" => Ok(NodeKind::Server),
            "bucket" => Ok(NodeKind::Bucket),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NodeKind::Cluster, None, true)]
    #[case(NodeKind::Server, None, false)]
    #[case(NodeKind::Bucket, None, false)]
    #[case(NodeKind::Cluster, Some(NodeKind::Cluster), false)]
    #[case(NodeKind::Server, Some(NodeKind::Cluster), true)]
    #[case(NodeKind::Bucket, Some(NodeKind::Cluster), false)]
    #[case(NodeKind::Cluster, Some(NodeKind::Server), false)]
    #[case(NodeKind::Server, Some(NodeKind::Server), false)]
    #[case(NodeKind::Bucket, Some(NodeKind::Server), true)]
    #[case(NodeKind::Cluster, Some(NodeKind::Bucket), false)]
    #[case(NodeKind::Server, Some(NodeKind::Bucket), false)]
    #[case(NodeKind::Bucket, Some(NodeKind::Bucket), false)]
    fn test_can_be_child_of(
        #[case] child: NodeKind,
        #[case] parent: Option<NodeKind>,
        #[case] expected: bool,
    ) {
        assert_eq!(can_be_child_of(child, parent), expected);
    }

    #[test]
    fn test_child_kind_agrees_with_compatibility_rule() {
        for parent in NodeKind::ALL {
            for child in NodeKind::ALL {
                assert_eq!(
                    parent.child_kind() == Some(child),
                    can_be_child_of(child, Some(parent)),
                    "{parent} -> {child}"
                );
            }
        }
    }

    #[test]
    fn test_kind_from_str_is_case_insensitive() {
        assert_eq!("Server".parse::<NodeKind>().unwrap(), NodeKind::Server);
        assert_eq!(" bucket ".parse::<NodeKind>().unwrap(), NodeKind::Bucket);
        assert!(matches!(
            "rack".parse::<NodeKind>(),
            Err(DomainError::UnknownKind(k)) if k == "rack"
        ));
    }
}
