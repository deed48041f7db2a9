//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;
use crate::domain::kind::NodeKind;

/// Domain errors are structural rejections.
/// They are local and recoverable: the operation that raises one has not mutated anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(HierarchyViolation),

    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unknown move policy '{0}' (expected same-parent or hierarchy)")]
    UnknownPolicy(String),
}

/// Why an edit was refused as a hierarchy violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyViolation {
    #[error("{child} cannot be placed at top level")]
    NotTopLevel { child: NodeKind },

    #[error("{child} cannot be a child of {parent}")]
    IncompatibleParent { child: NodeKind, parent: NodeKind },

    #[error("move target is missing")]
    MissingTarget,

    #[error("node {0} has no parent and cannot be moved")]
    Unmovable(NodeId),

    #[error("node {node} cannot leave its current parent")]
    CrossParentMove { node: NodeId },
}

impl HierarchyViolation {
    pub(crate) fn placement(child: NodeKind, parent: Option<NodeKind>) -> Self {
        match parent {
            None => HierarchyViolation::NotTopLevel { child },
            Some(parent) => HierarchyViolation::IncompatibleParent { child, parent },
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
