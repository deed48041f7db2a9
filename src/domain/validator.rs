//! Drag-and-drop move validation.
//!
//! Consulted before a move reaches [`TopologyArena::move_node`]. Validation is
//! read-only: it borrows the tree immutably and only answers accept or reject.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::arena::{NodeId, ParentRef, TopologyArena};
use crate::domain::error::{DomainError, DomainResult, HierarchyViolation};
use crate::domain::kind::can_be_child_of;

/// Which cross-parent moves the validator lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovePolicy {
    /// Only reorders within the current parent are accepted.
    #[default]
    SameParent,
    /// Reparenting is also accepted wherever the kind hierarchy allows it.
    Hierarchy,
}

impl MovePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MovePolicy::SameParent => "same-parent",
            MovePolicy::Hierarchy => "hierarchy",
        }
    }
}

impl FromStr for MovePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "same-parent" => Ok(MovePolicy::SameParent),
            "hierarchy" => Ok(MovePolicy::Hierarchy),
            other => Err(DomainError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    Accept,
    Reject,
}

impl MoveDecision {
    pub fn is_accept(self) -> bool {
        self == MoveDecision::Accept
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveValidator {
    policy: MovePolicy,
}

impl MoveValidator {
    pub fn new(policy: MovePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    /// Checks a proposed move of `node` under `target`.
    ///
    /// `target` is None when the drop happened outside any parent slot.
    pub fn check(
        &self,
        tree: &TopologyArena,
        node: NodeId,
        target: Option<ParentRef>,
    ) -> DomainResult<()> {
        // A node we cannot find a parent slot for is not movable at all.
        let current = tree
            .parent_of(node)
            .map(ParentRef::from)
            .map_err(|_| DomainError::InvalidHierarchy(HierarchyViolation::Unmovable(node)))?;
        let target = target.ok_or(DomainError::InvalidHierarchy(
            HierarchyViolation::MissingTarget,
        ))?;

        if current == target {
            return Ok(());
        }

        let same_backing = match (tree.slot_identity(current), tree.slot_identity(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if same_backing {
            return Ok(());
        }

        match self.policy {
            MovePolicy::SameParent => Err(DomainError::InvalidHierarchy(
                HierarchyViolation::CrossParentMove { node },
            )),
            MovePolicy::Hierarchy => {
                let kind = tree.kind_of(node)?;
                let parent_kind = target.node().map(|p| tree.kind_of(p)).transpose()?;
                if can_be_child_of(kind, parent_kind) {
                    Ok(())
                } else {
                    Err(DomainError::InvalidHierarchy(HierarchyViolation::placement(
                        kind,
                        parent_kind,
                    )))
                }
            }
        }
    }

    pub fn decide(
        &self,
        tree: &TopologyArena,
        node: NodeId,
        target: Option<ParentRef>,
    ) -> MoveDecision {
        match self.check(tree, node, target) {
            Ok(()) => MoveDecision::Accept,
            Err(e) => {
                debug!("move of {node} rejected: {e}");
                MoveDecision::Reject
            }
        }
    }
}
