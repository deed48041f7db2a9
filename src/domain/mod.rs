//! Domain layer: the constrained topology model
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod kind;
pub mod selection;
pub mod validator;

pub use arena::{NodeId, ParentRef, RemovedSet, TopologyArena, TreeNode};
pub use builder::{SnapshotNode, TopologyBuilder, TopologySnapshot};
pub use error::{DomainError, DomainResult, HierarchyViolation};
pub use kind::{can_be_child_of, NodeKind};
pub use selection::{ActionAvailability, Selection};
pub use validator::{MoveDecision, MovePolicy, MoveValidator};
