//! Selection state and the toolbar actions it permits.

use crate::domain::arena::NodeId;
use crate::domain::kind::NodeKind;

/// What the operator currently has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected { id: NodeId, kind: NodeKind },
}

impl Selection {
    pub fn selected(id: NodeId, kind: NodeKind) -> Self {
        Selection::Selected { id, kind }
    }

    pub fn id(&self) -> Option<NodeId> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected { id, .. } => Some(*id),
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected { kind, .. } => Some(*kind),
        }
    }

    /// Which edit actions this state enables.
    pub fn availability(&self) -> ActionAvailability {
        match self.kind() {
            None => ActionAvailability::DISABLED,
            Some(kind) => {
                let add_label = kind.child_kind().map(add_label_for);
                ActionAvailability {
                    rename: true,
                    delete: true,
                    add: add_label.is_some(),
                    add_label,
                }
            }
        }
    }
}

/// Enabled/disabled state of the toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAvailability {
    pub rename: bool,
    pub delete: bool,
    pub add: bool,
    /// Caption of the add button, present only while `add` is enabled
    pub add_label: Option<&'static str>,
}

impl ActionAvailability {
    pub const DISABLED: ActionAvailability = ActionAvailability {
        rename: false,
        delete: false,
        add: false,
        add_label: None,
    };

    pub fn is_all_disabled(&self) -> bool {
        *self == Self::DISABLED
    }
}

fn add_label_for(child: NodeKind) -> &'static str {
    match child {
        NodeKind::Cluster => "Add cluster",
        NodeKind::Server => "Add server",
        NodeKind::Bucket => "Add bucket",
    }
}
