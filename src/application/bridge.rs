//! Command interface towards the rendering collaborator.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::domain::{ActionAvailability, NodeId, NodeKind, ParentRef};

/// Receives rendering commands from the editor.
///
/// Implementations reflect the commands visually; they never mutate the topology.
pub trait RenderBridge {
    fn render_create(&mut self, parent: Option<NodeId>, node: NodeId, kind: NodeKind);
    fn render_rename(&mut self, node: NodeId, label: &str);
    fn render_remove(&mut self, nodes: &BTreeSet<NodeId>);
    fn render_reorder(&mut self, parent: Option<NodeId>, children: &[NodeId]);
    fn render_set_action_availability(&mut self, availability: &ActionAvailability);
}

/// One command issued to a [`RenderBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    Create {
        parent: Option<NodeId>,
        node: NodeId,
        kind: NodeKind,
    },
    Rename {
        node: NodeId,
        label: String,
    },
    Remove {
        nodes: BTreeSet<NodeId>,
    },
    Reorder {
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    },
    SetActionAvailability(ActionAvailability),
}

impl fmt::Display for RenderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderCommand::Create { parent, node, kind } => {
                write!(f, "create {kind} {node} under {}", ParentRef::from(*parent))
            }
            RenderCommand::Rename { node, label } => write!(f, "rename {node} to {label:?}"),
            RenderCommand::Remove { nodes } => write!(f, "remove [{}]", nodes.iter().join(", ")),
            RenderCommand::Reorder { parent, children } => write!(
                f,
                "reorder {} => [{}]",
                ParentRef::from(*parent),
                children.iter().join(", ")
            ),
            RenderCommand::SetActionAvailability(a) => {
                let flag = |on: bool| if on { "on" } else { "off" };
                write!(
                    f,
                    "actions rename={} delete={} add={}",
                    flag(a.rename),
                    flag(a.delete),
                    flag(a.add)
                )?;
                if let Some(label) = a.add_label {
                    write!(f, " ({label})")?;
                }
                Ok(())
            }
        }
    }
}

/// Bridge that records every command in arrival order.
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: Vec<RenderCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn last(&self) -> Option<&RenderCommand> {
        self.commands.last()
    }

    /// Returns the recorded commands and starts a fresh log.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl RenderBridge for CommandLog {
    fn render_create(&mut self, parent: Option<NodeId>, node: NodeId, kind: NodeKind) {
        self.commands
            .push(RenderCommand::Create { parent, node, kind });
    }

    fn render_rename(&mut self, node: NodeId, label: &str) {
        self.commands.push(RenderCommand::Rename {
            node,
            label: label.to_string(),
        });
    }

    fn render_remove(&mut self, nodes: &BTreeSet<NodeId>) {
        self.commands.push(RenderCommand::Remove {
            nodes: nodes.clone(),
        });
    }

    fn render_reorder(&mut self, parent: Option<NodeId>, children: &[NodeId]) {
        self.commands.push(RenderCommand::Reorder {
            parent,
            children: children.to_vec(),
        });
    }

    fn render_set_action_availability(&mut self, availability: &ActionAvailability) {
        self.commands
            .push(RenderCommand::SetActionAvailability(*availability));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let create = RenderCommand::Create {
            parent: None,
            node: NodeId::new(1),
            kind: NodeKind::Cluster,
        };
        assert_eq!(create.to_string(), "create cluster 1 under root");

        let remove = RenderCommand::Remove {
            nodes: BTreeSet::from([NodeId::new(3), NodeId::new(2)]),
        };
        assert_eq!(remove.to_string(), "remove [2, 3]");

        let actions = RenderCommand::SetActionAvailability(ActionAvailability {
            rename: true,
            delete: true,
            add: true,
            add_label: Some("Add bucket"),
        });
        assert_eq!(
            actions.to_string(),
            "actions rename=on delete=on add=on (Add bucket)"
        );
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = CommandLog::new();
        log.render_rename(NodeId::new(4), "db01");
        assert_eq!(log.drain().len(), 1);
        assert!(log.commands().is_empty());
        assert!(log.last().is_none());
    }
}
