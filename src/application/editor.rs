//! Topology editor service
//!
//! Owns the topology tree and the selection, turns bridge events into tree
//! edits and tells the bridge what to render. Structural rejections are never
//! fatal: they are logged, reported as [`EventOutcome::Rejected`] and the
//! bridge is left untouched.

use tracing::{debug, warn};

use crate::application::bridge::RenderBridge;
use crate::application::ApplicationResult;
use crate::config::{LabelSettings, Settings};
use crate::domain::{
    ActionAvailability, DomainError, MoveDecision, MoveValidator, NodeId, NodeKind, ParentRef,
    Selection, TopologyArena, TopologyBuilder, TopologySnapshot,
};

/// What became of a bridge event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The edit happened.
    Applied,
    /// A node was created.
    Created(NodeId),
    /// The requested action is currently disabled; nothing happened.
    Ignored,
    /// The edit was refused; nothing happened.
    Rejected(DomainError),
}

impl EventOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EventOutcome::Applied | EventOutcome::Created(_))
    }

    pub fn created(&self) -> Option<NodeId> {
        match self {
            EventOutcome::Created(id) => Some(*id),
            _ => None,
        }
    }
}

pub struct TopologyEditor<B: RenderBridge> {
    tree: TopologyArena,
    selection: Selection,
    validator: MoveValidator,
    labels: LabelSettings,
    bridge: B,
}

impl<B: RenderBridge> TopologyEditor<B> {
    /// Starts an editor on an empty topology.
    pub fn new(bridge: B, settings: &Settings) -> Self {
        Self::with_tree(TopologyArena::new(), bridge, settings)
    }

    /// Starts an editor on preloaded data.
    ///
    /// Every existing node is rendered, then the toolbar is published fully
    /// disabled: nothing is selected at start.
    pub fn with_tree(tree: TopologyArena, bridge: B, settings: &Settings) -> Self {
        let mut editor = Self {
            tree,
            selection: Selection::NoSelection,
            validator: MoveValidator::new(settings.moves.policy),
            labels: settings.labels.clone(),
            bridge,
        };
        editor.render_all();
        editor.publish_actions();
        editor
    }

    pub fn from_snapshot(
        snapshot: &TopologySnapshot,
        bridge: B,
        settings: &Settings,
    ) -> ApplicationResult<Self> {
        let tree = TopologyBuilder::new().build(snapshot)?;
        Ok(Self::with_tree(tree, bridge, settings))
    }

    pub fn tree(&self) -> &TopologyArena {
        &self.tree
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn availability(&self) -> ActionAvailability {
        self.selection.availability()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot::capture(&self.tree)
    }

    pub fn into_parts(self) -> (TopologyArena, B) {
        (self.tree, self.bridge)
    }

    fn render_all(&mut self) {
        let nodes: Vec<(Option<NodeId>, NodeId, NodeKind, String)> = self
            .tree
            .iter()
            .map(|n| (n.parent, n.id, n.kind, n.label.clone()))
            .collect();
        for (parent, id, kind, label) in nodes {
            self.bridge.render_create(parent, id, kind);
            if !label.is_empty() {
                self.bridge.render_rename(id, &label);
            }
        }
    }

    fn publish_actions(&mut self) {
        let availability = self.selection.availability();
        self.bridge.render_set_action_availability(&availability);
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.publish_actions();
    }

    fn reject(&self, event: &str, err: DomainError) -> EventOutcome {
        warn!("{event} rejected: {err}");
        EventOutcome::Rejected(err)
    }

    pub fn on_select(&mut self, id: NodeId) -> EventOutcome {
        match self.tree.kind_of(id) {
            Ok(kind) => {
                self.set_selection(Selection::selected(id, kind));
                EventOutcome::Applied
            }
            Err(e) => self.reject("select", e),
        }
    }

    pub fn on_deselect(&mut self) -> EventOutcome {
        self.set_selection(Selection::NoSelection);
        EventOutcome::Applied
    }

    /// Adds a new top-level cluster. Not tied to the selection.
    pub fn add_cluster(&mut self) -> EventOutcome {
        self.create(None, NodeKind::Cluster)
    }

    /// Adds a child of the appropriate kind under the selected node.
    pub fn on_request_add(&mut self) -> EventOutcome {
        if !self.availability().add {
            debug!("add ignored: action disabled");
            return EventOutcome::Ignored;
        }
        let (Some(parent), Some(child)) = (
            self.selection.id(),
            self.selection.kind().and_then(NodeKind::child_kind),
        ) else {
            return EventOutcome::Ignored;
        };
        self.create(Some(parent), child)
    }

    fn create(&mut self, parent: Option<NodeId>, kind: NodeKind) -> EventOutcome {
        let label = self.labels.placeholder(kind).to_string();
        match self.tree.add_child_labeled(parent, kind, label.clone()) {
            Ok(id) => {
                self.bridge.render_create(parent, id, kind);
                if !label.is_empty() {
                    self.bridge.render_rename(id, &label);
                }
                EventOutcome::Created(id)
            }
            Err(e) => self.reject("add", e),
        }
    }

    pub fn on_request_rename(&mut self, label: impl Into<String>) -> EventOutcome {
        let Some(id) = self.selection.id().filter(|_| self.availability().rename) else {
            debug!("rename ignored: action disabled");
            return EventOutcome::Ignored;
        };
        let label = label.into();
        match self.tree.rename(id, label.clone()) {
            Ok(()) => {
                self.bridge.render_rename(id, &label);
                EventOutcome::Applied
            }
            Err(e) => self.reject("rename", e),
        }
    }

    /// Deletes the selected node with its subtree.
    ///
    /// The selection falls back to the preceding sibling, then to the parent;
    /// with neither left nothing is selected.
    pub fn on_request_delete(&mut self) -> EventOutcome {
        let Some(id) = self.selection.id().filter(|_| self.availability().delete) else {
            debug!("delete ignored: action disabled");
            return EventOutcome::Ignored;
        };
        let removed = match self.tree.remove(id) {
            Ok(removed) => removed,
            Err(e) => return self.reject("delete", e),
        };
        self.bridge.render_remove(&removed.ids);

        let next = removed
            .previous_sibling
            .or(removed.parent)
            .and_then(|n| self.tree.kind_of(n).ok().map(|kind| Selection::selected(n, kind)))
            .unwrap_or(Selection::NoSelection);
        self.set_selection(next);
        EventOutcome::Applied
    }

    /// Answers whether `id` may be dropped under `target`. Never mutates.
    pub fn on_move_attempt(
        &self,
        id: NodeId,
        target: Option<ParentRef>,
        _position: usize,
    ) -> MoveDecision {
        self.validator.decide(&self.tree, id, target)
    }

    /// Applies a move the bridge has already had accepted.
    ///
    /// The move is validated again so a commit without a prior attempt cannot
    /// bypass the validator.
    pub fn on_move_committed(
        &mut self,
        id: NodeId,
        target: ParentRef,
        position: usize,
    ) -> EventOutcome {
        if let Err(e) = self.validator.check(&self.tree, id, Some(target)) {
            return self.reject("move", e);
        }
        let old_parent = match self.tree.parent_of(id) {
            Ok(parent) => parent,
            Err(e) => return self.reject("move", e),
        };
        if let Err(e) = self.tree.move_node(id, Some(target), position) {
            return self.reject("move", e);
        }

        self.render_children(old_parent);
        if target.node() != old_parent {
            self.render_children(target.node());
        }
        EventOutcome::Applied
    }

    /// Attempt and commit as a single step: a rejected drop changes nothing.
    pub fn on_move_dropped(
        &mut self,
        id: NodeId,
        target: Option<ParentRef>,
        position: usize,
    ) -> EventOutcome {
        if let Err(e) = self.validator.check(&self.tree, id, target) {
            return self.reject("move", e);
        }
        match target {
            Some(target) => self.on_move_committed(id, target, position),
            None => EventOutcome::Ignored,
        }
    }

    fn render_children(&mut self, parent: Option<NodeId>) {
        if let Ok(children) = self.tree.children_of(parent.into()) {
            let children = children.to_vec();
            self.bridge.render_reorder(parent, &children);
        }
    }
}
