use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult, HierarchyViolation};
use crate::domain::kind::{can_be_child_of, NodeKind};

/// Stable node identifier, assigned at creation and never reused by the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

/// A parent slot: the implicit top-level container or a concrete node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Container,
    Node(NodeId),
}

impl ParentRef {
    pub fn node(self) -> Option<NodeId> {
        match self {
            ParentRef::Container => None,
            ParentRef::Node(id) => Some(id),
        }
    }
}

impl From<Option<NodeId>> for ParentRef {
    fn from(parent: Option<NodeId>) -> Self {
        parent.map_or(ParentRef::Container, ParentRef::Node)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Container => f.write_str("root"),
            ParentRef::Node(id) => write!(f, "{id}"),
        }
    }
}

/// Storage identity behind a parent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotIdentity {
    Container,
    Node(Index),
}

/// Tree node in the arena-based topology.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Display text, replaced by rename
    pub label: String,
    /// Owning node, None for top-level clusters
    pub parent: Option<NodeId>,
    /// Child ids in display order
    pub children: Vec<NodeId>,
}

/// Outcome of a cascading removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSet {
    /// The node the removal was requested for
    pub root: NodeId,
    /// `root` plus all of its descendants
    pub ids: BTreeSet<NodeId>,
    /// Former parent of `root`, None if it was top-level
    pub parent: Option<NodeId>,
    /// Sibling that preceded `root` in its parent's sequence
    pub previous_sibling: Option<NodeId>,
}

impl RemovedSet {
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }
}

/// Arena-backed cluster → server → bucket tree.
///
/// The arena owns every node; parents only hold child ids. All mutating
/// operations validate first and mutate afterwards, so an `Err` always leaves
/// the tree untouched.
#[derive(Debug)]
pub struct TopologyArena {
    arena: Arena<TreeNode>,
    index: HashMap<NodeId, Index>,
    top_level: Vec<NodeId>,
    next_id: u64,
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            top_level: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.index.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.get(id).ok_or(DomainError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut TreeNode> {
        let idx = *self.index.get(&id).ok_or(DomainError::NotFound(id))?;
        self.arena.get_mut(idx).ok_or(DomainError::NotFound(id))
    }

    pub fn kind_of(&self, id: NodeId) -> DomainResult<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    pub fn parent_of(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        self.node(id).map(|n| n.parent)
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    /// Ordered children of a parent slot.
    pub fn children_of(&self, parent: ParentRef) -> DomainResult<&[NodeId]> {
        match parent {
            ParentRef::Container => Ok(&self.top_level),
            ParentRef::Node(id) => self.node(id).map(|n| n.children.as_slice()),
        }
    }

    /// Resolves a parent slot to the storage it refers to, None if the node is gone.
    pub(crate) fn slot_identity(&self, parent: ParentRef) -> Option<SlotIdentity> {
        match parent {
            ParentRef::Container => Some(SlotIdentity::Container),
            ParentRef::Node(id) => self.index.get(&id).map(|&idx| SlotIdentity::Node(idx)),
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> DomainResult<&mut Vec<NodeId>> {
        match parent {
            None => Ok(&mut self.top_level),
            Some(id) => self.node_mut(id).map(|n| &mut n.children),
        }
    }

    fn parent_kind(&self, parent: Option<NodeId>) -> DomainResult<Option<NodeKind>> {
        parent.map(|p| self.kind_of(p)).transpose()
    }

    /// Appends a new node with an empty label. See [`Self::add_child_labeled`].
    pub fn add_child(&mut self, parent: Option<NodeId>, kind: NodeKind) -> DomainResult<NodeId> {
        self.add_child_labeled(parent, kind, String::new())
    }

    /// Appends a new `kind` node as the last child of `parent` (top level if None).
    #[instrument(level = "trace", skip(self, label))]
    pub fn add_child_labeled(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        label: impl Into<String>,
    ) -> DomainResult<NodeId> {
        let parent_kind = self.parent_kind(parent)?;
        if !can_be_child_of(kind, parent_kind) {
            return Err(DomainError::InvalidHierarchy(HierarchyViolation::placement(
                kind,
                parent_kind,
            )));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        let idx = self.arena.insert(TreeNode {
            id,
            kind,
            label: label.into(),
            parent,
            children: Vec::new(),
        });
        self.index.insert(id, idx);
        self.siblings_mut(parent)?.push(id);

        debug!("added {kind} {id} under {}", ParentRef::from(parent));
        Ok(id)
    }

    #[instrument(level = "trace", skip(self, label))]
    pub fn rename(&mut self, id: NodeId, label: impl Into<String>) -> DomainResult<()> {
        self.node_mut(id)?.label = label.into();
        Ok(())
    }

    /// Removes `id` and its whole subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> DomainResult<RemovedSet> {
        let parent = self.parent_of(id)?;
        let siblings = self.children_of(parent.into())?;
        let position = siblings
            .iter()
            .position(|&c| c == id)
            .ok_or(DomainError::NotFound(id))?;
        let previous_sibling = position.checked_sub(1).map(|p| siblings[p]);

        let mut ids = BTreeSet::from([id]);
        ids.extend(self.descendants(id)?);

        self.siblings_mut(parent)?.remove(position);
        for removed in &ids {
            if let Some(idx) = self.index.remove(removed) {
                self.arena.remove(idx);
            }
        }

        debug!("removed {} node(s) rooted at {id}", ids.len());
        Ok(RemovedSet {
            root: id,
            ids,
            parent,
            previous_sibling,
        })
    }

    /// Detaches `id` and inserts it at `position` under `target`.
    ///
    /// `target` is None when the node was dropped outside any parent slot.
    /// `position` indexes the target sequence after the node has been detached
    /// and is clamped to its length.
    #[instrument(level = "trace", skip(self))]
    pub fn move_node(
        &mut self,
        id: NodeId,
        target: Option<ParentRef>,
        position: usize,
    ) -> DomainResult<()> {
        let node = self.node(id)?;
        let (kind, old_parent) = (node.kind, node.parent);
        let target = target.ok_or(DomainError::InvalidHierarchy(
            HierarchyViolation::MissingTarget,
        ))?;
        let new_parent = target.node();
        let parent_kind = self.parent_kind(new_parent)?;
        if !can_be_child_of(kind, parent_kind) {
            return Err(DomainError::InvalidHierarchy(HierarchyViolation::placement(
                kind,
                parent_kind,
            )));
        }
        let old_position = self
            .children_of(old_parent.into())?
            .iter()
            .position(|&c| c == id)
            .ok_or(DomainError::NotFound(id))?;

        self.siblings_mut(old_parent)?.remove(old_position);
        let siblings = self.siblings_mut(new_parent)?;
        let at = position.min(siblings.len());
        siblings.insert(at, id);
        self.node_mut(id)?.parent = new_parent;

        debug!("moved {id} to {target} at {at}");
        Ok(())
    }

    /// All descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            let node = self.node(current)?;
            stack.extend(node.children.iter().rev());
        }
        Ok(out)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels in use (0 for an empty tree, at most 3).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.top_level
            .iter()
            .map(|&id| self.calculate_depth(id))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Nodes without children, in display order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|node| node.children.is_empty())
            .map(|node| node.id)
            .collect()
    }

    /// Verifies the structural invariants, reporting the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = BTreeSet::new();
        let mut pending: Vec<(Option<NodeId>, &[NodeId])> = vec![(None, &self.top_level)];

        while let Some((parent, children)) = pending.pop() {
            let parent_kind = parent
                .map(|p| self.get(p).map(|n| n.kind).ok_or(format!("dangling parent {p}")))
                .transpose()?;
            for &child in children {
                let node = self.get(child).ok_or(format!("dangling child {child}"))?;
                if !seen.insert(child) {
                    return Err(format!("node {child} is reachable twice"));
                }
                if node.parent != parent {
                    return Err(format!("node {child} has a stale parent reference"));
                }
                if !can_be_child_of(node.kind, parent_kind) {
                    return Err(format!(
                        "{} {child} placed under {}",
                        node.kind,
                        ParentRef::from(parent)
                    ));
                }
                if node.kind.is_leaf() && !node.children.is_empty() {
                    return Err(format!("bucket {child} has children"));
                }
                pending.push((Some(child), &node.children));
            }
        }

        if seen.len() != self.arena.len() || self.index.len() != self.arena.len() {
            return Err(format!(
                "{} node(s) stored but {} reachable",
                self.arena.len(),
                seen.len()
            ));
        }
        Ok(())
    }
}

/// Pre-order traversal across all top-level clusters.
pub struct TreeIterator<'a> {
    tree: &'a TopologyArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TopologyArena) -> Self {
        let stack = tree.top_level.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some(node);
            }
        }
        None
    }
}

/// Post-order traversal: children before their parent.
pub struct PostOrderIterator<'a> {
    tree: &'a TopologyArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a TopologyArena) -> Self {
        let stack = tree.top_level.iter().rev().map(|&id| (id, false)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if visited {
                    return Some(node);
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
