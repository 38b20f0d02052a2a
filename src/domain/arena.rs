use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::cache::AccumulationCache;
use crate::domain::error::{TreeError, TreeResult};

/// Handle of a node in the twin tree arena.
///
/// Handles carry the arena generation, so a handle to a deleted node is
/// reported as stale instead of silently addressing a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "node#{}v{}", idx, generation)
    }
}

/// One of the two hierarchies of a twin tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Hierarchy below the first root
    Row,
    /// Hierarchy below the second root
    Column,
}

impl Axis {
    pub fn opposite(self) -> Self {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Node variants. Leaves have two parents, one per axis.
#[derive(Debug)]
pub enum NodeKind<B, L> {
    Root {
        axis: Axis,
        cache: AccumulationCache<L>,
    },
    Branch {
        value: B,
        axis: Axis,
        /// Back reference only
        parent: NodeId,
        cache: AccumulationCache<L>,
    },
    Leaf {
        value: L,
        /// Parent the leaf was created on
        parent1: NodeId,
        /// Parent on the opposite axis
        parent2: NodeId,
    },
}

/// Tree node in the arena-based twin hierarchy.
#[derive(Debug)]
pub struct TreeNode<B, L> {
    pub(crate) kind: NodeKind<B, L>,
    /// Indices of child nodes in the arena, always empty for leaves
    pub(crate) children: Vec<NodeId>,
    pub(crate) visible: bool,
}

impl<B, L> TreeNode<B, L> {
    pub(crate) fn root(axis: Axis) -> Self {
        Self {
            kind: NodeKind::Root {
                axis,
                cache: AccumulationCache::default(),
            },
            children: Vec::new(),
            visible: false,
        }
    }

    pub(crate) fn branch(value: B, axis: Axis, parent: NodeId) -> Self {
        Self {
            kind: NodeKind::Branch {
                value,
                axis,
                parent,
                cache: AccumulationCache::default(),
            },
            children: Vec::new(),
            visible: true,
        }
    }

    pub(crate) fn leaf(value: L, parent1: NodeId, parent2: NodeId) -> Self {
        Self {
            kind: NodeKind::Leaf {
                value,
                parent1,
                parent2,
            },
            children: Vec::new(),
            visible: true,
        }
    }

    pub fn kind(&self) -> &NodeKind<B, L> {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root { .. })
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Root { .. } => "root",
            NodeKind::Branch { .. } => "branch",
            NodeKind::Leaf { .. } => "leaf",
        }
    }

    pub fn branch_value(&self) -> Option<&B> {
        match &self.kind {
            NodeKind::Branch { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn leaf_value(&self) -> Option<&L> {
        match &self.kind {
            NodeKind::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Axis of a root or branch. Leaves belong to both axes.
    pub fn axis(&self) -> Option<Axis> {
        match self.kind {
            NodeKind::Root { axis, .. } | NodeKind::Branch { axis, .. } => Some(axis),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Parent of a branch, None for roots and leaves.
    pub fn parent(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Branch { parent, .. } => Some(parent),
            _ => None,
        }
    }

    /// Both parents of a leaf as (parent1, parent2).
    pub fn leaf_parents(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf {
                parent1, parent2, ..
            } => Some((parent1, parent2)),
            _ => None,
        }
    }

    /// The leaf parent that is not `parent`.
    pub fn other_parent(&self, parent: NodeId) -> Option<NodeId> {
        self.leaf_parents()
            .map(|(p1, p2)| if p1 == parent { p2 } else { p1 })
    }

    /// Whether the first child is a branch. Children are homogeneous, so this
    /// classifies all of them.
    pub(crate) fn first_child_is<F>(&self, arena: &NodeArena<B, L>, test: F) -> bool
    where
        F: Fn(&TreeNode<B, L>) -> bool,
    {
        self.children
            .first()
            .and_then(|&c| arena.get_node(c))
            .map(test)
            .unwrap_or(false)
    }

    pub(crate) fn cache(&self) -> Option<&AccumulationCache<L>> {
        match &self.kind {
            NodeKind::Root { cache, .. } | NodeKind::Branch { cache, .. } => Some(cache),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn cache_mut(&mut self) -> Option<&mut AccumulationCache<L>> {
        match &mut self.kind {
            NodeKind::Root { cache, .. } | NodeKind::Branch { cache, .. } => Some(cache),
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// Arena storage for the nodes of both axes.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Leaves are stored once and referenced from the children lists of both
/// parents.
#[derive(Debug)]
pub struct NodeArena<B, L> {
    arena: Arena<TreeNode<B, L>>,
}

impl<B, L> Default for NodeArena<B, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, L> NodeArena<B, L> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub(crate) fn insert_node(&mut self, node: TreeNode<B, L>) -> NodeId {
        NodeId(self.arena.insert(node))
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<TreeNode<B, L>> {
        self.arena.remove(id.0)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode<B, L>> {
        self.arena.get(id.0)
    }

    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<B, L>> {
        self.arena.get_mut(id.0)
    }

    /// Like `get_node`, reporting a stale handle as an error.
    pub fn node(&self, id: NodeId) -> TreeResult<&TreeNode<B, L>> {
        self.get_node(id).ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode<B, L>> {
        self.get_node_mut(id).ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TreeNode<B, L>> {
        self.arena.iter_mut().map(|(_, node)| node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk of the subtree below `start`, `start` included.
    pub fn iter_preorder(&self, start: NodeId) -> PreOrderIterator<'_, B, L> {
        PreOrderIterator::new(self, start)
    }

    /// Post-order walk of the subtree below `start`, `start` last.
    pub fn iter_postorder(&self, start: NodeId) -> PostOrderIterator<'_, B, L> {
        PostOrderIterator::new(self, start)
    }
}

pub struct PreOrderIterator<'a, B, L> {
    arena: &'a NodeArena<B, L>,
    stack: Vec<NodeId>,
}

impl<'a, B, L> PreOrderIterator<'a, B, L> {
    fn new(arena: &'a NodeArena<B, L>, start: NodeId) -> Self {
        Self {
            arena,
            stack: vec![start],
        }
    }
}

impl<'a, B, L> Iterator for PreOrderIterator<'a, B, L> {
    type Item = (NodeId, &'a TreeNode<B, L>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, B, L> {
    arena: &'a NodeArena<B, L>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, B, L> PostOrderIterator<'a, B, L> {
    fn new(arena: &'a NodeArena<B, L>, start: NodeId) -> Self {
        Self {
            arena,
            stack: vec![(start, false)],
        }
    }
}

impl<'a, B, L> Iterator for PostOrderIterator<'a, B, L> {
    type Item = (NodeId, &'a TreeNode<B, L>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (NodeArena<&'static str, i32>, NodeId, NodeId, NodeId, NodeId) {
        let mut arena = NodeArena::new();
        let root = arena.insert_node(TreeNode::root(Axis::Row));
        let a = arena.insert_node(TreeNode::branch("A", Axis::Row, root));
        let b = arena.insert_node(TreeNode::branch("B", Axis::Row, a));
        let c = arena.insert_node(TreeNode::branch("C", Axis::Row, root));
        arena.get_node_mut(root).unwrap().children = vec![a, c];
        arena.get_node_mut(a).unwrap().children = vec![b];
        (arena, root, a, b, c)
    }

    #[test]
    fn given_removed_node_when_looking_up_then_reports_stale_handle() {
        let (mut arena, _, _, _, c) = sample();
        arena.remove_node(c);
        assert!(!arena.contains(c));
        assert_eq!(arena.node(c).unwrap_err(), TreeError::StaleNode(c));
    }

    #[test]
    fn given_subtree_when_walking_preorder_then_parents_come_first() {
        let (arena, root, a, b, c) = sample();
        let order: Vec<NodeId> = arena.iter_preorder(root).map(|(id, _)| id).collect();
        assert_eq!(order, vec![root, a, b, c]);
    }

    #[test]
    fn given_subtree_when_walking_postorder_then_children_come_first() {
        let (arena, root, a, b, c) = sample();
        let order: Vec<NodeId> = arena.iter_postorder(root).map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, a, c, root]);
    }

    #[test]
    fn given_nodes_when_constructed_then_visibility_follows_kind() {
        let (arena, root, a, _, _) = sample();
        assert!(!arena.node(root).unwrap().is_visible());
        assert!(arena.node(a).unwrap().is_visible());
        assert_eq!(arena.node(a).unwrap().branch_value(), Some(&"A"));
        assert_eq!(arena.node(a).unwrap().leaf_value(), None);
        assert_eq!(Axis::Row.opposite(), Axis::Column);
    }
}
