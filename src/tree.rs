//! The twin tree façade: two roots, one arena, every operation.

use tracing::instrument;

use crate::config::Settings;
use crate::domain::{Axis, NodeArena, NodeId, NodeKind, TreeError, TreeNode, TreeResult};

/// A graph of two branch hierarchies whose leaf cells are shared.
///
/// The row root and the column root each own an independent hierarchy of
/// branches. A leaf sits under exactly one bottom branch of each axis, so
/// restructuring one axis (insert, delete, sort, filter) changes the other
/// axis's view of the cells without copying them.
///
/// ```
/// use twintree::{Axis, TwinTree};
///
/// let mut tree: TwinTree<&str, i32> = TwinTree::new();
/// let rows = tree.root(Axis::Row);
/// let cols = tree.root(Axis::Column);
/// let a = tree.add_branch(rows, "A").unwrap();
/// let p = tree.add_branch(cols, "P").unwrap();
/// let cell = tree.add_leaf(a, 1, p, false).unwrap();
///
/// assert_eq!(tree.children(a).unwrap(), &[cell]);
/// assert_eq!(tree.children(p).unwrap(), &[cell]);
/// ```
#[derive(Debug)]
pub struct TwinTree<B, L> {
    pub(crate) arena: NodeArena<B, L>,
    row_root: NodeId,
    column_root: NodeId,
    pub(crate) settings: Settings,
}

impl<B, L> Default for TwinTree<B, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, L> TwinTree<B, L> {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    #[instrument(level = "debug")]
    pub fn with_settings(settings: Settings) -> Self {
        let mut arena = NodeArena::new();
        let row_root = arena.insert_node(TreeNode::root(Axis::Row));
        let column_root = arena.insert_node(TreeNode::root(Axis::Column));
        Self {
            arena,
            row_root,
            column_root,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn root(&self, axis: Axis) -> NodeId {
        match axis {
            Axis::Row => self.row_root,
            Axis::Column => self.column_root,
        }
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&TreeNode<B, L>> {
        self.arena.node(id)
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.arena.node(id)?.children())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Number of branches and leaves, roots excluded.
    pub fn len(&self) -> usize {
        self.arena.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn arena(&self) -> &NodeArena<B, L> {
        &self.arena
    }

    /// Resolves a node that can hold children (root or branch) and its axis.
    pub(crate) fn container(
        &self,
        id: NodeId,
        operation: &'static str,
    ) -> TreeResult<(Axis, &TreeNode<B, L>)> {
        let node = self.arena.node(id)?;
        match node.kind {
            NodeKind::Root { axis, .. } | NodeKind::Branch { axis, .. } => Ok((axis, node)),
            NodeKind::Leaf { .. } => Err(TreeError::unsupported(operation, node.kind_name())),
        }
    }

    /// The ancestor directly below the root, `id` itself for top-level
    /// branches and roots.
    pub(crate) fn top_level_ancestor(&self, id: NodeId) -> TreeResult<NodeId> {
        let mut current = id;
        loop {
            match self.arena.node(current)?.parent() {
                Some(parent) if !self.arena.node(parent)?.is_root() => current = parent,
                _ => return Ok(current),
            }
        }
    }
}
