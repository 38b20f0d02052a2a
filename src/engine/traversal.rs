//! Flattening branch hierarchies into paths and mapping cells.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::domain::{NodeId, NodeKind, TreeError, TreeNode, TreeResult};
use crate::tree::TwinTree;

/// Branches from just below a root down to a bottom branch.
pub type BranchPath = Vec<NodeId>;

/// Row path → column path → leaf, in traversal order.
pub type LeafMap = IndexMap<BranchPath, IndexMap<BranchPath, NodeId>>;

impl<B, L> TwinTree<B, L> {
    /// Flattens the visible branch hierarchy below `start` into one path
    /// per bottom branch, top to bottom.
    ///
    /// A bottom branch is one whose children are leaves, or that has none.
    /// Hidden branches are skipped together with their subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn traverse_branches(&self, start: NodeId) -> TreeResult<Vec<BranchPath>> {
        let node = self.arena.node(start)?;
        let mut paths = Vec::new();
        if node.first_child_is(&self.arena, TreeNode::is_branch) {
            for &child in &node.children {
                self.collect_branch_paths(child, Vec::new(), &mut paths)?;
            }
        }
        debug!("traverse_branches: {} paths below {}", paths.len(), start);
        Ok(paths)
    }

    fn collect_branch_paths(
        &self,
        id: NodeId,
        mut path: BranchPath,
        paths: &mut Vec<BranchPath>,
    ) -> TreeResult<()> {
        let node = self.arena.node(id)?;
        if !node.visible {
            return Ok(());
        }
        path.push(id);
        if node.first_child_is(&self.arena, TreeNode::is_branch) {
            for &child in &node.children {
                self.collect_branch_paths(child, path.clone(), paths)?;
            }
        } else {
            paths.push(path);
        }
        Ok(())
    }

    /// Maps every visible leaf below the bottom branch of each path to the
    /// hierarchy path of its parent on the other axis.
    ///
    /// The result answers "which cell sits at row R, column C".
    #[instrument(level = "debug", skip_all, fields(paths = paths.len()))]
    pub fn traverse_leafs(&self, paths: &[BranchPath]) -> TreeResult<LeafMap> {
        let mut cells = LeafMap::with_capacity(paths.len());
        for path in paths {
            let Some(&bottom) = path.last() else {
                continue;
            };
            let mut row = IndexMap::new();
            for &child in &self.arena.node(bottom)?.children {
                let leaf = self.arena.node(child)?;
                if !leaf.visible {
                    continue;
                }
                if let Some(other) = leaf.other_parent(bottom) {
                    row.insert(self.hierarchy_path(other)?, child);
                }
            }
            cells.insert(path.clone(), row);
        }
        Ok(cells)
    }

    /// Branches from just below the root down to `node` included; empty for
    /// a root.
    pub fn hierarchy_path(&self, node: NodeId) -> TreeResult<BranchPath> {
        let mut path = Vec::new();
        let mut current = node;
        loop {
            let n = self.arena.node(current)?;
            match n.kind {
                NodeKind::Root { .. } => break,
                NodeKind::Branch { parent, .. } => {
                    path.push(current);
                    current = parent;
                }
                NodeKind::Leaf { .. } => {
                    return Err(TreeError::unsupported("hierarchy_path", n.kind_name()))
                }
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Parent of `leaf` on the axis opposite to `parent`.
    pub fn other_parent(&self, leaf: NodeId, parent: NodeId) -> TreeResult<NodeId> {
        let node = self.arena.node(leaf)?;
        node.other_parent(parent)
            .ok_or_else(|| TreeError::unsupported("other_parent", node.kind_name()))
    }
}
