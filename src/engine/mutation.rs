//! Branch and leaf insertion, deletion and visibility.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::domain::{Invalidation, LeafChange, NodeId, TreeError, TreeNode, TreeResult};
use crate::tree::TwinTree;

impl<B, L> TwinTree<B, L> {
    /// Appends a visible branch as the last child of `parent`.
    #[instrument(level = "debug", skip(self, value))]
    pub fn add_branch(&mut self, parent: NodeId, value: B) -> TreeResult<NodeId> {
        let len = self.container(parent, "add_branch")?.1.children.len();
        self.insert_branch(parent, value, len)
    }

    /// Inserts a visible branch at `index` among the children of `parent`.
    ///
    /// Paths computed before the insert are not renumbered; traverse again.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert_branch(&mut self, parent: NodeId, value: B, index: usize) -> TreeResult<NodeId> {
        self.insert_branch_with_visibility(parent, value, index, true)
    }

    /// Inserts a branch that starts out shown or hidden.
    ///
    /// A hidden branch is skipped by traversal and search until shown.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert_branch_with_visibility(
        &mut self,
        parent: NodeId,
        value: B,
        index: usize,
        visible: bool,
    ) -> TreeResult<NodeId> {
        let (axis, node) = self.container(parent, "add_branch")?;
        let len = node.children.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        if node.first_child_is(&self.arena, TreeNode::is_leaf) {
            return Err(TreeError::MixedChildren { node: parent });
        }

        let mut branch = TreeNode::branch(value, axis, parent);
        branch.visible = visible;
        let id = self.arena.insert_node(branch);
        self.arena.node_mut(parent)?.children.insert(index, id);
        debug!("insert_branch: {} at {} under {}, visible={}", id, index, parent, visible);
        Ok(id)
    }

    /// Appends a leaf to `parent` and to `other_parent` on the opposite axis.
    ///
    /// With `updated` set, the caches of both parents' top-level subtrees
    /// are invalidated.
    #[instrument(level = "debug", skip(self, value))]
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        value: L,
        other_parent: NodeId,
        updated: bool,
    ) -> TreeResult<NodeId> {
        let len = self.container(parent, "add_leaf")?.1.children.len();
        self.insert_leaf(parent, value, other_parent, len, updated)
    }

    /// Inserts a leaf at `index` under `parent` and appends it to
    /// `other_parent`. Only the invoking side is positional.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert_leaf(
        &mut self,
        parent: NodeId,
        value: L,
        other_parent: NodeId,
        index: usize,
        updated: bool,
    ) -> TreeResult<NodeId> {
        self.insert_leaf_with_visibility(parent, value, other_parent, index, true, updated)
    }

    /// Inserts a leaf that starts out shown or hidden. A hidden leaf is in
    /// both parents' child lists but counts toward no subtotal.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert_leaf_with_visibility(
        &mut self,
        parent: NodeId,
        value: L,
        other_parent: NodeId,
        index: usize,
        visible: bool,
        updated: bool,
    ) -> TreeResult<NodeId> {
        let (axis, node) = self.container(parent, "add_leaf")?;
        let len = node.children.len();
        let parent_has_branches = node.first_child_is(&self.arena, TreeNode::is_branch);
        let (other_axis, other) = self.container(other_parent, "add_leaf")?;
        let other_has_branches = other.first_child_is(&self.arena, TreeNode::is_branch);

        if other_axis != axis.opposite() {
            return Err(TreeError::AxisMismatch {
                expected: axis.opposite(),
                found: other_axis,
            });
        }
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        if parent_has_branches {
            return Err(TreeError::MixedChildren { node: parent });
        }
        if other_has_branches {
            return Err(TreeError::MixedChildren { node: other_parent });
        }

        let mut leaf = TreeNode::leaf(value, parent, other_parent);
        leaf.visible = visible;
        let id = self.arena.insert_node(leaf);
        self.arena.node_mut(parent)?.children.insert(index, id);
        self.arena.node_mut(other_parent)?.children.push(id);
        debug!(
            "insert_leaf: {} at {} under {}, appended under {}, visible={}",
            id, index, parent, other_parent, visible
        );

        if updated {
            self.invalidate(Invalidation::new(parent, LeafChange::Inserted))?;
            self.invalidate(Invalidation::new(other_parent, LeafChange::Inserted))?;
        }
        Ok(id)
    }

    /// Deletes `node` from `parent`.
    ///
    /// Nothing happens unless `node` is visible and currently a child of
    /// `parent`; the handle is returned either way. A branch takes its whole
    /// subtree with it, and every leaf below it is also removed from its
    /// parent on the other axis. A leaf is removed from both parents.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, parent: NodeId, node: NodeId) -> TreeResult<NodeId> {
        let Some(target) = self.arena.get_node(node) else {
            debug!("delete: {} is gone, nothing to do", node);
            return Ok(node);
        };
        if target.is_root() {
            return Err(TreeError::unsupported("delete", "root"));
        }
        let (target_visible, target_is_leaf) = (target.is_visible(), target.is_leaf());
        let (_, holder) = self.container(parent, "delete")?;
        if !target_visible || !holder.children.contains(&node) {
            debug!("delete: {} is hidden or not a child of {}", node, parent);
            return Ok(node);
        }

        if target_is_leaf {
            self.delete_leaf(parent, node)?;
        } else {
            self.delete_branch(parent, node)?;
        }
        Ok(node)
    }

    fn delete_leaf(&mut self, parent: NodeId, leaf: NodeId) -> TreeResult<()> {
        let other = self
            .arena
            .node(leaf)?
            .other_parent(parent)
            .ok_or(TreeError::StaleNode(leaf))?;

        self.invalidate(Invalidation::new(parent, LeafChange::Deleted))?;
        self.invalidate(Invalidation::new(other, LeafChange::Deleted))?;

        self.arena.node_mut(parent)?.children.retain(|&c| c != leaf);
        self.arena.node_mut(other)?.children.retain(|&c| c != leaf);
        self.arena.remove_node(leaf);
        trace!("delete_leaf: {} removed from {} and {}", leaf, parent, other);
        Ok(())
    }

    fn delete_branch(&mut self, parent: NodeId, branch: NodeId) -> TreeResult<()> {
        // Post-order: every node after its descendants
        let subtree: Vec<NodeId> = self
            .arena
            .iter_postorder(branch)
            .map(|(id, _)| id)
            .collect();
        let members: HashSet<NodeId> = subtree.iter().copied().collect();

        // Leaves of the subtree and their parent outside of it
        let mut detached = Vec::new();
        for &id in &subtree {
            if let Some((p1, p2)) = self.arena.node(id)?.leaf_parents() {
                let outside = if members.contains(&p1) { p2 } else { p1 };
                detached.push((id, outside));
            }
        }

        if !detached.is_empty() {
            self.invalidate(Invalidation::new(branch, LeafChange::Deleted))?;
            let outside: HashSet<NodeId> = detached.iter().map(|&(_, p)| p).collect();
            for other in outside {
                self.invalidate(Invalidation::new(other, LeafChange::Deleted))?;
            }
        }

        for &(leaf, outside) in &detached {
            self.arena.node_mut(outside)?.children.retain(|&c| c != leaf);
        }
        for &id in &subtree {
            self.arena.remove_node(id);
        }
        self.arena.node_mut(parent)?.children.retain(|&c| c != branch);
        debug!(
            "delete_branch: {} removed {} nodes, {} leaves detached",
            branch,
            subtree.len(),
            detached.len()
        );
        Ok(())
    }

    /// Shows or hides a node.
    ///
    /// Hiding cascades to every descendant, showing affects `node` only.
    /// Leaves whose visibility changes invalidate both parents' caches.
    #[instrument(level = "debug", skip(self))]
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> TreeResult<()> {
        if self.arena.node(node)?.is_root() {
            return Err(TreeError::unsupported("set_visible", "root"));
        }
        if visible {
            return self.apply_visibility(node, true);
        }
        let subtree: Vec<NodeId> = self.arena.iter_preorder(node).map(|(id, _)| id).collect();
        for id in subtree {
            self.apply_visibility(id, false)?;
        }
        Ok(())
    }

    /// Sets one node's flag and invalidates the caches that can reach it.
    ///
    /// A leaf invalidates both parents. A branch only changes what its own
    /// axis reaches, so it invalidates its own top-level subtree.
    pub(crate) fn apply_visibility(&mut self, id: NodeId, visible: bool) -> TreeResult<()> {
        let node = self.arena.node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        match node.leaf_parents() {
            Some((p1, p2)) => {
                self.invalidate(Invalidation::new(p1, LeafChange::VisibilityChanged))?;
                self.invalidate(Invalidation::new(p2, LeafChange::VisibilityChanged))?;
            }
            None => {
                self.invalidate(Invalidation::new(id, LeafChange::VisibilityChanged))?;
            }
        }
        Ok(())
    }
}
