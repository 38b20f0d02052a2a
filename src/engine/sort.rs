//! Per-level group sorting and leaf-driven reordering of the other axis.

use std::cmp::Ordering;
use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::{NodeId, TreeError, TreeNode, TreeResult};
use crate::engine::traversal::BranchPath;
use crate::tree::TwinTree;

/// Orders two siblings. One comparator per hierarchy level.
pub type NodeComparator<'a, B, L> = &'a dyn Fn(&TreeNode<B, L>, &TreeNode<B, L>) -> Ordering;

impl<B, L> TwinTree<B, L> {
    /// Sorts the hierarchy below `start`, level by level.
    ///
    /// The children of `start` are ordered by `comparators[0]`, their
    /// children by `comparators[1]` and so on. Leaf children of a bottom
    /// branch use the comparator of their level. Sorting is stable, levels
    /// without a comparator keep their order.
    #[instrument(level = "debug", skip(self, comparators), fields(levels = comparators.len()))]
    pub fn sort(&mut self, start: NodeId, comparators: &[NodeComparator<'_, B, L>]) -> TreeResult<()> {
        self.container(start, "sort")?;
        self.sort_level(start, 0, comparators)
    }

    fn sort_level(
        &mut self,
        node: NodeId,
        level: usize,
        comparators: &[NodeComparator<'_, B, L>],
    ) -> TreeResult<()> {
        let Some(&comparator) = comparators.get(level) else {
            return Ok(());
        };
        self.sort_children(node, comparator)?;

        let children = self.arena.node(node)?.children.clone();
        for child in children {
            if !self.arena.node(child)?.is_leaf() {
                self.sort_level(child, level + 1, comparators)?;
            }
        }
        Ok(())
    }

    fn sort_children(&mut self, node: NodeId, comparator: NodeComparator<'_, B, L>) -> TreeResult<()> {
        let mut keyed = self
            .arena
            .node(node)?
            .children
            .iter()
            .map(|&child| Ok((child, self.arena.node(child)?)))
            .collect::<TreeResult<Vec<_>>>()?;
        keyed.sort_by(|a, b| comparator(a.1, b.1));
        let sorted: Vec<NodeId> = keyed.into_iter().map(|(id, _)| id).collect();

        trace!("sort_children: {} children of {}", sorted.len(), node);
        self.arena.node_mut(node)?.children = sorted;
        Ok(())
    }

    /// Sorts the leaves of the bottom branch `branch` with `comparator` and
    /// reorders `unsorted` (paths of the other axis) to follow them.
    #[instrument(level = "debug", skip(self, unsorted, comparator))]
    pub fn sort_leafs_and_traverse(
        &mut self,
        unsorted: &[BranchPath],
        branch: NodeId,
        comparator: NodeComparator<'_, B, L>,
    ) -> TreeResult<Vec<BranchPath>> {
        self.ensure_bottom(branch, "sort_leafs_and_traverse")?;
        self.sort_children(branch, comparator)?;
        self.sorted_branches(unsorted, branch)
    }

    /// Reorders `unsorted` by the order of the leaves below `branch_parent`.
    ///
    /// Each visible leaf contributes the hierarchy path of its parent on the
    /// other axis. Paths no leaf points at keep their relative order and
    /// come first. The result is always a permutation of `unsorted`; the
    /// other axis itself is left untouched.
    #[instrument(level = "debug", skip(self, unsorted), fields(paths = unsorted.len()))]
    pub fn sorted_branches(
        &self,
        unsorted: &[BranchPath],
        branch_parent: NodeId,
    ) -> TreeResult<Vec<BranchPath>> {
        let parent = self.ensure_bottom(branch_parent, "sorted_branches")?;
        let known: HashSet<&BranchPath> = unsorted.iter().collect();

        let mut resolved = Vec::with_capacity(unsorted.len());
        for &child in &parent.children {
            let leaf = self.arena.node(child)?;
            if !leaf.visible {
                continue;
            }
            if let Some(other) = leaf.other_parent(branch_parent) {
                let path = self.hierarchy_path(other)?;
                if known.contains(&path) {
                    resolved.push(path);
                }
            }
        }
        let resolved: Vec<BranchPath> = resolved.into_iter().unique().collect();

        let mut sorted: Vec<BranchPath> = unsorted
            .iter()
            .filter(|path| !resolved.contains(path))
            .unique()
            .cloned()
            .collect();
        debug!(
            "sorted_branches: {} resolved, {} prepended",
            resolved.len(),
            sorted.len()
        );
        sorted.extend(resolved);
        Ok(sorted)
    }

    fn ensure_bottom(&self, branch: NodeId, operation: &'static str) -> TreeResult<&TreeNode<B, L>> {
        let (_, node) = self.container(branch, operation)?;
        if node.first_child_is(&self.arena, TreeNode::is_branch) {
            return Err(TreeError::NotBottomBranch { node: branch });
        }
        Ok(node)
    }
}
