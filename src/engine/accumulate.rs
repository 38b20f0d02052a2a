//! Demand-computed aggregates per branch and their coarse invalidation.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, instrument, trace};

use crate::domain::{BranchAccumulator, Invalidation, NodeId, TreeError, TreeNode, TreeResult};
use crate::tree::TwinTree;

impl<B, L> TwinTree<B, L> {
    /// Processes one invalidation event.
    ///
    /// Marks dirty every root/branch cache in the top-level subtree holding
    /// `event.parent`, and the cache of the axis root. Returns the number of
    /// caches marked.
    #[instrument(level = "trace", skip(self))]
    pub fn invalidate(&mut self, event: Invalidation) -> TreeResult<usize> {
        let (axis, _) = self.container(event.parent, "invalidate")?;
        let top = self.top_level_ancestor(event.parent)?;
        let root = self.root(axis);

        let mut targets = Vec::new();
        let mut queue = VecDeque::from([top]);
        while let Some(id) = queue.pop_front() {
            let node = self.arena.node(id)?;
            targets.push(id);
            if node.first_child_is(&self.arena, TreeNode::is_branch) {
                queue.extend(node.children.iter().copied());
            }
        }
        if top != root {
            targets.push(root);
        }

        for &id in &targets {
            if let Some(cache) = self.arena.node_mut(id)?.cache_mut() {
                cache.mark_dirty();
            }
        }
        trace!(
            "invalidate: leaf {} under {}, {} caches dirty",
            event.change,
            event.parent,
            targets.len()
        );
        Ok(targets.len())
    }

    /// Clears every cache, e.g. before aggregating with another accumulator.
    #[instrument(level = "debug", skip(self))]
    pub fn reset_accumulations(&mut self) {
        for node in self.arena.nodes_mut() {
            if let Some(cache) = node.cache_mut() {
                cache.clear();
            }
        }
    }

    /// Groups the visible leaves below `branch` by their parent on the
    /// other axis and aggregates each group.
    fn accumulate<A>(&self, branch: NodeId, accumulator: &A) -> TreeResult<HashMap<NodeId, L>>
    where
        A: BranchAccumulator<B, L> + ?Sized,
    {
        let mut groups: HashMap<NodeId, Vec<&TreeNode<B, L>>> = HashMap::new();
        let mut queue: VecDeque<(NodeId, NodeId)> = self
            .arena
            .node(branch)?
            .children
            .iter()
            .map(|&child| (branch, child))
            .collect();

        while let Some((parent, id)) = queue.pop_front() {
            let node = self.arena.node(id)?;
            if !node.visible {
                continue;
            }
            match node.other_parent(parent) {
                Some(other) => groups.entry(other).or_default().push(node),
                None => queue.extend(node.children.iter().map(|&child| (id, child))),
            }
        }

        let mut values = HashMap::with_capacity(groups.len());
        for (key, leaves) in groups {
            let key_node = self.arena.node(key)?;
            values.insert(key, accumulator.aggregate(&leaves, key_node));
        }
        Ok(values)
    }
}

impl<B, L: Clone> TwinTree<B, L> {
    /// Aggregate of the visible leaves below `branch` that sit under
    /// `other_branch` on the other axis.
    ///
    /// Values are computed for all opposite branches at once and cached until
    /// an invalidation marks the branch dirty. `None` means the two branches
    /// share no visible leaf.
    #[instrument(level = "debug", skip(self, accumulator))]
    pub fn accumulated_value<A>(
        &mut self,
        branch: NodeId,
        other_branch: NodeId,
        accumulator: &A,
    ) -> TreeResult<Option<L>>
    where
        A: BranchAccumulator<B, L> + ?Sized,
    {
        let node = self.arena.node_mut(branch)?;
        let refresh = match node.cache_mut() {
            Some(cache) => cache.needs_refresh(),
            None => return Err(TreeError::unsupported("accumulated_value", "leaf")),
        };

        if refresh {
            let values = self.accumulate(branch, accumulator)?;
            debug!(
                "accumulated_value: recomputed {} groups for {}",
                values.len(),
                branch
            );
            if let Some(cache) = self.arena.node_mut(branch)?.cache_mut() {
                cache.store(values);
            }
        }

        Ok(self
            .arena
            .node(branch)?
            .cache()
            .and_then(|cache| cache.get(other_branch))
            .cloned())
    }
}
