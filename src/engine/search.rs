//! Predicate search and visibility filtering over both axes.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::domain::{Axis, NodeArena, NodeId, TreeNode, TreeResult};
use crate::tree::TwinTree;

/// Which nodes a search or filter considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Branch and leaf nodes
    All,
    /// Branch nodes only
    Branch,
    /// Leaf nodes only
    Leaf,
}

impl Location {
    fn matches<B, L>(self, node: &TreeNode<B, L>) -> bool {
        match self {
            Location::All => !node.is_root(),
            Location::Branch => node.is_branch(),
            Location::Leaf => node.is_leaf(),
        }
    }

    fn descends<B, L>(self, node: &TreeNode<B, L>, arena: &NodeArena<B, L>) -> bool {
        match self {
            Location::All | Location::Leaf => true,
            Location::Branch => node.first_child_is(arena, TreeNode::is_branch),
        }
    }
}

type Visited = Mutex<HashSet<NodeId>>;

/// Records `id`, false if another walk got there first.
fn first_visit(visited: Option<&Visited>, id: NodeId) -> bool {
    match visited {
        Some(visited) => visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id),
        None => true,
    }
}

impl<B: Sync, L: Sync> TwinTree<B, L> {
    /// Finds the visible nodes of `location` kind that satisfy `predicate`.
    ///
    /// `Branch` and `All` walk both roots, on two workers when
    /// `Settings::parallel` is on; row matches come first. `Leaf` walks the
    /// row root only, since every leaf hangs below it. Hidden nodes are
    /// neither matched nor descended into.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn search<P>(&self, predicate: P, location: Location) -> Vec<NodeId>
    where
        P: Fn(&TreeNode<B, L>) -> bool + Sync,
    {
        let visited = (location == Location::All).then(|| Mutex::new(HashSet::new()));
        let visited = visited.as_ref();
        let rows = self.root(Axis::Row);
        let columns = self.root(Axis::Column);

        let matches = if location == Location::Leaf {
            self.search_from(&predicate, rows, visited, location)
        } else {
            let (mut row_matches, column_matches) = self.join(
                || self.search_from(&predicate, rows, visited, location),
                || self.search_from(&predicate, columns, visited, location),
            );
            row_matches.extend(column_matches);
            row_matches
        };
        debug!("search: {} matches", matches.len());
        matches
    }

    fn search_from<P>(
        &self,
        predicate: &P,
        start: NodeId,
        visited: Option<&Visited>,
        location: Location,
    ) -> Vec<NodeId>
    where
        P: Fn(&TreeNode<B, L>) -> bool,
    {
        let mut matches = Vec::new();
        let Some(start_node) = self.arena.get_node(start) else {
            return matches;
        };
        // Breadth-first, level by level
        let mut queue: VecDeque<NodeId> = start_node.children.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if !first_visit(visited, id) {
                continue;
            }
            let Some(node) = self.arena.get_node(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if location.matches(node) && predicate(node) {
                matches.push(id);
            }
            if location.descends(node, &self.arena) {
                queue.extend(node.children.iter().copied());
            }
        }
        matches
    }

    /// Sets the visibility of every reachable node of `location` kind to
    /// `predicate(node)`.
    ///
    /// A node that ends up hidden hides its whole subtree; its descendants
    /// are not evaluated. Both axes are planned read-only (in parallel when
    /// enabled), a hide from either side wins, and the merged plan is then
    /// applied, invalidating caches of every leaf that changed. Nothing is
    /// deleted or reordered.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn filter<P>(&mut self, predicate: P, location: Location) -> TreeResult<()>
    where
        P: Fn(&TreeNode<B, L>) -> bool + Sync,
    {
        let plan = {
            let visited = (location == Location::All).then(|| Mutex::new(HashSet::new()));
            let visited = visited.as_ref();
            let rows = self.root(Axis::Row);
            let columns = self.root(Axis::Column);

            if location == Location::Leaf {
                self.plan_filter(&predicate, rows, visited, location)
            } else {
                let (mut row_plan, column_plan) = self.join(
                    || self.plan_filter(&predicate, rows, visited, location),
                    || self.plan_filter(&predicate, columns, visited, location),
                );
                row_plan.extend(column_plan);
                row_plan
            }
        };

        let mut merged: IndexMap<NodeId, bool> = IndexMap::with_capacity(plan.len());
        for (id, visible) in plan {
            merged
                .entry(id)
                .and_modify(|v| *v = *v && visible)
                .or_insert(visible);
        }
        debug!("filter: applying {} visibility decisions", merged.len());
        for (id, visible) in merged {
            self.apply_visibility(id, visible)?;
        }
        Ok(())
    }

    fn plan_filter<P>(
        &self,
        predicate: &P,
        start: NodeId,
        visited: Option<&Visited>,
        location: Location,
    ) -> Vec<(NodeId, bool)>
    where
        P: Fn(&TreeNode<B, L>) -> bool,
    {
        let mut plan = Vec::new();
        let Some(start_node) = self.arena.get_node(start) else {
            return plan;
        };
        let mut queue: VecDeque<NodeId> = start_node.children.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if !first_visit(visited, id) {
                continue;
            }
            let Some(node) = self.arena.get_node(id) else {
                continue;
            };
            let in_scope = location.matches(node);
            let visible = if in_scope { predicate(node) } else { node.visible };
            if in_scope {
                plan.push((id, visible));
            }

            if visible {
                if location.descends(node, &self.arena) {
                    queue.extend(node.children.iter().copied());
                }
            } else if in_scope {
                // Cascade: the subtree goes hidden without being evaluated
                for (descendant, _) in self.arena.iter_preorder(id).skip(1) {
                    first_visit(visited, descendant);
                    plan.push((descendant, false));
                }
            }
        }
        plan
    }

    /// Runs both closures, on two rayon workers when parallel walks are on.
    fn join<RA, RB>(
        &self,
        a: impl FnOnce() -> RA + Send,
        b: impl FnOnce() -> RB + Send,
    ) -> (RA, RB)
    where
        RA: Send,
        RB: Send,
    {
        if self.settings.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }
}
