//! Per-branch accumulation cache and the invalidation event that clears it.

use std::collections::HashMap;
use std::fmt;

use crate::domain::arena::{NodeId, TreeNode};

/// Aggregates the visible leaves of a branch that meet one opposite-axis
/// branch into a single value, e.g. a subtotal.
///
/// Results are cached per branch, so implementations must be pure.
pub trait BranchAccumulator<B, L> {
    fn aggregate(&self, leaves: &[&TreeNode<B, L>], key: &TreeNode<B, L>) -> L;
}

impl<B, L, F> BranchAccumulator<B, L> for F
where
    F: Fn(&[&TreeNode<B, L>], &TreeNode<B, L>) -> L,
{
    fn aggregate(&self, leaves: &[&TreeNode<B, L>], key: &TreeNode<B, L>) -> L {
        self(leaves, key)
    }
}

/// Memoized aggregates of one root or branch, keyed by opposite-axis branch.
#[derive(Debug)]
pub struct AccumulationCache<L> {
    dirty: bool,
    /// None until computed, and again after a dirty read or reset
    values: Option<HashMap<NodeId, L>>,
}

impl<L> Default for AccumulationCache<L> {
    fn default() -> Self {
        Self {
            dirty: false,
            values: None,
        }
    }
}

impl<L> AccumulationCache<L> {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drops dirty values. Returns true when a recomputation is needed.
    pub fn needs_refresh(&mut self) -> bool {
        if self.dirty {
            self.values = None;
        }
        self.values.is_none()
    }

    pub fn store(&mut self, values: HashMap<NodeId, L>) {
        self.values = Some(values);
        self.dirty = false;
    }

    pub fn get(&self, key: NodeId) -> Option<&L> {
        self.values.as_ref().and_then(|v| v.get(&key))
    }

    pub fn clear(&mut self) {
        self.values = None;
        self.dirty = false;
    }
}

/// What happened to a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafChange {
    Inserted,
    Deleted,
    VisibilityChanged,
}

impl fmt::Display for LeafChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafChange::Inserted => write!(f, "inserted"),
            LeafChange::Deleted => write!(f, "deleted"),
            LeafChange::VisibilityChanged => write!(f, "visibility changed"),
        }
    }
}

/// "A leaf changed under `parent`".
///
/// Processing one marks dirty every cache in the top-level subtree that
/// contains `parent`, plus the cache of the axis root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pub parent: NodeId,
    pub change: LeafChange,
}

impl Invalidation {
    pub fn new(parent: NodeId, change: LeafChange) -> Self {
        Self { parent, change }
    }
}
