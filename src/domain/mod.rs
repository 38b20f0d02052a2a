//! Domain layer: node model, accumulation cache and errors
//!
//! This layer holds no traversal logic; the engines in `crate::engine` operate on it.

pub mod arena;
pub mod cache;
pub mod error;

pub use arena::{Axis, NodeArena, NodeId, NodeKind, TreeNode};
pub use cache::{AccumulationCache, BranchAccumulator, Invalidation, LeafChange};
pub use error::{TreeError, TreeResult};
