//! Algorithms over the twin tree
//!
//! Each module adds an `impl` block to [`crate::tree::TwinTree`].

pub mod accumulate;
pub mod mutation;
pub mod search;
pub mod sort;
pub mod traversal;

pub use search::Location;
pub use sort::NodeComparator;
pub use traversal::{BranchPath, LeafMap};
