//! Two branch hierarchies, rows and columns, sharing one set of leaf cells.

pub mod config;
pub mod domain;
pub mod engine;
pub mod tree;
pub mod tree_traits;
pub mod util;

pub use config::Settings;
pub use domain::{
    Axis, BranchAccumulator, Invalidation, LeafChange, NodeId, NodeKind, TreeError, TreeNode,
    TreeResult,
};
pub use engine::{BranchPath, LeafMap, Location, NodeComparator};
pub use tree::TwinTree;
pub use tree_traits::TreeNodeConvert;
