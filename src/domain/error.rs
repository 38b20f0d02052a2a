//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::{Axis, NodeId};

/// Domain errors represent violations of the twin tree structure.
///
/// No-op conditions (deleting a hidden or absent node, a search without
/// matches) are not errors; they show up as unchanged return values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("{operation} is not supported on a {kind} node")]
    UnsupportedOperation {
        operation: &'static str,
        kind: &'static str,
    },

    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("other parent must be on the {expected} axis, found {found}")]
    AxisMismatch { expected: Axis, found: Axis },

    #[error("children of {node} must be all branches or all leaves")]
    MixedChildren { node: NodeId },

    #[error("{node} has branch children, expected leaf children")]
    NotBottomBranch { node: NodeId },

    #[error("stale node handle: {0}")]
    StaleNode(NodeId),

    #[error("config error: {message}")]
    Config { message: String },
}

impl TreeError {
    pub(crate) fn unsupported(operation: &'static str, kind: &'static str) -> Self {
        Self::UnsupportedOperation { operation, kind }
    }
}

/// Result type for twin tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
