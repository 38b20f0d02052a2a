use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Axis, NodeId, NodeKind};
use crate::tree::TwinTree;

/// Renders one axis of a tree as a `termtree::Tree`.
pub trait TreeNodeConvert {
    fn to_tree_string(&self, axis: Axis) -> Tree<String>;
}

impl<B: fmt::Display, L: fmt::Display> TreeNodeConvert for TwinTree<B, L> {
    /// Hidden nodes are left out unless `Settings::show_hidden` is on, in
    /// which case they are marked.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, axis: Axis) -> Tree<String> {
        let root = self.root(axis);
        let mut tree = Tree::new(axis.to_string());
        build_tree(self, root, &mut tree);
        tree
    }
}

fn build_tree<B: fmt::Display, L: fmt::Display>(
    twin: &TwinTree<B, L>,
    node_id: NodeId,
    parent_tree: &mut Tree<String>,
) {
    let Some(node) = twin.arena.get_node(node_id) else {
        return;
    };
    for &child_id in &node.children {
        let Some(child) = twin.arena.get_node(child_id) else {
            continue;
        };
        if !child.visible && !twin.settings.show_hidden {
            continue;
        }
        let mut label = match &child.kind {
            NodeKind::Branch { value, .. } => value.to_string(),
            NodeKind::Leaf { value, .. } => format!("[{}]", value),
            NodeKind::Root { axis, .. } => axis.to_string(),
        };
        if !child.visible {
            label.push_str(" (hidden)");
        }
        let mut child_tree = Tree::new(label);
        build_tree(twin, child_id, &mut child_tree);
        parent_tree.push(child_tree);
    }
}

impl<B: fmt::Display, L: fmt::Display> fmt::Display for TwinTree<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string(Axis::Row))?;
        write!(f, "{}", self.to_tree_string(Axis::Column))
    }
}
