//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;

use rstest::fixture;

use twintree::util::testing;
use twintree::{Axis, NodeId, Settings, TreeNode, TwinTree};

pub type Tree = TwinTree<&'static str, i32>;
pub type Node = TreeNode<&'static str, i32>;

/// Rows `X{C, A, B}`, `Y{E, D}`; columns `Z{R, Q}`.
///
/// Cells (row branch, column branch):
/// C: 6(Q) 8(R), A: 3(Q) 10(R), B: 1(Q), E: 12(R) 15(Q), D: 16(R) 20(Q)
pub struct Scenario {
    pub tree: Tree,
    pub x: NodeId,
    pub y: NodeId,
    pub c: NodeId,
    pub a: NodeId,
    pub b: NodeId,
    pub e: NodeId,
    pub d: NodeId,
    pub z: NodeId,
    pub r: NodeId,
    pub q: NodeId,
    pub cells: HashMap<i32, NodeId>,
}

impl Scenario {
    pub fn build(settings: Settings) -> Self {
        testing::init_test_setup();
        let mut tree = TwinTree::with_settings(settings);
        let rows = tree.root(Axis::Row);
        let cols = tree.root(Axis::Column);

        let x = tree.add_branch(rows, "X").unwrap();
        let y = tree.add_branch(rows, "Y").unwrap();
        let c = tree.add_branch(x, "C").unwrap();
        let a = tree.add_branch(x, "A").unwrap();
        let b = tree.add_branch(x, "B").unwrap();
        let e = tree.add_branch(y, "E").unwrap();
        let d = tree.add_branch(y, "D").unwrap();
        let z = tree.add_branch(cols, "Z").unwrap();
        let r = tree.add_branch(z, "R").unwrap();
        let q = tree.add_branch(z, "Q").unwrap();

        // Order chosen so that R holds [10, 8, 12, 16] and Q [3, 1, 6, 15, 20]
        let mut cells = HashMap::new();
        for (row, value, col) in [
            (a, 3, q),
            (a, 10, r),
            (b, 1, q),
            (c, 6, q),
            (c, 8, r),
            (e, 12, r),
            (e, 15, q),
            (d, 16, r),
            (d, 20, q),
        ] {
            cells.insert(value, tree.add_leaf(row, value, col, false).unwrap());
        }

        Self {
            tree,
            x,
            y,
            c,
            a,
            b,
            e,
            d,
            z,
            r,
            q,
            cells,
        }
    }

    pub fn cell(&self, value: i32) -> NodeId {
        self.cells[&value]
    }
}

#[fixture]
pub fn scenario() -> Scenario {
    Scenario::build(Settings::default())
}

/// Leaf values of the children of `node`, in order.
pub fn leaf_values(tree: &Tree, node: NodeId) -> Vec<i32> {
    tree.children(node)
        .unwrap()
        .iter()
        .filter_map(|&id| tree.node(id).unwrap().leaf_value().copied())
        .collect()
}

/// Branch values of the children of `node`, in order.
pub fn branch_values(tree: &Tree, node: NodeId) -> Vec<&'static str> {
    tree.children(node)
        .unwrap()
        .iter()
        .filter_map(|&id| tree.node(id).unwrap().branch_value().copied())
        .collect()
}

pub fn ascending(a: &Node, b: &Node) -> Ordering {
    match (a.branch_value(), b.branch_value()) {
        (Some(x), Some(y)) => x.cmp(y),
        _ => a.leaf_value().cmp(&b.leaf_value()),
    }
}

pub fn descending(a: &Node, b: &Node) -> Ordering {
    ascending(a, b).reverse()
}

pub fn sum(leaves: &[&Node], _key: &Node) -> i32 {
    leaves.iter().filter_map(|leaf| leaf.leaf_value()).sum()
}
