//! Tests for group sorting and leaf-driven reordering of the other axis

mod common;

use rstest::rstest;

use common::{ascending, branch_values, descending, leaf_values, scenario, Node, Scenario};
use twintree::{Axis, NodeComparator, TreeError};

fn by_leaf(a: &Node, b: &Node) -> std::cmp::Ordering {
    a.leaf_value().cmp(&b.leaf_value())
}

// ============================================================
// Leaf-driven reorder
// ============================================================

#[rstest]
fn given_column_leaves_when_sorted_ascending_then_rows_follow(mut scenario: Scenario) {
    let s = &mut scenario;
    let rows = s.tree.traverse_branches(s.tree.root(Axis::Row)).unwrap();

    let sorted = s.tree.sort_leafs_and_traverse(&rows, s.r, &by_leaf).unwrap();

    assert_eq!(leaf_values(&s.tree, s.r), vec![8, 10, 12, 16]);
    assert_eq!(
        sorted,
        vec![
            vec![s.x, s.b], // no cell under R, kept in front
            vec![s.x, s.c],
            vec![s.x, s.a],
            vec![s.y, s.e],
            vec![s.y, s.d],
        ]
    );
    // the row axis itself is untouched
    assert_eq!(s.tree.traverse_branches(s.tree.root(Axis::Row)).unwrap(), rows);
}

#[rstest]
fn given_any_bottom_branch_when_sorting_branches_then_result_is_permutation(scenario: Scenario) {
    let s = &scenario;
    let rows = s.tree.traverse_branches(s.tree.root(Axis::Row)).unwrap();

    for branch in [s.r, s.q] {
        let mut sorted = s.tree.sorted_branches(&rows, branch).unwrap();
        let mut expected = rows.clone();
        sorted.sort();
        expected.sort();
        assert_eq!(sorted, expected);
    }
}

#[rstest]
fn given_paths_missing_from_unsorted_when_sorting_branches_then_dropped(scenario: Scenario) {
    let s = &scenario;
    let subset = vec![vec![s.y, s.d], vec![s.x, s.c]];

    let sorted = s.tree.sorted_branches(&subset, s.r).unwrap();

    assert_eq!(sorted, vec![vec![s.x, s.c], vec![s.y, s.d]]);
}

#[rstest]
fn given_branch_with_branch_children_when_sorting_branches_then_not_bottom(mut scenario: Scenario) {
    let s = &mut scenario;
    let rows = s.tree.traverse_branches(s.tree.root(Axis::Row)).unwrap();

    assert_eq!(
        s.tree.sorted_branches(&rows, s.z).unwrap_err(),
        TreeError::NotBottomBranch { node: s.z }
    );
    assert_eq!(
        s.tree
            .sort_leafs_and_traverse(&rows, s.z, &by_leaf)
            .unwrap_err(),
        TreeError::NotBottomBranch { node: s.z }
    );
    assert_eq!(branch_values(&s.tree, s.z), vec!["R", "Q"], "nothing sorted");
}

// ============================================================
// Group sort
// ============================================================

#[rstest]
fn given_mixed_directions_when_group_sorting_then_each_level_follows_its_comparator(
    mut scenario: Scenario,
) {
    let s = &mut scenario;
    let levels: [NodeComparator<'_, &str, i32>; 3] = [&descending, &ascending, &descending];

    s.tree.sort(s.tree.root(Axis::Row), &levels).unwrap();

    let rows = s.tree.traverse_branches(s.tree.root(Axis::Row)).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![s.y, s.d],
            vec![s.y, s.e],
            vec![s.x, s.a],
            vec![s.x, s.b],
            vec![s.x, s.c],
        ]
    );
    assert_eq!(leaf_values(&s.tree, s.d), vec![20, 16]);
    assert_eq!(leaf_values(&s.tree, s.e), vec![15, 12]);
    assert_eq!(leaf_values(&s.tree, s.a), vec![10, 3]);
    assert_eq!(leaf_values(&s.tree, s.b), vec![1]);
    assert_eq!(leaf_values(&s.tree, s.c), vec![8, 6]);

    let cols = s.tree.traverse_branches(s.tree.root(Axis::Column)).unwrap();
    assert_eq!(
        s.tree.sorted_branches(&cols, s.d).unwrap(),
        vec![vec![s.z, s.q], vec![s.z, s.r]]
    );
    assert_eq!(
        s.tree.sorted_branches(&cols, s.b).unwrap(),
        vec![vec![s.z, s.r], vec![s.z, s.q]]
    );
}

#[rstest]
fn given_sorted_tree_when_sorting_again_then_order_is_unchanged(mut scenario: Scenario) {
    let s = &mut scenario;
    let levels: [NodeComparator<'_, &str, i32>; 3] = [&descending, &ascending, &descending];
    let root = s.tree.root(Axis::Row);

    s.tree.sort(root, &levels).unwrap();
    let once = s.tree.traverse_branches(root).unwrap();
    let cells_once = s.tree.traverse_leafs(&once).unwrap();
    s.tree.sort(root, &levels).unwrap();

    assert_eq!(s.tree.traverse_branches(root).unwrap(), once);
    assert_eq!(s.tree.traverse_leafs(&once).unwrap(), cells_once);
}

#[rstest]
fn given_fewer_comparators_than_levels_when_sorting_then_deeper_levels_keep_order(
    mut scenario: Scenario,
) {
    let s = &mut scenario;
    let levels: [NodeComparator<'_, &str, i32>; 1] = [&descending];

    s.tree.sort(s.tree.root(Axis::Row), &levels).unwrap();

    assert_eq!(branch_values(&s.tree, s.tree.root(Axis::Row)), vec!["Y", "X"]);
    assert_eq!(branch_values(&s.tree, s.x), vec!["C", "A", "B"]);
    assert_eq!(leaf_values(&s.tree, s.c), vec![6, 8]);
}

#[rstest]
fn given_leaf_start_when_sorting_then_unsupported(mut scenario: Scenario) {
    let leaf = scenario.cell(1);
    let levels: [NodeComparator<'_, &str, i32>; 1] = [&ascending];
    assert!(matches!(
        scenario.tree.sort(leaf, &levels),
        Err(TreeError::UnsupportedOperation { .. })
    ));
}

#[rstest]
fn given_column_sort_when_cells_reordered_then_they_stay_shared(mut scenario: Scenario) {
    let s = &mut scenario;
    let levels: [NodeComparator<'_, &str, i32>; 3] = [&ascending, &ascending, &descending];

    s.tree.sort(s.tree.root(Axis::Column), &levels).unwrap();

    assert_eq!(branch_values(&s.tree, s.z), vec!["Q", "R"]);
    assert_eq!(leaf_values(&s.tree, s.q), vec![20, 15, 6, 3, 1]);
    // row side order is not affected
    assert_eq!(leaf_values(&s.tree, s.c), vec![6, 8]);
    assert_eq!(
        s.tree.other_parent(s.cell(20), s.q).unwrap(),
        s.d,
        "cells keep both parents"
    );
}
