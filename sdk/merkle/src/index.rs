//! Node index arithmetic for a fixed-height binary tree stored as a flat
//! array: root at 0, a node `n`'s children at `2n+1` and `2n+2`.
//!
//! Indices are `u64` throughout: at the production height of 32 the last
//! leaf sits at node index 2^33 − 2.

/// Leaf index (0-based, left to right) to flat node index.
pub fn leaf_to_node(leaf_index: u64, tree_width: u64) -> u64 {
    leaf_index + tree_width - 1
}

/// Flat node index of a leaf back to its leaf index.
pub fn node_to_leaf(node_index: u64, tree_width: u64) -> u64 {
    node_index + 1 - tree_width
}

/// The other child of this node's parent. Odd indices are left children,
/// so the sibling is to the right; even indices the reverse. The root has
/// no sibling and must not be passed here.
pub fn sibling_of(node_index: u64) -> u64 {
    debug_assert!(node_index > 0, "the root has no sibling");
    if node_index % 2 == 1 {
        node_index + 1
    } else {
        node_index - 1
    }
}

/// Parent of a non-root node.
pub fn parent_of(node_index: u64) -> u64 {
    debug_assert!(node_index > 0, "the root has no parent");
    if node_index % 2 == 1 {
        node_index >> 1
    } else {
        (node_index - 1) >> 1
    }
}

/// Node indices of a membership witness for `node_index`: the root first,
/// then the sibling at each level walking down, ending with `node_index`'s
/// own sibling. A leaf in a height-H tree yields H + 1 indices.
///
/// Iterative by design; depth is bounded by tree height but there is no
/// reason to spend stack on it.
pub fn sibling_path_indices(node_index: u64) -> Vec<u64> {
    let mut siblings = Vec::new();
    let mut node = node_index;
    while node != 0 {
        siblings.push(sibling_of(node));
        node = parent_of(node);
    }
    siblings.push(0);
    siblings.reverse();
    siblings
}
