//! Shade Merkle Client
//!
//! Index arithmetic and authenticated sibling-path retrieval for the
//! fixed-height commitment accumulator.
//!
//! ```text
//!                 0                    ← root, node index 0
//!               /   \
//!              1     2
//!             / \   / \
//!            3   4 5   6              ← leaves at [2^H − 1, 2^H + 2^H − 2]
//!            ↑
//!            leaf index 0
//! ```
//!
//! The client holds no tree state. Nodes live in an external store that the
//! ledger layer keeps appended; this crate only computes which node indices
//! a membership witness needs and validates what comes back.

pub mod client;
pub mod index;
pub mod store;

pub use client::{MerkleClient, SiblingPath};
pub use index::{leaf_to_node, node_to_leaf, parent_of, sibling_of, sibling_path_indices};
pub use store::{LeafRecord, NodeRecord, TreeStore, ZERO_NODE_VALUE};

use thiserror::Error;

/// Errors raised while assembling a membership witness.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// The store's leaf disagrees with the caller's cached commitment.
    /// Leaf indices are assigned asynchronously by the ledger, so a cached
    /// index can go stale; proving with it would waste minutes of work.
    #[error(
        "leaf {leaf_index} holds {stored} but the caller expected commitment {expected} \
         (stale leaf index or desynchronized note cache)"
    )]
    LeafMismatch {
        leaf_index: u64,
        expected: String,
        stored: String,
    },

    /// Two sibling paths fetched for the same operation disagree on the
    /// root: the tree was appended between the fetches. Retry the whole
    /// operation.
    #[error("sibling paths disagree on the accumulator root ({left} vs {right})")]
    RootMismatch { left: String, right: String },

    #[error("leaf index {leaf_index} is outside a tree of width {tree_width}")]
    LeafOutOfRange { leaf_index: u64, tree_width: u64 },

    #[error("tree store request failed")]
    Store(#[from] anyhow::Error),
}
