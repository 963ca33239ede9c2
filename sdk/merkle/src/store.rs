//! Contract with the external node store.
//!
//! The ledger layer persists tree nodes as they are appended and serves
//! them back by index. The store is an opaque collaborator, so its methods
//! surface `anyhow` errors; the client layers typed integrity checks on
//! top.

use serde::{Deserialize, Serialize};

/// The defined value of any node the store has never written: unpopulated
/// subtrees are implicitly all-zero, not missing data.
pub const ZERO_NODE_VALUE: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// A stored leaf, addressed by leaf index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafRecord {
    pub value: String,
    pub leaf_index: u64,
}

/// A stored tree node, addressed by flat node index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub value: String,
    pub node_index: u64,
}

/// Read access to the ledger's view of the accumulator.
///
/// `get_nodes` takes the whole index batch in one call so implementations
/// can answer it with a single query; indices absent from the response are
/// treated as [`ZERO_NODE_VALUE`] by the caller.
pub trait TreeStore: Send + Sync {
    fn get_leaf(&self, leaf_index: u64) -> anyhow::Result<LeafRecord>;

    fn get_nodes(&self, node_indices: &[u64]) -> anyhow::Result<Vec<NodeRecord>>;
}

impl<T: TreeStore + ?Sized> TreeStore for std::sync::Arc<T> {
    fn get_leaf(&self, leaf_index: u64) -> anyhow::Result<LeafRecord> {
        (**self).get_leaf(leaf_index)
    }

    fn get_nodes(&self, node_indices: &[u64]) -> anyhow::Result<Vec<NodeRecord>> {
        (**self).get_nodes(node_indices)
    }
}
