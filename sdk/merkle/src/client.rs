//! Sibling-path retrieval with integrity checks.

use crate::index::{leaf_to_node, sibling_path_indices};
use crate::store::{TreeStore, ZERO_NODE_VALUE};
use crate::MerkleError;
use shade_config::ProtocolConfig;
use std::collections::HashMap;
use tracing::debug;

/// A membership witness: node values from the root down to the leaf's own
/// sibling. `H + 1` entries for a tree of height `H`, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingPath(Vec<String>);

impl SiblingPath {
    /// The accumulator root the path was assembled against.
    pub fn root(&self) -> &str {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Fetches and validates membership witnesses from a [`TreeStore`].
///
/// Holds no tree state of its own; each call reads the store fresh, so a
/// path reflects whatever root the ledger had at the moment of the fetch.
pub struct MerkleClient<S: TreeStore> {
    store: S,
    tree_width: u64,
}

impl<S: TreeStore> MerkleClient<S> {
    pub fn new(store: S, config: &ProtocolConfig) -> Self {
        Self {
            store,
            tree_width: config.tree_width(),
        }
    }

    /// Assemble the sibling path for the leaf at `leaf_index`, first
    /// verifying that the stored leaf still matches `commitment`. Node
    /// indices the store has never populated come back as the zero value.
    pub fn fetch_sibling_path(
        &self,
        commitment: &str,
        leaf_index: u64,
    ) -> Result<SiblingPath, MerkleError> {
        if leaf_index >= self.tree_width {
            return Err(MerkleError::LeafOutOfRange {
                leaf_index,
                tree_width: self.tree_width,
            });
        }

        let leaf = self.store.get_leaf(leaf_index)?;
        if normalize(&leaf.value) != normalize(commitment) {
            return Err(MerkleError::LeafMismatch {
                leaf_index,
                expected: commitment.to_string(),
                stored: leaf.value,
            });
        }

        let indices = sibling_path_indices(leaf_to_node(leaf_index, self.tree_width));
        let nodes = self.store.get_nodes(&indices)?;
        let mut by_index: HashMap<u64, String> = nodes
            .into_iter()
            .map(|node| (node.node_index, node.value))
            .collect();

        let path: Vec<String> = indices
            .iter()
            .map(|index| {
                by_index
                    .remove(index)
                    .unwrap_or_else(|| ZERO_NODE_VALUE.to_string())
            })
            .collect();

        debug!(
            leaf_index,
            path_len = path.len(),
            root = %path[0],
            "assembled sibling path"
        );
        Ok(SiblingPath(path))
    }
}

fn normalize(hex: &str) -> String {
    hex.trim_start_matches("0x").to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LeafRecord, NodeRecord};
    use shade_privacy::DomainHasher;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    // Height-3 tree (8 leaves) built node by node, the way the ledger
    // layer populates the store after an append.
    struct MapStore {
        leaves: BTreeMap<u64, String>,
        nodes: Mutex<BTreeMap<u64, String>>,
    }

    impl MapStore {
        fn empty() -> Self {
            Self {
                leaves: BTreeMap::new(),
                nodes: Mutex::new(BTreeMap::new()),
            }
        }
    }

    impl TreeStore for MapStore {
        fn get_leaf(&self, leaf_index: u64) -> anyhow::Result<LeafRecord> {
            let value = self
                .leaves
                .get(&leaf_index)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no leaf at {leaf_index}"))?;
            Ok(LeafRecord { value, leaf_index })
        }

        fn get_nodes(&self, node_indices: &[u64]) -> anyhow::Result<Vec<NodeRecord>> {
            let nodes = self.nodes.lock().unwrap();
            Ok(node_indices
                .iter()
                .filter_map(|&node_index| {
                    nodes.get(&node_index).map(|value| NodeRecord {
                        value: value.clone(),
                        node_index,
                    })
                })
                .collect())
        }
    }

    fn height_three_config() -> ProtocolConfig {
        ProtocolConfig {
            tree_height: 3,
            ..ProtocolConfig::default()
        }
    }

    /// Fill the store with a fully populated height-3 tree whose leaf
    /// values are distinct markers, hashing pairs upward with the node
    /// hasher.
    fn populated_store() -> MapStore {
        let hasher = DomainHasher::new(27);
        let mut store = MapStore::empty();
        let mut values: BTreeMap<u64, String> = BTreeMap::new();
        for leaf in 0u64..8 {
            let value = format!("0x{:064x}", leaf + 0xa1);
            store.leaves.insert(leaf, value.clone());
            values.insert(leaf + 7, value);
        }
        for node in (0u64..7).rev() {
            let left = values[&(2 * node + 1)].clone();
            let right = values[&(2 * node + 2)].clone();
            let parent = hasher.hash_concat(&[&left, &right]).unwrap();
            values.insert(node, parent);
        }
        *store.nodes.get_mut().unwrap() = values;
        store
    }

    #[test]
    fn path_has_height_plus_one_entries_root_first() {
        let store = populated_store();
        let root = store.nodes.lock().unwrap()[&0].clone();
        let client = MerkleClient::new(store, &height_three_config());

        let path = client
            .fetch_sibling_path(&format!("0x{:064x}", 7 + 0xa1), 7)
            .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.root(), root);
        // leaf 7 sits at node 14; its witness is nodes [0, 1, 5, 13]
        assert_eq!(path.iter().nth(3).unwrap(), &format!("0x{:064x}", 0xa7));
    }

    #[test]
    fn unpopulated_nodes_read_as_zero() {
        let mut store = MapStore::empty();
        store
            .leaves
            .insert(0, format!("0x{:064x}", 0xa1u64));
        let client = MerkleClient::new(store, &height_three_config());

        let path = client
            .fetch_sibling_path(&format!("0x{:064x}", 0xa1u64), 0)
            .unwrap();
        assert_eq!(path.len(), 4);
        for value in path.iter() {
            assert_eq!(value, ZERO_NODE_VALUE);
        }
    }

    #[test]
    fn stale_commitment_is_rejected_with_context() {
        let store = populated_store();
        let client = MerkleClient::new(store, &height_three_config());

        let err = client
            .fetch_sibling_path(&format!("0x{:064x}", 0xffu64), 2)
            .unwrap_err();
        match err {
            MerkleError::LeafMismatch {
                leaf_index, stored, ..
            } => {
                assert_eq!(leaf_index, 2);
                assert_eq!(stored, format!("0x{:064x}", 0xa3u64));
            }
            other => panic!("expected LeafMismatch, got {other}"),
        }
    }

    #[test]
    fn commitment_comparison_ignores_prefix_and_case() {
        let store = populated_store();
        let client = MerkleClient::new(store, &height_three_config());

        let bare_upper = format!("{:064X}", 0xa1u64);
        assert!(client.fetch_sibling_path(&bare_upper, 0).is_ok());
    }

    #[test]
    fn out_of_range_leaf_is_rejected_before_any_fetch() {
        let client = MerkleClient::new(MapStore::empty(), &height_three_config());
        let err = client.fetch_sibling_path("0x00", 8).unwrap_err();
        assert!(matches!(
            err,
            MerkleError::LeafOutOfRange {
                leaf_index: 8,
                tree_width: 8
            }
        ));
    }
}
