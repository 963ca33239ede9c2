//! Shade Configuration
//!
//! The protocol constants every Shade component agrees on. These values are
//! baked into the compiled circuits and the shield contract: changing any of
//! them invalidates existing proving keys, so they are modelled as a single
//! immutable value constructed once and handed to each component, never as
//! process-wide mutable state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_TREE_HEIGHT: u32 = 32;
const DEFAULT_LEAF_HASH_BYTES: usize = 32;
const DEFAULT_NODE_HASH_BYTES: usize = 27;
const DEFAULT_PACKING_SIZE: usize = 128;
const DEFAULT_BATCH_SIZE: usize = 20;

/// Protocol-wide constants.
///
/// The node hash length is shorter than the leaf hash length so that a pair
/// of node values concatenates into a single hashing round inside the
/// circuit, and so a node value's decimal magnitude stays below the proving
/// field's modulus when spliced into a witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Height of the commitment accumulator (leaves = 2^height).
    #[serde(default = "default_tree_height")]
    pub tree_height: u32,
    /// Width of a leaf hash in bytes.
    #[serde(default = "default_leaf_hash_bytes")]
    pub leaf_hash_bytes: usize,
    /// Width of an inner tree-node hash in bytes.
    #[serde(default = "default_node_hash_bytes")]
    pub node_hash_bytes: usize,
    /// Bits per field element when packing wide values for the circuit.
    /// The proving field is just shy of 256 bits, so 256-bit values are
    /// packed in 128-bit halves.
    #[serde(default = "default_packing_size")]
    pub packing_size: usize,
    /// Output count of the batched transfer circuit. Reserved; the primary
    /// flows do not exercise it.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            tree_height: DEFAULT_TREE_HEIGHT,
            leaf_hash_bytes: DEFAULT_LEAF_HASH_BYTES,
            node_hash_bytes: DEFAULT_NODE_HASH_BYTES,
            packing_size: DEFAULT_PACKING_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

fn default_tree_height() -> u32 {
    DEFAULT_TREE_HEIGHT
}

fn default_leaf_hash_bytes() -> usize {
    DEFAULT_LEAF_HASH_BYTES
}

fn default_node_hash_bytes() -> usize {
    DEFAULT_NODE_HASH_BYTES
}

fn default_packing_size() -> usize {
    DEFAULT_PACKING_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl ProtocolConfig {
    /// Load from a TOML file. Missing fields fall back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Number of leaves in the accumulator.
    pub fn tree_width(&self) -> u64 {
        1u64 << self.tree_height
    }

    /// Leaf hash width in bits.
    pub fn leaf_hash_bits(&self) -> usize {
        self.leaf_hash_bytes * 8
    }

    /// Inner-node hash width in bits.
    pub fn node_hash_bits(&self) -> usize {
        self.node_hash_bytes * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_circuit_constants() {
        let config = ProtocolConfig::default();
        assert_eq!(config.tree_height, 32);
        assert_eq!(config.leaf_hash_bytes, 32);
        assert_eq!(config.node_hash_bytes, 27);
        assert_eq!(config.packing_size, 128);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.tree_width(), 1 << 32);
        assert_eq!(config.node_hash_bits(), 216);
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let config: ProtocolConfig = toml::from_str("tree_height = 4").unwrap();
        assert_eq!(config.tree_height, 4);
        assert_eq!(config.leaf_hash_bytes, 32);
        assert_eq!(config.packing_size, 128);
    }
}
