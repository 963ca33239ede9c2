//! The domain hasher: one SHA-256 round, truncated to a fixed width.
//!
//! Every commitment, nullifier and public-input binder in the protocol is
//! built from `hash_concat`. Items are concatenated as raw bytes (the byte
//! representation of their hex strings, never their decimal values), so the
//! output is order-sensitive: swapping two inputs changes the digest.

use shade_codec::{CodecError, decode_hex_bytes};
use sha2::{Digest, Sha256};

/// SHA-256 over hex-string inputs with configurable output truncation.
#[derive(Debug, Clone, Copy)]
pub struct DomainHasher {
    output_bytes: usize,
}

impl Default for DomainHasher {
    /// Full-width 32-byte output.
    fn default() -> Self {
        Self::new(32)
    }
}

impl DomainHasher {
    /// `output_bytes` is the leaf-hash width; outputs keep the rightmost
    /// `output_bytes` bytes of the digest. 32 means untruncated.
    pub fn new(output_bytes: usize) -> Self {
        Self {
            output_bytes: output_bytes.min(32),
        }
    }

    pub fn output_bytes(&self) -> usize {
        self.output_bytes
    }

    /// Hash a single hex value, truncated to the configured width.
    pub fn hash(&self, item: &str) -> Result<String, CodecError> {
        let digest = hex::encode(Sha256::digest(decode_hex_bytes(item)?));
        Ok(format!("0x{}", &digest[digest.len() - self.output_bytes * 2..]))
    }

    /// Byte-concatenate all items, then hash. The full 32-byte digest is
    /// returned; truncation for inner tree nodes happens where the value is
    /// spliced into a witness, not here.
    pub fn hash_concat<S: AsRef<str>>(&self, items: &[S]) -> Result<String, CodecError> {
        let mut hasher = Sha256::new();
        for item in items {
            hasher.update(decode_hex_bytes(item.as_ref())?);
        }
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}
