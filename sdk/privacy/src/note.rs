//! Shielded notes and their derivation rules.

use crate::hasher::DomainHasher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shade_codec::CodecError;

/// Amounts ride in a fixed 128-bit hex lane (32 nibbles), matching the
/// field packing size used for witness amounts.
pub const AMOUNT_HEX_CHARS: usize = 32;

/// Lifecycle of a note, driven by ledger confirmations. The core computes
/// the values attached to each transition; it never advances states itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// Minted or received, not yet confirmed in the accumulator.
    Pending,
    /// Confirmed and spendable.
    Unspent,
    /// Consumed by a transfer input or a burn.
    Spent,
    /// Transferred away; a fresh note now belongs to the receiver.
    Sent,
}

/// A note of hidden value. Immutable once committed except for `status`
/// and `leaf_index`, which the ledger layer fills in after inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub value: u64,
    pub owner_public_key: String,
    pub salt: String,
    pub commitment: String,
    pub leaf_index: Option<u64>,
    pub status: NoteStatus,
}

impl Note {
    /// Build a pending note, deriving its commitment.
    pub fn new(
        hasher: &DomainHasher,
        value: u64,
        owner_public_key: &str,
        salt: &str,
    ) -> Result<Self, CodecError> {
        let commitment = note_commitment(hasher, value, owner_public_key, salt)?;
        Ok(Self {
            value,
            owner_public_key: owner_public_key.to_string(),
            salt: salt.to_string(),
            commitment,
            leaf_index: None,
            status: NoteStatus::Pending,
        })
    }

    /// Record the leaf index assigned by the ledger and mark spendable.
    pub fn confirmed_at(mut self, leaf_index: u64) -> Self {
        self.leaf_index = Some(leaf_index);
        self.status = NoteStatus::Unspent;
        self
    }

    /// Nullifier for spending this note. Depends only on the salt and the
    /// owner's private key, never on the value or public key.
    pub fn nullifier(
        &self,
        hasher: &DomainHasher,
        owner_private_key: &str,
    ) -> Result<String, CodecError> {
        note_nullifier(hasher, &self.salt, owner_private_key)
    }
}

/// Amount as a 128-bit left-padded hex lane.
pub fn amount_hex(value: u64) -> String {
    format!("0x{value:032x}")
}

/// `commitment = H(value_hex ‖ owner_public_key ‖ salt)`
pub fn note_commitment(
    hasher: &DomainHasher,
    value: u64,
    owner_public_key: &str,
    salt: &str,
) -> Result<String, CodecError> {
    hasher.hash_concat(&[&amount_hex(value), owner_public_key, salt])
}

/// `nullifier = H(salt ‖ owner_private_key)`
pub fn note_nullifier(
    hasher: &DomainHasher,
    salt: &str,
    owner_private_key: &str,
) -> Result<String, CodecError> {
    hasher.hash_concat(&[salt, owner_private_key])
}

/// The shielded public key is the truncated hash of the private key.
pub fn derive_public_key(
    hasher: &DomainHasher,
    private_key: &str,
) -> Result<String, CodecError> {
    hasher.hash(private_key)
}

/// Fresh random salt of `bytes` bytes, as prefixed hex.
pub fn random_salt(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    format!("0x{}", hex::encode(buf))
}
