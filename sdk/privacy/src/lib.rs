//! Shade Privacy SDK
//!
//! Note-based privacy primitives for shielded value.
//!
//! ```text
//! Note = {
//!     value,             // amount in the smallest unit
//!     owner_public_key,  // 256-bit, derived from the owner's private key
//!     salt,              // 256-bit blinding factor
//!     commitment,        // H(value_hex ‖ owner_public_key ‖ salt)
//! }
//!
//! nullifier = H(salt ‖ owner_private_key)   // published when the note is spent
//! ```
//!
//! `H` is a single SHA-256 round over concatenated raw bytes, truncated to
//! the configured leaf-hash width. Both hashes are pure functions of their
//! inputs; nothing in this crate holds state.

pub mod hasher;
pub mod note;

pub use hasher::DomainHasher;
pub use note::{
    AMOUNT_HEX_CHARS, Note, NoteStatus, amount_hex, derive_public_key, note_commitment,
    note_nullifier, random_salt,
};
