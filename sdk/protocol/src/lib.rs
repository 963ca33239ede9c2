//! Shade Protocol
//!
//! Client-side orchestration of the shielded note operations. Given a view
//! of the commitment accumulator (a [`TreeStore`]) and a proving service
//! (a [`ProverBackend`]), the [`NoteProtocol`] derives note values, builds
//! each circuit's witness vector in its contracted order, and returns the
//! proof payload ready for ledger submission.
//!
//! ```text
//!   mint      value, pk, salt            → commitment + proof
//!   transfer  2 notes in, 2 notes out    → nullifiers + commitments + proof
//!   burn      note, pay-to address       → nullifier + proof
//! ```
//!
//! Ledger state checks run before any prover call. Proving takes minutes;
//! a witness built on a stale leaf or a moved root is rejected here rather
//! than discovered deep inside constraint satisfaction.

pub mod error;
pub mod protocol;
pub mod prover;

pub use error::ProtocolError;
pub use protocol::{
    BurnBundle, MintBundle, NoteProtocol, TransferBundle, TransferInput, TransferOutput,
};
pub use prover::{
    CircuitId, ProofPoint, ProverBackend, PUBLIC_INPUT_PACKING_BITS, RawProof,
    public_inputs_for,
};

pub use shade_merkle::TreeStore;
