use crate::prover::CircuitId;
use shade_codec::CodecError;
use shade_merkle::MerkleError;
use thiserror::Error;

/// Errors raised while assembling a shielded operation.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Encoding(#[from] CodecError),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// A side of a transfer sums past the circuit's 32-bit adder; the
    /// in-circuit equality check would reject the witness after minutes
    /// of proving, so this is caught up front.
    #[error("{side} values sum to {sum}, past the circuit's 32-bit adder bound")]
    ValueConservation { side: &'static str, sum: u128 },

    /// The operation needs a ledger fact (a leaf index) that the note
    /// does not carry yet.
    #[error("note {0} has no recorded leaf index; it has not been confirmed on the ledger")]
    LedgerEventNotFound(String),

    /// The external proving service failed. Witness computation and proof
    /// generation are separate calls against per-circuit state, so the
    /// failing stage is part of the context.
    #[error("{circuit} circuit failed during {stage}")]
    ExternalProver {
        circuit: CircuitId,
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
