//! The three shielded operations, assembled end to end: derive the values,
//! fetch and validate ledger state, build the witness vector in the exact
//! order each circuit's signature demands, then drive the prover.
//!
//! The element orderings below are a wire contract with the compiled
//! circuits. Reordering any of them produces witnesses that fail constraint
//! satisfaction, so every ordering is pinned by a shape test.

use crate::error::ProtocolError;
use crate::prover::{
    CircuitId, ProverBackend, PUBLIC_INPUT_PACKING_BITS, public_inputs_for,
};
use shade_codec::{CodecError, ProofElement, flatten_for_circuit, left_pad_hex};
use shade_config::ProtocolConfig;
use shade_merkle::{MerkleClient, MerkleError, SiblingPath, TreeStore};
use shade_privacy::{
    DomainHasher, Note, amount_hex, derive_public_key, note_nullifier,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The transfer circuit sums each side with a 32-bit adder.
const ADDER_BOUND: u64 = 0xFFFF_FFFF;

/// A confirmed note being consumed by a transfer, reduced to the facts the
/// witness needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInput {
    pub value: u64,
    pub salt: String,
    pub commitment: String,
    pub leaf_index: u64,
}

impl TransferInput {
    /// Borrow the spendable facts out of a confirmed note.
    pub fn from_note(note: &Note) -> Result<Self, ProtocolError> {
        let leaf_index = note
            .leaf_index
            .ok_or_else(|| ProtocolError::LedgerEventNotFound(note.commitment.clone()))?;
        Ok(Self {
            value: note.value,
            salt: note.salt.clone(),
            commitment: note.commitment.clone(),
            leaf_index,
        })
    }
}

/// A note to be created by a transfer. The first output goes to the
/// receiver, the second carries the sender's change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutput {
    pub value: u64,
    pub salt: String,
}

/// Everything a caller needs to submit a mint: the pending note and the
/// proof payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintBundle {
    pub note: Note,
    pub public_input_hash: String,
    pub proof: Vec<String>,
    pub public_inputs: Vec<String>,
}

/// A proven transfer: the two pending output notes, the nullifiers that
/// retire the inputs, and the root the membership witnesses were built
/// against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferBundle {
    pub receiver_note: Note,
    pub change_note: Note,
    pub nullifiers: [String; 2],
    pub root: String,
    pub public_input_hash: String,
    pub proof: Vec<String>,
    pub public_inputs: Vec<String>,
}

/// A proven burn releasing a note's value to a public address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnBundle {
    pub nullifier: String,
    pub root: String,
    pub public_input_hash: String,
    pub proof: Vec<String>,
    pub public_inputs: Vec<String>,
}

/// Orchestrates mint, transfer and burn against a tree store and a proving
/// backend.
pub struct NoteProtocol<S: TreeStore, P: ProverBackend> {
    config: ProtocolConfig,
    hasher: DomainHasher,
    tree: MerkleClient<S>,
    prover: P,
}

impl<S: TreeStore, P: ProverBackend> NoteProtocol<S, P> {
    pub fn new(config: ProtocolConfig, store: S, prover: P) -> Self {
        let hasher = DomainHasher::new(config.leaf_hash_bytes);
        let tree = MerkleClient::new(store, &config);
        Self {
            config,
            hasher,
            tree,
            prover,
        }
    }

    /// The hasher all note derivations go through, for callers preparing
    /// commitments or keys ahead of an operation.
    pub fn hasher(&self) -> &DomainHasher {
        &self.hasher
    }

    /// Prove creation of a new note of public `value` for
    /// `owner_public_key`.
    pub fn mint(
        &self,
        value: u64,
        owner_public_key: &str,
        salt: &str,
    ) -> Result<MintBundle, ProtocolError> {
        let note = Note::new(&self.hasher, value, owner_public_key, salt)?;
        let amount = amount_hex(value);
        let public_input_hash = self.hasher.hash_concat(&[&amount, &note.commitment])?;
        info!(value, commitment = %note.commitment, "minting note");

        let packing = self.config.packing_size;
        let elements = vec![
            public_input_element(&public_input_hash)?,
            ProofElement::field(&amount, packing, Some(1))?,
            ProofElement::field(owner_public_key, packing, None)?,
            ProofElement::field(salt, packing, None)?,
            ProofElement::field(&note.commitment, packing, None)?,
        ];
        let proof = self.prove(CircuitId::Mint, &elements)?;
        let public_inputs = public_inputs_for(&public_input_hash)?;
        Ok(MintBundle {
            note,
            public_input_hash,
            proof,
            public_inputs,
        })
    }

    /// Prove a two-in, two-out transfer. The first output is the
    /// receiver's note, the second is the sender's change; both inputs
    /// must belong to the sender and be confirmed under the same root.
    pub fn transfer(
        &self,
        inputs: &[TransferInput; 2],
        outputs: &[TransferOutput; 2],
        receiver_public_key: &str,
        sender_private_key: &str,
    ) -> Result<TransferBundle, ProtocolError> {
        check_adder_bound("input", inputs.iter().map(|input| input.value))?;
        check_adder_bound("output", outputs.iter().map(|output| output.value))?;

        let sender_public_key = derive_public_key(&self.hasher, sender_private_key)?;
        let receiver_note = Note::new(
            &self.hasher,
            outputs[0].value,
            receiver_public_key,
            &outputs[0].salt,
        )?;
        let change_note = Note::new(
            &self.hasher,
            outputs[1].value,
            &sender_public_key,
            &outputs[1].salt,
        )?;
        let nullifiers = [
            note_nullifier(&self.hasher, &inputs[0].salt, sender_private_key)?,
            note_nullifier(&self.hasher, &inputs[1].salt, sender_private_key)?,
        ];

        let path0 = self
            .tree
            .fetch_sibling_path(&inputs[0].commitment, inputs[0].leaf_index)?;
        let path1 = self
            .tree
            .fetch_sibling_path(&inputs[1].commitment, inputs[1].leaf_index)?;
        // The ledger may have appended between the two fetches; a witness
        // mixing two roots can never satisfy the circuit.
        if path0.root() != path1.root() {
            return Err(MerkleError::RootMismatch {
                left: path0.root().to_string(),
                right: path1.root().to_string(),
            }
            .into());
        }
        let root = path0.root().to_string();

        let public_input_hash = self.hasher.hash_concat(&[
            &root,
            &nullifiers[0],
            &nullifiers[1],
            &receiver_note.commitment,
            &change_note.commitment,
        ])?;
        info!(
            root = %root,
            receiver_commitment = %receiver_note.commitment,
            change_commitment = %change_note.commitment,
            "transferring notes"
        );

        let packing = self.config.packing_size;
        let mut elements = vec![
            public_input_element(&public_input_hash)?,
            ProofElement::field(&amount_hex(inputs[0].value), packing, Some(1))?,
            ProofElement::field(sender_private_key, packing, None)?,
            ProofElement::field(&inputs[0].salt, packing, None)?,
        ];
        self.push_path(&mut elements, &path0)?;
        elements.push(leaf_index_element(inputs[0].leaf_index, packing)?);
        elements.push(ProofElement::field(
            &amount_hex(inputs[1].value),
            packing,
            Some(1),
        )?);
        elements.push(ProofElement::field(&inputs[1].salt, packing, None)?);
        self.push_path(&mut elements, &path1)?;
        elements.push(leaf_index_element(inputs[1].leaf_index, packing)?);
        elements.push(ProofElement::field(&nullifiers[0], packing, None)?);
        elements.push(ProofElement::field(&nullifiers[1], packing, None)?);
        elements.push(ProofElement::field(
            &amount_hex(outputs[0].value),
            packing,
            Some(1),
        )?);
        elements.push(ProofElement::field(receiver_public_key, packing, None)?);
        elements.push(ProofElement::field(&outputs[0].salt, packing, None)?);
        elements.push(ProofElement::field(
            &receiver_note.commitment,
            packing,
            None,
        )?);
        elements.push(ProofElement::field(
            &amount_hex(outputs[1].value),
            packing,
            Some(1),
        )?);
        elements.push(ProofElement::field(&outputs[1].salt, packing, None)?);
        elements.push(ProofElement::field(&change_note.commitment, packing, None)?);
        elements.push(ProofElement::field(&root, packing, None)?);

        let proof = self.prove(CircuitId::Transfer, &elements)?;
        let public_inputs = public_inputs_for(&public_input_hash)?;
        Ok(TransferBundle {
            receiver_note,
            change_note,
            nullifiers,
            root,
            public_input_hash,
            proof,
            public_inputs,
        })
    }

    /// Prove release of a confirmed note's value to the public address
    /// `pay_to`.
    pub fn burn(
        &self,
        note: &Note,
        owner_private_key: &str,
        pay_to: &str,
    ) -> Result<BurnBundle, ProtocolError> {
        let leaf_index = note
            .leaf_index
            .ok_or_else(|| ProtocolError::LedgerEventNotFound(note.commitment.clone()))?;
        let nullifier = note.nullifier(&self.hasher, owner_private_key)?;
        let path = self.tree.fetch_sibling_path(&note.commitment, leaf_index)?;
        let root = path.root().to_string();

        let amount = amount_hex(note.value);
        // The address is narrower than a hash; widen it so the preimage
        // layout matches what the circuit hashes.
        let pay_to_padded = left_pad_hex(pay_to, self.config.leaf_hash_bits())?;
        let public_input_hash =
            self.hasher
                .hash_concat(&[&root, &nullifier, &amount, &pay_to_padded])?;
        info!(value = note.value, nullifier = %nullifier, root = %root, "burning note");

        let packing = self.config.packing_size;
        let mut elements = vec![
            public_input_element(&public_input_hash)?,
            ProofElement::field(pay_to, packing, None)?,
            ProofElement::field(&amount, packing, Some(1))?,
            ProofElement::field(owner_private_key, packing, None)?,
            ProofElement::field(&note.salt, packing, None)?,
        ];
        self.push_path(&mut elements, &path)?;
        elements.push(leaf_index_element(leaf_index, packing)?);
        elements.push(ProofElement::field(&nullifier, packing, None)?);
        elements.push(ProofElement::field(&root, packing, None)?);

        let proof = self.prove(CircuitId::Burn, &elements)?;
        let public_inputs = public_inputs_for(&public_input_hash)?;
        Ok(BurnBundle {
            nullifier,
            root,
            public_input_hash,
            proof,
            public_inputs,
        })
    }

    /// Splice a sibling path into the witness, skipping the root (it rides
    /// as its own element at the end of the vector). Node values are pinned
    /// to one packet each; a leaf-width sibling narrows to the node hash
    /// width here, which is how the circuit consumes the tree.
    fn push_path(
        &self,
        elements: &mut Vec<ProofElement>,
        path: &SiblingPath,
    ) -> Result<(), CodecError> {
        for value in path.iter().skip(1) {
            elements.push(ProofElement::field(
                value,
                self.config.node_hash_bits(),
                Some(1),
            )?);
        }
        Ok(())
    }

    fn prove(
        &self,
        circuit: CircuitId,
        elements: &[ProofElement],
    ) -> Result<Vec<String>, ProtocolError> {
        let args = flatten_for_circuit(elements)?;
        debug!(circuit = %circuit, args = args.len(), "computing witness");
        self.prover
            .compute_witness(circuit, &args)
            .map_err(|source| ProtocolError::ExternalProver {
                circuit,
                stage: "compute-witness",
                source,
            })?;
        debug!(circuit = %circuit, "generating proof");
        let raw = self
            .prover
            .generate_proof(circuit)
            .map_err(|source| ProtocolError::ExternalProver {
                circuit,
                stage: "generate-proof",
                source,
            })?;
        Ok(raw.decode()?)
    }
}

fn public_input_element(hash: &str) -> Result<ProofElement, CodecError> {
    ProofElement::field(hash, PUBLIC_INPUT_PACKING_BITS, Some(1))
}

fn leaf_index_element(leaf_index: u64, packing: usize) -> Result<ProofElement, CodecError> {
    ProofElement::field(&format!("0x{leaf_index:x}"), packing, Some(1))
}

fn check_adder_bound(
    side: &'static str,
    values: impl IntoIterator<Item = u64>,
) -> Result<(), ProtocolError> {
    let sum: u128 = values.into_iter().map(u128::from).sum();
    if sum > u128::from(ADDER_BOUND) {
        return Err(ProtocolError::ValueConservation { side, sum });
    }
    Ok(())
}
