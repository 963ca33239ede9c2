//! Contract with the external proving service and the shape of what it
//! returns.
//!
//! The service keeps per-circuit state between the two calls: witness
//! computation writes the assignment the later proof generation reads, so
//! the two methods must be invoked in order for the same circuit.

use serde::{Deserialize, Serialize};
use shade_codec::{CodecError, ProofElement, flatten_for_circuit, hex_to_dec};
use std::fmt;

/// Bit width of the single field element carrying a public-input hash.
/// One byte short of the hash width; the proving field cannot hold a full
/// 256-bit value, so the hash is deliberately narrowed on both sides of
/// the circuit boundary.
pub const PUBLIC_INPUT_PACKING_BITS: usize = 248;

/// The three compiled circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitId {
    Mint,
    Transfer,
    Burn,
}

impl CircuitId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitId::Mint => "mint",
            CircuitId::Transfer => "transfer",
            CircuitId::Burn => "burn",
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the proof structure as the proving service serializes it:
/// curve points nest as arrays of coordinate strings, and coordinate
/// strings are hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofPoint {
    Coord(String),
    Group(Vec<ProofPoint>),
}

/// A proof as returned by the proving service, structure intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProof(pub Vec<ProofPoint>);

impl RawProof {
    /// Flatten to the decimal coordinate list the shield contract takes,
    /// depth first, preserving the service's ordering.
    pub fn decode(&self) -> Result<Vec<String>, CodecError> {
        let mut coords = Vec::new();
        for point in &self.0 {
            flatten_point(point, &mut coords)?;
        }
        Ok(coords)
    }
}

fn flatten_point(point: &ProofPoint, out: &mut Vec<String>) -> Result<(), CodecError> {
    match point {
        ProofPoint::Coord(hex) => out.push(hex_to_dec(hex)?),
        ProofPoint::Group(points) => {
            for inner in points {
                flatten_point(inner, out)?;
            }
        }
    }
    Ok(())
}

/// The decimal public-input vector matching a proof: the operation's
/// public-input hash as the single narrowed field element the circuit
/// exposes.
pub fn public_inputs_for(public_input_hash: &str) -> Result<Vec<String>, CodecError> {
    let element = ProofElement::field(public_input_hash, PUBLIC_INPUT_PACKING_BITS, Some(1))?;
    flatten_for_circuit(&[element])
}

/// Driver for the external proving service.
pub trait ProverBackend: Send + Sync {
    /// Compute the witness assignment for `circuit` from the flattened
    /// decimal argument vector.
    fn compute_witness(&self, circuit: CircuitId, args: &[String]) -> anyhow::Result<()>;

    /// Generate a proof from the last computed witness for `circuit`.
    fn generate_proof(&self, circuit: CircuitId) -> anyhow::Result<RawProof>;
}

impl<T: ProverBackend + ?Sized> ProverBackend for std::sync::Arc<T> {
    fn compute_witness(&self, circuit: CircuitId, args: &[String]) -> anyhow::Result<()> {
        (**self).compute_witness(circuit, args)
    }

    fn generate_proof(&self, circuit: CircuitId) -> anyhow::Result<RawProof> {
        (**self).generate_proof(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_flattens_depth_first() {
        // a: point, b: pair of points, c: point
        let proof = RawProof(vec![
            ProofPoint::Group(vec![
                ProofPoint::Coord("0x01".into()),
                ProofPoint::Coord("0x02".into()),
            ]),
            ProofPoint::Group(vec![
                ProofPoint::Group(vec![
                    ProofPoint::Coord("0x03".into()),
                    ProofPoint::Coord("0x04".into()),
                ]),
                ProofPoint::Group(vec![
                    ProofPoint::Coord("0x05".into()),
                    ProofPoint::Coord("0x06".into()),
                ]),
            ]),
            ProofPoint::Group(vec![
                ProofPoint::Coord("0xff".into()),
                ProofPoint::Coord("0x100".into()),
            ]),
        ]);
        assert_eq!(
            proof.decode().unwrap(),
            vec!["1", "2", "3", "4", "5", "6", "255", "256"]
        );
    }

    #[test]
    fn raw_proof_deserializes_from_nested_json() {
        let json = r#"[["0x0a", "0x0b"], [["0x0c", "0x0d"], ["0x0e", "0x0f"]]]"#;
        let proof: RawProof = serde_json::from_str(json).unwrap();
        assert_eq!(
            proof.decode().unwrap(),
            vec!["10", "11", "12", "13", "14", "15"]
        );
    }

    #[test]
    fn public_inputs_narrow_the_hash_to_one_element() {
        let hash = format!("0xff{}", "11".repeat(31));
        let inputs = public_inputs_for(&hash).unwrap();
        assert_eq!(inputs.len(), 1);
        // top byte dropped, rightmost 248 bits kept
        assert_eq!(
            inputs[0],
            hex_to_dec(&format!("0x{}", "11".repeat(31))).unwrap()
        );
    }

    #[test]
    fn circuit_ids_render_as_service_paths() {
        assert_eq!(CircuitId::Mint.to_string(), "mint");
        assert_eq!(CircuitId::Transfer.as_str(), "transfer");
        assert_eq!(CircuitId::Burn.as_str(), "burn");
    }
}
