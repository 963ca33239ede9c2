//! Tagged witness elements and the flattening pass that turns them into the
//! literal argument vector a compiled circuit consumes.
//!
//! Element order in equals element order out; the ordering is part of the
//! circuit's external contract, not a choice made here.

use crate::CodecError;
use crate::convert::{ensure_prefix, hex_to_bytes, strip_prefix};
use crate::field::field_pack;
use serde::{Deserialize, Serialize};

/// How a raw hex value is expanded into witness slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "encoding")]
pub enum Encoding {
    /// One witness slot per bit, width-preserving (four slots per nibble).
    Bits,
    /// One witness slot per byte, in decimal.
    Bytes,
    /// Packed into `packing_size`-bit field elements. `packets` pins the
    /// element count expected by the circuit; `None` takes the natural
    /// split.
    Field {
        packing_size: usize,
        packets: Option<usize>,
    },
}

/// A hex value tagged with its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofElement {
    pub hex: String,
    pub encoding: Encoding,
}

impl ProofElement {
    /// Wrap a raw hex value. Empty input is always a caller bug.
    pub fn new(hex: &str, encoding: Encoding) -> Result<Self, CodecError> {
        if strip_prefix(hex).is_empty() {
            return Err(CodecError::EmptyElement);
        }
        Ok(Self {
            hex: ensure_prefix(hex),
            encoding,
        })
    }

    pub fn bits(hex: &str) -> Result<Self, CodecError> {
        Self::new(hex, Encoding::Bits)
    }

    pub fn bytes(hex: &str) -> Result<Self, CodecError> {
        Self::new(hex, Encoding::Bytes)
    }

    pub fn field(
        hex: &str,
        packing_size: usize,
        packets: Option<usize>,
    ) -> Result<Self, CodecError> {
        Self::new(
            hex,
            Encoding::Field {
                packing_size,
                packets,
            },
        )
    }
}

/// Expand a hex value into individual bit slots, four per nibble, so
/// `0x0f` becomes `0,0,0,0,1,1,1,1`.
fn hex_to_bit_slots(hex: &str) -> Result<Vec<String>, CodecError> {
    strip_prefix(hex)
        .chars()
        .map(|c| {
            c.to_digit(16).ok_or_else(|| CodecError::InvalidDigits {
                digits: hex.to_string(),
                base: 16,
            })
        })
        .try_fold(Vec::new(), |mut slots, nibble| {
            let nibble = nibble?;
            for shift in (0..4).rev() {
                slots.push(((nibble >> shift) & 1).to_string());
            }
            Ok(slots)
        })
}

/// Flatten tagged elements into the decimal witness argument vector.
///
/// `Field` elements are packed in lossy mode here: the circuits
/// deliberately narrow some values at this point (a 256-bit public-input
/// hash rides in a single 248-bit element), and the packet counts in the
/// element tags are the authority on how many slots each value occupies.
pub fn flatten_for_circuit(elements: &[ProofElement]) -> Result<Vec<String>, CodecError> {
    let mut args = Vec::new();
    for element in elements {
        match element.encoding {
            Encoding::Bits => args.extend(hex_to_bit_slots(&element.hex)?),
            Encoding::Bytes => args.extend(hex_to_bytes(&element.hex)?),
            Encoding::Field {
                packing_size,
                packets,
            } => args.extend(field_pack(&element.hex, packing_size, packets, true)?),
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_values() {
        assert!(matches!(
            ProofElement::bits(""),
            Err(CodecError::EmptyElement)
        ));
        assert!(matches!(
            ProofElement::field("0x", 128, None),
            Err(CodecError::EmptyElement)
        ));
    }

    #[test]
    fn bits_expansion_preserves_width() {
        let element = ProofElement::bits("0x0f").unwrap();
        let args = flatten_for_circuit(&[element]).unwrap();
        assert_eq!(args, vec!["0", "0", "0", "0", "1", "1", "1", "1"]);
    }

    #[test]
    fn bytes_expansion() {
        let element = ProofElement::bytes("0x01ff").unwrap();
        let args = flatten_for_circuit(&[element]).unwrap();
        assert_eq!(args, vec!["1", "255"]);
    }

    #[test]
    fn field_elements_splice_in_order() {
        let wide = format!("0x02{}", "00".repeat(16)); // needs 2 packets at 128 bits
        let elements = vec![
            ProofElement::field("0xff", 128, Some(1)).unwrap(),
            ProofElement::field(&wide, 128, None).unwrap(),
        ];
        let args = flatten_for_circuit(&elements).unwrap();
        assert_eq!(args, vec!["255", "2", "0"]);
    }

    #[test]
    fn flatten_packs_lossily_per_element_tag() {
        // 256-bit value pinned to one 248-bit packet: top byte dropped
        let value = format!("0xff{}", "00".repeat(31));
        let element = ProofElement::field(&value, 248, Some(1)).unwrap();
        let args = flatten_for_circuit(&[element]).unwrap();
        assert_eq!(args, vec!["0"]);
    }
}
