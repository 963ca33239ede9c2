//! Shade Codec
//!
//! Conversions between the value representations the protocol juggles:
//! hex strings (what the ledger and hasher speak), arbitrary-precision
//! decimal strings (what the proving backend consumes), and binary chunks
//! (how wide values are packed into field elements).
//!
//! Everything here is numerically load-bearing. A mis-packed field element
//! does not fail a type check; it silently corrupts every proof built on
//! top of it, so oversize values and dropped packets are hard errors unless
//! a caller opts into lossy packing explicitly.

pub mod convert;
pub mod element;
pub mod field;

pub use convert::{
    bin_to_dec, bin_to_hex, dec_to_bin, dec_to_hex, dec_to_padded_hex, decode_hex_bytes,
    ensure_prefix, hex_to_bin, hex_to_bytes, hex_to_dec, hex_to_utf8, is_hex, left_pad_hex,
    strip_prefix, utf8_to_hex,
};
pub use element::{Encoding, ProofElement, flatten_for_circuit};
pub use field::{field_pack, fields_to_dec, split_into_bit_chunks};

use thiserror::Error;

/// Errors raised while encoding values for the circuit.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("`{digits}` is not a valid base-{base} number")]
    InvalidDigits { digits: String, base: u32 },

    #[error("value `{value}` does not fit into {width_bits} bits")]
    Oversize { value: String, width_bits: usize },

    #[error("bit width {0} is not a whole number of bytes")]
    UnalignedWidth(usize),

    #[error(
        "field split into {actual} packets but only {expected} were requested; \
         data would be lost (pass lossy packing explicitly to allow this)"
    )]
    PacketOverflow { actual: usize, expected: usize },

    #[error("proof element hex value is empty")]
    EmptyElement,

    #[error("string does not fit into {0} bytes")]
    StringTooLong(usize),

    #[error("hex does not decode to valid utf-8")]
    InvalidUtf8,
}
