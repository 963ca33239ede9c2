//! Base conversions and hex-string normalization.
//!
//! Values routinely exceed machine-word width (256-bit hashes, 248-bit
//! packed public inputs), so every conversion goes through `BigUint` rather
//! than native integers.

use crate::CodecError;
use num_bigint::BigUint;
use num_traits::Num;

/// Remove a leading `0x` marker if present.
pub fn strip_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

/// Add a leading `0x` marker if absent.
pub fn ensure_prefix(hex: &str) -> String {
    if hex.starts_with("0x") {
        hex.to_string()
    } else {
        format!("0x{hex}")
    }
}

/// Whether the string (with or without marker) is a well-formed hex number.
pub fn is_hex(value: &str) -> bool {
    let stripped = strip_prefix(value);
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_hexdigit())
}

/// Arbitrary-precision digit-string conversion between bases.
///
/// The empty string is the zero value and maps to `"0"`.
pub fn base_convert(digits: &str, from_base: u32, to_base: u32) -> Result<String, CodecError> {
    if digits.is_empty() {
        return Ok("0".to_string());
    }
    let value =
        BigUint::from_str_radix(&digits.to_ascii_lowercase(), from_base).map_err(|_| {
            CodecError::InvalidDigits {
                digits: digits.to_string(),
                base: from_base,
            }
        })?;
    Ok(value.to_str_radix(to_base))
}

/// Hex string (with or without marker) to a decimal string.
pub fn hex_to_dec(hex: &str) -> Result<String, CodecError> {
    base_convert(strip_prefix(hex), 16, 10)
}

/// Decimal string to a `0x`-prefixed hex string.
pub fn dec_to_hex(dec: &str) -> Result<String, CodecError> {
    Ok(ensure_prefix(&base_convert(dec, 10, 16)?))
}

/// Hex string to its binary digit string (no leading zeros; `"0"` for zero).
pub fn hex_to_bin(hex: &str) -> Result<String, CodecError> {
    base_convert(strip_prefix(hex), 16, 2)
}

/// Binary digit string to a decimal string.
pub fn bin_to_dec(bin: &str) -> Result<String, CodecError> {
    base_convert(bin, 2, 10)
}

/// Binary digit string to a `0x`-prefixed hex string.
pub fn bin_to_hex(bin: &str) -> Result<String, CodecError> {
    Ok(ensure_prefix(&base_convert(bin, 2, 16)?))
}

/// Decimal string to its binary digit string.
pub fn dec_to_bin(dec: &str) -> Result<String, CodecError> {
    base_convert(dec, 10, 2)
}

/// Decimal string to a hex string left-padded with zero nibbles to exactly
/// `hex_chars` characters (marker excluded). Values wider than the target
/// are an error, never truncated.
pub fn dec_to_padded_hex(dec: &str, hex_chars: usize) -> Result<String, CodecError> {
    let hex = base_convert(dec, 10, 16)?;
    if hex.len() > hex_chars {
        return Err(CodecError::Oversize {
            value: dec.to_string(),
            width_bits: hex_chars * 4,
        });
    }
    Ok(format!("0x{hex:0>hex_chars$}"))
}

/// Left-pad a hex value with zero nibbles to exactly `total_bits` wide.
///
/// `total_bits` must be a whole number of bytes, and the input must already
/// fit: this function never truncates. Truncation happens only at the
/// explicit hash-width step in the domain hasher.
pub fn left_pad_hex(hex: &str, total_bits: usize) -> Result<String, CodecError> {
    if total_bits % 8 != 0 {
        return Err(CodecError::UnalignedWidth(total_bits));
    }
    let stripped = strip_prefix(hex);
    let chars = total_bits / 4;
    if stripped.len() > chars {
        return Err(CodecError::Oversize {
            value: ensure_prefix(stripped),
            width_bits: total_bits,
        });
    }
    Ok(format!("0x{stripped:0>chars$}"))
}

/// Decode a hex string into raw bytes. Odd-length input is left-padded with
/// a zero nibble first.
pub fn decode_hex_bytes(value: &str) -> Result<Vec<u8>, CodecError> {
    let stripped = strip_prefix(value);
    let padded;
    let even = if stripped.len() % 2 == 0 {
        stripped
    } else {
        padded = format!("0{stripped}");
        &padded
    };
    hex::decode(even).map_err(|_| CodecError::InvalidDigits {
        digits: value.to_string(),
        base: 16,
    })
}

/// Expand a hex string into per-byte decimal strings, e.g. `0x0aff` becomes
/// `["10", "255"]`.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<String>, CodecError> {
    Ok(decode_hex_bytes(hex)?
        .into_iter()
        .map(|b| b.to_string())
        .collect())
}

/// Encode a UTF-8 string as hex, left-padded with zero bytes to exactly
/// `out_bytes` bytes.
pub fn utf8_to_hex(value: &str, out_bytes: usize) -> Result<String, CodecError> {
    let hex = hex::encode(value.as_bytes());
    if hex.len() > out_bytes * 2 {
        return Err(CodecError::StringTooLong(out_bytes));
    }
    let chars = out_bytes * 2;
    Ok(format!("0x{hex:0>chars$}"))
}

/// Decode a left-zero-padded hex string back into its UTF-8 string.
pub fn hex_to_utf8(hex: &str) -> Result<String, CodecError> {
    let bytes = decode_hex_bytes(hex)?;
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[start..].to_vec()).map_err(|_| CodecError::InvalidUtf8)
}
