//! Field packing: splitting wide values into chunks whose decimal magnitude
//! stays below the proving field's modulus.
//!
//! The proving field is roughly 254 bits, so a 256-bit hash cannot ride in a
//! single field element. It is split big-endian into `packing_size`-bit
//! chunks from the right; only the most-significant leftover chunk is
//! narrower, and it is left-padded to full width.

use crate::CodecError;
use crate::convert::{bin_to_dec, hex_to_bin};
use num_bigint::BigUint;
use num_traits::Num;

/// Split a hex value into binary chunk strings of `chunk_bits` each, from
/// the right. The leftmost chunk carries the remainder and is left-padded
/// with zeros to exactly `chunk_bits`.
///
/// The split is width-preserving: a 256-bit hash that happens to start
/// with zero nibbles still splits into the same number of chunks, which is
/// what keeps unpinned witness elements at a stable slot count.
pub fn split_into_bit_chunks(hex: &str, chunk_bits: usize) -> Result<Vec<String>, CodecError> {
    let width = crate::convert::strip_prefix(hex).len() * 4;
    let bits = format!("{:0>width$}", hex_to_bin(hex)?);
    let mut chunks = Vec::with_capacity(bits.len() / chunk_bits + 1);
    let mut rest = bits.as_str();
    while rest.len() > chunk_bits {
        let split_at = rest.len() - chunk_bits;
        chunks.push(rest[split_at..].to_string());
        rest = &rest[..split_at];
    }
    chunks.push(format!("{rest:0>chunk_bits$}"));
    chunks.reverse();
    Ok(chunks)
}

/// Pack a hex value into decimal field elements of `packing_bits` each.
///
/// When `expected_packets` is given, the result is reconciled against it:
/// fewer packets than expected are left-padded with zero-value packets;
/// more packets than expected means data would be dropped, which is an
/// error unless `allow_lossy` is set. Lossy mode drops the excess packets
/// from the most-significant end, matching how the circuit deliberately
/// narrows a 256-bit public-input hash to 248 bits.
pub fn field_pack(
    hex: &str,
    packing_bits: usize,
    expected_packets: Option<usize>,
    allow_lossy: bool,
) -> Result<Vec<String>, CodecError> {
    let mut packets = split_into_bit_chunks(hex, packing_bits)?
        .iter()
        .map(|chunk| bin_to_dec(chunk))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(expected) = expected_packets {
        if packets.len() > expected {
            if !allow_lossy {
                return Err(CodecError::PacketOverflow {
                    actual: packets.len(),
                    expected,
                });
            }
            packets.drain(..packets.len() - expected);
        } else {
            while packets.len() < expected {
                packets.insert(0, "0".to_string());
            }
        }
    }
    Ok(packets)
}

/// Recombine packed field elements back into the decimal value they encode.
/// Element `i` is shifted left by `packing_bits * (len - 1 - i)`.
pub fn fields_to_dec(packets: &[String], packing_bits: usize) -> Result<String, CodecError> {
    let mut acc = BigUint::default();
    for (i, packet) in packets.iter().enumerate() {
        let value =
            BigUint::from_str_radix(packet, 10).map_err(|_| CodecError::InvalidDigits {
                digits: packet.clone(),
                base: 10,
            })?;
        let shift = packing_bits * (packets.len() - 1 - i);
        acc += value << shift;
    }
    Ok(acc.to_str_radix(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::hex_to_dec;
    use rand::RngCore;

    fn random_hex_256(rng: &mut impl RngCore) -> String {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn chunks_split_from_the_right() {
        // 0x1ff = 1_1111_1111; chunks of 4 from the right
        let chunks = split_into_bit_chunks("0x1ff", 4).unwrap();
        assert_eq!(chunks, vec!["0001", "1111", "1111"]);
    }

    #[test]
    fn narrow_value_is_a_single_padded_chunk() {
        let chunks = split_into_bit_chunks("0x05", 8).unwrap();
        assert_eq!(chunks, vec!["00000101"]);
        let chunks = split_into_bit_chunks("0x00", 8).unwrap();
        assert_eq!(chunks, vec!["00000000"]);
    }

    #[test]
    fn pack_pads_missing_packets_on_the_left() {
        let packets = field_pack("0xff", 128, Some(2), false).unwrap();
        assert_eq!(packets, vec!["0", "255"]);
    }

    #[test]
    fn pack_round_trips_a_random_256_bit_value() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let value = random_hex_256(&mut rng);
            let packets = field_pack(&value, 128, Some(2), false).unwrap();
            assert_eq!(packets.len(), 2);
            assert_eq!(
                fields_to_dec(&packets, 128).unwrap(),
                hex_to_dec(&value).unwrap()
            );
        }
    }

    #[test]
    fn overflowing_pack_fails_unless_lossy() {
        // needs two 128-bit packets
        let wide = format!("0x01{}", "00".repeat(16));
        let err = field_pack(&wide, 128, Some(1), false).unwrap_err();
        assert!(matches!(
            err,
            CodecError::PacketOverflow {
                actual: 2,
                expected: 1
            }
        ));

        // lossy mode keeps the least-significant packets
        let packets = field_pack(&wide, 128, Some(1), true).unwrap();
        assert_eq!(packets, vec!["0"]);
    }

    #[test]
    fn lossy_248_packing_drops_the_top_byte() {
        let value = format!("0xab{}", "11".repeat(31));
        let lossless = field_pack(&value, 248, None, false).unwrap();
        assert_eq!(lossless.len(), 2);
        let lossy = field_pack(&value, 248, Some(1), true).unwrap();
        assert_eq!(lossy.len(), 1);
        // the surviving packet is the low 248 bits
        assert_eq!(lossy[0], lossless[1]);
        assert_eq!(
            lossy[0],
            hex_to_dec(&format!("0x{}", "11".repeat(31))).unwrap()
        );
    }
}
