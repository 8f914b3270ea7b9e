//! CryptoNote varint codec
//!
//! Base-128 little-endian integers: seven data bits per byte, the high bit
//! set on every byte except the last.

use crate::error::{Error, Result};
use crate::params::MAX_VARINT_SIZE;

/// Decode a varint starting at `offset`.
///
/// Returns the value and the number of bytes consumed. Encodings with a
/// redundant trailing zero group are rejected so that every value has
/// exactly one accepted byte form.
pub fn decode(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in buf.get(offset..).unwrap_or_default().iter().enumerate() {
        if i == MAX_VARINT_SIZE {
            return Err(Error::Overflow);
        }

        let group = u64::from(byte & 0x7f);
        // The tenth byte may only carry the single remaining bit
        if shift == 63 && group > 1 {
            return Err(Error::Overflow);
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(Error::NonCanonical);
            }
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    if buf.len().saturating_sub(offset) >= MAX_VARINT_SIZE {
        Err(Error::Overflow)
    } else {
        Err(Error::TruncatedInput)
    }
}

/// Encode `value` in its minimal form.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_SIZE);
    write(&mut out, value);
    out
}

/// Append the minimal encoding of `value` to `out`.
pub fn write(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(0x7f), vec![0x7f]);
        assert_eq!(encode(0x80), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_SIZE);
    }

    #[test]
    fn test_decode_at_offset() {
        let buf = [0xff, 0xac, 0x02, 0x07];
        assert_eq!(decode(&buf, 1), Ok((300, 2)));
        assert_eq!(decode(&buf, 3), Ok((7, 1)));
    }

    #[test]
    fn test_truncated() {
        assert_eq!(decode(&[], 0), Err(Error::TruncatedInput));
        assert_eq!(decode(&[0x80, 0x80], 0), Err(Error::TruncatedInput));
        assert_eq!(decode(&[0x01], 5), Err(Error::TruncatedInput));
    }

    #[test]
    fn test_overflow() {
        let mut too_long = vec![0xff; MAX_VARINT_SIZE];
        too_long.push(0x01);
        assert_eq!(decode(&too_long, 0), Err(Error::Overflow));

        // Ten bytes whose last group exceeds the 64th bit
        let mut wide = vec![0xff; 9];
        wide.push(0x02);
        assert_eq!(decode(&wide, 0), Err(Error::Overflow));
    }

    #[test]
    fn test_non_canonical() {
        assert_eq!(decode(&[0x81, 0x00], 0), Err(Error::NonCanonical));
        assert_eq!(decode(&[0x00], 0), Ok((0, 1)));
    }

    proptest! {
        #[test]
        fn prop_round_trip(v in any::<u64>()) {
            let bytes = encode(v);
            prop_assert_eq!(decode(&bytes, 0), Ok((v, bytes.len())));
        }

        #[test]
        fn prop_decode_ignores_suffix(v in any::<u64>(), tail in proptest::collection::vec(any::<u8>(), 0..8)) {
            let mut bytes = encode(v);
            let len = bytes.len();
            bytes.extend_from_slice(&tail);
            prop_assert_eq!(decode(&bytes, 0), Ok((v, len)));
        }
    }
}
