//! Final hash selection
//!
//! After the last Keccak permutation the two low bits of the first state
//! byte pick one of four 256-bit hashes, each applied to the full state.

use blake_hash::Blake256;
use groestl::{Digest, Groestl256};
use jh::Jh256;
use skein::{Skein512, digest::consts::U32};

use crate::params::{HASH_SIZE, STATE_SIZE};

/// One of the four finalization hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalHash {
    Blake256,
    Groestl256,
    Jh256,
    Skein512_256,
}

impl FinalHash {
    /// Selection rule: `state[0] & 3`
    pub fn select(state: &[u8; STATE_SIZE]) -> Self {
        match state[0] & 3 {
            0 => FinalHash::Blake256,
            1 => FinalHash::Groestl256,
            2 => FinalHash::Jh256,
            _ => FinalHash::Skein512_256,
        }
    }

    pub fn digest(self, data: &[u8]) -> [u8; HASH_SIZE] {
        let mut out = [0u8; HASH_SIZE];
        match self {
            // blake-hash implements the older digest 0.9 trait
            FinalHash::Blake256 => {
                out.copy_from_slice(&<Blake256 as blake_hash::Digest>::digest(data))
            }
            FinalHash::Groestl256 => out.copy_from_slice(&Groestl256::digest(data)),
            FinalHash::Jh256 => out.copy_from_slice(&Jh256::digest(data)),
            FinalHash::Skein512_256 => out.copy_from_slice(&Skein512::<U32>::digest(data)),
        }
        out
    }
}

/// Hash the permuted state with the hash it selects.
pub fn extra_hash(state: &[u8; STATE_SIZE]) -> [u8; HASH_SIZE] {
    FinalHash::select(state).digest(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_uses_low_bits() {
        let mut state = [0u8; STATE_SIZE];
        for (byte, expected) in [
            (0x00, FinalHash::Blake256),
            (0x05, FinalHash::Groestl256),
            (0xfe, FinalHash::Jh256),
            (0x03, FinalHash::Skein512_256),
        ] {
            state[0] = byte;
            assert_eq!(FinalHash::select(&state), expected);
        }
    }

    #[test]
    fn test_blake256_vectors() {
        assert_eq!(
            hex::encode(FinalHash::Blake256.digest(b"")),
            "716f6e863f744b9ac22c97ec7b76ea5f5908bc5b2f67c61510bfc4751384ea7a"
        );
        assert_eq!(
            hex::encode(FinalHash::Blake256.digest(&[0u8])),
            "0ce8d4ef4dd7cd8d62dfded9d4edb0a774ae6a41929a74da23109e8f11139c87"
        );
        // Two blocks, the second holding only padding
        assert_eq!(
            hex::encode(FinalHash::Blake256.digest(&[0u8; 72])),
            "d419bad32d504fb7d44d460c42c5593fe544fa4c135dec31e21bd9abdcc22d41"
        );
    }

    #[test]
    fn test_candidates_differ() {
        let data = [0x42u8; STATE_SIZE];
        let outputs = [
            FinalHash::Blake256.digest(&data),
            FinalHash::Groestl256.digest(&data),
            FinalHash::Jh256.digest(&data),
            FinalHash::Skein512_256.digest(&data),
        ];
        for i in 0..outputs.len() {
            for j in i + 1..outputs.len() {
                assert_ne!(outputs[i], outputs[j]);
            }
        }
    }
}
