//! Keccak sponge
//!
//! CryptoNote uses the original Keccak padding (`0x01`, not SHA-3's `0x06`).
//! The fast hash is plain Keccak-256; the slow hash needs the whole 200-byte
//! state after absorbing, which the `Hasher` API does not expose, so the
//! sponge is driven directly over `keccakf`.

use tiny_keccak::{Hasher, Keccak, keccakf};

use crate::params::{HASH_SIZE, KECCAK_RATE, STATE_SIZE};

const WORDS: usize = STATE_SIZE / 8;

/// Keccak-f[1600] state as 25 little-endian lanes
#[derive(Clone)]
pub struct KeccakState {
    lanes: [u64; WORDS],
}

impl KeccakState {
    /// Absorb `input` with Keccak padding at rate 136 and permute.
    pub fn absorb(input: &[u8]) -> Self {
        let mut lanes = [0u64; WORDS];

        let mut blocks = input.chunks_exact(KECCAK_RATE);
        for block in &mut blocks {
            xor_block(&mut lanes, block);
            keccakf(&mut lanes);
        }

        let rest = blocks.remainder();
        let mut last = [0u8; KECCAK_RATE];
        last[..rest.len()].copy_from_slice(rest);
        last[rest.len()] |= 0x01;
        last[KECCAK_RATE - 1] |= 0x80;
        xor_block(&mut lanes, &last);
        keccakf(&mut lanes);

        Self { lanes }
    }

    /// Rebuild a state from its byte form.
    pub fn from_bytes(bytes: &[u8; STATE_SIZE]) -> Self {
        let mut lanes = [0u64; WORDS];
        for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(8)) {
            *lane = u64::from_le_bytes(chunk.try_into().unwrap_or_default());
        }
        Self { lanes }
    }

    /// Apply the permutation once.
    pub fn permute(&mut self) {
        keccakf(&mut self.lanes);
    }

    pub fn to_bytes(&self) -> [u8; STATE_SIZE] {
        let mut out = [0u8; STATE_SIZE];
        for (chunk, lane) in out.chunks_exact_mut(8).zip(self.lanes.iter()) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        out
    }
}

#[inline(always)]
fn xor_block(lanes: &mut [u64; WORDS], block: &[u8]) {
    for (lane, chunk) in lanes.iter_mut().zip(block.chunks_exact(8)) {
        *lane ^= u64::from_le_bytes(chunk.try_into().unwrap_or_default());
    }
}

/// CryptoNote fast hash (Keccak-256).
pub fn fast_hash(input: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Keccak::v256();
    hasher.update(input);
    let mut out = [0u8; HASH_SIZE];
    hasher.finalize(&mut out);
    out
}
