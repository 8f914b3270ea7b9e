//! CryptoNight slow hash
//!
//! The construction has four phases over a 2 MB scratchpad:
//!
//! 1. Keccak-absorb the input into a 200-byte state.
//! 2. Fill the scratchpad by repeatedly AES-encrypting state bytes 64..192
//!    with round keys expanded from state bytes 0..32.
//! 3. Run `ITERATIONS / 2` double steps of data-dependent reads, AES rounds,
//!    64x64 multiplications and writes. Every address depends on the
//!    previous step, so this phase is bound by memory latency.
//! 4. Fold the scratchpad back into the state with keys from bytes 32..64,
//!    permute once more and hash the state with one of four functions.
//!
//! Variants 1 and 2 (Monero v7 and v8) layer extra arithmetic onto phase 3.

use core::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::finalize::extra_hash;
use crate::keccak::KeccakState;
use crate::params::*;
use crate::primitives::{Block, aes_pseudo_round, aes_round, expand_key};

/// Mask turning a 64-bit value into a 16-byte aligned scratchpad offset
const ADDRESS_MASK: usize = SCRATCHPAD_SIZE - AES_BLOCK_SIZE;

/// Nibble table for the variant 1 byte tweak
const VARIANT1_TABLE: u32 = 0x75310;

/// Offset of the 8 input bytes mixed into the variant 1 tweak
const VARIANT1_NONCE_OFFSET: usize = 35;

/// Slow hash algorithm revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Variant {
    /// Original CryptoNight
    #[default]
    V0,
    /// Monero v7 tweak
    V1,
    /// Monero v8: shuffle, integer division and square root
    V2,
}

impl Variant {
    /// Variant used by a block of the given major version (`v >= 7 ? v - 6 : 0`)
    pub fn from_major_version(major_version: u8) -> Self {
        if major_version >= 7 {
            Variant::from(major_version - 6)
        } else {
            Variant::V0
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<u8> for Variant {
    /// Unknown revisions clamp to the newest supported variant.
    fn from(value: u8) -> Self {
        match value {
            0 => Variant::V0,
            1 => Variant::V1,
            _ => Variant::V2,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// CryptoNight hasher
///
/// Owns one scratchpad, reused across calls. `hash` takes `&mut self`, so a
/// pad is never shared by two computations; give each thread its own hasher.
pub struct CryptoNight {
    scratchpad: Vec<u8>,
}

impl CryptoNight {
    /// Create a new hasher
    ///
    /// Allocates the 2MB scratchpad.
    pub fn new() -> Self {
        Self {
            scratchpad: vec![0u8; SCRATCHPAD_SIZE],
        }
    }

    /// Compute the slow hash of `input`.
    ///
    /// Every phase overwrites the scratchpad before reading it, so results do
    /// not depend on earlier calls.
    pub fn hash(&mut self, input: &[u8], variant: Variant) -> [u8; HASH_SIZE] {
        let mut state = KeccakState::absorb(input).to_bytes();

        // Phase 2: expand the state into the scratchpad
        self.fill_scratchpad(&state);

        // Phase 3: memory-hard mixing
        self.mix(&state, input, variant);

        // Phase 4: fold the scratchpad back and pick the final hash
        self.fold(&mut state);
        let mut keccak = KeccakState::from_bytes(&state);
        keccak.permute();
        extra_hash(&keccak.to_bytes())
    }

    fn fill_scratchpad(&mut self, state: &[u8; STATE_SIZE]) {
        let keys = expand_key(&key_at(state, 0));
        let mut text = text_blocks(state);

        for line in self.scratchpad.chunks_exact_mut(INIT_SIZE_BYTE) {
            for (block, out) in text.iter_mut().zip(line.chunks_exact_mut(AES_BLOCK_SIZE)) {
                aes_pseudo_round(block, &keys);
                out.copy_from_slice(block);
            }
        }
    }

    fn mix(&mut self, state: &[u8; STATE_SIZE], input: &[u8], variant: Variant) {
        let pad = &mut self.scratchpad[..];

        let mut a = xor(load(state, 0), load(state, 32));
        let mut b = xor(load(state, 16), load(state, 48));

        // Variant 2 keeps the previous `b` and two running integer results
        let mut b1 = xor(load(state, 64), load(state, 80));
        let mut division = le64(&state[96..]);
        let mut sqrt = le64(&state[104..]);

        let tweak = match variant {
            Variant::V1 => le64(&state[192..]) ^ variant1_nonce(input),
            _ => 0,
        };

        for _ in 0..ITERATIONS / 2 {
            // First half-step: one AES round keyed by `a`
            let j = address(a[0]);
            let c1 = from_block(&aes_round(&to_block(load(pad, j)), &to_block(a)));
            if variant >= Variant::V2 {
                shuffle_add(pad, j, a, b, b1);
            }
            store(pad, j, xor(c1, b));
            if variant == Variant::V1 {
                tweak_byte(&mut pad[j + 11]);
            }

            // Second half-step: 64x64 multiply and add into `a`
            let j = address(c1[0]);
            let mut c2 = load(pad, j);
            if variant >= Variant::V2 {
                c2[0] ^= division ^ (sqrt << 32);
                (division, sqrt) = integer_math(c1, sqrt);
            }

            let product = u128::from(c1[0]) * u128::from(c2[0]);
            let mut d = [(product >> 64) as u64, product as u64];
            if variant >= Variant::V2 {
                store(pad, j ^ 0x10, xor(load(pad, j ^ 0x10), d));
                d = xor(d, load(pad, j ^ 0x20));
                shuffle_add(pad, j, a, b, b1);
            }

            let sum = [a[0].wrapping_add(d[0]), a[1].wrapping_add(d[1])];
            let mut written = sum;
            if variant == Variant::V1 {
                written[1] ^= tweak;
            }
            store(pad, j, written);

            a = xor(c2, sum);
            b1 = b;
            b = c1;
        }
    }

    fn fold(&self, state: &mut [u8; STATE_SIZE]) {
        let keys = expand_key(&key_at(state, 32));
        let mut text = text_blocks(state);

        for line in self.scratchpad.chunks_exact(INIT_SIZE_BYTE) {
            for (block, chunk) in text.iter_mut().zip(line.chunks_exact(AES_BLOCK_SIZE)) {
                for (x, y) in block.iter_mut().zip(chunk) {
                    *x ^= y;
                }
                aes_pseudo_round(block, &keys);
            }
        }

        for (out, block) in state[64..64 + INIT_SIZE_BYTE]
            .chunks_exact_mut(AES_BLOCK_SIZE)
            .zip(text.iter())
        {
            out.copy_from_slice(block);
        }
    }
}

impl Default for CryptoNight {
    fn default() -> Self {
        Self::new()
    }
}

/// Two little-endian u64 halves of a 16-byte value
type Pair = [u64; 2];

#[inline(always)]
fn le64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

#[inline(always)]
fn load(buf: &[u8], offset: usize) -> Pair {
    [le64(&buf[offset..]), le64(&buf[offset + 8..])]
}

#[inline(always)]
fn store(buf: &mut [u8], offset: usize, value: Pair) {
    buf[offset..offset + 8].copy_from_slice(&value[0].to_le_bytes());
    buf[offset + 8..offset + 16].copy_from_slice(&value[1].to_le_bytes());
}

#[inline(always)]
fn xor(x: Pair, y: Pair) -> Pair {
    [x[0] ^ y[0], x[1] ^ y[1]]
}

#[inline(always)]
fn add(x: Pair, y: Pair) -> Pair {
    [x[0].wrapping_add(y[0]), x[1].wrapping_add(y[1])]
}

#[inline(always)]
fn to_block(value: Pair) -> Block {
    let mut block = [0u8; AES_BLOCK_SIZE];
    store(&mut block, 0, value);
    block
}

#[inline(always)]
fn from_block(block: &Block) -> Pair {
    load(block, 0)
}

#[inline(always)]
fn address(value: u64) -> usize {
    value as usize & ADDRESS_MASK
}

fn key_at(state: &[u8; STATE_SIZE], offset: usize) -> [u8; AES_KEY_SIZE] {
    let mut key = [0u8; AES_KEY_SIZE];
    key.copy_from_slice(&state[offset..offset + AES_KEY_SIZE]);
    key
}

/// State bytes 64..192 as eight AES blocks
fn text_blocks(state: &[u8; STATE_SIZE]) -> [Block; INIT_SIZE_BLK] {
    let mut text = [[0u8; AES_BLOCK_SIZE]; INIT_SIZE_BLK];
    for (block, chunk) in text
        .iter_mut()
        .zip(state[64..64 + INIT_SIZE_BYTE].chunks_exact(AES_BLOCK_SIZE))
    {
        block.copy_from_slice(chunk);
    }
    text
}

/// Input bytes 35..43 as a u64, missing bytes read as zero
fn variant1_nonce(input: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    if let Some(tail) = input.get(VARIANT1_NONCE_OFFSET..) {
        let n = tail.len().min(8);
        word[..n].copy_from_slice(&tail[..n]);
    }
    u64::from_le_bytes(word)
}

#[inline(always)]
fn tweak_byte(byte: &mut u8) {
    let tmp = *byte;
    let index = (((tmp >> 3) & 6) | (tmp & 1)) << 1;
    *byte = tmp ^ ((VARIANT1_TABLE >> index) & 0x30) as u8;
}

/// Rotate the three neighbours of `j` in its 64-byte line, adding `b1`, `b`
/// and `a` as they move
#[inline(always)]
fn shuffle_add(pad: &mut [u8], j: usize, a: Pair, b: Pair, b1: Pair) {
    let chunk1 = load(pad, j ^ 0x10);
    let chunk2 = load(pad, j ^ 0x20);
    let chunk3 = load(pad, j ^ 0x30);

    store(pad, j ^ 0x10, add(chunk3, b1));
    store(pad, j ^ 0x20, add(chunk1, b));
    store(pad, j ^ 0x30, add(chunk2, a));
}

/// Variant 2 division and square root, returning the new running results
#[inline(always)]
fn integer_math(c1: Pair, sqrt: u64) -> (u64, u64) {
    let dividend = c1[1];
    let divisor = u64::from((c1[0] as u32).wrapping_add((sqrt << 1) as u32) | 0x8000_0001);

    let quotient = (dividend / divisor) as u32;
    let division = u64::from(quotient) | ((dividend % divisor) << 32);

    let sqrt_input = c1[0].wrapping_add(division);
    (division, integer_sqrt(sqrt_input))
}

/// `floor(sqrt(2^64 + n) * 2 - 2^33)` computed through f64 with an exact
/// integer fix-up of the rounding error
#[inline(always)]
fn integer_sqrt(n: u64) -> u64 {
    let approx = ((n as f64 + 18446744073709551616.0).sqrt() * 2.0 - 8589934592.0) as u64;

    let s = approx >> 1;
    let b = approx & 1;
    let r2 = s.wrapping_mul(s.wrapping_add(b)).wrapping_add(approx << 32);

    let mut r = approx;
    if r2.wrapping_add(b) > n {
        r = r.wrapping_sub(1);
    }
    if r2.wrapping_add(1 << 32) < n.wrapping_sub(s) {
        r = r.wrapping_add(1);
    }
    r
}

/// One-shot slow hash with a raw variant byte (values above 2 clamp to 2).
///
/// Allocates a fresh scratchpad; reuse a [`CryptoNight`] for repeated calls.
pub fn slow_hash(input: &[u8], variant: u8) -> [u8; HASH_SIZE] {
    CryptoNight::new().hash(input, Variant::from(variant))
}

/// Hash many inputs, one scratchpad per rayon worker.
#[cfg(feature = "parallel")]
pub fn slow_hash_batch<T>(inputs: &[T], variant: Variant) -> Vec<[u8; HASH_SIZE]>
where
    T: AsRef<[u8]> + Sync,
{
    tracing::debug!(count = inputs.len(), %variant, "hashing batch in parallel");
    inputs
        .par_iter()
        .map_init(CryptoNight::new, |hasher, input| {
            hasher.hash(input.as_ref(), variant)
        })
        .collect()
}

/// Hash many inputs sequentially with one scratchpad.
#[cfg(not(feature = "parallel"))]
pub fn slow_hash_batch<T>(inputs: &[T], variant: Variant) -> Vec<[u8; HASH_SIZE]>
where
    T: AsRef<[u8]>,
{
    tracing::debug!(count = inputs.len(), %variant, "hashing batch");
    let mut hasher = CryptoNight::new();
    inputs
        .iter()
        .map(|input| hasher.hash(input.as_ref(), variant))
        .collect()
}
