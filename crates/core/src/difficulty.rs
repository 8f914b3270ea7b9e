//! Share and block difficulty
//!
//! A digest is read as a little-endian 256-bit integer `H`. Its difficulty is
//! `floor((2^256 - 1) / H)`, and it meets difficulty `d` when `H * d` does
//! not overflow 256 bits. Pool jobs advertise a compact 32-bit target.

use crate::params::HASH_SIZE;

/// Little-endian 256-bit integer as four u64 limbs
type U256 = [u64; 4];

fn limbs(hash: &[u8; HASH_SIZE]) -> U256 {
    let mut out = [0u64; 4];
    for (limb, chunk) in out.iter_mut().zip(hash.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(word);
    }
    out
}

/// Difficulty of a digest, saturating at `u64::MAX`; `None` for the zero digest.
pub fn hash_difficulty(hash: &[u8; HASH_SIZE]) -> Option<u64> {
    let divisor = limbs(hash);
    if divisor == [0; 4] {
        return None;
    }

    // Restoring long division of 2^256 - 1 by the digest, one bit at a time
    let mut quotient: U256 = [0; 4];
    let mut remainder: U256 = [0; 4];
    for bit in (0..256).rev() {
        let carry = remainder[3] >> 63;
        shl1(&mut remainder);
        remainder[0] |= 1;

        if carry == 1 || !less_than(&remainder, &divisor) {
            sub_assign(&mut remainder, &divisor);
            quotient[bit / 64] |= 1 << (bit % 64);
        }
    }

    if quotient[1..] != [0; 3] {
        Some(u64::MAX)
    } else {
        Some(quotient[0])
    }
}

/// True when `hash * difficulty < 2^256`.
pub fn meets_difficulty(hash: &[u8; HASH_SIZE], difficulty: u64) -> bool {
    let mut carry: u128 = 0;
    for limb in limbs(hash) {
        let wide = u128::from(limb) * u128::from(difficulty) + carry;
        carry = wide >> 64;
    }
    carry == 0
}

/// Compact pool target `u32::MAX / difficulty`; difficulty 0 counts as 1.
pub fn compact_target(difficulty: u64) -> u32 {
    (u64::from(u32::MAX) / difficulty.max(1)) as u32
}

/// Compact target as the little-endian hex string sent to miners
pub fn target_hex(difficulty: u64) -> String {
    hex::encode(compact_target(difficulty).to_le_bytes())
}

fn shl1(x: &mut U256) {
    for i in (1..4).rev() {
        x[i] = (x[i] << 1) | (x[i - 1] >> 63);
    }
    x[0] <<= 1;
}

fn less_than(x: &U256, y: &U256) -> bool {
    for i in (0..4).rev() {
        if x[i] != y[i] {
            return x[i] < y[i];
        }
    }
    false
}

fn sub_assign(x: &mut U256, y: &U256) {
    let mut borrow = false;
    for i in 0..4 {
        let (d1, b1) = x[i].overflowing_sub(y[i]);
        let (d2, b2) = d1.overflowing_sub(u64::from(borrow));
        x[i] = d2;
        borrow = b1 || b2;
    }
}
