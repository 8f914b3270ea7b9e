//! Raw primitives for CryptoNight
//!
//! A single AES encryption round (the x86 `AESENC` instruction), the AES-256
//! key schedule and the ten-round "pseudo round" used to fill and fold the
//! scratchpad.

use crate::params::{AES_BLOCK_SIZE, AES_KEY_SIZE, AES_ROUNDS};

/// One AES block
pub type Block = [u8; AES_BLOCK_SIZE];

/// Round keys for a pseudo round
pub type RoundKeys = [Block; AES_ROUNDS];

/// Single AESENC round: SubBytes, ShiftRows, MixColumns, then XOR `key`
#[inline(always)]
pub fn aes_round(state: &Block, key: &Block) -> Block {
    #[cfg(all(target_arch = "x86_64", target_feature = "aes"))]
    {
        aes_round_x86(state, key)
    }

    #[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
    {
        aes_round_arm(state, key)
    }

    #[cfg(not(any(
        all(target_arch = "x86_64", target_feature = "aes"),
        all(target_arch = "aarch64", target_feature = "aes")
    )))]
    {
        aes_round_soft(state, key)
    }
}

/// x86_64 AES-NI round
#[cfg(all(target_arch = "x86_64", target_feature = "aes"))]
#[inline(always)]
fn aes_round_x86(state: &Block, key: &Block) -> Block {
    use core::arch::x86_64::{__m128i, _mm_aesenc_si128, _mm_loadu_si128, _mm_storeu_si128};

    unsafe {
        let s = _mm_loadu_si128(state.as_ptr() as *const __m128i);
        let k = _mm_loadu_si128(key.as_ptr() as *const __m128i);
        let mut result = [0u8; AES_BLOCK_SIZE];
        _mm_storeu_si128(result.as_mut_ptr() as *mut __m128i, _mm_aesenc_si128(s, k));
        result
    }
}

/// ARM crypto-extension round
#[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
#[inline(always)]
fn aes_round_arm(state: &Block, key: &Block) -> Block {
    use core::arch::aarch64::{vaeseq_u8, vaesmcq_u8, vdupq_n_u8, veorq_u8, vld1q_u8, vst1q_u8};

    unsafe {
        let s = vld1q_u8(state.as_ptr());
        let k = vld1q_u8(key.as_ptr());
        let zero = vdupq_n_u8(0);

        // AESE adds the key before SubBytes; AESENC adds it after MixColumns
        let out = veorq_u8(vaesmcq_u8(vaeseq_u8(s, zero)), k);

        let mut result = [0u8; AES_BLOCK_SIZE];
        vst1q_u8(result.as_mut_ptr(), out);
        result
    }
}

/// Portable round through the `aes` crate
#[cfg(not(any(
    all(target_arch = "x86_64", target_feature = "aes"),
    all(target_arch = "aarch64", target_feature = "aes")
)))]
#[inline(always)]
fn aes_round_soft(state: &Block, key: &Block) -> Block {
    use aes::Block as AesBlock;

    let mut block = AesBlock::clone_from_slice(state);
    aes::hazmat::cipher_round(&mut block, &AesBlock::clone_from_slice(key));

    let mut result = [0u8; AES_BLOCK_SIZE];
    result.copy_from_slice(&block);
    result
}

/// Ten AESENC rounds without the initial key whitening of real AES
#[inline(always)]
pub fn aes_pseudo_round(block: &mut Block, keys: &RoundKeys) {
    for key in keys {
        *block = aes_round(block, key);
    }
}

/// The first ten round keys of the AES-256 schedule for `key`.
pub fn expand_key(key: &[u8; AES_KEY_SIZE]) -> RoundKeys {
    const NK: usize = AES_KEY_SIZE / 4;
    const RCON: [u8; 4] = [0x01, 0x02, 0x04, 0x08];

    let mut words = [[0u8; 4]; AES_ROUNDS * 4];
    for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
        word.copy_from_slice(chunk);
    }

    for i in NK..words.len() {
        let mut temp = words[i - 1];
        if i % NK == 0 {
            temp.rotate_left(1);
            temp = temp.map(|b| SBOX[b as usize]);
            temp[0] ^= RCON[i / NK - 1];
        } else if i % NK == 4 {
            temp = temp.map(|b| SBOX[b as usize]);
        }
        for (j, byte) in temp.iter().enumerate() {
            words[i][j] = words[i - NK][j] ^ byte;
        }
    }

    let mut keys = [[0u8; AES_BLOCK_SIZE]; AES_ROUNDS];
    for (round, key) in keys.iter_mut().enumerate() {
        for (j, word) in words[round * 4..round * 4 + 4].iter().enumerate() {
            key[j * 4..j * 4 + 4].copy_from_slice(word);
        }
    }
    keys
}

/// AES S-box (key schedule)
const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_round_zero() {
        // SubBytes(0) = 0x63 everywhere, which ShiftRows and MixColumns keep
        assert_eq!(aes_round(&[0u8; 16], &[0u8; 16]), [0x63u8; 16]);
    }

    #[test]
    fn test_aes_round_adds_key_last() {
        let state = [7u8; 16];
        let key = [0x5au8; 16];
        let plain = aes_round(&state, &[0u8; 16]);
        let keyed = aes_round(&state, &key);
        for i in 0..16 {
            assert_eq!(keyed[i], plain[i] ^ key[i]);
        }
    }

    #[test]
    fn test_expand_key_fips197() {
        // FIPS-197 appendix A.3 key 000102..1f
        let key: [u8; 32] = core::array::from_fn(|i| i as u8);
        let keys = expand_key(&key);
        assert_eq!(&keys[0][..], &key[..16]);
        assert_eq!(&keys[1][..], &key[16..]);
        assert_eq!(hex::encode(keys[2]), "a573c29fa176c498a97fce93a572c09c");
    }

    #[test]
    fn test_pseudo_round_deterministic() {
        let keys = expand_key(&[3u8; 32]);
        let mut a = [1u8; 16];
        let mut b = [1u8; 16];
        aes_pseudo_round(&mut a, &keys);
        aes_pseudo_round(&mut b, &keys);
        assert_eq!(a, b);
        assert_ne!(a, [1u8; 16]);
    }
}
