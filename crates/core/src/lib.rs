//! # CryptoNote Mining Primitives
//!
//! The three computations a CryptoNote mining pool needs from the chain's
//! serialization and proof-of-work rules:
//!
//! - **Hashing blobs**: reduce a serialized block to the header, transaction
//!   tree root and transaction count that proof of work is computed over.
//! - **Addresses**: decode the block-wise base58 address format and verify
//!   its Keccak checksum.
//! - **Hashing**: the CryptoNight memory-hard slow hash (variants 0, 1 and
//!   2) and the Keccak-256 fast hash.
//!
//! ## Algorithm Parameters
//!
//! - 2MB scratchpad, filled and folded with 10-round AES
//! - 524,288 double mixing steps
//! - Final hash chosen from BLAKE-256, Groestl-256, JH-256 and Skein-512-256
//!
//! ## Example
//!
//! ```rust
//! use cnutil_core::{CryptoNight, Variant, extract_hashing_blob, fast_hash, validate_address};
//!
//! // Boundary functions signal failure with sentinels
//! assert!(extract_hashing_blob(&[0x01, 0x00]).is_empty());
//! assert!(!validate_address("not an address"));
//!
//! let id = fast_hash(b"");
//! assert_eq!(id.len(), 32);
//!
//! // Reusable hasher (avoids re-allocating the scratchpad)
//! let mut hasher = CryptoNight::new();
//! let _ = hasher.hash(b"first", Variant::V0);
//! ```
//!
//! ## Parallel Batches
//!
//! With the default `parallel` feature, [`slow_hash_batch`] spreads inputs
//! over rayon workers, each with its own scratchpad.

mod address;
pub mod base58;
mod block;
mod cryptonight;
mod difficulty;
mod error;
mod finalize;
mod keccak;
mod params;
mod primitives;
pub mod varint;

pub use address::{Address, AddressKind, validate_address, validate_pool_address};
pub use block::{Block, BlockHeader, MinerTx, block_id, tree_hash};
pub use cryptonight::{CryptoNight, Variant, slow_hash, slow_hash_batch};
pub use difficulty::{compact_target, hash_difficulty, meets_difficulty, target_hex};
pub use error::{Error, Result};
pub use finalize::FinalHash;
pub use keccak::fast_hash;
pub use params::*;

/// Hashing blob of a serialized block, or an empty vector if the block does
/// not parse.
pub fn extract_hashing_blob(raw: &[u8]) -> Vec<u8> {
    match Block::parse(raw) {
        Ok(block) => block.hashing_blob(),
        Err(err) => {
            tracing::debug!(%err, len = raw.len(), "block conversion failed");
            Vec::new()
        }
    }
}
