//! CryptoNight and CryptoNote parameters
//!
//! Values follow CryptoNote Standard 008 (CryptoNight) and the Monero
//! serialization rules for blocks and addresses.

/// Scratchpad size in bytes (2 MB)
pub const SCRATCHPAD_SIZE: usize = 1 << 21;

/// Number of mixing half-steps; the main loop runs `ITERATIONS / 2` times
pub const ITERATIONS: usize = 1 << 20;

/// AES block size
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-256 key size used for the scratchpad key schedule
pub const AES_KEY_SIZE: usize = 32;

/// Number of AES round keys used by a pseudo round
pub const AES_ROUNDS: usize = 10;

/// Blocks encrypted in lock-step while filling and folding the scratchpad
pub const INIT_SIZE_BLK: usize = 8;

/// Bytes written to the scratchpad per fill step (8 AES blocks)
pub const INIT_SIZE_BYTE: usize = INIT_SIZE_BLK * AES_BLOCK_SIZE;

/// Keccak-f[1600] state size in bytes
pub const STATE_SIZE: usize = 200;

/// Keccak sponge rate in bytes (same for the 200-byte state and the 256-bit hash)
pub const KECCAK_RATE: usize = 136;

/// Digest size of every hash in the family
pub const HASH_SIZE: usize = 32;

/// Address checksum length (leading bytes of the fast hash)
pub const ADDRESS_CHECKSUM_SIZE: usize = 4;

/// Public spend key + public view key
pub const ADDRESS_KEYS_SIZE: usize = 64;

/// Payment id carried by integrated addresses
pub const PAYMENT_ID_SIZE: usize = 8;

/// Longest varint encoding of a u64
pub const MAX_VARINT_SIZE: usize = 10;

/// Fixed-width block nonce
pub const NONCE_SIZE: usize = 4;

/// Worst-case hashing blob: two version varints capped at one byte each,
/// timestamp and tx-count varints, previous hash, nonce and tree root
pub const MAX_HASHING_BLOB_SIZE: usize =
    2 + MAX_VARINT_SIZE + HASH_SIZE + NONCE_SIZE + HASH_SIZE + MAX_VARINT_SIZE;
