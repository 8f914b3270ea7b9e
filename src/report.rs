//! Serializable results for each operation
//!
//! The command-line front end prints these either as text or as JSON; other
//! callers (a pool's job server, for instance) can embed them directly.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::algorithm::{
    Address, AddressKind, Block, CryptoNight, HASH_SIZE, Variant, block_id, compact_target,
    fast_hash, hash_difficulty, meets_difficulty, target_hex, validate_address,
    validate_pool_address,
};

/// Errors from decoding command input
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("block conversion failed: {0}")]
    Block(#[from] crate::algorithm::Error),

    #[error("expected a {expected}-byte hash, got {actual} bytes")]
    HashLength { expected: usize, actual: usize },
}

/// Decode a hex argument, tolerating surrounding whitespace and a `0x` prefix
pub fn decode_hex(input: &str) -> Result<Vec<u8>, ReportError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(digits)?)
}

fn decode_hash(input: &str) -> Result<[u8; HASH_SIZE], ReportError> {
    let bytes = decode_hex(input)?;
    let mut hash = [0u8; HASH_SIZE];
    if bytes.len() != HASH_SIZE {
        return Err(ReportError::HashLength {
            expected: HASH_SIZE,
            actual: bytes.len(),
        });
    }
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// A converted block
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlobReport {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub prev_id: String,
    pub nonce: String,
    pub height: u64,
    pub tx_count: u64,
    pub tree_root: String,
    pub pow_variant: u8,
    pub hashing_blob: String,
    pub block_id: String,
}

impl BlobReport {
    pub fn from_raw(raw: &[u8]) -> Result<Self, ReportError> {
        let block = Block::parse(raw)?;
        let blob = block.hashing_blob();
        tracing::debug!(
            height = block.miner_tx.height,
            txs = block.tx_count(),
            "converted block"
        );

        Ok(Self {
            major_version: block.header.major_version,
            minor_version: block.header.minor_version,
            timestamp: block.header.timestamp,
            prev_id: hex::encode(block.header.prev_id),
            nonce: hex::encode(block.header.nonce),
            height: block.miner_tx.height,
            tx_count: block.tx_count(),
            tree_root: hex::encode(block.tree_root()),
            pow_variant: block.pow_variant().as_u8(),
            hashing_blob: hex::encode(&blob),
            block_id: hex::encode(block_id(&blob)),
        })
    }

    pub fn from_hex(raw_hex: &str) -> Result<Self, ReportError> {
        Self::from_raw(&decode_hex(raw_hex)?)
    }
}

impl fmt::Display for BlobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hashing blob: {}", self.hashing_blob)?;
        writeln!(f, "Block id: {}", self.block_id)?;
        writeln!(
            f,
            "Version: {}.{} (variant {})",
            self.major_version, self.minor_version, self.pow_variant
        )?;
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Previous: {}", self.prev_id)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Transactions: {} (root {})", self.tx_count, self.tree_root)
    }
}

/// Address validation outcome
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddressReport {
    pub address: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Result of the pool check, when a pool address was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_match: Option<bool>,
}

impl AddressReport {
    pub fn new(address: &str, pool_address: Option<&str>) -> Self {
        let (prefix, kind, payment_id, error) = match Address::decode(address) {
            Ok(decoded) => (
                Some(decoded.prefix),
                Some(match decoded.kind() {
                    AddressKind::Standard => "standard",
                    AddressKind::Integrated => "integrated",
                }),
                decoded.payment_id.map(hex::encode),
                None,
            ),
            Err(err) => (None, None, None, Some(err.to_string())),
        };

        Self {
            address: address.to_string(),
            valid: validate_address(address),
            prefix,
            kind,
            payment_id,
            error,
            pool_match: pool_address.map(|pool| validate_pool_address(address, pool)),
        }
    }
}

impl fmt::Display for AddressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.valid { "valid" } else { "invalid" })?;
        if let (Some(prefix), Some(kind)) = (self.prefix, self.kind) {
            write!(f, " ({} address, prefix {})", kind, prefix)?;
        }
        if let Some(id) = &self.payment_id {
            write!(f, "\nPayment id: {}", id)?;
        }
        if let Some(error) = &self.error {
            write!(f, "\nReason: {}", error)?;
        }
        if let Some(pool_match) = self.pool_match {
            write!(
                f,
                "\nPool address check: {}",
                if pool_match { "ok" } else { "rejected" }
            )?;
        }
        Ok(())
    }
}

/// A computed digest
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HashReport {
    pub function: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<u8>,
    pub input_len: usize,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u64>,
}

impl HashReport {
    pub fn slow(hasher: &mut CryptoNight, input: &[u8], variant: Variant) -> Self {
        let hash = hasher.hash(input, variant);
        Self {
            function: "cryptonight",
            variant: Some(variant.as_u8()),
            input_len: input.len(),
            hash: hex::encode(hash),
            difficulty: hash_difficulty(&hash),
        }
    }

    pub fn fast(input: &[u8]) -> Self {
        Self {
            function: "keccak256",
            variant: None,
            input_len: input.len(),
            hash: hex::encode(fast_hash(input)),
            difficulty: None,
        }
    }

    pub fn block_id(hashing_blob: &[u8]) -> Self {
        Self {
            function: "block_id",
            variant: None,
            input_len: hashing_blob.len(),
            hash: hex::encode(block_id(hashing_blob)),
            difficulty: None,
        }
    }
}

impl fmt::Display for HashReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash)?;
        if let Some(difficulty) = self.difficulty {
            write!(f, "\nDifficulty: {}", difficulty)?;
        }
        Ok(())
    }
}

/// Difficulty of an existing digest
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DifficultyReport {
    pub hash: String,
    pub difficulty: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_target: Option<bool>,
}

impl DifficultyReport {
    pub fn from_hex(hash_hex: &str, target: Option<u64>) -> Result<Self, ReportError> {
        let hash = decode_hash(hash_hex)?;
        Ok(Self {
            hash: hex::encode(hash),
            difficulty: hash_difficulty(&hash),
            target,
            meets_target: target.map(|t| meets_difficulty(&hash, t)),
        })
    }
}

impl fmt::Display for DifficultyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty {
            Some(difficulty) => write!(f, "Difficulty: {}", difficulty)?,
            None => write!(f, "Difficulty: unbounded (zero hash)")?,
        }
        if let (Some(target), Some(meets)) = (self.target, self.meets_target) {
            write!(
                f,
                "\nTarget {}: {}",
                target,
                if meets { "met" } else { "not met" }
            )?;
        }
        Ok(())
    }
}

/// Compact pool target for a share difficulty
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetReport {
    pub difficulty: u64,
    pub compact_target: u32,
    pub target_hex: String,
}

impl TargetReport {
    pub fn new(difficulty: u64) -> Self {
        Self {
            difficulty,
            compact_target: compact_target(difficulty),
            target_hex: target_hex(difficulty),
        }
    }
}

impl fmt::Display for TargetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (compact {:#010x})",
            self.target_hex, self.compact_target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_BLOCK: &str = "0100a5d1fca9057dff46d140d453a672437ba0ec7d6a74bc5fa0391f8a918e41fd7ba2cf6fc1af000000000183811401ffc7801405889ec5dc2402e0fe0db63a8e532a7b988e0c32a764e5e8d64d7efac9bc9d24ce32b0984ab93980b09dc2df0102ccd38432501a9182ccc5b44cb47abdddbc9a6321cd581f5f07a7a9195795d5c68080dd9da41702f6e944ee4c6e1eeaed1fa6a3c2480a410e959c6e823b96dad54d31fe223cc0fd80c0a8ca9a3a0286d0e3411670e4c2abe8492c695c66d8262660ee88a0b14a2b03c9180fb6f0d480c0caf384a30202aec5c9b7efe841dd821476e0e06217be13a4c85a83efcf9576314d60130e02e72b0150526f7a381cec33e5827c1848dd80e6eac4b262304ea06b3a43303a4631df28020800000000018ba82000";

    const ADDRESS: &str = "45pyCXYn2UBVUmCFjgKr7LF8hCTeGwucWJ2xni7qrbj6GgAZBFY6tANarozZx9DaQqHyuR1AL8HJbRmqwLhUaDpKJW4hqS1";

    #[test]
    fn test_blob_report() {
        let report = BlobReport::from_hex(RAW_BLOCK).unwrap();
        assert_eq!(
            report.hashing_blob,
            "0100a5d1fca9057dff46d140d453a672437ba0ec7d6a74bc5fa0391f8a918e41fd7ba2cf6fc1af00000000e81cb2bf0d2c5054a49bda094c39cb263a9565b9b81cf4c4f848292040419f4a01"
        );
        assert_eq!(report.height, 327751);
        assert_eq!(report.pow_variant, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tx_count"], 1);
    }

    #[test]
    fn test_blob_report_errors() {
        assert!(matches!(
            BlobReport::from_hex("zz"),
            Err(ReportError::Hex(_))
        ));
        assert!(matches!(
            BlobReport::from_hex("0100"),
            Err(ReportError::Block(_))
        ));
    }

    #[test]
    fn test_address_report() {
        let report = AddressReport::new(ADDRESS, Some(ADDRESS));
        assert!(report.valid);
        assert_eq!(report.prefix, Some(18));
        assert_eq!(report.kind, Some("standard"));
        assert_eq!(report.pool_match, Some(true));

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("error"));

        let bad = AddressReport::new("OMG", None);
        assert!(!bad.valid);
        assert!(bad.error.is_some());
        assert_eq!(bad.to_string().lines().next(), Some("invalid"));
    }

    #[test]
    fn test_difficulty_and_target_reports() {
        let report = DifficultyReport::from_hex(
            "8e3c1865f22801dc3df0a688da80701e2390e7838e65c142604cc00eafe34000",
            Some(1000),
        )
        .unwrap();
        assert_eq!(report.difficulty, Some(1009));
        assert_eq!(report.meets_target, Some(true));

        assert!(matches!(
            DifficultyReport::from_hex("00ff", None),
            Err(ReportError::HashLength { actual: 2, .. })
        ));

        let target = TargetReport::new(500);
        assert_eq!(target.target_hex, "6e128300");
        assert_eq!(target.to_string(), "6e128300 (compact 0x0083126e)");
    }

    #[test]
    fn test_fast_hash_report() {
        let report = HashReport::fast(b"");
        assert_eq!(
            report.hash,
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("variant").is_none());
    }

    #[test]
    fn test_decode_hex_prefix() {
        assert_eq!(decode_hex(" 0x0a0b \n").unwrap(), vec![0x0a, 0x0b]);
    }
}
