//! CryptoNote block parsing and hashing blobs
//!
//! A serialized block is
//!
//! ```text
//! header || miner_tx || varint(n) || n x tx_hash(32)
//! header = varint(major) || varint(minor) || varint(timestamp) || prev_id(32) || nonce(4)
//! ```
//!
//! Proof of work is computed over the hashing blob
//!
//! ```text
//! header || tree_root(32) || varint(n + 1)
//! ```
//!
//! where the tree root commits to the miner transaction hash followed by the
//! `n` listed transaction hashes. Only the miner transaction is walked, and
//! only far enough to find where it ends.

use crate::cryptonight::Variant;
use crate::error::{Error, Result};
use crate::keccak::fast_hash;
use crate::params::{HASH_SIZE, MAX_HASHING_BLOB_SIZE, NONCE_SIZE};
use crate::varint;

/// Coinbase input tag
const TXIN_GEN: u8 = 0xff;

/// Output to a one-time public key
const TXOUT_TO_KEY: u8 = 0x02;

/// Output to a one-time public key with a one-byte view tag
const TXOUT_TO_TAGGED_KEY: u8 = 0x03;

/// RingCT type of a coinbase transaction
const RCT_TYPE_NULL: u8 = 0;

/// Sequential reader over a raw block
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn varint(&mut self, field: &'static str) -> Result<u64> {
        let (value, len) =
            varint::decode(self.buf, self.pos).map_err(|e| Error::parse(field, e))?;
        self.pos += len;
        Ok(value)
    }

    /// Varint that must fit in a byte (version numbers)
    fn small_varint(&mut self, field: &'static str) -> Result<u8> {
        let value = self.varint(field)?;
        u8::try_from(value).map_err(|_| Error::parse(field, Error::Overflow))
    }

    fn bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| Error::parse(field, Error::TruncatedInput))?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, field)?);
        Ok(out)
    }

    fn byte(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.bytes(1, field)?[0])
    }

    /// Consumed bytes since `start`
    fn since(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Block header fields covered by the proof of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub prev_id: [u8; HASH_SIZE],
    pub nonce: [u8; NONCE_SIZE],
}

impl BlockHeader {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            major_version: reader.small_varint("major_version")?,
            minor_version: reader.small_varint("minor_version")?,
            timestamp: reader.varint("timestamp")?,
            prev_id: reader.array("prev_id")?,
            nonce: reader.array("nonce")?,
        })
    }

    /// Serialize the header. Varints are minimal, which is the only form
    /// the parser accepts, so a parsed header reproduces its input bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAX_HASHING_BLOB_SIZE);
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut Vec<u8>) {
        varint::write(out, u64::from(self.major_version));
        varint::write(out, u64::from(self.minor_version));
        varint::write(out, self.timestamp);
        out.extend_from_slice(&self.prev_id);
        out.extend_from_slice(&self.nonce);
    }
}

/// The coinbase transaction, reduced to what the hashing blob needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerTx {
    pub version: u64,
    pub unlock_time: u64,
    /// Height claimed by the coinbase input
    pub height: u64,
    pub outputs: usize,
    pub hash: [u8; HASH_SIZE],
}

impl MinerTx {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let start = reader.pos;

        let version = reader.varint("miner_tx.version")?;
        let unlock_time = reader.varint("miner_tx.unlock_time")?;

        let mut height = 0;
        let inputs = reader.varint("miner_tx.vin")?;
        for _ in 0..inputs {
            match reader.byte("miner_tx.vin")? {
                TXIN_GEN => height = reader.varint("miner_tx.vin.height")?,
                tag => {
                    return Err(Error::parse(
                        "miner_tx.vin",
                        Error::UnknownTag { field: "input", tag },
                    ));
                }
            }
        }

        let outputs = reader.varint("miner_tx.vout")?;
        for _ in 0..outputs {
            reader.varint("miner_tx.vout.amount")?;
            match reader.byte("miner_tx.vout")? {
                TXOUT_TO_KEY => {
                    reader.bytes(HASH_SIZE, "miner_tx.vout.key")?;
                }
                TXOUT_TO_TAGGED_KEY => {
                    reader.bytes(HASH_SIZE + 1, "miner_tx.vout.key")?;
                }
                tag => {
                    return Err(Error::parse(
                        "miner_tx.vout",
                        Error::UnknownTag { field: "output", tag },
                    ));
                }
            }
        }

        let extra_len = reader.varint("miner_tx.extra")?;
        let extra_len = usize::try_from(extra_len)
            .map_err(|_| Error::parse("miner_tx.extra", Error::Overflow))?;
        reader.bytes(extra_len, "miner_tx.extra")?;

        let hash = if version >= 2 {
            let prefix = reader.since(start);
            let rct_type = reader.byte("miner_tx.rct_type")?;
            if rct_type != RCT_TYPE_NULL {
                return Err(Error::parse(
                    "miner_tx.rct_type",
                    Error::UnknownTag {
                        field: "rct_signatures",
                        tag: rct_type,
                    },
                ));
            }

            // Prefix hash, base RingCT hash, and an empty prunable part
            let mut parts = [0u8; 3 * HASH_SIZE];
            parts[..HASH_SIZE].copy_from_slice(&fast_hash(prefix));
            parts[HASH_SIZE..2 * HASH_SIZE].copy_from_slice(&fast_hash(&[rct_type]));
            fast_hash(&parts)
        } else {
            fast_hash(reader.since(start))
        };

        Ok(Self {
            version,
            unlock_time,
            height,
            outputs: outputs as usize,
            hash,
        })
    }
}

/// A parsed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub miner_tx: MinerTx,
    pub tx_hashes: Vec<[u8; HASH_SIZE]>,
}

impl Block {
    /// Parse a serialized block. The whole buffer must be consumed.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(raw);

        let header = BlockHeader::read(&mut reader)?;
        let miner_tx = MinerTx::read(&mut reader)?;

        let count = reader.varint("tx_hashes")?;
        if count > (reader.remaining() / HASH_SIZE) as u64 {
            return Err(Error::parse("tx_hashes", Error::TruncatedInput));
        }
        let mut tx_hashes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            tx_hashes.push(reader.array("tx_hashes")?);
        }

        if reader.remaining() > 0 {
            return Err(Error::TrailingBytes(reader.remaining()));
        }

        Ok(Self {
            header,
            miner_tx,
            tx_hashes,
        })
    }

    /// Transactions committed by the tree root, miner transaction included
    pub fn tx_count(&self) -> u64 {
        self.tx_hashes.len() as u64 + 1
    }

    /// Tree root over the miner transaction and the listed hashes
    pub fn tree_root(&self) -> [u8; HASH_SIZE] {
        let mut hashes = Vec::with_capacity(self.tx_hashes.len() + 1);
        hashes.push(self.miner_tx.hash);
        hashes.extend_from_slice(&self.tx_hashes);
        tree_hash(&hashes)
    }

    /// The proof-of-work preimage
    pub fn hashing_blob(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAX_HASHING_BLOB_SIZE);
        self.header.write(&mut out);
        out.extend_from_slice(&self.tree_root());
        varint::write(&mut out, self.tx_count());
        out
    }

    /// Slow-hash variant required by the header's major version
    pub fn pow_variant(&self) -> Variant {
        Variant::from_major_version(self.header.major_version)
    }
}

/// Block identifier: fast hash of the length-prefixed hashing blob
pub fn block_id(hashing_blob: &[u8]) -> [u8; HASH_SIZE] {
    let mut data = varint::encode(hashing_blob.len() as u64);
    data.extend_from_slice(hashing_blob);
    fast_hash(&data)
}

/// CryptoNote transaction tree hash.
///
/// Not a plain binary Merkle tree: the list is first reduced to the largest
/// power of two below its length by hashing the trailing pairs. An empty
/// list has no root and yields the zero hash.
pub fn tree_hash(hashes: &[[u8; HASH_SIZE]]) -> [u8; HASH_SIZE] {
    match hashes {
        [] => [0u8; HASH_SIZE],
        [single] => *single,
        [left, right] => hash_pair(left, right),
        _ => {
            let count = hashes.len();
            let mut width = 1;
            while width * 2 < count {
                width *= 2;
            }

            let direct = 2 * width - count;
            let mut level: Vec<[u8; HASH_SIZE]> = hashes[..direct].to_vec();
            level.extend(
                hashes[direct..]
                    .chunks_exact(2)
                    .map(|pair| hash_pair(&pair[0], &pair[1])),
            );

            while level.len() > 2 {
                level = level
                    .chunks_exact(2)
                    .map(|pair| hash_pair(&pair[0], &pair[1]))
                    .collect();
            }
            hash_pair(&level[0], &level[1])
        }
    }
}

fn hash_pair(left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
    let mut data = [0u8; 2 * HASH_SIZE];
    data[..HASH_SIZE].copy_from_slice(left);
    data[HASH_SIZE..].copy_from_slice(right);
    fast_hash(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(major: u8) -> Vec<u8> {
        BlockHeader {
            major_version: major,
            minor_version: major,
            timestamp: 1_700_000_000,
            prev_id: [0x11; HASH_SIZE],
            nonce: [1, 2, 3, 4],
        }
        .serialize()
    }

    /// Version 2 coinbase paying one tagged output
    fn miner_tx_v2(height: u64) -> (Vec<u8>, Vec<u8>) {
        let mut prefix = Vec::new();
        varint::write(&mut prefix, 2);
        varint::write(&mut prefix, height + 60);
        prefix.extend_from_slice(&[1, TXIN_GEN]);
        varint::write(&mut prefix, height);
        prefix.push(1);
        varint::write(&mut prefix, 600_000_000_000);
        prefix.push(TXOUT_TO_TAGGED_KEY);
        prefix.extend_from_slice(&[0x22; HASH_SIZE + 1]);
        prefix.extend_from_slice(&[2, 0x01, 0x02]);

        let mut tx = prefix.clone();
        tx.push(RCT_TYPE_NULL);
        (prefix, tx)
    }

    fn block_v2(tx_hashes: &[[u8; HASH_SIZE]]) -> Vec<u8> {
        let mut raw = header_bytes(16);
        raw.extend_from_slice(&miner_tx_v2(3_000_000).1);
        varint::write(&mut raw, tx_hashes.len() as u64);
        for hash in tx_hashes {
            raw.extend_from_slice(hash);
        }
        raw
    }

    #[test]
    fn test_tree_hash_vectors() {
        let hashes: Vec<[u8; HASH_SIZE]> = (0..5u8).map(|i| [i; HASH_SIZE]).collect();
        assert_eq!(tree_hash(&hashes[..1]), hashes[0]);
        assert_eq!(
            hex::encode(tree_hash(&hashes[..2])),
            "d5f4f7e1d989848480236fb0a5f808d5877abf778364ae50845234dd6c1e80fc"
        );
        assert_eq!(
            hex::encode(tree_hash(&hashes[..3])),
            "0cd034051f8e0c34ce76996395ebf1bfa94c9c445c59a3230a1f93f67945dcbb"
        );
        assert_eq!(
            hex::encode(tree_hash(&hashes[..4])),
            "57ad090642e288d3069bf5bcf54be1be00e27ee594cfd22c204c9fbece2bf006"
        );
        assert_eq!(
            hex::encode(tree_hash(&hashes)),
            "60d4c7e49745b945a101686ffa32392f5f081d2683c5fb697ea84498e3e91931"
        );
    }

    #[test]
    fn test_parse_v2_miner_tx() {
        let txs = [[0xaa; HASH_SIZE], [0xbb; HASH_SIZE]];
        let block = Block::parse(&block_v2(&txs)).unwrap();

        assert_eq!(block.header.major_version, 16);
        assert_eq!(block.miner_tx.height, 3_000_000);
        assert_eq!(block.miner_tx.outputs, 1);
        assert_eq!(block.tx_count(), 3);
        assert_eq!(block.pow_variant(), Variant::V2);

        let (prefix, _) = miner_tx_v2(3_000_000);
        let mut parts = Vec::new();
        parts.extend_from_slice(&fast_hash(&prefix));
        parts.extend_from_slice(&fast_hash(&[RCT_TYPE_NULL]));
        parts.extend_from_slice(&[0u8; HASH_SIZE]);
        assert_eq!(block.miner_tx.hash, fast_hash(&parts));

        let blob = block.hashing_blob();
        let header = header_bytes(16);
        assert_eq!(&blob[..header.len()], &header[..]);
        assert_eq!(
            &blob[header.len()..header.len() + HASH_SIZE],
            &tree_hash(&[block.miner_tx.hash, txs[0], txs[1]])
        );
        assert_eq!(blob[header.len() + HASH_SIZE..], [3]);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut raw = block_v2(&[]);
        raw.push(0);
        assert_eq!(Block::parse(&raw), Err(Error::TrailingBytes(1)));
    }

    #[test]
    fn test_truncation_at_every_length() {
        let raw = block_v2(&[[0xcc; HASH_SIZE]]);
        for len in 0..raw.len() {
            let err = Block::parse(&raw[..len]).unwrap_err();
            assert!(
                matches!(err, Error::Parse { .. }),
                "length {} gave {:?}",
                len,
                err
            );
        }
    }

    #[test]
    fn test_unknown_output_tag() {
        let mut raw = header_bytes(1);
        raw.extend_from_slice(&[1, 0, 1, TXIN_GEN, 5, 1, 10, 0x04]);
        let err = Block::parse(&raw).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &Error::UnknownTag {
                field: "output",
                tag: 0x04
            }
        );
    }

    #[test]
    fn test_nonzero_rct_type_rejected() {
        let mut raw = header_bytes(16);
        let (prefix, _) = miner_tx_v2(1);
        raw.extend_from_slice(&prefix);
        raw.extend_from_slice(&[5, 0]);
        let err = Block::parse(&raw).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::UnknownTag {
                field: "rct_signatures",
                tag: 5
            }
        ));
    }

    #[test]
    fn test_version_must_fit_byte() {
        let mut raw = Vec::new();
        varint::write(&mut raw, 256);
        raw.extend_from_slice(&[0u8; 64]);
        let err = Block::parse(&raw).unwrap_err();
        assert_eq!(err.root_cause(), &Error::Overflow);
    }

    #[test]
    fn test_huge_tx_count_is_truncation() {
        let mut raw = header_bytes(1);
        raw.extend_from_slice(&[1, 0, 1, TXIN_GEN, 5, 0, 0]);
        varint::write(&mut raw, u64::MAX);
        let err = Block::parse(&raw).unwrap_err();
        assert_eq!(err.root_cause(), &Error::TruncatedInput);
    }
}
