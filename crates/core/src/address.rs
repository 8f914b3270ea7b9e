//! CryptoNote addresses
//!
//! An address is the block-wise base58 encoding of
//!
//! ```text
//! varint(prefix) || spend_key(32) || view_key(32) [|| payment_id(8)] || checksum(4)
//! ```
//!
//! with `checksum = fast_hash(everything before it)[..4]`. The prefix tags
//! the network and address kind; which prefixes are acceptable is a policy
//! decision left to the caller.

use core::fmt;
use core::str::FromStr;

use crate::base58;
use crate::error::{Error, Result};
use crate::keccak::fast_hash;
use crate::params::{ADDRESS_CHECKSUM_SIZE, ADDRESS_KEYS_SIZE, HASH_SIZE, PAYMENT_ID_SIZE};
use crate::varint;

/// Layout of the decoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Spend and view keys only
    Standard,
    /// Keys followed by an 8-byte payment id
    Integrated,
}

/// A decoded address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub prefix: u64,
    pub spend_key: [u8; HASH_SIZE],
    pub view_key: [u8; HASH_SIZE],
    pub payment_id: Option<[u8; PAYMENT_ID_SIZE]>,
}

impl Address {
    /// Decode and checksum-verify an address string.
    pub fn decode(address: &str) -> Result<Self> {
        let raw = base58::decode(address)?;

        if raw.len() < 1 + ADDRESS_KEYS_SIZE + ADDRESS_CHECKSUM_SIZE {
            return Err(Error::InvalidPayload(raw.len()));
        }
        let (body, checksum) = raw.split_at(raw.len() - ADDRESS_CHECKSUM_SIZE);

        let (prefix, prefix_len) = varint::decode(body, 0)?;
        let payload = &body[prefix_len..];
        let payment_id = match payload.len() {
            ADDRESS_KEYS_SIZE => None,
            n if n == ADDRESS_KEYS_SIZE + PAYMENT_ID_SIZE => {
                let mut id = [0u8; PAYMENT_ID_SIZE];
                id.copy_from_slice(&payload[ADDRESS_KEYS_SIZE..]);
                Some(id)
            }
            n => return Err(Error::InvalidPayload(n)),
        };

        if fast_hash(body)[..ADDRESS_CHECKSUM_SIZE] != *checksum {
            return Err(Error::ChecksumMismatch);
        }

        let mut spend_key = [0u8; HASH_SIZE];
        let mut view_key = [0u8; HASH_SIZE];
        spend_key.copy_from_slice(&payload[..HASH_SIZE]);
        view_key.copy_from_slice(&payload[HASH_SIZE..ADDRESS_KEYS_SIZE]);

        Ok(Self {
            prefix,
            spend_key,
            view_key,
            payment_id,
        })
    }

    /// Encode back to the base58 string form.
    pub fn encode(&self) -> String {
        let mut body = varint::encode(self.prefix);
        body.extend_from_slice(&self.spend_key);
        body.extend_from_slice(&self.view_key);
        if let Some(id) = &self.payment_id {
            body.extend_from_slice(id);
        }
        let checksum = fast_hash(&body);
        body.extend_from_slice(&checksum[..ADDRESS_CHECKSUM_SIZE]);
        base58::encode(&body)
    }

    pub fn kind(&self) -> AddressKind {
        match self.payment_id {
            Some(_) => AddressKind::Integrated,
            None => AddressKind::Standard,
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Address::decode(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// True for a well-formed standard address with a matching checksum.
///
/// Any decoding failure is reported as `false`; integrated addresses are
/// not accepted.
pub fn validate_address(address: &str) -> bool {
    match Address::decode(address) {
        Ok(decoded) => decoded.kind() == AddressKind::Standard,
        Err(err) => {
            tracing::debug!(%err, "address rejected");
            false
        }
    }
}

/// Validate a miner's login address against the pool's own address: same
/// length, same leading character (network), and a valid standard address.
pub fn validate_pool_address(address: &str, pool_address: &str) -> bool {
    if address.len() != pool_address.len() {
        return false;
    }
    if address.chars().next() != pool_address.chars().next() {
        return false;
    }
    validate_address(address)
}
