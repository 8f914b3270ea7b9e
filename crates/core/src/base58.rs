//! CryptoNote block-wise Base58
//!
//! Input is cut into 8-byte blocks. Each block is read as a big-endian
//! integer and written as a fixed number of base58 digits, so the encoded
//! length depends only on the input length and leading zero bytes need no
//! special handling.

use crate::error::{Error, Result};

/// Base58 alphabet (Bitcoin ordering, no `0`, `O`, `I`, `l`)
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Bytes per full block
pub const FULL_BLOCK_SIZE: usize = 8;

/// Characters per full block
pub const FULL_ENCODED_BLOCK_SIZE: usize = 11;

/// Encoded width for a block of `n` bytes, `ceil(8n / log2(58))`
const ENCODED_BLOCK_SIZES: [usize; FULL_BLOCK_SIZE + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

/// Reverse lookup, `0xff` for characters outside the alphabet
const DECODE_MAP: [u8; 128] = {
    let mut map = [0xffu8; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        map[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    map
};

/// Block byte width for an encoded width, if one exists
fn decoded_block_size(encoded: usize) -> Option<usize> {
    ENCODED_BLOCK_SIZES.iter().position(|&size| size == encoded)
}

/// Encode one block of at most 8 bytes.
pub fn encode_block(block: &[u8]) -> Result<String> {
    if block.len() > FULL_BLOCK_SIZE {
        return Err(Error::InvalidLength(block.len()));
    }
    let mut out = String::with_capacity(FULL_ENCODED_BLOCK_SIZE);
    write_block(&mut out, block);
    Ok(out)
}

/// Append the digits of a block of at most 8 bytes to `out`
fn write_block(out: &mut String, block: &[u8]) {
    let width = ENCODED_BLOCK_SIZES[block.len()];
    let mut num = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

    let mut digits = [ALPHABET[0]; FULL_ENCODED_BLOCK_SIZE];
    for digit in digits[..width].iter_mut().rev() {
        *digit = ALPHABET[(num % 58) as usize];
        num /= 58;
    }
    out.extend(digits[..width].iter().map(|&d| char::from(d)));
}

/// Decode one encoded block back to its byte width.
pub fn decode_block(block: &str) -> Result<Vec<u8>> {
    let size = decoded_block_size(block.len()).ok_or(Error::InvalidLength(block.len()))?;

    let mut num: u128 = 0;
    for c in block.chars() {
        let digit = match DECODE_MAP.get(c as usize) {
            Some(&d) if d != 0xff => d,
            _ => return Err(Error::InvalidCharacter(c)),
        };
        num = num * 58 + u128::from(digit);
    }

    // Eleven digits reach past 2^64, shorter widths past their byte count
    if num >> (8 * size) != 0 {
        return Err(Error::BlockOverflow);
    }

    Ok(num.to_be_bytes()[16 - size..].to_vec())
}

/// Encode a whole buffer.
pub fn encode(data: &[u8]) -> String {
    let mut out =
        String::with_capacity(data.len().div_ceil(FULL_BLOCK_SIZE) * FULL_ENCODED_BLOCK_SIZE);
    for chunk in data.chunks(FULL_BLOCK_SIZE) {
        write_block(&mut out, chunk);
    }
    out
}

/// Decode a whole string.
///
/// The string must split into full 11-character blocks followed by at most
/// one valid partial width; anything else is `InvalidLength`.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    if !encoded.is_ascii() {
        let bad = encoded.chars().find(|c| !c.is_ascii()).unwrap_or('\u{fffd}');
        return Err(Error::InvalidCharacter(bad));
    }

    let tail = encoded.len() % FULL_ENCODED_BLOCK_SIZE;
    if decoded_block_size(tail).is_none() {
        return Err(Error::InvalidLength(encoded.len()));
    }

    let mut out = Vec::with_capacity(encoded.len().div_ceil(FULL_ENCODED_BLOCK_SIZE) * FULL_BLOCK_SIZE);
    for chunk in encoded.as_bytes().chunks(FULL_ENCODED_BLOCK_SIZE) {
        // Chunks of an ASCII string are valid UTF-8
        let block = std::str::from_utf8(chunk).map_err(|_| Error::InvalidLength(encoded.len()))?;
        out.extend_from_slice(&decode_block(block)?);
    }
    Ok(out)
}
