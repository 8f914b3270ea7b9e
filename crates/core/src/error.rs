//! Error types shared by the codecs and parsers

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Failures raised by the varint and base58 codecs, the block parser and
/// the address decoder.
///
/// The hash functions have no failure path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer ended before the field being decoded was complete
    #[error("input truncated")]
    TruncatedInput,

    /// Varint value does not fit the target integer width
    #[error("varint overflows the target integer")]
    Overflow,

    /// Varint has a redundant trailing zero group
    #[error("varint is not minimally encoded")]
    NonCanonical,

    /// Character outside the base58 alphabet
    #[error("invalid base58 character {0:?}")]
    InvalidCharacter(char),

    /// Decoded base58 block does not fit its byte width
    #[error("base58 block overflows its byte width")]
    BlockOverflow,

    /// Base58 string length is not a sequence of block widths
    #[error("invalid base58 length {0}")]
    InvalidLength(usize),

    /// Address checksum does not match the payload
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// Address payload after the prefix has an unexpected size
    #[error("address payload has {0} bytes after the prefix")]
    InvalidPayload(usize),

    /// Unsupported variant tag inside a serialized transaction
    #[error("unknown {field} tag {tag:#04x}")]
    UnknownTag { field: &'static str, tag: u8 },

    /// Bytes left over after the last field of a block
    #[error("{0} trailing bytes after block")]
    TrailingBytes(usize),

    /// Block parsing failed while reading `field`
    #[error("malformed block field `{field}`: {source}")]
    Parse {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a lower-level failure with the block field being read
    pub(crate) fn parse(field: &'static str, source: Error) -> Self {
        Error::Parse {
            field,
            source: Box::new(source),
        }
    }

    /// Innermost cause, looking through `Parse` wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Parse { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
