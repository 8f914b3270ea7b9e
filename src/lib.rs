//! CryptoNote mining utilities
//!
//! Pool-side helpers for CryptoNote chains: turning submitted blocks into
//! proof-of-work hashing blobs, validating miner addresses, and computing
//! the CryptoNight and Keccak digests shares are checked against.
//!
//! # Example
//!
//! ```rust
//! use cnutil::algorithm::{extract_hashing_blob, validate_address};
//! use cnutil::report::TargetReport;
//!
//! // Malformed blocks convert to an empty blob
//! assert!(extract_hashing_blob(b"short").is_empty());
//!
//! assert!(validate_address(
//!     "45pyCXYn2UBVUmCFjgKr7LF8hCTeGwucWJ2xni7qrbj6GgAZBFY6tANarozZx9DaQqHyuR1AL8HJbRmqwLhUaDpKJW4hqS1"
//! ));
//!
//! // Job target for a share difficulty of 500
//! assert_eq!(TargetReport::new(500).target_hex, "6e128300");
//! ```

// Re-export the core algorithms
pub use cnutil_core as algorithm;

pub mod report;

// Convenience re-exports
pub use algorithm::{
    CryptoNight, Variant, extract_hashing_blob, fast_hash, slow_hash, validate_address,
};
