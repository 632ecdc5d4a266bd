//! # Hashing Utilities
//!
//! Helix uses exactly one hash function and refuses to support more without
//! a very good reason:
//!
//! - **Keccak-256** — transaction hashes, signing digests, and address
//!   derivation all flow through it. It is the hash the network's nodes
//!   compute, so there is no "compatible alternative"; a different hash is
//!   simply a different (and rejected) transaction.
//!
//! The implementation is `alloy_primitives::keccak256`, which is a thin,
//! audited wrapper itself. These helpers exist so the rest of the crate has
//! one obvious import and one obvious output type.

use alloy_primitives::B256;

/// Computes the Keccak-256 hash of the input data.
///
/// Returns the digest as a fixed 32-byte [`B256`]. Every signing digest and
/// transaction hash in the SDK goes through this function.
///
/// # Example
///
/// ```
/// use helix_sdk::crypto::hash::keccak256;
///
/// let digest = keccak256(b"helix");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> B256 {
    alloy_primitives::keccak256(data)
}

/// Computes Keccak-256 and returns a plain 32-byte array.
///
/// Same digest as [`keccak256`], for callers that want to avoid pulling the
/// `B256` type into their signatures.
pub fn keccak256_array(data: &[u8]) -> [u8; 32] {
    alloy_primitives::keccak256(data).0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_empty_input_vector() {
        // The canonical Keccak-256 digest of the empty string.
        let digest = keccak256(b"");
        assert_eq!(
            hex::encode(digest),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak256_known_vector() {
        let digest = keccak256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn array_variant_matches() {
        let data = b"helix network";
        assert_eq!(keccak256(data).0, keccak256_array(data));
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(keccak256(b"same input"), keccak256(b"same input"));
        assert_ne!(keccak256(b"input a"), keccak256(b"input b"));
    }
}
