//! # Cryptographic Primitives for Helix
//!
//! Everything security-related in the SDK flows through this module:
//! key generation, address derivation, digest hashing, and the `(v, r, s)`
//! signature machinery that transactions accumulate.
//!
//! We deliberately chose boring, well-audited building blocks:
//!
//! - **secp256k1 / RFC 6979 ECDSA** (`k256`) — deterministic signing with
//!   public-key recovery, which is what keeps signatures at 65 bytes and
//!   lets verifiers work without a key registry.
//! - **Keccak-256** (`alloy-primitives`) — the network's only hash.
//!
//! Nothing in here is hand-rolled cryptography; these are thin, type-safe
//! wrappers that pin down the encodings the rest of the crate depends on.

pub mod hash;
pub mod keys;
pub mod signatures;

// Re-export the types people actually need so call sites don't have to
// memorize the module hierarchy.
pub use hash::keccak256;
pub use keys::{HelixKeypair, HelixPublicKey, KeyError};
pub use signatures::{SignatureList, TxSignature};
