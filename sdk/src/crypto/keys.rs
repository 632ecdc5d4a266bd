//! # Key Management
//!
//! secp256k1 keypair handling for Helix accounts.
//!
//! Every signer on the Helix network — sender or fee payer — holds a
//! secp256k1 private key. This module handles key creation, import/export,
//! public-key compression, and the address derivation every other module
//! builds on: `address = keccak256(uncompressed_point[1..])[12..]`.
//!
//! ## Why recoverable ECDSA?
//!
//! Helix transactions do not carry the signer's public key on the wire.
//! Verifiers recover it from the `(v, r, s)` signature and the signing
//! digest, which keeps every signature at 65 bytes regardless of how many
//! parties co-sign. Signing itself is RFC 6979 deterministic — no RNG at
//! signing time, no nonce-reuse disasters.
//!
//! ## Security considerations
//!
//! - Key generation uses the OS CSPRNG (`OsRng`) and nothing else.
//! - Secret key bytes never appear in `Debug` output or log events. If you
//!   add logging to this module, keep it that way.

use alloy_primitives::{Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::hash::keccak256;

/// Length of a SEC1-compressed secp256k1 public key in bytes.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* key material was rejected —
/// error messages that describe secrets in detail have a way of ending up
/// in logs.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The secret key bytes are the wrong length or not a valid scalar.
    #[error("invalid secret key bytes: wrong length or not a valid curve scalar")]
    InvalidSecretKey,

    /// The public key bytes do not describe a point on secp256k1.
    #[error("invalid public key bytes: not a valid secp256k1 point")]
    InvalidPublicKey,

    /// Producing a signature over the supplied digest failed.
    #[error("signature generation failed for the supplied digest")]
    SigningFailed,
}

// ---------------------------------------------------------------------------
// HelixKeypair
// ---------------------------------------------------------------------------

/// A Helix signing keypair wrapping a secp256k1 private key.
///
/// This is what the keystore collaborator hands to the signer. The SDK never
/// persists it; loading and storing key files is deliberately somebody
/// else's problem.
///
/// Note that the address derived from this key is not necessarily the
/// account it signs for: once an account registers a multi-signature or
/// role-based [`AccountKey`](crate::account::AccountKey), keys sign on
/// behalf of addresses they did not derive.
///
/// # Examples
///
/// ```
/// use helix_sdk::crypto::keys::HelixKeypair;
///
/// let kp = HelixKeypair::generate();
/// let addr = kp.address();
/// assert_eq!(addr.len(), 20);
/// ```
pub struct HelixKeypair {
    signing_key: SigningKey,
}

impl HelixKeypair {
    /// Generates a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstructs a keypair from raw 32-byte secret key material.
    ///
    /// Fails with [`KeyError::InvalidSecretKey`] if the bytes are zero or
    /// not a valid scalar for the curve — a key that cannot produce a valid
    /// curve point is rejected here, before it ever reaches a signer.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstructs a keypair from a hex-encoded secret key, with or without
    /// a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&arr)
    }

    /// Returns the public half of this keypair.
    pub fn public_key(&self) -> HelixPublicKey {
        HelixPublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Returns the Helix address derived from this keypair's public key.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with care.** This is the only secret standing between an
    /// attacker and the associated account (or its share of a multi-sig).
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        let bytes = self.signing_key.to_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    }

    /// Signs a 32-byte digest, returning `(recoveryId, r, s)`.
    ///
    /// Deterministic per RFC 6979 with low-`s` normalization, so the same
    /// key and digest always produce the same triple. Chain-id binding is
    /// the caller's job — see [`crate::transaction::signing`].
    pub fn sign_digest(&self, digest: B256) -> Result<(u8, U256, U256), KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|_| KeyError::SigningFailed)?;
        let bytes = signature.to_bytes();
        let r = U256::from_be_slice(&bytes[..32]);
        let s = U256::from_be_slice(&bytes[32..]);
        Ok((recovery_id.to_byte(), r, s))
    }
}

impl Clone for HelixKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for HelixKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        write!(f, "HelixKeypair(address={})", self.address())
    }
}

impl PartialEq for HelixKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material byte-for-byte in non-constant time is a habit not worth
    /// acquiring.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for HelixKeypair {}

// ---------------------------------------------------------------------------
// HelixPublicKey
// ---------------------------------------------------------------------------

/// The public half of a Helix keypair, stored SEC1-compressed (33 bytes).
///
/// This is the form that appears on the wire inside account keys, and the
/// form verifiers reconstruct through signature recovery. Safe to share,
/// log, and embed in transactions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HelixPublicKey {
    bytes: [u8; COMPRESSED_PUBLIC_KEY_LENGTH],
}

impl HelixPublicKey {
    /// Builds a public key from a verified curve point.
    pub(crate) fn from_verifying_key(vk: &VerifyingKey) -> Self {
        let point = vk.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(point.as_bytes());
        Self { bytes }
    }

    /// Parses a SEC1-encoded public key, compressed (33 bytes) or
    /// uncompressed (65 bytes). The stored form is always compressed.
    ///
    /// The bytes are validated as an actual point on secp256k1; 33 bytes of
    /// garbage are not a public key.
    pub fn from_sec1_bytes(slice: &[u8]) -> Result<Self, KeyError> {
        let vk = VerifyingKey::from_sec1_bytes(slice).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&vk))
    }

    /// Builds a public key from affine `x` and `y` coordinates.
    pub fn from_xy(x: B256, y: B256) -> Result<Self, KeyError> {
        let mut uncompressed = [0u8; 65];
        uncompressed[0] = 0x04;
        uncompressed[1..33].copy_from_slice(x.as_slice());
        uncompressed[33..].copy_from_slice(y.as_slice());
        Self::from_sec1_bytes(&uncompressed)
    }

    /// Parses a hex-encoded SEC1 public key, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Returns the compressed SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// Returns the affine `x` coordinate.
    pub fn x(&self) -> B256 {
        B256::from_slice(&self.bytes[1..])
    }

    /// Returns the uncompressed SEC1 encoding (65 bytes, `0x04` prefix).
    pub fn uncompressed(&self) -> [u8; 65] {
        // Stored bytes always come from a validated point.
        let vk = VerifyingKey::from_sec1_bytes(&self.bytes)
            .expect("stored public key bytes are a validated curve point");
        let point = vk.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Derives the Helix address: the last 20 bytes of the Keccak-256 hash
    /// of the uncompressed point (without the `0x04` prefix byte).
    pub fn address(&self) -> Address {
        let uncompressed = self.uncompressed();
        let digest = keccak256(&uncompressed[1..]);
        Address::from_slice(&digest[12..])
    }

    /// Hex-encoded compressed key, `0x`-prefixed.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl fmt::Display for HelixPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HelixPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HelixPublicKey({}…)", &self.to_hex()[..12])
    }
}

// Serialized as a 0x-prefixed hex string: fixed-size arrays over 32 bytes
// don't derive serde, and the hex form is what JSON-RPC surfaces expect
// anyway.
impl Serialize for HelixPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HelixPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature recovery
// ---------------------------------------------------------------------------

/// Recovers the signer's address from a digest and a raw `(recoveryId, r, s)`
/// triple.
///
/// Fails with [`KeyError::InvalidPublicKey`] when the triple does not
/// describe a recoverable point — a corrupted signature, a digest that was
/// not the one signed, or a recovery id outside the valid range.
pub fn recover_address(digest: B256, recovery_id: u8, r: U256, s: U256) -> Result<Address, KeyError> {
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&r.to_be_bytes::<32>());
    sig_bytes[32..].copy_from_slice(&s.to_be_bytes::<32>());
    let signature =
        EcdsaSignature::from_slice(&sig_bytes).map_err(|_| KeyError::InvalidPublicKey)?;
    let recovery_id = RecoveryId::from_byte(recovery_id).ok_or(KeyError::InvalidPublicKey)?;
    let vk = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
        .map_err(|_| KeyError::InvalidPublicKey)?;
    Ok(HelixPublicKey::from_verifying_key(&vk).address())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
