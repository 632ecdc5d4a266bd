//! # Transaction Signatures
//!
//! The `(v, r, s)` signature triple and the append-only [`SignatureList`]
//! that Helix transactions accumulate.
//!
//! `v` folds the recovery id together with the chain id
//! (`v = 35 + 2·chainId + recoveryId`), so a signature pins the network it
//! was produced for: replaying the same raw bytes on another chain changes
//! the signing digest and the recovery comes out wrong. `r` and `s` are the
//! usual ECDSA components, encoded on the wire as minimal big-endian
//! integers.
//!
//! A fee-delegated transaction carries **two** independent lists — sender
//! signatures and fee-payer signatures — appended at different times,
//! usually by different machines.

use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Buf, BufMut, Decodable, Encodable, Header};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::keys::{recover_address, KeyError};

/// Offset added to `v` when folding in the chain id.
const V_CHAIN_OFFSET: u64 = 35;

// ---------------------------------------------------------------------------
// TxSignature
// ---------------------------------------------------------------------------

/// A single ECDSA signature over a transaction digest.
///
/// Immutable once created: a signature is evidence, and evidence does not
/// get edited. To change what a transaction attests, sign again and append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    v: u64,
    r: U256,
    s: U256,
}

impl TxSignature {
    /// Builds a signature from raw components, as read off the wire.
    pub fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Builds a signature from a fresh `(recoveryId, r, s)` triple, folding
    /// the chain id into `v`.
    pub fn from_recoverable(recovery_id: u8, r: U256, s: U256, chain_id: u64) -> Self {
        Self {
            v: V_CHAIN_OFFSET + 2 * chain_id + recovery_id as u64,
            r,
            s,
        }
    }

    /// The recovery component, chain id folded in.
    pub fn v(&self) -> u64 {
        self.v
    }

    /// The ECDSA `r` component.
    pub fn r(&self) -> U256 {
        self.r
    }

    /// The ECDSA `s` component.
    pub fn s(&self) -> U256 {
        self.s
    }

    /// Extracts the curve recovery id (0 or 1) from `v`.
    ///
    /// Returns `None` for `v` values no Helix signer produces.
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            27 | 28 => Some((self.v - 27) as u8),
            v if v >= V_CHAIN_OFFSET => Some(((v - V_CHAIN_OFFSET) % 2) as u8),
            _ => None,
        }
    }

    /// Extracts the chain id folded into `v`, if any.
    pub fn chain_id(&self) -> Option<u64> {
        match self.v {
            v if v >= V_CHAIN_OFFSET => Some((v - V_CHAIN_OFFSET) / 2),
            _ => None,
        }
    }

    /// Recovers the signer's address from this signature over `digest`.
    pub fn recover(&self, digest: B256) -> Result<Address, KeyError> {
        let recovery_id = self.recovery_id().ok_or(KeyError::InvalidPublicKey)?;
        recover_address(digest, recovery_id, self.r, self.s)
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v={:#x}, r={:#x}, s={:#x})", self.v, self.r, self.s)
    }
}

// On the wire a signature is the 3-list `[v, r, s]` of minimal big-endian
// integers.
impl Encodable for TxSignature {
    fn encode(&self, out: &mut dyn BufMut) {
        let payload_length = self.v.length() + self.r.length() + self.s.length();
        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.v.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.v.length() + self.r.length() + self.s.length();
        payload_length + Header {
            list: true,
            payload_length,
        }
        .length()
    }
}

impl Decodable for TxSignature {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        if buf.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let mut payload = &buf[..header.payload_length];
        let v = u64::decode(&mut payload)?;
        let r = U256::decode(&mut payload)?;
        let s = U256::decode(&mut payload)?;
        if !payload.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }
        buf.advance(header.payload_length);
        Ok(Self { v, r, s })
    }
}

// ---------------------------------------------------------------------------
// SignatureList
// ---------------------------------------------------------------------------

/// An ordered, append-only collection of [`TxSignature`]s.
///
/// Order is append order and is significant on the wire; it is *not*
/// significant for authorization, which works over the set of recovered
/// signer addresses. The list knowingly permits duplicate and
/// address-colliding entries — validation happens at authorization time,
/// not here. A stricter policy could be added without changing the wire
/// format, but today the list records exactly what callers appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureList(Vec<TxSignature>);

impl SignatureList {
    /// An empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns a new list with `signature` appended at the end.
    ///
    /// Pure by design: the original list is untouched, so callers holding
    /// snapshots never observe a mutation.
    #[must_use]
    pub fn append(&self, signature: TxSignature) -> Self {
        let mut inner = self.0.clone();
        inner.push(signature);
        Self(inner)
    }

    /// Returns a new list with every signature of `other` appended, in
    /// `other`'s order.
    #[must_use]
    pub fn append_all(&self, other: &SignatureList) -> Self {
        let mut inner = self.0.clone();
        inner.extend_from_slice(&other.0);
        Self(inner)
    }

    /// `true` when no signature has been appended yet. Downstream
    /// submission logic uses this to decide whether a transaction is ready
    /// (sender side) or counter-signed (fee-payer side).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of signatures in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first signature, if any.
    pub fn first(&self) -> Option<&TxSignature> {
        self.0.first()
    }

    /// Iterates the signatures in append order.
    pub fn iter(&self) -> impl Iterator<Item = &TxSignature> {
        self.0.iter()
    }

    /// Borrows the signatures as a slice.
    pub fn as_slice(&self) -> &[TxSignature] {
        &self.0
    }
}

impl From<Vec<TxSignature>> for SignatureList {
    fn from(signatures: Vec<TxSignature>) -> Self {
        Self(signatures)
    }
}

impl Encodable for SignatureList {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for SignatureList {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self(Vec::<TxSignature>::decode(buf)?))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
