//! # Account Key Model
//!
//! On Helix, the authority over an address is not hardwired to the key that
//! derived it. An account registers an [`AccountKey`] on chain, and from
//! then on that structure — not the address math — decides which signatures
//! count. The model is a closed family:
//!
//! - [`AccountKey::Legacy`] — the implicit key: whoever derives the address
//!   signs for it.
//! - [`AccountKey::Public`] — a single explicit key, decoupled from the
//!   address.
//! - [`AccountKey::Fail`] — no signature is ever valid. Used to retire an
//!   account on purpose.
//! - [`AccountKey::WeightedMultiSig`] — N keys with weights and a pass
//!   threshold.
//! - [`AccountKey::RoleBased`] — up to three independent sub-keys, one per
//!   [`Role`].
//! - [`AccountKey::Nil`] — a placeholder meaning "leave this role slot
//!   untouched" inside role-based account updates. Never a standalone key.
//!
//! Structural invariants (threshold satisfiable, no nested role-based keys,
//! at most three roles) are enforced at construction, so an `AccountKey`
//! value that exists is an `AccountKey` value that can, in principle, be
//! satisfied. Authorization itself is a pure set computation over recovered
//! signer addresses — see [`AccountKey::authorizes`].

use alloy_primitives::{Address, Bytes};
use alloy_rlp::{Buf, Decodable, Encodable, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::config::{MAX_ROLE_KEYS, MAX_WEIGHTED_KEYS};
use crate::crypto::keys::{HelixPublicKey, KeyError};

/// Wire tag for a legacy account key.
const TAG_LEGACY: u8 = 0x01;
/// Wire tag for a single-public-key account key.
const TAG_PUBLIC: u8 = 0x02;
/// Wire tag for a fail account key.
const TAG_FAIL: u8 = 0x03;
/// Wire tag for a weighted multi-signature account key.
const TAG_WEIGHTED_MULTI_SIG: u8 = 0x04;
/// Wire tag for a role-based account key.
const TAG_ROLE_BASED: u8 = 0x05;
/// The nil key has no tag: it is the single RLP empty-string byte.
const NIL_BYTE: u8 = 0x80;
/// Tagless keys (legacy, fail) carry an empty RLP list as their payload.
const EMPTY_LIST_BYTE: u8 = 0xc0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A structurally malformed account key, rejected at construction or
/// decode time.
///
/// Failing fast here is the point: a weighted key whose threshold exceeds
/// the sum of its weights can never authorize anything, and the place to
/// learn that is the constructor, not a rejected transaction three systems
/// later.
#[derive(Debug, Error)]
pub enum AccountKeyError {
    /// A multi-sig threshold of zero would make every signature set pass.
    #[error("multi-sig threshold must be positive")]
    ZeroThreshold,

    /// The threshold can never be met by the key set.
    #[error("unsatisfiable multi-sig: threshold {threshold} exceeds total weight {weight_sum}")]
    UnsatisfiableThreshold { threshold: u32, weight_sum: u64 },

    /// A key with weight zero can never contribute to the threshold.
    #[error("weighted key at index {index} has zero weight")]
    ZeroWeight { index: usize },

    /// A multi-sig key needs at least one weighted key.
    #[error("multi-sig key set is empty")]
    EmptyKeySet,

    /// More weighted keys than the network accepts.
    #[error("multi-sig key set has {count} keys, maximum is {max}")]
    TooManyKeys { count: usize, max: usize },

    /// A role-based key needs at least one role slot.
    #[error("role-based key has no role slots")]
    EmptyRoleSet,

    /// More role slots than roles exist.
    #[error("role-based key has {count} slots, maximum is {max}")]
    TooManyRoles { count: usize, max: usize },

    /// Role-based keys do not nest.
    #[error("role-based keys cannot contain another role-based key")]
    NestedRoleBased,

    /// `Nil` is only meaningful inside a role-based update.
    #[error("nil account key is not valid as a standalone account key")]
    StandaloneNil,

    /// The leading tag byte does not name any account key type.
    #[error("unknown account key tag {tag:#04x}")]
    UnknownKeyTag { tag: u8 },

    /// The payload after the tag is not the RLP structure the tag demands.
    #[error("malformed account key payload: {0}")]
    InvalidEncoding(#[from] alloy_rlp::Error),

    /// Bytes left over after a complete account key was read.
    #[error("{remaining} trailing byte(s) after account key payload")]
    TrailingBytes { remaining: usize },

    /// The embedded public key is not a point on the curve.
    #[error("invalid public key in account key: {0}")]
    InvalidPublicKey(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The operation classes a role-based key partitions authority over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Ordinary transaction signing (transfers, contract calls, cancels).
    Transaction,
    /// Replacing the account's own key.
    AccountUpdate,
    /// Co-signing as a fee payer for somebody else's transaction.
    FeePayer,
}

impl Role {
    /// Slot index of this role inside a role-based key.
    pub const fn index(self) -> usize {
        match self {
            Role::Transaction => 0,
            Role::AccountUpdate => 1,
            Role::FeePayer => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Transaction => write!(f, "transaction"),
            Role::AccountUpdate => write!(f, "account-update"),
            Role::FeePayer => write!(f, "fee-payer"),
        }
    }
}

// ---------------------------------------------------------------------------
// AccountKey
// ---------------------------------------------------------------------------

/// A public key with the weight it contributes toward a multi-sig threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPublicKey {
    /// Weight this key contributes when it has signed.
    pub weight: u32,
    /// The key itself.
    pub key: HelixPublicKey,
}

impl WeightedPublicKey {
    /// Pairs a key with its weight.
    pub fn new(weight: u32, key: HelixPublicKey) -> Self {
        Self { weight, key }
    }
}

/// The cryptographic authority structure registered for an address.
///
/// Closed, exhaustively matched everywhere it is consumed (encode, decode,
/// authorize); adding a variant is a compile-checked change, not a runtime
/// surprise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKey {
    /// Role-slot placeholder: "do not change this role". Never authorizes.
    Nil,
    /// The implicit key derived from the address itself.
    Legacy,
    /// Always-invalid key; the account can no longer sign anything.
    Fail,
    /// A single explicit public key.
    Public(HelixPublicKey),
    /// N weighted keys with a pass threshold.
    WeightedMultiSig {
        /// Minimum total weight of signing keys for authorization.
        threshold: u32,
        /// The admissible keys and their weights.
        keys: Vec<WeightedPublicKey>,
    },
    /// Independent sub-keys per role, indexed by [`Role::index`].
    RoleBased(Vec<AccountKey>),
}

impl AccountKey {
    /// Builds a weighted multi-signature key, validating that the threshold
    /// is positive and satisfiable and the key set within network limits.
    pub fn weighted_multi_sig(
        threshold: u32,
        keys: Vec<WeightedPublicKey>,
    ) -> Result<Self, AccountKeyError> {
        if keys.is_empty() {
            return Err(AccountKeyError::EmptyKeySet);
        }
        if keys.len() > MAX_WEIGHTED_KEYS {
            return Err(AccountKeyError::TooManyKeys {
                count: keys.len(),
                max: MAX_WEIGHTED_KEYS,
            });
        }
        if threshold == 0 {
            return Err(AccountKeyError::ZeroThreshold);
        }
        if let Some(index) = keys.iter().position(|k| k.weight == 0) {
            return Err(AccountKeyError::ZeroWeight { index });
        }
        let weight_sum: u64 = keys.iter().map(|k| k.weight as u64).sum();
        if (threshold as u64) > weight_sum {
            return Err(AccountKeyError::UnsatisfiableThreshold {
                threshold,
                weight_sum,
            });
        }
        Ok(AccountKey::WeightedMultiSig { threshold, keys })
    }

    /// Builds a role-based key from role slots in [`Role::index`] order.
    /// Missing trailing roles are simply absent; a missing middle role is an
    /// explicit [`AccountKey::Nil`].
    pub fn role_based(roles: Vec<AccountKey>) -> Result<Self, AccountKeyError> {
        if roles.is_empty() {
            return Err(AccountKeyError::EmptyRoleSet);
        }
        if roles.len() > MAX_ROLE_KEYS {
            return Err(AccountKeyError::TooManyRoles {
                count: roles.len(),
                max: MAX_ROLE_KEYS,
            });
        }
        if roles.iter().any(|k| matches!(k, AccountKey::RoleBased(_))) {
            return Err(AccountKeyError::NestedRoleBased);
        }
        Ok(AccountKey::RoleBased(roles))
    }

    /// Decides whether `signers` — the set of addresses recovered from a
    /// transaction's signatures — carries the authority of this key over
    /// `account` for the given `role`.
    ///
    /// Pure and side-effect free. For multi-sig keys, signers outside the
    /// key set are ignored rather than rejected: extra unrelated signatures
    /// do not invalidate an otherwise sufficient set. For single-key forms
    /// (legacy, public) exactly the one expected signer must be present.
    /// A role with no sub-key defined authorizes nothing — there is no
    /// fallback to another role's key.
    pub fn authorizes(&self, account: Address, signers: &HashSet<Address>, role: Role) -> bool {
        match self {
            AccountKey::Nil | AccountKey::Fail => false,
            AccountKey::Legacy => signers.len() == 1 && signers.contains(&account),
            AccountKey::Public(key) => signers.len() == 1 && signers.contains(&key.address()),
            AccountKey::WeightedMultiSig { threshold, keys } => {
                let signed_weight: u64 = keys
                    .iter()
                    .filter(|k| signers.contains(&k.key.address()))
                    .map(|k| k.weight as u64)
                    .sum();
                signed_weight >= *threshold as u64
            }
            AccountKey::RoleBased(slots) => slots
                .get(role.index())
                .is_some_and(|key| key.authorizes(account, signers, role)),
        }
    }

    // -----------------------------------------------------------------------
    // Wire codec
    // -----------------------------------------------------------------------

    /// Serializes this key to its canonical tag-prefixed byte string, the
    /// form embedded in account-update transaction bodies.
    pub fn to_rlp_bytes(&self) -> Vec<u8> {
        match self {
            AccountKey::Nil => vec![NIL_BYTE],
            AccountKey::Legacy => vec![TAG_LEGACY, EMPTY_LIST_BYTE],
            AccountKey::Fail => vec![TAG_FAIL, EMPTY_LIST_BYTE],
            AccountKey::Public(key) => {
                let mut out = vec![TAG_PUBLIC];
                key.as_bytes()[..].encode(&mut out);
                out
            }
            AccountKey::WeightedMultiSig { threshold, keys } => {
                let mut entries = Vec::new();
                for weighted in keys {
                    let entry_len =
                        weighted.weight.length() + weighted.key.as_bytes()[..].length();
                    Header {
                        list: true,
                        payload_length: entry_len,
                    }
                    .encode(&mut entries);
                    weighted.weight.encode(&mut entries);
                    weighted.key.as_bytes()[..].encode(&mut entries);
                }

                let mut payload = Vec::new();
                threshold.encode(&mut payload);
                Header {
                    list: true,
                    payload_length: entries.len(),
                }
                .encode(&mut payload);
                payload.extend_from_slice(&entries);

                let mut out = vec![TAG_WEIGHTED_MULTI_SIG];
                Header {
                    list: true,
                    payload_length: payload.len(),
                }
                .encode(&mut out);
                out.extend_from_slice(&payload);
                out
            }
            AccountKey::RoleBased(slots) => {
                let mut payload = Vec::new();
                for slot in slots {
                    slot.to_rlp_bytes()[..].encode(&mut payload);
                }
                let mut out = vec![TAG_ROLE_BASED];
                Header {
                    list: true,
                    payload_length: payload.len(),
                }
                .encode(&mut out);
                out.extend_from_slice(&payload);
                out
            }
        }
    }

    /// Parses a canonical account key byte string.
    ///
    /// Structural invariants are re-validated on the way in — bytes that
    /// decode to an unsatisfiable or nested key are rejected just like an
    /// attempt to construct one.
    pub fn from_rlp_bytes(bytes: &[u8]) -> Result<Self, AccountKeyError> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or(AccountKeyError::InvalidEncoding(
                alloy_rlp::Error::InputTooShort,
            ))?;
        match tag {
            NIL_BYTE => {
                ensure_consumed(rest)?;
                Ok(AccountKey::Nil)
            }
            TAG_LEGACY => {
                decode_empty_list(rest)?;
                Ok(AccountKey::Legacy)
            }
            TAG_FAIL => {
                decode_empty_list(rest)?;
                Ok(AccountKey::Fail)
            }
            TAG_PUBLIC => {
                let mut buf = rest;
                let key_bytes = Bytes::decode(&mut buf)?;
                ensure_consumed(buf)?;
                Ok(AccountKey::Public(HelixPublicKey::from_sec1_bytes(
                    &key_bytes,
                )?))
            }
            TAG_WEIGHTED_MULTI_SIG => {
                let mut buf = rest;
                let header = Header::decode(&mut buf)?;
                if !header.list {
                    return Err(alloy_rlp::Error::UnexpectedString.into());
                }
                if buf.len() < header.payload_length {
                    return Err(alloy_rlp::Error::InputTooShort.into());
                }
                let mut payload = &buf[..header.payload_length];
                buf.advance(header.payload_length);
                ensure_consumed(buf)?;

                let threshold = u32::decode(&mut payload)?;
                let entries_header = Header::decode(&mut payload)?;
                if !entries_header.list {
                    return Err(alloy_rlp::Error::UnexpectedString.into());
                }
                if payload.len() < entries_header.payload_length {
                    return Err(alloy_rlp::Error::InputTooShort.into());
                }
                let mut entries = &payload[..entries_header.payload_length];
                payload.advance(entries_header.payload_length);
                if !payload.is_empty() {
                    return Err(AccountKeyError::TrailingBytes {
                        remaining: payload.len(),
                    });
                }

                let mut keys = Vec::new();
                while !entries.is_empty() {
                    let entry_header = Header::decode(&mut entries)?;
                    if !entry_header.list {
                        return Err(alloy_rlp::Error::UnexpectedString.into());
                    }
                    if entries.len() < entry_header.payload_length {
                        return Err(alloy_rlp::Error::InputTooShort.into());
                    }
                    let mut entry = &entries[..entry_header.payload_length];
                    entries.advance(entry_header.payload_length);

                    let weight = u32::decode(&mut entry)?;
                    let key_bytes = Bytes::decode(&mut entry)?;
                    if !entry.is_empty() {
                        return Err(AccountKeyError::TrailingBytes {
                            remaining: entry.len(),
                        });
                    }
                    keys.push(WeightedPublicKey::new(
                        weight,
                        HelixPublicKey::from_sec1_bytes(&key_bytes)?,
                    ));
                }
                AccountKey::weighted_multi_sig(threshold, keys)
            }
            TAG_ROLE_BASED => {
                let mut buf = rest;
                let header = Header::decode(&mut buf)?;
                if !header.list {
                    return Err(alloy_rlp::Error::UnexpectedString.into());
                }
                if buf.len() < header.payload_length {
                    return Err(alloy_rlp::Error::InputTooShort.into());
                }
                let mut payload = &buf[..header.payload_length];
                buf.advance(header.payload_length);
                ensure_consumed(buf)?;

                let mut slots = Vec::new();
                while !payload.is_empty() {
                    let slot_bytes = Bytes::decode(&mut payload)?;
                    slots.push(AccountKey::from_rlp_bytes(&slot_bytes)?);
                }
                AccountKey::role_based(slots)
            }
            other => Err(AccountKeyError::UnknownKeyTag { tag: other }),
        }
    }
}

fn ensure_consumed(rest: &[u8]) -> Result<(), AccountKeyError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(AccountKeyError::TrailingBytes {
            remaining: rest.len(),
        })
    }
}

fn decode_empty_list(rest: &[u8]) -> Result<(), AccountKeyError> {
    match rest {
        [EMPTY_LIST_BYTE] => Ok(()),
        [] => Err(alloy_rlp::Error::InputTooShort.into()),
        [EMPTY_LIST_BYTE, tail @ ..] => Err(AccountKeyError::TrailingBytes {
            remaining: tail.len(),
        }),
        _ => Err(alloy_rlp::Error::UnexpectedString.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
