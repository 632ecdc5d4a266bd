//! Sender and fee-payer signing.
//!
//! Signing is a separate step from building because the key material is
//! usually somewhere else — a keystore, a hardware signer, a different
//! machine entirely. Both signers mutate the envelope in place, appending
//! to the appropriate signature list; a failed call returns before any
//! mutation, leaving the envelope exactly as it was.
//!
//! ## Digests
//!
//! The sender digest covers the canonical pre-signature encoding plus the
//! chain id (`keccak256(RLP([RLP([tag, body...]), chainId, 0, 0]))`), so
//! the same transaction signed for one network is garbage on every other —
//! that is the whole replay-protection story.
//!
//! The fee-payer digest additionally folds in the sender signature list and
//! the fee payer's own address:
//! `keccak256(RLP([RLP([tag, body...]), senderSigs, feePayer, chainId, 0, 0]))`.
//! A fee payer therefore commits to exactly the sender-signed content; the
//! sender cannot swap fields (or signatures) under an already-collected
//! fee-payer signature.
//!
//! ## Concurrency
//!
//! Both signers take `&mut Transaction`. Concurrent signing of one shared
//! envelope instance is not a thing — clone per signer and combine with
//! [`super::verification::merge_signatures`], or sequence the signers.

use alloy_primitives::{Address, B256};
use alloy_rlp::Encodable;
use thiserror::Error;
use tracing::debug;

use super::builder::Transaction;
use super::codec::{self, CodecError};
use super::types::TransactionType;
use crate::crypto::hash::keccak256;
use crate::crypto::keys::{HelixKeypair, KeyError};
use crate::crypto::signatures::TxSignature;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Signer-time failures. Every variant is raised before the envelope is
/// touched, so an `Err` means "nothing happened".
#[derive(Debug, Error)]
pub enum SignError {
    /// Fee-payer signing was attempted on a type with no fee-payer slot.
    #[error("{tx_type} is not a fee-delegated transaction type")]
    NotFeeDelegated { tx_type: TransactionType },

    /// The envelope already names a different fee payer.
    #[error("fee payer mismatch: transaction names {expected}, signing key derives {actual}")]
    FeePayerMismatch { expected: Address, actual: Address },

    /// The private key cannot produce a valid signature.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(#[from] KeyError),

    /// A legacy transaction has exactly one signature slot and it is taken.
    #[error("legacy transactions carry a single signature; this one is already signed")]
    AlreadySigned,

    /// The envelope could not be rendered into a signing payload.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// Signers
// ---------------------------------------------------------------------------

/// Signs the envelope with the sender key and appends the signature to the
/// sender list.
///
/// Typed envelopes accumulate signatures — call once per key of a
/// multi-signature account, in any order. Legacy envelopes hold exactly
/// one signature and refuse a second.
pub fn sign_transaction(
    tx: &mut Transaction,
    keypair: &HelixKeypair,
    chain_id: u64,
) -> Result<(), SignError> {
    if tx.tx_type == TransactionType::Legacy && !tx.signatures.is_empty() {
        return Err(SignError::AlreadySigned);
    }
    let digest = signing_digest(tx, chain_id)?;
    let (recovery_id, r, s) = keypair.sign_digest(digest)?;
    let signature = TxSignature::from_recoverable(recovery_id, r, s, chain_id);

    tx.signatures = tx.signatures.append(signature);
    debug!(
        tx_type = %tx.tx_type,
        chain_id,
        signatures = tx.signatures.len(),
        "appended sender signature"
    );
    Ok(())
}

/// Counter-signs a fee-delegated envelope as the fee payer.
///
/// If the envelope does not name a fee payer yet, the signing key's address
/// is adopted; if it names a different one, the call fails with
/// [`SignError::FeePayerMismatch`]. Only legal on `FeeDelegated*` types.
pub fn sign_as_fee_payer(
    tx: &mut Transaction,
    keypair: &HelixKeypair,
    chain_id: u64,
) -> Result<(), SignError> {
    if !tx.tx_type.is_fee_delegated() {
        return Err(SignError::NotFeeDelegated { tx_type: tx.tx_type });
    }
    let payer = keypair.address();
    if let Some(existing) = tx.fee_payer {
        if existing != payer {
            return Err(SignError::FeePayerMismatch {
                expected: existing,
                actual: payer,
            });
        }
    }

    let digest = fee_payer_digest(tx, payer, chain_id)?;
    let (recovery_id, r, s) = keypair.sign_digest(digest)?;
    let signature = TxSignature::from_recoverable(recovery_id, r, s, chain_id);

    tx.fee_payer = Some(payer);
    tx.fee_payer_signatures = tx.fee_payer_signatures.append(signature);
    debug!(
        tx_type = %tx.tx_type,
        chain_id,
        fee_payer_signatures = tx.fee_payer_signatures.len(),
        "appended fee payer signature"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// The sender signing digest for `tx` on the given chain.
pub fn signing_digest(tx: &Transaction, chain_id: u64) -> Result<B256, SignError> {
    let payload = match tx.tx_type {
        TransactionType::Legacy => codec::legacy_signing_payload(tx, chain_id)?,
        _ => {
            let inner = codec::typed_signing_payload(tx)?;
            let mut payload = Vec::new();
            inner[..].encode(&mut payload);
            chain_id.encode(&mut payload);
            0u8.encode(&mut payload);
            0u8.encode(&mut payload);
            codec::wrap_list(&payload)
        }
    };
    Ok(keccak256(&payload))
}

/// The fee-payer signing digest for `tx` on the given chain, using the
/// envelope's current fee payer and sender signature list.
///
/// Used by verification to recover fee-payer signers; during signing the
/// address being adopted is used instead.
pub fn fee_payer_signing_digest(tx: &Transaction, chain_id: u64) -> Result<B256, SignError> {
    fee_payer_digest(tx, tx.fee_payer.unwrap_or(Address::ZERO), chain_id)
}

fn fee_payer_digest(tx: &Transaction, payer: Address, chain_id: u64) -> Result<B256, SignError> {
    if !tx.tx_type.is_fee_delegated() {
        return Err(SignError::NotFeeDelegated { tx_type: tx.tx_type });
    }
    let inner = codec::typed_signing_payload(tx)?;
    let mut payload = Vec::new();
    inner[..].encode(&mut payload);
    tx.signatures.encode(&mut payload);
    payer.encode(&mut payload);
    chain_id.encode(&mut payload);
    0u8.encode(&mut payload);
    0u8.encode(&mut payload);
    Ok(keccak256(&codec::wrap_list(&payload)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
