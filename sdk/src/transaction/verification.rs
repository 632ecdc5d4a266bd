//! Signer recovery and authorization checks for signed transactions.
//!
//! Nothing here talks to a node: given an envelope, a chain id, and the
//! account key registered for an address, these functions answer "who
//! signed this" and "is that enough". The account-key check itself is the
//! pure boolean [`AccountKey::authorizes`]; this module recovers the signer
//! set, picks the role the transaction type exercises, and wraps a `false`
//! into an error the caller can surface.

use alloy_primitives::Address;
use std::collections::HashSet;
use thiserror::Error;

use super::builder::Transaction;
use super::signing::{self, SignError};
use super::types::TxFamily;
use crate::account::{AccountKey, Role};
use crate::crypto::signatures::{SignatureList, TxSignature};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while recovering signers or checking authorization.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The sender signature list is empty; there is nothing to recover.
    #[error("transaction carries no sender signatures")]
    MissingSignature,

    /// The fee-payer signature list is empty (or no fee payer is named).
    #[error("transaction carries no fee payer signatures")]
    MissingFeePayerSignature,

    /// A signature did not recover to a valid public key.
    #[error("signature at index {index} does not recover to a valid public key")]
    RecoveryFailed { index: usize },

    /// A signature was produced for a different network.
    #[error("signature at index {index} encodes chain id {got}, expected {expected}")]
    ChainIdMismatch { index: usize, got: u64, expected: u64 },

    /// The recovered signer set does not satisfy the account key.
    #[error("account key does not authorize the recovered signers for {role} on {account}")]
    InsufficientAuthorization { account: Address, role: Role },

    /// Two envelopes differ outside their signature lists and cannot be
    /// combined.
    #[error("transactions differ outside their signature lists and cannot be combined")]
    MismatchedTransactions,

    /// The signing digest could not be reconstructed.
    #[error(transparent)]
    Sign(#[from] SignError),
}

// ---------------------------------------------------------------------------
// Signer recovery
// ---------------------------------------------------------------------------

/// Recovers the sender addresses behind every signature in the sender list,
/// in append order.
pub fn recover_sender_addresses(
    tx: &Transaction,
    chain_id: u64,
) -> Result<Vec<Address>, VerificationError> {
    if tx.signatures.is_empty() {
        return Err(VerificationError::MissingSignature);
    }
    let digest = signing::signing_digest(tx, chain_id)?;
    recover_all(tx.signatures.as_slice(), digest, chain_id)
}

/// Recovers the addresses behind every fee-payer signature, in append order.
pub fn recover_fee_payer_addresses(
    tx: &Transaction,
    chain_id: u64,
) -> Result<Vec<Address>, VerificationError> {
    if tx.fee_payer_signatures.is_empty() {
        return Err(VerificationError::MissingFeePayerSignature);
    }
    let digest = signing::fee_payer_signing_digest(tx, chain_id)?;
    recover_all(tx.fee_payer_signatures.as_slice(), digest, chain_id)
}

fn recover_all(
    signatures: &[TxSignature],
    digest: alloy_primitives::B256,
    expected_chain: u64,
) -> Result<Vec<Address>, VerificationError> {
    let mut addresses = Vec::with_capacity(signatures.len());
    for (index, signature) in signatures.iter().enumerate() {
        if let Some(got) = signature.chain_id() {
            if got != expected_chain {
                return Err(VerificationError::ChainIdMismatch {
                    index,
                    got,
                    expected: expected_chain,
                });
            }
        }
        let address = signature
            .recover(digest)
            .map_err(|_| VerificationError::RecoveryFailed { index })?;
        addresses.push(address);
    }
    Ok(addresses)
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// Checks that the sender signatures satisfy `account_key` for the role the
/// transaction type exercises (account updates use the account-update role,
/// everything else the transaction role).
pub fn verify_sender(
    tx: &Transaction,
    account_key: &AccountKey,
    chain_id: u64,
) -> Result<(), VerificationError> {
    let signers: HashSet<Address> = recover_sender_addresses(tx, chain_id)?.into_iter().collect();
    let role = match tx.tx_type.family() {
        TxFamily::AccountUpdate => Role::AccountUpdate,
        _ => Role::Transaction,
    };
    if account_key.authorizes(tx.from, &signers, role) {
        Ok(())
    } else {
        Err(VerificationError::InsufficientAuthorization {
            account: tx.from,
            role,
        })
    }
}

/// Checks that the fee-payer signatures satisfy `account_key` for the
/// fee-payer role of the named fee payer.
pub fn verify_fee_payer(
    tx: &Transaction,
    account_key: &AccountKey,
    chain_id: u64,
) -> Result<(), VerificationError> {
    let payer = tx
        .fee_payer
        .ok_or(VerificationError::MissingFeePayerSignature)?;
    let signers: HashSet<Address> = recover_fee_payer_addresses(tx, chain_id)?
        .into_iter()
        .collect();
    if account_key.authorizes(payer, &signers, Role::FeePayer) {
        Ok(())
    } else {
        Err(VerificationError::InsufficientAuthorization {
            account: payer,
            role: Role::FeePayer,
        })
    }
}

// ---------------------------------------------------------------------------
// Signature merging
// ---------------------------------------------------------------------------

/// Folds the signatures of `other` — an independently signed copy of the
/// same envelope — into `tx`.
///
/// The two envelopes must agree on every field outside the signature lists
/// and the fee payer (a sender-side copy legitimately has no fee payer yet;
/// two *different* named fee payers do not merge). Signatures are appended
/// in `other`'s order; the list-level duplicate policy applies, so merging
/// overlapping copies duplicates the overlap.
pub fn merge_signatures(
    tx: &mut Transaction,
    other: &Transaction,
) -> Result<(), VerificationError> {
    let strip = |t: &Transaction| {
        let mut bare = t.clone();
        bare.signatures = SignatureList::new();
        bare.fee_payer_signatures = SignatureList::new();
        bare.fee_payer = None;
        bare
    };
    if strip(tx) != strip(other) {
        return Err(VerificationError::MismatchedTransactions);
    }
    if let (Some(ours), Some(theirs)) = (tx.fee_payer, other.fee_payer) {
        if ours != theirs {
            return Err(VerificationError::MismatchedTransactions);
        }
    }

    if tx.fee_payer.is_none() {
        tx.fee_payer = other.fee_payer;
    }
    tx.signatures = tx.signatures.append_all(&other.signatures);
    tx.fee_payer_signatures = tx.fee_payer_signatures.append_all(&other.fee_payer_signatures);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::WeightedPublicKey;
    use crate::crypto::keys::HelixKeypair;
    use crate::transaction::signing::{sign_as_fee_payer, sign_transaction};
    use crate::transaction::TransactionType;
    use alloy_primitives::U256;

    const CHAIN: u64 = 1;

    fn transfer(tx_type: TransactionType, from: Address) -> Transaction {
        Transaction::builder(tx_type)
            .nonce(3)
            .gas_price(25)
            .gas(90_000)
            .from(from)
            .to(Address::repeat_byte(0xbb))
            .value(U256::from(42u64))
            .build()
            .unwrap()
    }

    #[test]
    fn recovers_the_signing_key_address() {
        let kp = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, kp.address());
        sign_transaction(&mut tx, &kp, CHAIN).unwrap();
        assert_eq!(
            recover_sender_addresses(&tx, CHAIN).unwrap(),
            vec![kp.address()]
        );
    }

    #[test]
    fn unsigned_transaction_has_nothing_to_recover() {
        let tx = transfer(TransactionType::ValueTransfer, Address::repeat_byte(0xaa));
        assert!(matches!(
            recover_sender_addresses(&tx, CHAIN),
            Err(VerificationError::MissingSignature)
        ));
    }

    #[test]
    fn chain_id_mismatch_is_reported() {
        let kp = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, kp.address());
        sign_transaction(&mut tx, &kp, CHAIN).unwrap();
        assert!(matches!(
            recover_sender_addresses(&tx, 2),
            Err(VerificationError::ChainIdMismatch {
                index: 0,
                got: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn legacy_key_sender_verifies() {
        let kp = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, kp.address());
        sign_transaction(&mut tx, &kp, CHAIN).unwrap();
        verify_sender(&tx, &AccountKey::Legacy, CHAIN).unwrap();
    }

    #[test]
    fn wrong_signer_fails_authorization() {
        let account = HelixKeypair::generate();
        let intruder = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, account.address());
        sign_transaction(&mut tx, &intruder, CHAIN).unwrap();
        assert!(matches!(
            verify_sender(&tx, &AccountKey::Legacy, CHAIN),
            Err(VerificationError::InsufficientAuthorization { .. })
        ));
    }

    #[test]
    fn multisig_two_of_three_via_merge() {
        let (a, b, c) = (
            HelixKeypair::generate(),
            HelixKeypair::generate(),
            HelixKeypair::generate(),
        );
        let account = HelixKeypair::generate().address();
        let key = AccountKey::weighted_multi_sig(
            2,
            vec![
                WeightedPublicKey::new(1, a.public_key()),
                WeightedPublicKey::new(1, b.public_key()),
                WeightedPublicKey::new(1, c.public_key()),
            ],
        )
        .unwrap();

        let base = transfer(TransactionType::ValueTransfer, account);

        // Each co-signer works on an independent copy.
        let mut copy_a = base.clone();
        sign_transaction(&mut copy_a, &a, CHAIN).unwrap();
        let mut copy_b = base.clone();
        sign_transaction(&mut copy_b, &b, CHAIN).unwrap();

        // One signature is not enough...
        assert!(verify_sender(&copy_a, &key, CHAIN).is_err());

        // ...two merged copies are.
        merge_signatures(&mut copy_a, &copy_b).unwrap();
        assert_eq!(copy_a.signatures.len(), 2);
        verify_sender(&copy_a, &key, CHAIN).unwrap();
    }

    #[test]
    fn merge_rejects_differing_envelopes() {
        let kp = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, kp.address());
        let mut other = transfer(TransactionType::ValueTransfer, kp.address());
        other.nonce += 1;
        sign_transaction(&mut other, &kp, CHAIN).unwrap();
        assert!(matches!(
            merge_signatures(&mut tx, &other),
            Err(VerificationError::MismatchedTransactions)
        ));
    }

    #[test]
    fn fee_payer_verifies_under_fee_payer_role() {
        let sender = HelixKeypair::generate();
        let payer = HelixKeypair::generate();
        let mut tx = Transaction::builder(TransactionType::FeeDelegatedValueTransfer)
            .nonce(3)
            .gas_price(25)
            .gas(90_000)
            .from(sender.address())
            .to(Address::repeat_byte(0xbb))
            .value(U256::from(42u64))
            .build()
            .unwrap();
        sign_transaction(&mut tx, &sender, CHAIN).unwrap();
        sign_as_fee_payer(&mut tx, &payer, CHAIN).unwrap();

        assert_eq!(
            recover_fee_payer_addresses(&tx, CHAIN).unwrap(),
            vec![payer.address()]
        );
        verify_fee_payer(&tx, &AccountKey::Legacy, CHAIN).unwrap();
        // The sender list still verifies independently.
        verify_sender(&tx, &AccountKey::Legacy, CHAIN).unwrap();
    }

    #[test]
    fn fail_key_authorizes_nobody() {
        let kp = HelixKeypair::generate();
        let mut tx = transfer(TransactionType::ValueTransfer, kp.address());
        sign_transaction(&mut tx, &kp, CHAIN).unwrap();
        assert!(matches!(
            verify_sender(&tx, &AccountKey::Fail, CHAIN),
            Err(VerificationError::InsufficientAuthorization { .. })
        ));
    }
}
