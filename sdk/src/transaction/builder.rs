//! The transaction envelope and its builder.
//!
//! A [`Transaction`] holds the common field set every type shares, the
//! type-conditional fields (recipient, value, payload, account key, deploy
//! markers, fee ratio), and the two signature lists. Which conditional
//! fields must be populated is decided by the type's field profile; the
//! builder enforces it at [`TransactionBuilder::build`], and the codec
//! re-checks before writing bytes, so an envelope that encodes is an
//! envelope whose shape the network will recognize.
//!
//! The builder does not sign — that happens in [`super::signing`], usually
//! on a different machine than the one that assembled the fields.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codec;
use super::types::{CodeFormat, FeeRatio, FieldRule, InvalidFeeRatio, TransactionType};
use crate::account::{AccountKey, AccountKeyError};
use crate::crypto::signatures::SignatureList;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The envelope's populated fields do not match what its type expects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field the type requires was left unset.
    #[error("{tx_type} requires the `{field}` field")]
    MissingField {
        tx_type: TransactionType,
        field: &'static str,
    },

    /// A field the type has no slot for was populated.
    #[error("{tx_type} does not carry the `{field}` field")]
    UnexpectedField {
        tx_type: TransactionType,
        field: &'static str,
    },

    /// The fee ratio is outside 1..=99.
    #[error(transparent)]
    FeeRatio(#[from] InvalidFeeRatio),

    /// The account key is structurally invalid (e.g. a standalone nil key).
    #[error(transparent)]
    AccountKey(#[from] AccountKeyError),
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A Helix transaction envelope.
///
/// Constructed with all non-signature fields populated, then mutated in
/// place by the signer(s) to append signatures, then encoded and handed to
/// the RPC collaborator for broadcast. `nonce` and `gas_price` are plain
/// fields precisely so callers can populate them from node queries before
/// signing.
///
/// Concurrency: signing is a read-modify-write over the signature lists, so
/// the signers take `&mut Transaction` — exclusive access is a compile-time
/// property, not a locking discipline. Clone the envelope if two parties
/// must work on it simultaneously, and combine the results with
/// [`super::verification::merge_signatures`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction's type; fixes the wire layout and signature slots.
    pub tx_type: TransactionType,
    /// Sender's sequence number, consumed on execution.
    pub nonce: u64,
    /// Unit price of gas the sender (and fee payer, if any) will pay.
    pub gas_price: u128,
    /// Maximum gas the transaction may consume.
    pub gas: u64,
    /// The sender.
    pub from: Address,
    /// Recipient, where the type has one.
    pub to: Option<Address>,
    /// Transferred amount in base units, where the type moves value.
    pub value: Option<U256>,
    /// Opaque bytes: memo, deploy bytecode, or contract call data. Produced
    /// by the ABI collaborator; never interpreted here.
    pub payload: Option<Bytes>,
    /// Replacement account key, on account-update types.
    pub account_key: Option<AccountKey>,
    /// Deploy marker: whether the contract address is human readable.
    pub human_readable: Option<bool>,
    /// Deploy marker: executable format of the bytecode.
    pub code_format: Option<CodeFormat>,
    /// Gas percentage charged to the fee payer, on `*WithRatio` types.
    pub fee_ratio: Option<FeeRatio>,
    /// The fee payer's address, once a fee payer has signed (or the caller
    /// pinned one in advance).
    pub fee_payer: Option<Address>,
    /// Sender signatures, in append order.
    pub signatures: SignatureList,
    /// Fee-payer signatures, non-empty only after an explicit fee-payer
    /// signing step.
    pub fee_payer_signatures: SignatureList,
}

impl Transaction {
    /// Starts a builder for the given type.
    pub fn builder(tx_type: TransactionType) -> TransactionBuilder {
        TransactionBuilder::new(tx_type)
    }

    /// `true` when this type carries a fee-payer signature slot.
    pub fn is_fee_delegated(&self) -> bool {
        self.tx_type.is_fee_delegated()
    }

    /// The canonical wire bytes. See [`super::codec::encode`].
    pub fn encode(&self) -> Result<Vec<u8>, codec::CodecError> {
        codec::encode(self)
    }

    /// The wire bytes as a `0x`-prefixed lowercase hex string, the form
    /// JSON-RPC transports expect.
    pub fn raw_transaction(&self) -> Result<String, codec::CodecError> {
        Ok(format!("0x{}", hex::encode(self.encode()?)))
    }

    /// Keccak-256 of the canonical wire bytes.
    pub fn transaction_hash(&self) -> Result<B256, codec::CodecError> {
        Ok(crate::crypto::hash::keccak256(&self.encode()?))
    }

    /// The sender-side transaction hash: for fee-delegated types, the hash
    /// of the envelope with its fee-payer fields reset, so sender tooling
    /// can track the transaction before the fee payer has co-signed. For
    /// everything else it equals [`Self::transaction_hash`].
    pub fn sender_tx_hash(&self) -> Result<B256, codec::CodecError> {
        if !self.is_fee_delegated() {
            return self.transaction_hash();
        }
        let mut stripped = self.clone();
        stripped.fee_payer = None;
        stripped.fee_payer_signatures = SignatureList::new();
        stripped.transaction_hash()
    }

    /// Checks the populated fields against the type's field profile.
    ///
    /// Called by the builder and again by the codec; decoding also funnels
    /// through construction, so a `Transaction` in the wild is expected to
    /// pass.
    pub(crate) fn validate_shape(&self) -> Result<(), ValidationError> {
        let profile = self.tx_type.profile();

        check_field(self.tx_type, "to", self.to.is_some(), profile.to)?;
        check_field(self.tx_type, "value", self.value.is_some(), profile.value)?;
        check_field(self.tx_type, "payload", self.payload.is_some(), profile.payload)?;
        check_field(
            self.tx_type,
            "account_key",
            self.account_key.is_some(),
            profile.account_key,
        )?;
        check_field(
            self.tx_type,
            "human_readable",
            self.human_readable.is_some(),
            profile.deploy_markers,
        )?;
        check_field(
            self.tx_type,
            "code_format",
            self.code_format.is_some(),
            profile.deploy_markers,
        )?;

        // Fee fields only exist on the delegated forms.
        let ratio_rule = if self.tx_type.has_fee_ratio() {
            FieldRule::Required
        } else {
            FieldRule::Forbidden
        };
        check_field(self.tx_type, "fee_ratio", self.fee_ratio.is_some(), ratio_rule)?;
        if !self.tx_type.is_fee_delegated() {
            check_field(
                self.tx_type,
                "fee_payer",
                self.fee_payer.is_some(),
                FieldRule::Forbidden,
            )?;
            if !self.fee_payer_signatures.is_empty() {
                return Err(ValidationError::UnexpectedField {
                    tx_type: self.tx_type,
                    field: "fee_payer_signatures",
                });
            }
        }

        if matches!(self.account_key, Some(AccountKey::Nil)) {
            return Err(AccountKeyError::StandaloneNil.into());
        }

        Ok(())
    }
}

fn check_field(
    tx_type: TransactionType,
    field: &'static str,
    populated: bool,
    rule: FieldRule,
) -> Result<(), ValidationError> {
    match rule {
        FieldRule::Required if !populated => Err(ValidationError::MissingField { tx_type, field }),
        FieldRule::Forbidden if populated => {
            Err(ValidationError::UnexpectedField { tx_type, field })
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`] envelopes.
///
/// # Usage
///
/// ```
/// use helix_sdk::transaction::{Transaction, TransactionType};
/// use alloy_primitives::{Address, U256};
///
/// let tx = Transaction::builder(TransactionType::ValueTransfer)
///     .nonce(1)
///     .gas_price(25_000_000_000)
///     .gas(21_000)
///     .from(Address::ZERO)
///     .to(Address::repeat_byte(0x11))
///     .value(U256::from(10u64))
///     .build()
///     .unwrap();
/// assert!(tx.signatures.is_empty());
/// ```
///
/// `build()` validates the field profile and the fee-ratio bounds, so a
/// mis-shaped envelope fails here instead of at encode time.
pub struct TransactionBuilder {
    tx_type: TransactionType,
    nonce: u64,
    gas_price: u128,
    gas: u64,
    from: Address,
    to: Option<Address>,
    value: Option<U256>,
    payload: Option<Bytes>,
    account_key: Option<AccountKey>,
    human_readable: Option<bool>,
    code_format: Option<CodeFormat>,
    fee_ratio: Option<u8>,
    fee_payer: Option<Address>,
}

impl TransactionBuilder {
    /// Creates a builder for the given transaction type.
    pub fn new(tx_type: TransactionType) -> Self {
        Self {
            tx_type,
            nonce: 0,
            gas_price: 0,
            gas: 0,
            from: Address::ZERO,
            to: None,
            value: None,
            payload: None,
            account_key: None,
            human_readable: None,
            code_format: None,
            fee_ratio: None,
            fee_payer: None,
        }
    }

    /// Sets the sender's nonce, typically fetched from the node.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the gas price, typically fetched from the node.
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Sets the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Sets the sender address.
    pub fn from(mut self, from: Address) -> Self {
        self.from = from;
        self
    }

    /// Sets the recipient.
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Sets the transferred value in base units.
    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Attaches opaque payload bytes (memo, bytecode, or call data).
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the replacement account key for account-update types.
    pub fn account_key(mut self, key: AccountKey) -> Self {
        self.account_key = Some(key);
        self
    }

    /// Sets the deploy markers (human-readable flag and code format).
    pub fn deploy_markers(mut self, human_readable: bool, code_format: CodeFormat) -> Self {
        self.human_readable = Some(human_readable);
        self.code_format = Some(code_format);
        self
    }

    /// Sets the fee ratio percentage; validated at `build()`.
    pub fn fee_ratio(mut self, percent: u8) -> Self {
        self.fee_ratio = Some(percent);
        self
    }

    /// Pins the fee payer in advance. Usually left unset and adopted from
    /// the fee payer's key at signing time.
    pub fn fee_payer(mut self, fee_payer: Address) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Validates the assembled fields and produces an unsigned envelope.
    pub fn build(self) -> Result<Transaction, ValidationError> {
        let fee_ratio = self.fee_ratio.map(FeeRatio::new).transpose()?;
        let tx = Transaction {
            tx_type: self.tx_type,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas: self.gas,
            from: self.from,
            to: self.to,
            value: self.value,
            payload: self.payload,
            account_key: self.account_key,
            human_readable: self.human_readable,
            code_format: self.code_format,
            fee_ratio,
            fee_payer: self.fee_payer,
            signatures: SignatureList::new(),
            fee_payer_signatures: SignatureList::new(),
        };
        tx.validate_shape()?;
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
