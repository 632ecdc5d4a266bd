//! Canonical wire codec for transaction envelopes.
//!
//! Encoding is deterministic: the type tag first, then one RLP list holding
//! the body fields in the exact order the network's parsers read them,
//! then the signature lists. The same envelope always produces the same
//! bytes — there is no randomness and no non-canonical integer padding
//! anywhere in the pipeline, because a single differing byte is a different
//! transaction as far as a node is concerned.
//!
//! Decoding dispatches purely on the leading byte: a list prefix means a
//! legacy transaction, anything else must be a registered type tag. Corrupt
//! input is rejected wholesale — truncated payloads, trailing bytes, and
//! length prefixes that disagree with reality all fail; nothing is ever
//! partially populated or "best-effort" recovered.
//!
//! Body layouts per family (fee-delegated forms append `senderSigs,
//! feePayer, feePayerSigs`, ratio forms insert `feeRatio` after the body):
//!
//! ```text
//! ValueTransfer          [nonce, gasPrice, gas, to, value, from]
//! ValueTransferMemo      [nonce, gasPrice, gas, to, value, from, payload]
//! AccountUpdate          [nonce, gasPrice, gas, from, encodedAccountKey]
//! SmartContractDeploy    [nonce, gasPrice, gas, to?, value, from, payload,
//!                         humanReadable, codeFormat]
//! SmartContractExecution [nonce, gasPrice, gas, to, value, from, payload]
//! Cancel                 [nonce, gasPrice, gas, from]
//! Legacy                 [nonce, gasPrice, gas, to?, value, payload, v, r, s]
//! ```

use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, Header, EMPTY_STRING_CODE};
use thiserror::Error;
use tracing::trace;

use super::builder::{Transaction, ValidationError};
use super::types::{CodeFormat, FeeRatio, InvalidFeeRatio, TransactionType, TxFamily};
use crate::account::{AccountKey, AccountKeyError};
use crate::crypto::keys::KeyError;
use crate::crypto::signatures::{SignatureList, TxSignature};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Decode- and encode-time failures. All unrecoverable: the caller gets the
/// error, never a half-filled envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Nothing to decode.
    #[error("empty transaction payload")]
    EmptyInput,

    /// The leading byte names no registered transaction type.
    #[error("unknown transaction type tag {tag:#04x}")]
    UnknownTransactionType { tag: u8 },

    /// The byte stream is not the RLP structure the type demands
    /// (truncated input, bad length prefix, non-canonical integer, ...).
    #[error("malformed transaction encoding: {0}")]
    MalformedEncoding(#[from] alloy_rlp::Error),

    /// Bytes left over after a complete transaction was read.
    #[error("{remaining} trailing byte(s) after transaction payload")]
    TrailingBytes { remaining: usize },

    /// A recipient field that is neither empty nor 20 bytes.
    #[error("invalid recipient length: expected 0 or 20 bytes, got {got}")]
    InvalidAddressLength { got: usize },

    /// The deploy code-format byte names no known format.
    #[error("unknown code format {value:#04x}")]
    UnknownCodeFormat { value: u8 },

    /// The envelope's populated fields do not match its type.
    #[error(transparent)]
    Shape(#[from] ValidationError),

    /// The embedded account key failed to decode or validate.
    #[error(transparent)]
    AccountKey(#[from] AccountKeyError),

    /// A fee ratio outside 1..=99 appeared on the wire.
    #[error(transparent)]
    FeeRatio(#[from] InvalidFeeRatio),

    /// A legacy transaction must carry its single signature to be encoded.
    #[error("a legacy transaction must be signed before encoding")]
    UnsignedLegacy,

    /// Legacy transactions embed exactly one signature in the field list.
    #[error("a legacy transaction carries exactly one signature, found {count}")]
    LegacySignatureCount { count: usize },

    /// The sender of a legacy transaction could not be recovered from its
    /// embedded signature.
    #[error("cannot recover legacy sender: {0}")]
    LegacyRecovery(#[from] KeyError),

    /// The hex text form was not valid hex.
    #[error("invalid hex transaction: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes an envelope to its canonical wire bytes.
///
/// The envelope's shape is re-validated against its type's field profile
/// first, so a hand-mutated envelope cannot smuggle, say, a fee ratio into
/// a type that has no slot for one.
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    tx.validate_shape()?;
    match tx.tx_type {
        TransactionType::Legacy => encode_legacy(tx),
        _ => encode_typed(tx),
    }
}

/// Decodes canonical wire bytes back into an envelope.
pub fn decode(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let (&first, rest) = bytes.split_first().ok_or(CodecError::EmptyInput)?;
    trace!(tag = first, len = bytes.len(), "decoding transaction");
    if first >= 0xc0 {
        // An RLP list prefix: the tagless legacy layout.
        decode_legacy(bytes)
    } else {
        let tx_type = TransactionType::from_tag(first)
            .ok_or(CodecError::UnknownTransactionType { tag: first })?;
        decode_typed(tx_type, rest)
    }
}

/// Decodes a `0x`-prefixed (or bare) hex string, the JSON-RPC text form.
pub fn decode_hex(raw: &str) -> Result<Transaction, CodecError> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    decode(&hex::decode(stripped)?)
}

/// The inner signing payload of a typed transaction:
/// `RLP([tag, body..., (feeRatio)])`. Wrapped by the signer together with
/// the chain id (and, for fee payers, the sender signature list).
pub(crate) fn typed_signing_payload(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let mut payload = Vec::new();
    tx.tx_type.tag().encode(&mut payload);
    encode_body(tx, &mut payload)?;
    Ok(wrap_list(&payload))
}

/// The full legacy signing payload:
/// `RLP([nonce, gasPrice, gas, to, value, payload, chainId, 0, 0])`.
pub(crate) fn legacy_signing_payload(tx: &Transaction, chain_id: u64) -> Result<Vec<u8>, CodecError> {
    let mut payload = Vec::new();
    encode_legacy_core(tx, &mut payload)?;
    chain_id.encode(&mut payload);
    0u8.encode(&mut payload);
    0u8.encode(&mut payload);
    Ok(wrap_list(&payload))
}

fn encode_typed(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let mut payload = Vec::new();
    encode_body(tx, &mut payload)?;
    tx.signatures.encode(&mut payload);
    if tx.tx_type.is_fee_delegated() {
        // An unset fee payer is the zero address on the wire.
        tx.fee_payer.unwrap_or(Address::ZERO).encode(&mut payload);
        tx.fee_payer_signatures.encode(&mut payload);
    }

    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(tx.tx_type.tag());
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn encode_legacy(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let signature = match tx.signatures.len() {
        0 => return Err(CodecError::UnsignedLegacy),
        1 => tx.signatures.first().ok_or(CodecError::UnsignedLegacy)?,
        count => return Err(CodecError::LegacySignatureCount { count }),
    };

    let mut payload = Vec::new();
    encode_legacy_core(tx, &mut payload)?;
    signature.v().encode(&mut payload);
    signature.r().encode(&mut payload);
    signature.s().encode(&mut payload);
    Ok(wrap_list(&payload))
}

/// The legacy fields shared by the raw form and the signing payload:
/// `nonce, gasPrice, gas, to, value, payload`.
fn encode_legacy_core(tx: &Transaction, out: &mut Vec<u8>) -> Result<(), CodecError> {
    tx.nonce.encode(out);
    tx.gas_price.encode(out);
    tx.gas.encode(out);
    encode_optional_address(tx.to, out);
    required(tx, tx.value, "value")?.encode(out);
    tx.payload.clone().unwrap_or_default().encode(out);
    Ok(())
}

/// The type-specific body fields, in wire order, fee ratio included.
fn encode_body(tx: &Transaction, out: &mut Vec<u8>) -> Result<(), CodecError> {
    tx.nonce.encode(out);
    tx.gas_price.encode(out);
    tx.gas.encode(out);

    match tx.tx_type.family() {
        TxFamily::Legacy => unreachable!("legacy transactions use their own layout"),
        TxFamily::ValueTransfer => {
            required(tx, tx.to, "to")?.encode(out);
            required(tx, tx.value, "value")?.encode(out);
            tx.from.encode(out);
        }
        TxFamily::ValueTransferMemo | TxFamily::SmartContractExecution => {
            required(tx, tx.to, "to")?.encode(out);
            required(tx, tx.value, "value")?.encode(out);
            tx.from.encode(out);
            required(tx, tx.payload.clone(), "payload")?.encode(out);
        }
        TxFamily::AccountUpdate => {
            tx.from.encode(out);
            let key = required(tx, tx.account_key.clone(), "account_key")?;
            key.to_rlp_bytes()[..].encode(out);
        }
        TxFamily::SmartContractDeploy => {
            encode_optional_address(tx.to, out);
            required(tx, tx.value, "value")?.encode(out);
            tx.from.encode(out);
            required(tx, tx.payload.clone(), "payload")?.encode(out);
            required(tx, tx.human_readable, "human_readable")?.encode(out);
            required(tx, tx.code_format, "code_format")?.as_u8().encode(out);
        }
        TxFamily::Cancel => {
            tx.from.encode(out);
        }
    }

    if let Some(ratio) = tx.fee_ratio {
        ratio.get().encode(out);
    }
    Ok(())
}

fn encode_optional_address(addr: Option<Address>, out: &mut Vec<u8>) {
    match addr {
        Some(addr) => addr.encode(out),
        None => out.push(EMPTY_STRING_CODE),
    }
}

fn required<T>(tx: &Transaction, field: Option<T>, name: &'static str) -> Result<T, CodecError> {
    field.ok_or(CodecError::Shape(ValidationError::MissingField {
        tx_type: tx.tx_type,
        field: name,
    }))
}

pub(crate) fn wrap_list(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(payload);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_typed(tx_type: TransactionType, rest: &[u8]) -> Result<Transaction, CodecError> {
    let mut buf = rest;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString.into());
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    if buf.len() > header.payload_length {
        return Err(CodecError::TrailingBytes {
            remaining: buf.len() - header.payload_length,
        });
    }
    let mut body = &buf[..header.payload_length];

    let nonce = u64::decode(&mut body)?;
    let gas_price = u128::decode(&mut body)?;
    let gas = u64::decode(&mut body)?;

    let mut to = None;
    let mut value = None;
    let mut payload = None;
    let mut account_key = None;
    let mut human_readable = None;
    let mut code_format = None;
    let from;

    match tx_type.family() {
        TxFamily::Legacy => unreachable!("legacy transactions use their own layout"),
        TxFamily::ValueTransfer => {
            to = Some(Address::decode(&mut body)?);
            value = Some(U256::decode(&mut body)?);
            from = Address::decode(&mut body)?;
        }
        TxFamily::ValueTransferMemo | TxFamily::SmartContractExecution => {
            to = Some(Address::decode(&mut body)?);
            value = Some(U256::decode(&mut body)?);
            from = Address::decode(&mut body)?;
            payload = Some(Bytes::decode(&mut body)?);
        }
        TxFamily::AccountUpdate => {
            from = Address::decode(&mut body)?;
            let key_bytes = Bytes::decode(&mut body)?;
            account_key = Some(AccountKey::from_rlp_bytes(&key_bytes)?);
        }
        TxFamily::SmartContractDeploy => {
            to = decode_optional_address(&mut body)?;
            value = Some(U256::decode(&mut body)?);
            from = Address::decode(&mut body)?;
            payload = Some(Bytes::decode(&mut body)?);
            human_readable = Some(bool::decode(&mut body)?);
            let format = u8::decode(&mut body)?;
            code_format =
                Some(CodeFormat::from_u8(format).ok_or(CodecError::UnknownCodeFormat {
                    value: format,
                })?);
        }
        TxFamily::Cancel => {
            from = Address::decode(&mut body)?;
        }
    }

    let fee_ratio = if tx_type.has_fee_ratio() {
        Some(FeeRatio::new(u8::decode(&mut body)?)?)
    } else {
        None
    };

    let signatures = SignatureList::decode(&mut body)?;

    let (fee_payer, fee_payer_signatures) = if tx_type.is_fee_delegated() {
        let payer = Address::decode(&mut body)?;
        let payer_sigs = SignatureList::decode(&mut body)?;
        let payer = (payer != Address::ZERO).then_some(payer);
        (payer, payer_sigs)
    } else {
        (None, SignatureList::new())
    };

    if !body.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: body.len(),
        });
    }

    let tx = Transaction {
        tx_type,
        nonce,
        gas_price,
        gas,
        from,
        to,
        value,
        payload,
        account_key,
        human_readable,
        code_format,
        fee_ratio,
        fee_payer,
        signatures,
        fee_payer_signatures,
    };
    tx.validate_shape()?;
    Ok(tx)
}

fn decode_legacy(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let mut buf = bytes;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString.into());
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    if buf.len() > header.payload_length {
        return Err(CodecError::TrailingBytes {
            remaining: buf.len() - header.payload_length,
        });
    }
    let mut body = &buf[..header.payload_length];

    let nonce = u64::decode(&mut body)?;
    let gas_price = u128::decode(&mut body)?;
    let gas = u64::decode(&mut body)?;
    let to = decode_optional_address(&mut body)?;
    let value = U256::decode(&mut body)?;
    let payload = Bytes::decode(&mut body)?;
    let v = u64::decode(&mut body)?;
    let r = U256::decode(&mut body)?;
    let s = U256::decode(&mut body)?;
    if !body.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: body.len(),
        });
    }

    let signature = TxSignature::new(v, r, s);
    let payload = (!payload.is_empty()).then_some(payload);

    // The legacy layout has no `from` field; the sender is implicit in the
    // embedded signature and recovered here so the decoded envelope is
    // complete.
    let mut probe = Transaction {
        tx_type: TransactionType::Legacy,
        nonce,
        gas_price,
        gas,
        from: Address::ZERO,
        to,
        value: Some(value),
        payload,
        account_key: None,
        human_readable: None,
        code_format: None,
        fee_ratio: None,
        fee_payer: None,
        signatures: SignatureList::new().append(signature),
        fee_payer_signatures: SignatureList::new(),
    };
    probe.from = recover_legacy_sender(&probe, &signature)?;
    probe.validate_shape()?;
    Ok(probe)
}

fn recover_legacy_sender(
    tx: &Transaction,
    signature: &TxSignature,
) -> Result<Address, CodecError> {
    let digest_payload = match signature.chain_id() {
        Some(chain_id) => legacy_signing_payload(tx, chain_id)?,
        // Pre-chain-id signatures hash the six core fields alone.
        None => {
            let mut payload = Vec::new();
            encode_legacy_core(tx, &mut payload)?;
            wrap_list(&payload)
        }
    };
    let digest = crate::crypto::hash::keccak256(&digest_payload);
    Ok(signature.recover(digest)?)
}

fn decode_optional_address(buf: &mut &[u8]) -> Result<Option<Address>, CodecError> {
    let bytes = Bytes::decode(buf)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        got => Err(CodecError::InvalidAddressLength { got }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
