//! # Transaction Module
//!
//! Construction, canonical encoding, signing, and verification of Helix
//! transactions. Every value transfer, account-key update, contract deploy,
//! contract call, and cancellation on the network is represented as a
//! [`Transaction`] envelope of one of nineteen registered types.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TransactionType registry, CodeFormat, FeeRatio
//! builder.rs      — Transaction envelope + fluent TransactionBuilder
//! codec.rs        — canonical RLP wire codec (encode / decode)
//! signing.rs      — sender and fee-payer signing
//! verification.rs — signer recovery, authorization, signature merging
//! ```
//!
//! ## Transaction lifecycle
//!
//! 1. **Build** — assemble the fields with [`TransactionBuilder`]; `nonce`
//!    and `gas_price` usually come from the node RPC collaborator.
//! 2. **Sign** — [`sign_transaction`] appends sender signatures; for
//!    fee-delegated types, [`sign_as_fee_payer`] appends the fee payer's.
//! 3. **Encode** — [`Transaction::raw_transaction`] yields the hex form a
//!    `sendRawTransaction`-style RPC call expects.
//! 4. **Decode** — [`decode`] reconstructs the exact envelope from raw
//!    bytes, signature lists and all, dispatching on the leading type tag.
//!
//! ## Design decisions
//!
//! - One envelope struct with type-conditional optional fields, policed by
//!   the per-type field profile at build *and* encode time. The profile
//!   table in `types.rs` is the single place a new type gets wired in.
//! - Signing never needs the network: digests bind the chain id, which is
//!   all the replay protection the format has (and all it needs).
//! - The fee-payer digest covers the sender signature list, so a collected
//!   fee-payer signature pins the sender-signed content.

pub mod builder;
pub mod codec;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{Transaction, TransactionBuilder, ValidationError};
pub use codec::{decode, decode_hex, encode, CodecError};
pub use signing::{sign_as_fee_payer, sign_transaction, SignError};
pub use types::{CodeFormat, FeeRatio, InvalidFeeRatio, TransactionType};
pub use verification::{
    merge_signatures, recover_fee_payer_addresses, recover_sender_addresses, verify_fee_payer,
    verify_sender, VerificationError,
};
