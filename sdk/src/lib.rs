// Copyright (c) 2026 Helix Labs. MIT License.
// See LICENSE for details.

//! # Helix SDK — Core Library
//!
//! Client-side SDK for the Helix network: build a transaction, collect the
//! signatures it needs, serialize it byte-for-byte the way a node expects,
//! and decode raw transactions back into fully typed envelopes.
//!
//! The interesting part of Helix, and of this crate, is that neither
//! "transaction" nor "signer" is one thing:
//!
//! - Nineteen transaction types — six base operations, each in plain,
//!   fee-delegated, and fee-delegated-with-ratio form — each with its own
//!   order-sensitive wire layout behind a single leading tag byte.
//! - A polymorphic account-key model: an address may be governed by its
//!   implicit key, one explicit key, a weighted multi-signature set, or
//!   per-role keys, and the set of signatures a transaction needs follows
//!   from that, not from the address.
//! - Two independent signature lists per fee-delegated transaction, filled
//!   in at different times by different parties, with the fee payer
//!   cryptographically committing to what the sender already signed.
//!
//! ## Architecture
//!
//! - **crypto** — keypairs, Keccak-256, and the `(v, r, s)` signature
//!   machinery. Thin wrappers over audited implementations; nothing here
//!   is hand-rolled cryptography.
//! - **account** — the account-key model and its authorization semantics.
//! - **transaction** — envelope, type registry, wire codec, signers, and
//!   verification.
//! - **config** — protocol constants shared with the network.
//!
//! Out of scope by design: JSON-RPC transport, ABI encoding, and keystore
//! files. This crate produces and consumes their inputs and outputs but
//! holds no sockets, no ABIs, and no key files.
//!
//! ## Design philosophy
//!
//! 1. Canonical bytes or no bytes — a codec that is "almost" what the node
//!    parses is a codec that burns funds.
//! 2. Fail at construction, not on the wire: unsatisfiable keys and
//!    out-of-range ratios never make it into an envelope.
//! 3. Pure core: encoding, decoding, and authorization are synchronous,
//!    side-effect-free functions you can call from anywhere.
//! 4. If it touches signing, it has tests against pinned vectors.

pub mod account;
pub mod config;
pub mod crypto;
pub mod transaction;
