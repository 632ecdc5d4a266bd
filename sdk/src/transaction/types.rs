//! Transaction type registry and the small value types that ride along with
//! it.
//!
//! Every Helix transaction belongs to exactly one [`TransactionType`], and
//! every type owns exactly one wire tag — the mapping is bijective in both
//! directions, checked by exhaustive matches the compiler refuses to let
//! drift. The registry also records, per type, which envelope fields must
//! and must not be populated; the builder consults it at construction time
//! and the codec consults it again before writing bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{MAX_FEE_RATIO, MIN_FEE_RATIO};

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The closed family of Helix transaction types.
///
/// Six base operations, each with a fee-delegated form (a second party pays
/// gas) and a partial-fee-delegated form (gas split by ratio), plus the
/// tagless legacy format kept for compatibility with pre-typed tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Pre-typed transaction: plain value transfer or contract interaction,
    /// encoded without a leading tag byte.
    Legacy,
    /// Plain value transfer.
    ValueTransfer,
    /// Value transfer, gas paid by a fee payer.
    FeeDelegatedValueTransfer,
    /// Value transfer, gas split between sender and fee payer.
    FeeDelegatedValueTransferWithRatio,
    /// Value transfer carrying an opaque memo.
    ValueTransferMemo,
    /// Memo transfer, gas paid by a fee payer.
    FeeDelegatedValueTransferMemo,
    /// Memo transfer, gas split by ratio.
    FeeDelegatedValueTransferMemoWithRatio,
    /// Replaces the account key registered for the sender.
    AccountUpdate,
    /// Account update, gas paid by a fee payer.
    FeeDelegatedAccountUpdate,
    /// Account update, gas split by ratio.
    FeeDelegatedAccountUpdateWithRatio,
    /// Deploys contract bytecode.
    SmartContractDeploy,
    /// Contract deploy, gas paid by a fee payer.
    FeeDelegatedSmartContractDeploy,
    /// Contract deploy, gas split by ratio.
    FeeDelegatedSmartContractDeployWithRatio,
    /// Executes a deployed contract with call data.
    SmartContractExecution,
    /// Contract execution, gas paid by a fee payer.
    FeeDelegatedSmartContractExecution,
    /// Contract execution, gas split by ratio.
    FeeDelegatedSmartContractExecutionWithRatio,
    /// Withdraws a pending transaction with the same nonce from the pool.
    Cancel,
    /// Cancel, gas paid by a fee payer.
    FeeDelegatedCancel,
    /// Cancel, gas split by ratio.
    FeeDelegatedCancelWithRatio,
}

/// The field families a transaction body is assembled from. Internal to the
/// codec and the builder's shape validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TxFamily {
    Legacy,
    ValueTransfer,
    ValueTransferMemo,
    AccountUpdate,
    SmartContractDeploy,
    SmartContractExecution,
    Cancel,
}

/// Whether a type-conditional envelope field must be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldRule {
    Required,
    Optional,
    Forbidden,
}

/// Per-type field requirements, consulted by the builder and the codec.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldProfile {
    pub to: FieldRule,
    pub value: FieldRule,
    pub payload: FieldRule,
    pub account_key: FieldRule,
    pub deploy_markers: FieldRule,
}

impl TransactionType {
    /// All types, in tag order. Handy for exhaustive tests and registries.
    pub const ALL: [TransactionType; 19] = [
        TransactionType::Legacy,
        TransactionType::ValueTransfer,
        TransactionType::FeeDelegatedValueTransfer,
        TransactionType::FeeDelegatedValueTransferWithRatio,
        TransactionType::ValueTransferMemo,
        TransactionType::FeeDelegatedValueTransferMemo,
        TransactionType::FeeDelegatedValueTransferMemoWithRatio,
        TransactionType::AccountUpdate,
        TransactionType::FeeDelegatedAccountUpdate,
        TransactionType::FeeDelegatedAccountUpdateWithRatio,
        TransactionType::SmartContractDeploy,
        TransactionType::FeeDelegatedSmartContractDeploy,
        TransactionType::FeeDelegatedSmartContractDeployWithRatio,
        TransactionType::SmartContractExecution,
        TransactionType::FeeDelegatedSmartContractExecution,
        TransactionType::FeeDelegatedSmartContractExecutionWithRatio,
        TransactionType::Cancel,
        TransactionType::FeeDelegatedCancel,
        TransactionType::FeeDelegatedCancelWithRatio,
    ];

    /// The one-byte wire tag. Legacy nominally owns `0x00`; on the wire a
    /// legacy transaction is recognized by its RLP list prefix instead of a
    /// tag byte.
    pub const fn tag(self) -> u8 {
        match self {
            TransactionType::Legacy => 0x00,
            TransactionType::ValueTransfer => 0x08,
            TransactionType::FeeDelegatedValueTransfer => 0x09,
            TransactionType::FeeDelegatedValueTransferWithRatio => 0x0a,
            TransactionType::ValueTransferMemo => 0x10,
            TransactionType::FeeDelegatedValueTransferMemo => 0x11,
            TransactionType::FeeDelegatedValueTransferMemoWithRatio => 0x12,
            TransactionType::AccountUpdate => 0x20,
            TransactionType::FeeDelegatedAccountUpdate => 0x21,
            TransactionType::FeeDelegatedAccountUpdateWithRatio => 0x22,
            TransactionType::SmartContractDeploy => 0x28,
            TransactionType::FeeDelegatedSmartContractDeploy => 0x29,
            TransactionType::FeeDelegatedSmartContractDeployWithRatio => 0x2a,
            TransactionType::SmartContractExecution => 0x30,
            TransactionType::FeeDelegatedSmartContractExecution => 0x31,
            TransactionType::FeeDelegatedSmartContractExecutionWithRatio => 0x32,
            TransactionType::Cancel => 0x38,
            TransactionType::FeeDelegatedCancel => 0x39,
            TransactionType::FeeDelegatedCancelWithRatio => 0x3a,
        }
    }

    /// Looks a typed transaction up by its wire tag.
    ///
    /// `None` for unknown tags and for `0x00` — legacy transactions never
    /// put their nominal tag on the wire, so accepting it here would let a
    /// forged prefix masquerade as a valid envelope.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x08 => Some(TransactionType::ValueTransfer),
            0x09 => Some(TransactionType::FeeDelegatedValueTransfer),
            0x0a => Some(TransactionType::FeeDelegatedValueTransferWithRatio),
            0x10 => Some(TransactionType::ValueTransferMemo),
            0x11 => Some(TransactionType::FeeDelegatedValueTransferMemo),
            0x12 => Some(TransactionType::FeeDelegatedValueTransferMemoWithRatio),
            0x20 => Some(TransactionType::AccountUpdate),
            0x21 => Some(TransactionType::FeeDelegatedAccountUpdate),
            0x22 => Some(TransactionType::FeeDelegatedAccountUpdateWithRatio),
            0x28 => Some(TransactionType::SmartContractDeploy),
            0x29 => Some(TransactionType::FeeDelegatedSmartContractDeploy),
            0x2a => Some(TransactionType::FeeDelegatedSmartContractDeployWithRatio),
            0x30 => Some(TransactionType::SmartContractExecution),
            0x31 => Some(TransactionType::FeeDelegatedSmartContractExecution),
            0x32 => Some(TransactionType::FeeDelegatedSmartContractExecutionWithRatio),
            0x38 => Some(TransactionType::Cancel),
            0x39 => Some(TransactionType::FeeDelegatedCancel),
            0x3a => Some(TransactionType::FeeDelegatedCancelWithRatio),
            _ => None,
        }
    }

    /// `true` when the type carries a fee payer and a fee-payer signature
    /// slot.
    pub const fn is_fee_delegated(self) -> bool {
        matches!(
            self,
            TransactionType::FeeDelegatedValueTransfer
                | TransactionType::FeeDelegatedValueTransferWithRatio
                | TransactionType::FeeDelegatedValueTransferMemo
                | TransactionType::FeeDelegatedValueTransferMemoWithRatio
                | TransactionType::FeeDelegatedAccountUpdate
                | TransactionType::FeeDelegatedAccountUpdateWithRatio
                | TransactionType::FeeDelegatedSmartContractDeploy
                | TransactionType::FeeDelegatedSmartContractDeployWithRatio
                | TransactionType::FeeDelegatedSmartContractExecution
                | TransactionType::FeeDelegatedSmartContractExecutionWithRatio
                | TransactionType::FeeDelegatedCancel
                | TransactionType::FeeDelegatedCancelWithRatio
        )
    }

    /// `true` when the type carries a fee ratio (gas split by percentage).
    pub const fn has_fee_ratio(self) -> bool {
        matches!(
            self,
            TransactionType::FeeDelegatedValueTransferWithRatio
                | TransactionType::FeeDelegatedValueTransferMemoWithRatio
                | TransactionType::FeeDelegatedAccountUpdateWithRatio
                | TransactionType::FeeDelegatedSmartContractDeployWithRatio
                | TransactionType::FeeDelegatedSmartContractExecutionWithRatio
                | TransactionType::FeeDelegatedCancelWithRatio
        )
    }

    /// The body field family shared by a type and its fee-delegated forms.
    pub(crate) const fn family(self) -> TxFamily {
        match self {
            TransactionType::Legacy => TxFamily::Legacy,
            TransactionType::ValueTransfer
            | TransactionType::FeeDelegatedValueTransfer
            | TransactionType::FeeDelegatedValueTransferWithRatio => TxFamily::ValueTransfer,
            TransactionType::ValueTransferMemo
            | TransactionType::FeeDelegatedValueTransferMemo
            | TransactionType::FeeDelegatedValueTransferMemoWithRatio => {
                TxFamily::ValueTransferMemo
            }
            TransactionType::AccountUpdate
            | TransactionType::FeeDelegatedAccountUpdate
            | TransactionType::FeeDelegatedAccountUpdateWithRatio => TxFamily::AccountUpdate,
            TransactionType::SmartContractDeploy
            | TransactionType::FeeDelegatedSmartContractDeploy
            | TransactionType::FeeDelegatedSmartContractDeployWithRatio => {
                TxFamily::SmartContractDeploy
            }
            TransactionType::SmartContractExecution
            | TransactionType::FeeDelegatedSmartContractExecution
            | TransactionType::FeeDelegatedSmartContractExecutionWithRatio => {
                TxFamily::SmartContractExecution
            }
            TransactionType::Cancel
            | TransactionType::FeeDelegatedCancel
            | TransactionType::FeeDelegatedCancelWithRatio => TxFamily::Cancel,
        }
    }

    /// The field requirements the builder enforces and the codec re-checks.
    pub(crate) const fn profile(self) -> FieldProfile {
        use FieldRule::{Forbidden, Optional, Required};
        match self.family() {
            TxFamily::Legacy => FieldProfile {
                to: Optional, // absent for contract creation
                value: Required,
                payload: Optional,
                account_key: Forbidden,
                deploy_markers: Forbidden,
            },
            TxFamily::ValueTransfer => FieldProfile {
                to: Required,
                value: Required,
                payload: Forbidden,
                account_key: Forbidden,
                deploy_markers: Forbidden,
            },
            TxFamily::ValueTransferMemo => FieldProfile {
                to: Required,
                value: Required,
                payload: Required,
                account_key: Forbidden,
                deploy_markers: Forbidden,
            },
            TxFamily::AccountUpdate => FieldProfile {
                to: Forbidden,
                value: Forbidden,
                payload: Forbidden,
                account_key: Required,
                deploy_markers: Forbidden,
            },
            TxFamily::SmartContractDeploy => FieldProfile {
                to: Optional, // populated only for pre-allocated addresses
                value: Required,
                payload: Required,
                account_key: Forbidden,
                deploy_markers: Required,
            },
            TxFamily::SmartContractExecution => FieldProfile {
                to: Required,
                value: Required,
                payload: Required,
                account_key: Forbidden,
                deploy_markers: Forbidden,
            },
            TxFamily::Cancel => FieldProfile {
                to: Forbidden,
                value: Forbidden,
                payload: Forbidden,
                account_key: Forbidden,
                deploy_markers: Forbidden,
            },
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------------------------------------------------
// CodeFormat
// ---------------------------------------------------------------------------

/// Executable format of deployed contract bytecode.
///
/// Only the EVM format exists today; the field is on the wire so new
/// formats can be introduced without a new transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeFormat {
    /// EVM bytecode.
    #[default]
    Evm,
}

impl CodeFormat {
    /// Wire value of this format.
    pub const fn as_u8(self) -> u8 {
        match self {
            CodeFormat::Evm => 0x00,
        }
    }

    /// Looks a format up by wire value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(CodeFormat::Evm),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// FeeRatio
// ---------------------------------------------------------------------------

/// The fee ratio is outside the admissible 1..=99 percent range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("fee ratio must be between {MIN_FEE_RATIO} and {MAX_FEE_RATIO} percent, got {0}")]
pub struct InvalidFeeRatio(pub u8);

/// Percentage of gas cost charged to the fee payer, strictly within 1..=99.
///
/// The bounds are enforced here, at construction — an envelope can never
/// hold an out-of-range ratio long enough to reach the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeeRatio(u8);

impl FeeRatio {
    /// Validates and wraps a ratio percentage.
    pub fn new(percent: u8) -> Result<Self, InvalidFeeRatio> {
        if (MIN_FEE_RATIO..=MAX_FEE_RATIO).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(InvalidFeeRatio(percent))
        }
    }

    /// The ratio as a plain percentage.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FeeRatio {
    type Error = InvalidFeeRatio;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeRatio> for u8 {
    fn from(ratio: FeeRatio) -> u8 {
        ratio.0
    }
}

impl fmt::Display for FeeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
