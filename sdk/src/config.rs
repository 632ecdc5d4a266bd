//! # Protocol Constants
//!
//! Every magic number the SDK shares with the Helix network lives here.
//! If you find yourself hardcoding one of these somewhere else, stop —
//! the wire format does not forgive drift.

// ---------------------------------------------------------------------------
// Network identifiers
// ---------------------------------------------------------------------------

/// Chain id of the Helix mainnet. Folded into every signature's `v`
/// component, so a mainnet signature cannot be replayed elsewhere.
pub const MAINNET_CHAIN_ID: u64 = 9110;

/// Chain id of the public testnet.
pub const TESTNET_CHAIN_ID: u64 = 9111;

/// Chain id conventionally used by single-node development networks.
pub const DEVNET_CHAIN_ID: u64 = 1;

// ---------------------------------------------------------------------------
// Account model limits
// ---------------------------------------------------------------------------

/// Maximum number of weighted public keys in a multi-signature account key.
/// Matches the limit enforced by network nodes; a larger key set would be
/// rejected at account-update time anyway.
pub const MAX_WEIGHTED_KEYS: usize = 10;

/// Maximum number of role slots in a role-based account key
/// (transaction, account update, fee payer).
pub const MAX_ROLE_KEYS: usize = 3;

// ---------------------------------------------------------------------------
// Fee delegation
// ---------------------------------------------------------------------------

/// Lowest admissible fee ratio: the fee payer covers at least 1% of gas.
pub const MIN_FEE_RATIO: u8 = 1;

/// Highest admissible fee ratio: the fee payer covers at most 99% of gas.
/// A ratio of 100 would be plain fee delegation and has its own
/// transaction types.
pub const MAX_FEE_RATIO: u8 = 99;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_ratio_bounds_leave_room_for_both_parties() {
        assert!(MIN_FEE_RATIO >= 1);
        assert!(MAX_FEE_RATIO <= 99);
        assert!(MIN_FEE_RATIO < MAX_FEE_RATIO);
    }

    #[test]
    fn networks_are_distinct() {
        assert_ne!(MAINNET_CHAIN_ID, TESTNET_CHAIN_ID);
    }
}
