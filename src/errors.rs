//! Error types.
//!
//! - `AccountingError`: returned by the pure accounting core (`math`, `scheduler`, `ledger`).
//! - `StakingError`: contract error codes surfaced through `env().revert(..)`.

use odra::prelude::*;

/// Failure of a pure accounting step. Never panics, never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingError {
    /// Zero amount where a positive amount is required
    InvalidAmount,
    /// Zero-length funding window
    InvalidDuration,
    /// Decrease larger than the staker's current stake
    InsufficientStake,
    /// Checked U256/u64 arithmetic overflowed
    Overflow,
    /// Stake changed without settling against the current accumulator first
    StaleCheckpoint,
}

/// Errors for PilotStaking operations
#[odra::odra_error]
pub enum StakingError {
    InvalidAmount = 1,
    InsufficientStake = 2,
    InsufficientFunds = 3,
    Unauthorized = 4,
    InvalidDuration = 5,
    Overflow = 6,
    ContractPaused = 7,
    InvalidConfig = 8,
    NotConfigured = 9,
    StaleCheckpoint = 10,
}

impl From<AccountingError> for StakingError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::InvalidAmount => StakingError::InvalidAmount,
            AccountingError::InvalidDuration => StakingError::InvalidDuration,
            AccountingError::InsufficientStake => StakingError::InsufficientStake,
            AccountingError::Overflow => StakingError::Overflow,
            AccountingError::StaleCheckpoint => StakingError::StaleCheckpoint,
        }
    }
}
