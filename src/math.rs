//! Fixed-point arithmetic for reward-per-share accounting.
//!
//! The accumulator stores reward per unit of stake scaled by `PRECISION`:
//!
//! ```text
//! Δacc    = reward × PRECISION / total_staked
//! accrued = staked × (acc − checkpoint) / PRECISION
//! ```
//!
//! Both divisions round down, so stakers can never be credited more than was emitted.
//! All products go through checked `U256` multiplication.

use odra::casper_types::U256;

use crate::errors::AccountingError;

/// Accumulator scaling factor (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

fn precision() -> U256 {
    U256::from(PRECISION)
}

/// Reward emitted at `rate_per_block` over `blocks` blocks.
pub fn emitted(rate_per_block: U256, blocks: u64) -> Result<U256, AccountingError> {
    rate_per_block
        .checked_mul(U256::from(blocks))
        .ok_or(AccountingError::Overflow)
}

/// Accumulator increase when `reward` is spread over `total_staked` units.
/// Zero when nothing is staked.
pub fn reward_per_share_delta(reward: U256, total_staked: U256) -> Result<U256, AccountingError> {
    if total_staked.is_zero() {
        return Ok(U256::zero());
    }
    reward
        .checked_mul(precision())
        .map(|scaled| scaled / total_staked)
        .ok_or(AccountingError::Overflow)
}

/// Reward owed to `staked` units for an accumulator move from `checkpoint` to `accumulator`.
pub fn accrued(staked: U256, accumulator: U256, checkpoint: U256) -> Result<U256, AccountingError> {
    let delta = accumulator
        .checked_sub(checkpoint)
        .ok_or(AccountingError::StaleCheckpoint)?;
    staked
        .checked_mul(delta)
        .map(|scaled| scaled / precision())
        .ok_or(AccountingError::Overflow)
}

/// Per-block rate that spreads `total` evenly over `blocks`, rounding down.
pub fn rate_over(total: U256, blocks: u64) -> Result<U256, AccountingError> {
    if blocks == 0 {
        return Err(AccountingError::InvalidDuration);
    }
    Ok(total / U256::from(blocks))
}

pub fn checked_add(a: U256, b: U256) -> Result<U256, AccountingError> {
    a.checked_add(b).ok_or(AccountingError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    fn wad(n: u64) -> U256 {
        U256::from(n) * U256::from(WAD)
    }

    #[test]
    fn delta_is_zero_without_stakers() {
        assert_eq!(reward_per_share_delta(wad(100), U256::zero()), Ok(U256::zero()));
    }

    #[test]
    fn delta_keeps_precision_for_small_share() {
        // 1 wei of reward over 1e18 staked still moves the accumulator by 1
        let delta = reward_per_share_delta(U256::one(), wad(1)).unwrap();
        assert_eq!(delta, U256::one());
    }

    #[test]
    fn accrued_matches_emission_for_sole_staker() {
        // 100e18 over 3000 blocks, 21 blocks, 10e18 staked
        let rate = rate_over(wad(100), 3000).unwrap();
        assert_eq!(rate, U256::from(33_333_333_333_333_333u64));

        let reward = emitted(rate, 21).unwrap();
        let acc = reward_per_share_delta(reward, wad(10)).unwrap();
        let owed = accrued(wad(10), acc, U256::zero()).unwrap();
        assert_eq!(owed, U256::from(699_999_999_999_999_990u64));
        assert!(owed <= reward);
    }

    #[test]
    fn accrued_rejects_checkpoint_ahead_of_accumulator() {
        assert_eq!(
            accrued(wad(1), U256::from(5u64), U256::from(6u64)),
            Err(AccountingError::StaleCheckpoint)
        );
    }

    #[test]
    fn emitted_overflow_is_reported() {
        assert_eq!(emitted(U256::MAX, 2), Err(AccountingError::Overflow));
        assert_eq!(
            reward_per_share_delta(U256::MAX, U256::one()),
            Err(AccountingError::Overflow)
        );
    }

    #[test]
    fn rate_over_zero_blocks_is_invalid() {
        assert_eq!(rate_over(wad(1), 0), Err(AccountingError::InvalidDuration));
    }
}
