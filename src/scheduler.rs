//! Reward scheduler: the global reward-rate state and its accumulator.
//!
//! Every mutating entry point of the staking contract first calls [`advance`] with the
//! current block, then works on the returned copy and stores it back once the whole call
//! succeeds. Nothing here touches contract storage.

use odra::casper_types::U256;

use crate::errors::AccountingError;
use crate::math;

/// Global reward state, persisted as one record.
#[odra::odra_type]
#[derive(Default)]
pub struct RewardSchedule {
    /// Sum of all stakers' principal
    pub total_staked: U256,
    /// Reward per unit of stake since genesis, scaled by `math::PRECISION`. Never decreases.
    pub reward_per_share: U256,
    /// Reward emitted per block inside the current window
    pub reward_rate_per_block: U256,
    /// First block that no longer earns at `reward_rate_per_block`
    pub window_end_block: u64,
    /// Block the accumulator was last advanced to
    pub last_update_block: u64,
    pub total_reward_funded: U256,
    pub total_reward_paid: U256,
    /// Reward emitted while nothing was staked, re-emitted by the next funding
    pub undistributed_reward: U256,
}

impl RewardSchedule {
    /// Schedule of a freshly deployed contract whose clock starts at `block`.
    pub fn genesis(block: u64) -> Self {
        RewardSchedule {
            window_end_block: block,
            last_update_block: block,
            ..Default::default()
        }
    }

    /// Whether `block` still earns at the current rate.
    pub fn is_active(&self, block: u64) -> bool {
        block < self.window_end_block && !self.reward_rate_per_block.is_zero()
    }

    /// Reward still to be emitted by the current window after `block`.
    pub fn remaining_reward(&self, block: u64) -> Result<U256, AccountingError> {
        let remaining_blocks = self.window_end_block.saturating_sub(block);
        math::emitted(self.reward_rate_per_block, remaining_blocks)
    }
}

/// Advance the accumulator to `block`.
///
/// Blocks past `window_end_block` earn nothing. With nothing staked the emitted reward
/// goes to `undistributed_reward` instead of the accumulator.
pub fn advance(schedule: &RewardSchedule, block: u64) -> Result<RewardSchedule, AccountingError> {
    let mut next = schedule.clone();
    let applicable = block.min(schedule.window_end_block);
    let elapsed = applicable.saturating_sub(schedule.last_update_block);

    if elapsed > 0 && !schedule.reward_rate_per_block.is_zero() {
        let reward = math::emitted(schedule.reward_rate_per_block, elapsed)?;
        if schedule.total_staked.is_zero() {
            next.undistributed_reward = math::checked_add(schedule.undistributed_reward, reward)?;
        } else {
            let delta = math::reward_per_share_delta(reward, schedule.total_staked)?;
            next.reward_per_share = math::checked_add(schedule.reward_per_share, delta)?;
        }
    }

    next.last_update_block = schedule.last_update_block.max(block);
    Ok(next)
}

/// Start a new funding window of `duration_blocks` at `block` carrying `amount` new reward.
///
/// The window replaces any window in progress. Its unemitted remainder and any
/// `undistributed_reward` are folded into the new rate. What the per-block rate cannot
/// spread evenly is parked in `undistributed_reward` for the next funding.
pub fn fund(
    schedule: &RewardSchedule,
    amount: U256,
    duration_blocks: u64,
    block: u64,
) -> Result<RewardSchedule, AccountingError> {
    if duration_blocks == 0 {
        return Err(AccountingError::InvalidDuration);
    }
    if amount.is_zero() {
        return Err(AccountingError::InvalidAmount);
    }

    let mut next = advance(schedule, block)?;
    let leftover = next.remaining_reward(block)?;
    let carried = math::checked_add(leftover, next.undistributed_reward)?;
    let to_emit = math::checked_add(amount, carried)?;

    let rate = math::rate_over(to_emit, duration_blocks)?;
    let scheduled = math::emitted(rate, duration_blocks)?;

    next.reward_rate_per_block = rate;
    next.window_end_block = block
        .checked_add(duration_blocks)
        .ok_or(AccountingError::Overflow)?;
    next.total_reward_funded = math::checked_add(next.total_reward_funded, amount)?;
    next.undistributed_reward = to_emit - scheduled;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    fn wad(n: u64) -> U256 {
        U256::from(n) * U256::from(WAD)
    }

    fn funded() -> RewardSchedule {
        fund(&RewardSchedule::genesis(0), wad(100), 3000, 0).unwrap()
    }

    #[test]
    fn fund_sets_rate_and_window() {
        let s = funded();
        assert_eq!(s.reward_rate_per_block, U256::from(33_333_333_333_333_333u64));
        assert_eq!(s.window_end_block, 3000);
        assert_eq!(s.total_reward_funded, wad(100));
        // 100e18 - 3000 * rate
        assert_eq!(s.undistributed_reward, U256::from(1_000u64));
        assert!(s.is_active(0));
        assert!(!s.is_active(3000));
    }

    #[test]
    fn fund_rejects_zero_duration_and_amount() {
        let s = RewardSchedule::genesis(0);
        assert_eq!(fund(&s, wad(1), 0, 0), Err(AccountingError::InvalidDuration));
        assert_eq!(fund(&s, U256::zero(), 10, 0), Err(AccountingError::InvalidAmount));
    }

    #[test]
    fn idle_blocks_are_parked_not_accumulated() {
        let s = advance(&funded(), 20).unwrap();
        assert_eq!(s.reward_per_share, U256::zero());
        assert_eq!(s.last_update_block, 20);
        assert_eq!(s.undistributed_reward, U256::from(666_666_666_666_667_660u64));
    }

    #[test]
    fn advance_accumulates_for_stakers() {
        let mut s = funded();
        s.total_staked = wad(10);
        let s = advance(&s, 21).unwrap();
        assert_eq!(s.reward_per_share, U256::from(69_999_999_999_999_999u64));
        assert_eq!(s.undistributed_reward, funded().undistributed_reward);
    }

    #[test]
    fn advance_is_idempotent_within_a_block() {
        let mut s = funded();
        s.total_staked = wad(10);
        let once = advance(&s, 7).unwrap();
        let twice = advance(&once, 7).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn blocks_after_window_end_earn_nothing() {
        let mut s = funded();
        s.total_staked = wad(100);
        let at_end = advance(&s, 3000).unwrap();
        let later = advance(&at_end, 9000).unwrap();
        assert_eq!(at_end.reward_per_share, later.reward_per_share);
        assert_eq!(later.last_update_block, 9000);
    }

    #[test]
    fn refunding_folds_leftover_into_new_rate() {
        let s = fund(&funded(), wad(100), 3, 0).unwrap();
        // (100e18 + 3000 * 33333333333333333 + 1000 parked) / 3
        assert_eq!(
            s.reward_rate_per_block,
            U256::from(66_666_666_666_666_666_666u128)
        );
        assert_eq!(s.undistributed_reward, U256::from(2u64));
        assert_eq!(s.window_end_block, 3);
        assert_eq!(s.total_reward_funded, wad(200));
    }

    #[test]
    fn refunding_re_emits_undistributed_reward() {
        let idle = advance(&funded(), 1000).unwrap();
        let s = fund(&idle, wad(1), 1000, 1000).unwrap();
        assert_eq!(s.undistributed_reward, U256::zero());
        // 1e18 new + 2000 blocks leftover + 1000 idle blocks + 1000 parked, over 1000 blocks
        assert_eq!(s.reward_rate_per_block, U256::from(101_000_000_000_000_000u128));
    }

    #[test]
    fn refunding_never_loses_reward() {
        let mut s = funded();
        s.total_staked = wad(7);
        let s = advance(&s, 1234).unwrap();
        let next = fund(&s, U256::from(10_000_000_000_000_000_007u128), 999, 1234).unwrap();

        let carried = s.remaining_reward(1234).unwrap() + s.undistributed_reward;
        let total = U256::from(10_000_000_000_000_000_007u128) + carried;
        let scheduled = next.remaining_reward(1234).unwrap();
        assert_eq!(scheduled + next.undistributed_reward, total);
    }

    #[test]
    fn accumulator_never_decreases() {
        let mut s = funded();
        s.total_staked = wad(3);
        let mut last = s.reward_per_share;
        for block in [1u64, 1, 5, 40, 40, 2999, 3000, 3500] {
            s = advance(&s, block).unwrap();
            assert!(s.reward_per_share >= last);
            last = s.reward_per_share;
        }
    }
}
