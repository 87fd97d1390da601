//! Stake ledger: per-staker balances and reward checkpoints.
//!
//! A staker's reward is settled lazily against the global accumulator, so no call ever
//! iterates over other stakers. Stake may only change right after [`StakerCheckpoint::settle`]
//! has brought the checkpoint up to the schedule's accumulator.

use odra::casper_types::U256;

use crate::errors::AccountingError;
use crate::math;
use crate::scheduler::RewardSchedule;

/// Per-staker state. Created on first interaction and never removed.
#[odra::odra_type]
#[derive(Default)]
pub struct StakerCheckpoint {
    pub staked: U256,
    /// Accumulator value at the last settlement
    pub reward_per_share_checkpoint: U256,
    /// Settled reward not yet paid out
    pub pending_reward: U256,
}

impl StakerCheckpoint {
    /// Credit reward accrued since the last checkpoint and move the checkpoint to
    /// `accumulator`. Returns the newly credited amount.
    pub fn settle(&mut self, accumulator: U256) -> Result<U256, AccountingError> {
        let credited = math::accrued(self.staked, accumulator, self.reward_per_share_checkpoint)?;
        self.pending_reward = math::checked_add(self.pending_reward, credited)?;
        self.reward_per_share_checkpoint = accumulator;
        Ok(credited)
    }

    /// Take the whole pending reward, leaving zero behind.
    pub fn drain_pending(&mut self) -> U256 {
        core::mem::take(&mut self.pending_reward)
    }

    /// Reward this staker would hold after settling against `accumulator`, without writing.
    pub fn pending_at(&self, accumulator: U256) -> Result<U256, AccountingError> {
        let mut settled = self.clone();
        settled.settle(accumulator)?;
        Ok(settled.pending_reward)
    }

    fn ensure_settled(&self, schedule: &RewardSchedule) -> Result<(), AccountingError> {
        if self.reward_per_share_checkpoint != schedule.reward_per_share {
            return Err(AccountingError::StaleCheckpoint);
        }
        Ok(())
    }
}

pub fn increase_stake(
    schedule: &mut RewardSchedule,
    staker: &mut StakerCheckpoint,
    amount: U256,
) -> Result<(), AccountingError> {
    if amount.is_zero() {
        return Err(AccountingError::InvalidAmount);
    }
    staker.ensure_settled(schedule)?;
    staker.staked = math::checked_add(staker.staked, amount)?;
    schedule.total_staked = math::checked_add(schedule.total_staked, amount)?;
    Ok(())
}

pub fn decrease_stake(
    schedule: &mut RewardSchedule,
    staker: &mut StakerCheckpoint,
    amount: U256,
) -> Result<(), AccountingError> {
    if amount.is_zero() {
        return Err(AccountingError::InvalidAmount);
    }
    if amount > staker.staked {
        return Err(AccountingError::InsufficientStake);
    }
    staker.ensure_settled(schedule)?;
    staker.staked -= amount;
    schedule.total_staked = schedule
        .total_staked
        .checked_sub(amount)
        .ok_or(AccountingError::Overflow)?;
    Ok(())
}
