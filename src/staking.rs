//! PilotStaking: stake PILOT, earn a separately funded reward token
//!
//! - Users stake the principal token and accrue reward in proportion to stake × blocks held
//! - A funding authority opens reward windows: `amount` spread evenly over `duration_blocks`
//! - Claims pay out settled reward, never more than the contract's reward reserve
//!
//! ## Block clock
//! Block numbers are derived from block time: `(now - genesis) / block_interval_ms`.
//! All calls inside one interval share a block number and therefore one accumulator value.
//!
//! ## Call sequence
//! Every mutating entry point advances the schedule to the current block, settles the
//! caller, then applies its own change. Storage is written once at the end; any revert
//! (including a failed token transfer) discards the whole call.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::errors::{AccountingError, StakingError};
use crate::ledger::{self, StakerCheckpoint};
use crate::math;
use crate::scheduler::{self, RewardSchedule};
use crate::token::{cep18_ref, Cep18TokenContractRef};

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct Staked {
        pub user: Address,
        pub amount: U256,
        /// Reward paid out together with the stake
        pub harvested: U256,
        pub new_stake: U256,
    }

    #[odra::event]
    pub struct Unstaked {
        pub user: Address,
        pub amount: U256,
        pub harvested: U256,
        pub new_stake: U256,
    }

    #[odra::event]
    pub struct Claimed {
        pub user: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RewardsUpdated {
        pub funder: Address,
        pub amount: U256,
        pub duration_blocks: u64,
        pub reward_rate_per_block: U256,
        pub window_end_block: u64,
        /// Whether `amount` was pulled from the funder in the same call
        pub pulled: bool,
    }

    #[odra::event]
    pub struct RewardAuthorityChanged {
        pub old_authority: Option<Address>,
        pub new_authority: Address,
    }

    #[odra::event]
    pub struct OwnershipTransferred {
        pub old_owner: Option<Address>,
        pub new_owner: Address,
    }

    #[odra::event]
    pub struct Paused {
        pub by: Address,
    }

    #[odra::event]
    pub struct Unpaused {
        pub by: Address,
    }
}

// ==========================================
// Types
// ==========================================

/// Staker info returned by get_staker
#[odra::odra_type]
pub struct StakerInfo {
    pub staked: U256,
    /// Reward the staker would receive by claiming now
    pub claimable: U256,
    pub reward_per_share_checkpoint: U256,
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::Staked,
        events::Unstaked,
        events::Claimed,
        events::RewardsUpdated,
        events::RewardAuthorityChanged,
        events::OwnershipTransferred,
        events::Paused,
        events::Unpaused
    ],
    errors = StakingError
)]
pub struct PilotStaking {
    // Token references
    principal_token: Var<Address>,
    reward_token: Var<Address>,

    // Block clock
    genesis_time_ms: Var<u64>,
    block_interval_ms: Var<u64>,

    // Global reward state, one record
    schedule: Var<RewardSchedule>,
    // Per-user state, never pruned
    stakers: Mapping<Address, StakerCheckpoint>,

    // Admin
    owner: Var<Address>,
    reward_authority: Var<Address>,
    paused: Var<bool>,
}

#[odra::module]
impl PilotStaking {
    // ==========================================
    // Initialization
    // ==========================================

    /// Initialize the staking contract. The deployer becomes owner and reward authority.
    pub fn init(&mut self, principal_token: Address, reward_token: Address, block_interval_ms: u64) {
        if block_interval_ms == 0 {
            self.env().revert(StakingError::InvalidConfig);
        }
        let caller = self.env().caller();
        self.principal_token.set(principal_token);
        self.reward_token.set(reward_token);
        self.genesis_time_ms.set(self.env().get_block_time());
        self.block_interval_ms.set(block_interval_ms);
        self.schedule.set(RewardSchedule::genesis(0));
        self.owner.set(caller);
        self.reward_authority.set(caller);
        self.paused.set(false);
    }

    // ==========================================
    // User Functions
    // ==========================================

    /// Stake `amount` principal (requires prior approve).
    /// Pays out the caller's settled reward if the reserve covers it.
    pub fn stake(&mut self, amount: U256) {
        self.require_not_paused();
        if amount.is_zero() {
            self.env().revert(StakingError::InvalidAmount);
        }
        let caller = self.env().caller();
        let (mut schedule, mut staker) = self.settled(caller);

        let self_address = self.env().self_address();
        self.principal().transfer_from(caller, self_address, amount);
        self.or_revert(ledger::increase_stake(&mut schedule, &mut staker, amount));

        let harvested = self.harvest(&mut schedule, &mut staker, caller);
        let new_stake = staker.staked;
        self.commit(caller, schedule, staker);

        self.env().emit_event(events::Staked {
            user: caller,
            amount,
            harvested,
            new_stake,
        });
    }

    /// Withdraw `amount` principal.
    /// Pays out the caller's settled reward if the reserve covers it.
    pub fn unstake(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(StakingError::InvalidAmount);
        }
        let caller = self.env().caller();
        let (mut schedule, mut staker) = self.settled(caller);

        self.or_revert(ledger::decrease_stake(&mut schedule, &mut staker, amount));
        self.principal().transfer(caller, amount);

        let harvested = self.harvest(&mut schedule, &mut staker, caller);
        let new_stake = staker.staked;
        self.commit(caller, schedule, staker);

        self.env().emit_event(events::Unstaked {
            user: caller,
            amount,
            harvested,
            new_stake,
        });
    }

    /// Pay out the caller's whole settled reward and return it.
    /// Returns 0 when nothing accrued since the last payout.
    /// Reverts with InsufficientFunds if the reward reserve cannot cover it.
    pub fn claim(&mut self) -> U256 {
        let caller = self.env().caller();
        let (mut schedule, mut staker) = self.settled(caller);

        let reward = staker.drain_pending();
        if reward.is_zero() {
            self.commit(caller, schedule, staker);
            return U256::zero();
        }
        if reward > self.reserve_with(schedule.total_staked) {
            self.env().revert(StakingError::InsufficientFunds);
        }

        schedule.total_reward_paid =
            self.or_revert(math::checked_add(schedule.total_reward_paid, reward));
        self.commit(caller, schedule, staker);
        self.reward().transfer(caller, reward);

        self.env().emit_event(events::Claimed {
            user: caller,
            amount: reward,
        });
        reward
    }

    // ==========================================
    // Funding (reward authority)
    // ==========================================

    /// Open a new reward window of `duration_blocks` carrying `amount` new reward.
    /// Schedule only: reward tokens are sent to the contract separately.
    pub fn update_rewards(&mut self, amount: U256, duration_blocks: u64) {
        self.require_reward_authority();
        self.require_not_paused();
        self.apply_funding(amount, duration_blocks, false);
    }

    /// Pull `amount` reward tokens from the caller (requires prior approve)
    /// and open a new reward window with them.
    pub fn fund_rewards(&mut self, amount: U256, duration_blocks: u64) {
        self.require_reward_authority();
        self.require_not_paused();
        if amount.is_zero() {
            self.env().revert(StakingError::InvalidAmount);
        }
        let caller = self.env().caller();
        let self_address = self.env().self_address();
        self.reward().transfer_from(caller, self_address, amount);
        self.apply_funding(amount, duration_blocks, true);
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Total principal staked by all users
    pub fn total_pilot_staked(&self) -> U256 {
        self.schedule.get_or_default().total_staked
    }

    /// Principal staked by user
    pub fn staked_of(&self, user: Address) -> U256 {
        self.stakers.get(&user).unwrap_or_default().staked
    }

    /// Reward `user` would receive by claiming now (read-only calculation)
    pub fn pending_reward_of(&self, user: Address) -> U256 {
        let schedule = self.or_revert(scheduler::advance(
            &self.schedule.get_or_default(),
            self.current_block(),
        ));
        let staker = self.stakers.get(&user).unwrap_or_default();
        self.or_revert(staker.pending_at(schedule.reward_per_share))
    }

    /// Complete staker info for user
    pub fn get_staker(&self, user: Address) -> StakerInfo {
        let staker = self.stakers.get(&user).unwrap_or_default();
        StakerInfo {
            staked: staker.staked,
            claimable: self.pending_reward_of(user),
            reward_per_share_checkpoint: staker.reward_per_share_checkpoint,
        }
    }

    /// Stored schedule (as of the last mutating call)
    pub fn get_schedule(&self) -> RewardSchedule {
        self.schedule.get_or_default()
    }

    /// Reward emitted per block in the current window
    pub fn reward_rate_per_block(&self) -> U256 {
        self.schedule.get_or_default().reward_rate_per_block
    }

    /// First block past the current reward window
    pub fn window_end_block(&self) -> u64 {
        self.schedule.get_or_default().window_end_block
    }

    /// Block the accumulator was last advanced to
    pub fn last_update_block(&self) -> u64 {
        self.schedule.get_or_default().last_update_block
    }

    /// Stored accumulator, scaled by 1e18
    pub fn reward_per_share(&self) -> U256 {
        self.schedule.get_or_default().reward_per_share
    }

    /// Sum of all funding amounts
    pub fn total_reward_funded(&self) -> U256 {
        self.schedule.get_or_default().total_reward_funded
    }

    /// Sum of all reward payouts
    pub fn total_reward_paid(&self) -> U256 {
        self.schedule.get_or_default().total_reward_paid
    }

    /// Reward emitted while nothing was staked, including blocks up to now
    pub fn undistributed_reward(&self) -> U256 {
        let schedule = self.or_revert(scheduler::advance(
            &self.schedule.get_or_default(),
            self.current_block(),
        ));
        schedule.undistributed_reward
    }

    /// Reward tokens available for payouts (staked principal excluded)
    pub fn reward_reserve(&self) -> U256 {
        self.reserve_with(self.schedule.get_or_default().total_staked)
    }

    /// Block number derived from block time
    pub fn current_block(&self) -> u64 {
        let genesis = self.genesis_time_ms.get_or_default();
        let interval = self.block_interval_ms.get_or_default();
        let elapsed = self.env().get_block_time().saturating_sub(genesis);
        elapsed.checked_div(interval).unwrap_or_default()
    }

    /// Staked token address
    pub fn principal_token(&self) -> Option<Address> {
        self.principal_token.get()
    }

    /// Reward token address
    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    /// Milliseconds per derived block
    pub fn block_interval_ms(&self) -> u64 {
        self.block_interval_ms.get_or_default()
    }

    /// Get current owner
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    /// Get current reward authority
    pub fn reward_authority(&self) -> Option<Address> {
        self.reward_authority.get()
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ==========================================
    // Admin Functions
    // ==========================================

    /// Hand the funding role to `new_authority` (owner only)
    pub fn set_reward_authority(&mut self, new_authority: Address) {
        self.require_owner();
        let old_authority = self.reward_authority.get();
        self.reward_authority.set(new_authority);
        self.env().emit_event(events::RewardAuthorityChanged {
            old_authority,
            new_authority,
        });
    }

    /// Transfer ownership (owner only)
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        let old_owner = self.owner.get();
        self.owner.set(new_owner);
        self.env().emit_event(events::OwnershipTransferred {
            old_owner,
            new_owner,
        });
    }

    /// Pause new stakes and reward updates (owner only).
    /// Unstake and claim stay open.
    pub fn pause(&mut self) {
        self.require_owner();
        if self.paused.get_or_default() {
            self.env().revert(StakingError::ContractPaused);
        }
        self.paused.set(true);
        self.env().emit_event(events::Paused {
            by: self.env().caller(),
        });
    }

    /// Resume stakes and reward updates (owner only)
    pub fn unpause(&mut self) {
        self.require_owner();
        if !self.paused.get_or_default() {
            self.env().revert(StakingError::ContractPaused);
        }
        self.paused.set(false);
        self.env().emit_event(events::Unpaused {
            by: self.env().caller(),
        });
    }
}

// ==========================================
// Internal Functions
// ==========================================

impl PilotStaking {
    fn require_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(StakingError::ContractPaused);
        }
    }

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(StakingError::Unauthorized);
        }
    }

    fn require_reward_authority(&self) {
        if self.reward_authority.get() != Some(self.env().caller()) {
            self.env().revert(StakingError::Unauthorized);
        }
    }

    fn or_revert<T>(&self, result: Result<T, AccountingError>) -> T {
        result.unwrap_or_else(|err| self.env().revert(StakingError::from(err)))
    }

    fn principal(&self) -> Cep18TokenContractRef {
        let address = self
            .principal_token
            .get()
            .unwrap_or_else(|| self.env().revert(StakingError::NotConfigured));
        cep18_ref(self.env(), address)
    }

    fn reward(&self) -> Cep18TokenContractRef {
        let address = self
            .reward_token
            .get()
            .unwrap_or_else(|| self.env().revert(StakingError::NotConfigured));
        cep18_ref(self.env(), address)
    }

    /// Schedule advanced to the current block and `user` settled against it (not stored).
    fn settled(&self, user: Address) -> (RewardSchedule, StakerCheckpoint) {
        let schedule = self.or_revert(scheduler::advance(
            &self.schedule.get_or_default(),
            self.current_block(),
        ));
        let mut staker = self.stakers.get(&user).unwrap_or_default();
        self.or_revert(staker.settle(schedule.reward_per_share));
        (schedule, staker)
    }

    fn commit(&mut self, user: Address, schedule: RewardSchedule, staker: StakerCheckpoint) {
        self.schedule.set(schedule);
        self.stakers.set(&user, staker);
    }

    /// Reward-token balance minus principal when both assets are the same token
    fn reserve_with(&self, total_staked: U256) -> U256 {
        let held = self.reward().balance_of(self.env().self_address());
        if self.reward_token.get() == self.principal_token.get() {
            held.saturating_sub(total_staked)
        } else {
            held
        }
    }

    /// Pay out the staker's pending reward if the reserve covers it, else leave it pending.
    fn harvest(
        &self,
        schedule: &mut RewardSchedule,
        staker: &mut StakerCheckpoint,
        user: Address,
    ) -> U256 {
        if staker.pending_reward.is_zero()
            || staker.pending_reward > self.reserve_with(schedule.total_staked)
        {
            return U256::zero();
        }
        let reward = staker.drain_pending();
        schedule.total_reward_paid =
            self.or_revert(math::checked_add(schedule.total_reward_paid, reward));
        self.reward().transfer(user, reward);
        reward
    }

    fn apply_funding(&mut self, amount: U256, duration_blocks: u64, pulled: bool) {
        let schedule = self.or_revert(scheduler::fund(
            &self.schedule.get_or_default(),
            amount,
            duration_blocks,
            self.current_block(),
        ));
        let reward_rate_per_block = schedule.reward_rate_per_block;
        let window_end_block = schedule.window_end_block;
        self.schedule.set(schedule);

        self.env().emit_event(events::RewardsUpdated {
            funder: self.env().caller(),
            amount,
            duration_blocks,
            reward_rate_per_block,
            window_end_block,
            pulled,
        });
    }
}
