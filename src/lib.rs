//! Pilot Staking: reward-accrual staking on Casper (Odra)
//!
//! Users stake a principal token and earn a separately funded reward token, distributed
//! per block in proportion to stake.
//! - math: fixed-point helpers for the reward-per-share accumulator
//! - scheduler: global reward rate, funding windows and accumulator
//! - ledger: per-staker balances and reward checkpoints
//! - staking: PilotStaking contract (stake / unstake / claim / funding)
//! - token: external CEP-18 interface for the principal and reward assets
//! - tokens: FaucetToken, a CEP-18 token with open faucet mint

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod errors;
pub mod math;
pub mod scheduler;
pub mod ledger;
pub mod token;
pub mod tokens;
pub mod staking;
