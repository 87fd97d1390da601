//! External CEP-18 token interface
//!
//! The staking contract moves the principal and reward assets only through this interface.
//! Any CEP-18 contract exposing these entry points can be plugged in at deploy time.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

/// CEP-18 entry points used by the staking contract
#[odra::external_contract]
pub trait Cep18Token {
    /// Balance held by `address`
    fn balance_of(&self, address: Address) -> U256;

    /// Move `amount` from the calling contract to `recipient`.
    /// Reverts in the token if the caller's balance is short.
    fn transfer(&mut self, recipient: Address, amount: U256);

    /// Move `amount` from `owner` to `recipient` using the caller's allowance.
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
}

/// Reference to the CEP-18 token deployed at `address`
pub fn cep18_ref(env: Rc<ContractEnv>, address: Address) -> Cep18TokenContractRef {
    Cep18TokenContractRef::new(env, address)
}
