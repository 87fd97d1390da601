//! FaucetToken: CEP-18 token with an open faucet mint
//!
//! Used as the principal (PILOT) and reward (WETH) assets in tests, demos and testnet
//! deployments. Entry-point names and argument names follow CEP-18, so the staking
//! contract talks to it through `token::Cep18Token` like to any other CEP-18 token.

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::cep18::events::{
    DecreaseAllowance, IncreaseAllowance, Mint, SetAllowance, Transfer, TransferFrom,
};
use odra_modules::cep18_token::Cep18;

#[odra::module(
    events = [
        Mint,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom
    ]
)]
pub struct FaucetToken {
    token: SubModule<Cep18>,
}

#[odra::module]
impl FaucetToken {
    /// Initialize the token with zero supply
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.token.init(symbol, name, decimals, U256::zero());
    }

    /// Token name
    pub fn name(&self) -> String {
        self.token.name()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    /// Token decimals
    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    /// Total supply
    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    /// Balance of an address
    pub fn balance_of(&self, address: Address) -> U256 {
        self.token.balance_of(&address)
    }

    /// Allowance from owner to spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn increase_allowance(&mut self, spender: Address, amount: U256) {
        self.token.increase_allowance(&spender, &amount);
    }

    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) {
        self.token.decrease_allowance(&spender, &amount);
    }

    /// Spend `amount` of `owner`'s allowance to the caller and move it to `recipient`
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    /// Faucet mint - anyone can call to get test tokens
    pub fn faucet_mint(&mut self, to: Address, amount: U256) {
        self.token.raw_mint(&to, &amount);
    }
}
