//! Livenet deploy and demo binary for PilotStaking.
//!
//! Run with:
//! - Deploy only:      PILOT_LIVENET_MODE=deploy cargo run --bin pilot_staking_livenet --features=livenet
//! - Deploy + demo:    PILOT_LIVENET_MODE=deploy_and_demo cargo run --bin pilot_staking_livenet --features=livenet
//! - Demo on existing: PILOT_LIVENET_MODE=demo PILOT_EXISTING_STAKING=... PILOT_EXISTING_PRINCIPAL=... PILOT_EXISTING_REWARD=... cargo run ...
//! - Query position:   PILOT_LIVENET_MODE=query PILOT_EXISTING_STAKING=... PILOT_EXISTING_PRINCIPAL=... PILOT_EXISTING_REWARD=... cargo run ...
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS
//! - ODRA_CASPER_LIVENET_EVENTS_URL
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS     (motes)
//! - ODRA_CASPER_LIVENET_CALL_GAS       (motes)
//! - PILOT_BLOCK_INTERVAL_MS            (default: 16384)
//! - PILOT_DEMO_FUND                    (whole reward tokens, default: 100)
//! - PILOT_DEMO_DURATION_BLOCKS         (default: 3000)
//! - PILOT_DEMO_STAKE                   (whole principal tokens, default: 10)

use odra::casper_types::U256;
use odra::host::{Deployer, HostRef, HostRefLoader};
use odra::prelude::*;

use pilot_staking::staking::{PilotStaking, PilotStakingHostRef, PilotStakingInitArgs};
use pilot_staking::tokens::{FaucetToken, FaucetTokenHostRef, FaucetTokenInitArgs};

const MOTES_PER_CSPR: u64 = 1_000_000_000;
const WAD: u128 = 1_000_000_000_000_000_000;

const DEFAULT_DEPLOY_GAS_MOTES: u64 = 450_000_000_000; // 450 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR
const DEFAULT_BLOCK_INTERVAL_MS: u64 = 16_384;

fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(WAD)
}

fn main() {
    println!("============================================");
    println!("  Pilot Staking - Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("PILOT_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_deploy = mode == "deploy" || mode == "deploy_and_demo";
    let should_demo = mode == "demo" || mode == "deploy_and_demo";
    let should_query = mode == "query";

    let deploy_gas = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS", DEFAULT_DEPLOY_GAS_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);
    let block_interval_ms = read_u64_env("PILOT_BLOCK_INTERVAL_MS", DEFAULT_BLOCK_INTERVAL_MS);

    let fund_tokens = read_u64_env("PILOT_DEMO_FUND", 100);
    let duration_blocks = read_u64_env("PILOT_DEMO_DURATION_BLOCKS", 3000);
    let stake_tokens = read_u64_env("PILOT_DEMO_STAKE", 10);

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy={} ({} CSPR), calls={} ({} CSPR)",
        deploy_gas,
        deploy_gas / MOTES_PER_CSPR,
        call_gas,
        call_gas / MOTES_PER_CSPR
    );
    println!("[INFO] Block interval: {} ms", block_interval_ms);
    println!(
        "[INFO] Demo params: fund={} over {} blocks, stake={}",
        fund_tokens, duration_blocks, stake_tokens
    );
    println!();

    // ==========================================
    // Step 1: Deploy (or reuse) the principal and reward tokens
    // ==========================================
    let (principal, reward) = if should_deploy {
        println!("[STEP 1] Deploying PILOT and WETH faucet tokens...");
        env.set_gas(deploy_gas);
        let principal = FaucetToken::deploy(
            &env,
            FaucetTokenInitArgs {
                name: "Pilot".to_string(),
                symbol: "PILOT".to_string(),
                decimals: 18,
            },
        );
        env.set_gas(deploy_gas);
        let reward = FaucetToken::deploy(
            &env,
            FaucetTokenInitArgs {
                name: "Wrapped Ether".to_string(),
                symbol: "WETH".to_string(),
                decimals: 18,
            },
        );
        println!("[OK] PILOT deployed at: {:?}", principal.address());
        println!("[OK] WETH deployed at:  {:?}", reward.address());
        println!();
        (principal, reward)
    } else {
        println!("[STEP 1] Reusing existing tokens...");
        let principal = FaucetToken::load(&env, existing_address("PILOT_EXISTING_PRINCIPAL", &mode));
        let reward = FaucetToken::load(&env, existing_address("PILOT_EXISTING_REWARD", &mode));
        println!("[OK] PILOT: {:?}", principal.address());
        println!("[OK] WETH:  {:?}", reward.address());
        println!();
        (principal, reward)
    };

    // ==========================================
    // Step 2: Deploy (or reuse) PilotStaking
    // ==========================================
    let staking = if should_deploy {
        println!("[STEP 2] Deploying PilotStaking contract...");
        env.set_gas(deploy_gas);
        let staking = PilotStaking::deploy(
            &env,
            PilotStakingInitArgs {
                principal_token: principal.address(),
                reward_token: reward.address(),
                block_interval_ms,
            },
        );
        println!("[OK] PilotStaking deployed at: {:?}", staking.address());
        println!("     Owner: {:?}", staking.owner());
        println!("     Reward authority: {:?}", staking.reward_authority());
        println!();
        staking
    } else {
        println!("[STEP 2] Reusing existing PilotStaking contract...");
        let staking = PilotStaking::load(&env, existing_address("PILOT_EXISTING_STAKING", &mode));
        println!("[OK] PilotStaking: {:?}", staking.address());
        println!();
        staking
    };

    if should_query {
        let user = env.caller();
        let info = staking.get_staker(user);
        println!(
            "PILOT_POSITION_JSON={{\"user\":\"{:?}\",\"staked\":\"{}\",\"claimable\":\"{}\",\"reward_balance\":\"{}\",\"total_staked\":\"{}\",\"current_block\":{},\"window_end_block\":{}}}",
            user,
            info.staked,
            info.claimable,
            reward.balance_of(user),
            staking.total_pilot_staked(),
            staking.current_block(),
            staking.window_end_block()
        );
        return;
    }

    // ==========================================
    // Demo: mint -> fund -> stake -> claim
    // ==========================================
    if should_demo {
        let caller = env.caller();
        let mut principal = principal;
        let mut reward = reward;
        let mut staking = staking;
        let staking_addr = staking.address();

        println!("[DEMO 1] Minting demo tokens to caller...");
        env.set_gas(call_gas);
        principal.faucet_mint(caller, tokens(stake_tokens));
        env.set_gas(call_gas);
        reward.faucet_mint(caller, tokens(fund_tokens));
        println!("[OK] PILOT balance: {}", principal.balance_of(caller));
        println!("[OK] WETH balance:  {}", reward.balance_of(caller));

        println!("[DEMO 2] Funding {} WETH over {} blocks...", fund_tokens, duration_blocks);
        env.set_gas(call_gas);
        reward.approve(staking_addr, tokens(fund_tokens));
        env.set_gas(call_gas);
        staking.fund_rewards(tokens(fund_tokens), duration_blocks);
        println!("[OK] Rate per block: {}", staking.reward_rate_per_block());
        println!("     Window end block: {}", staking.window_end_block());

        println!("[DEMO 3] Staking {} PILOT...", stake_tokens);
        env.set_gas(call_gas);
        principal.approve(staking_addr, tokens(stake_tokens));
        env.set_gas(call_gas);
        staking.stake(tokens(stake_tokens));
        println!("[OK] Stake complete.");
        print_staker_info(&staking, caller, &reward);

        println!("[DEMO 4] Claiming...");
        env.set_gas(call_gas);
        let claimed = staking.claim();
        if claimed.is_zero() {
            println!("[WARN] Nothing accrued yet (same block as stake). Re-run in demo mode later.");
        } else {
            println!("[OK] Claimed {} WETH wei.", claimed);
        }
        print_staker_info(&staking, caller, &reward);
        return;
    }

    output_deploy_json(principal.address(), reward.address(), staking.address(), block_interval_ms);
}

fn print_staker_info(staking: &PilotStakingHostRef, user: Address, reward: &FaucetTokenHostRef) {
    let info = staking.get_staker(user);
    println!("     staked: {}", info.staked);
    println!("     claimable: {}", info.claimable);
    println!("     checkpoint: {}", info.reward_per_share_checkpoint);
    println!("     total_staked: {}", staking.total_pilot_staked());
    println!("     current_block: {}", staking.current_block());
    println!("     reward_reserve: {}", staking.reward_reserve());
    println!("     total_reward_funded: {}", staking.total_reward_funded());
    println!("     total_reward_paid: {}", staking.total_reward_paid());
    println!("     user WETH balance: {}", reward.balance_of(user));
    println!();
}

fn existing_address(var: &str, mode: &str) -> Address {
    let raw = std::env::var(var).unwrap_or_else(|_| panic!("{} must be set for mode={}", var, mode));
    parse_contract_address(&raw)
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned.parse::<u64>().unwrap_or(default_value)
        }
        Err(_) => default_value,
    }
}

fn output_deploy_json(principal: Address, reward: Address, staking: Address, block_interval_ms: u64) {
    let chain_name =
        std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_else(|_| "casper-test".to_string());
    println!(
        r#"PILOT_DEPLOY_JSON={{"chain_name":"{}","principal_token_hash":"{}","reward_token_hash":"{}","staking_contract_hash":"{}","block_interval_ms":{},"deployed_at":"{}"}}"#,
        chain_name,
        format_address_hash(&principal),
        format_address_hash(&reward),
        format_address_hash(&staking),
        block_interval_ms,
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

fn format_address_hash(addr: &Address) -> String {
    let debug_str = format!("{:?}", addr);
    let (Some(start), Some(end)) = (debug_str.find('['), debug_str.rfind(']')) else {
        return debug_str;
    };
    debug_str[start + 1..end]
        .split(", ")
        .filter_map(|part| part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")))
        .collect()
}

fn parse_contract_address(raw: &str) -> Address {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::contracts::ContractPackageHash;

    fn decode_hex_32(s: &str) -> [u8; 32] {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            panic!("Invalid address hash (expected 64 hex): {}", s);
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .unwrap_or_else(|_| panic!("Invalid hex in address: {}", s));
        }
        out
    }

    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("account-hash-") {
        return Address::Account(AccountHash::new(decode_hex_32(hex)));
    }
    let package_hex = ["contract-package-", "package-", "hash-"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    Address::Contract(ContractPackageHash::new(decode_hex_32(package_hex)))
}
