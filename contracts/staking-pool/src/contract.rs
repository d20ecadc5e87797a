use cosmwasm_std::{
    entry_point, from_json, to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env,
    MessageInfo, Order, Response, StdResult, Uint128, Uint256, WasmMsg,
};
use cw2::{get_contract_version, set_contract_version};
use cw20::{Cw20ExecuteMsg, Cw20ReceiveMsg};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::ledger;
use crate::msg::{
    ConfigResponse, Cw20HookMsg, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg,
    StakerResponse, UserInfoResponse,
};
use crate::state::{Config, PoolState, Staker, CONFIG, POOL_STATE, STAKERS};

const CONTRACT_NAME: &str = "crates.io:staking-pool";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    ledger::validate_penalty_rate(msg.penalty_rate_bps)?;

    let config = Config {
        owner: deps.api.addr_validate(&msg.owner)?,
        staking_token: deps.api.addr_validate(&msg.staking_token)?,
        reward_token: deps.api.addr_validate(&msg.reward_token)?,
        reward_rate: msg.reward_rate,
        lock_period: msg.lock_period,
        penalty_rate_bps: msg.penalty_rate_bps,
    };
    CONFIG.save(deps.storage, &config)?;

    let pool = PoolState {
        total_staked: Uint128::zero(),
        reward_per_token_stored: Uint256::zero(),
        last_update_time: env.block.time.seconds(),
        forfeited_principal: Uint128::zero(),
        total_rewards_funded: Uint128::zero(),
        total_rewards_claimed: Uint128::zero(),
    };
    POOL_STATE.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", config.owner)
        .add_attribute("staking_token", config.staking_token)
        .add_attribute("reward_token", config.reward_token)
        .add_attribute("reward_rate", config.reward_rate)
        .add_attribute("lock_period", config.lock_period.to_string())
        .add_attribute("penalty_rate_bps", config.penalty_rate_bps.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Receive(msg) => execute_receive(deps, env, info, msg),
        ExecuteMsg::Withdraw { amount } => execute_withdraw(deps, env, info, amount),
        ExecuteMsg::ClaimRewards {} => execute_claim_rewards(deps, env, info),
        ExecuteMsg::EmergencyWithdraw {} => execute_emergency_withdraw(deps, env, info),
        ExecuteMsg::SetRewardRate { reward_rate } => {
            execute_set_reward_rate(deps, env, info, reward_rate)
        }
        ExecuteMsg::SetLockPeriod { lock_period } => execute_set_lock_period(deps, info, lock_period),
        ExecuteMsg::SetPenaltyRate { penalty_rate_bps } => {
            execute_set_penalty_rate(deps, info, penalty_rate_bps)
        }
        ExecuteMsg::SweepForfeited { recipient } => execute_sweep_forfeited(deps, info, recipient),
        ExecuteMsg::TransferOwnership { owner } => execute_transfer_ownership(deps, info, owner),
    }
}

fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let hook_msg: Cw20HookMsg = from_json(&msg.msg)?;
    match hook_msg {
        Cw20HookMsg::Stake {} => execute_stake(deps, env, info, msg.sender, msg.amount),
        Cw20HookMsg::FundRewards {} => execute_fund_rewards(deps, info, msg.sender, msg.amount),
    }
}

fn execute_stake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    // The CW20 contract that called Receive
    if info.sender != config.staking_token {
        return Err(ContractError::InvalidToken {
            token: info.sender.to_string(),
        });
    }
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }

    let now = env.block.time.seconds();
    let user_addr = deps.api.addr_validate(&user)?;
    let mut pool = POOL_STATE.load(deps.storage)?;
    let mut staker = STAKERS
        .may_load(deps.storage, &user_addr)?
        .unwrap_or_default();

    ledger::update_pool(&mut pool, config.reward_rate, now)?;
    ledger::settle_staker(&mut staker, pool.reward_per_token_stored)?;

    staker.staked_amount = staker.staked_amount.checked_add(amount)?;
    staker.stake_timestamp = now;
    pool.total_staked = pool.total_staked.checked_add(amount)?;

    POOL_STATE.save(deps.storage, &pool)?;
    STAKERS.save(deps.storage, &user_addr, &staker)?;

    Ok(Response::new()
        .add_attribute("action", "stake")
        .add_attribute("user", user_addr)
        .add_attribute("amount", amount)
        .add_attribute("total_staked", pool.total_staked)
        .add_attribute("unlock_time", ledger::unlock_time(&staker, config.lock_period).to_string()))
}

fn execute_fund_rewards(
    deps: DepsMut,
    info: MessageInfo,
    funder: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.reward_token {
        return Err(ContractError::InvalidToken {
            token: info.sender.to_string(),
        });
    }
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }

    let mut pool = POOL_STATE.load(deps.storage)?;
    pool.total_rewards_funded = pool.total_rewards_funded.checked_add(amount)?;
    POOL_STATE.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "fund_rewards")
        .add_attribute("funder", funder)
        .add_attribute("amount", amount))
}

fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }

    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();
    let user_addr = info.sender;
    let mut staker = STAKERS
        .may_load(deps.storage, &user_addr)?
        .unwrap_or_default();

    if amount > staker.staked_amount {
        return Err(ContractError::InsufficientStake {});
    }

    let mut pool = POOL_STATE.load(deps.storage)?;
    ledger::update_pool(&mut pool, config.reward_rate, now)?;
    ledger::settle_staker(&mut staker, pool.reward_per_token_stored)?;

    let penalty_amount = if ledger::can_withdraw_without_penalty(&staker, config.lock_period, now) {
        Uint128::zero()
    } else {
        ledger::penalty(amount, config.penalty_rate_bps)
    };
    let payout = amount.checked_sub(penalty_amount)?;

    staker.staked_amount = staker.staked_amount.checked_sub(amount)?;
    pool.total_staked = pool.total_staked.checked_sub(amount)?;
    pool.forfeited_principal = pool.forfeited_principal.checked_add(penalty_amount)?;

    POOL_STATE.save(deps.storage, &pool)?;
    STAKERS.save(deps.storage, &user_addr, &staker)?;

    let mut res = Response::new();
    if !payout.is_zero() {
        res = res.add_message(cw20_transfer(&config.staking_token, &user_addr, payout)?);
    }

    Ok(res
        .add_attribute("action", "withdraw")
        .add_attribute("user", user_addr)
        .add_attribute("amount", amount)
        .add_attribute("payout", payout)
        .add_attribute("penalty", penalty_amount))
}

fn execute_claim_rewards(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();
    let user_addr = info.sender;
    let mut pool = POOL_STATE.load(deps.storage)?;
    let mut staker = STAKERS
        .may_load(deps.storage, &user_addr)?
        .unwrap_or_default();

    ledger::update_pool(&mut pool, config.reward_rate, now)?;
    ledger::settle_staker(&mut staker, pool.reward_per_token_stored)?;

    let rewards = staker.accrued_rewards;
    staker.accrued_rewards = Uint128::zero();
    pool.total_rewards_claimed = pool.total_rewards_claimed.checked_add(rewards)?;

    POOL_STATE.save(deps.storage, &pool)?;
    STAKERS.save(deps.storage, &user_addr, &staker)?;

    // nothing accrued is a successful no-op
    let mut res = Response::new();
    if !rewards.is_zero() {
        res = res.add_message(cw20_transfer(&config.reward_token, &user_addr, rewards)?);
    }

    Ok(res
        .add_attribute("action", "claim_rewards")
        .add_attribute("user", user_addr)
        .add_attribute("rewards", rewards))
}

fn execute_emergency_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();
    let user_addr = info.sender;
    let mut staker = STAKERS
        .may_load(deps.storage, &user_addr)?
        .unwrap_or_default();

    if staker.staked_amount.is_zero() {
        return Err(ContractError::InsufficientStake {});
    }

    let mut pool = POOL_STATE.load(deps.storage)?;
    ledger::update_pool(&mut pool, config.reward_rate, now)?;

    let amount = staker.staked_amount;
    let penalty_amount = ledger::penalty(amount, config.penalty_rate_bps);
    let payout = amount.checked_sub(penalty_amount)?;
    let forfeited_rewards = ledger::pending_rewards(&staker, pool.reward_per_token_stored)?
        .checked_add(staker.accrued_rewards)?;

    staker.staked_amount = Uint128::zero();
    staker.accrued_rewards = Uint128::zero();
    staker.reward_per_token_paid = pool.reward_per_token_stored;
    staker.stake_timestamp = 0;
    pool.total_staked = pool.total_staked.checked_sub(amount)?;
    pool.forfeited_principal = pool.forfeited_principal.checked_add(penalty_amount)?;

    POOL_STATE.save(deps.storage, &pool)?;
    STAKERS.save(deps.storage, &user_addr, &staker)?;

    let mut res = Response::new();
    if !payout.is_zero() {
        res = res.add_message(cw20_transfer(&config.staking_token, &user_addr, payout)?);
    }

    Ok(res
        .add_attribute("action", "emergency_withdraw")
        .add_attribute("user", user_addr)
        .add_attribute("amount", amount)
        .add_attribute("payout", payout)
        .add_attribute("penalty", penalty_amount)
        .add_attribute("forfeited_rewards", forfeited_rewards))
}

// Owner Handlers
fn execute_set_reward_rate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    reward_rate: Uint128,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    // Elapsed time is credited at the old rate
    let mut pool = POOL_STATE.load(deps.storage)?;
    ledger::update_pool(&mut pool, config.reward_rate, env.block.time.seconds())?;
    POOL_STATE.save(deps.storage, &pool)?;

    config.reward_rate = reward_rate;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_reward_rate")
        .add_attribute("reward_rate", reward_rate))
}

fn execute_set_lock_period(
    deps: DepsMut,
    info: MessageInfo,
    lock_period: u64,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    config.lock_period = lock_period;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_lock_period")
        .add_attribute("lock_period", lock_period.to_string()))
}

fn execute_set_penalty_rate(
    deps: DepsMut,
    info: MessageInfo,
    penalty_rate_bps: u16,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;
    ledger::validate_penalty_rate(penalty_rate_bps)?;

    config.penalty_rate_bps = penalty_rate_bps;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_penalty_rate")
        .add_attribute("penalty_rate_bps", penalty_rate_bps.to_string()))
}

fn execute_sweep_forfeited(
    deps: DepsMut,
    info: MessageInfo,
    recipient: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    let recipient = match recipient {
        Some(r) => deps.api.addr_validate(&r)?,
        None => config.owner.clone(),
    };

    let mut pool = POOL_STATE.load(deps.storage)?;
    let amount = pool.forfeited_principal;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    pool.forfeited_principal = Uint128::zero();
    POOL_STATE.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_message(cw20_transfer(&config.staking_token, &recipient, amount)?)
        .add_attribute("action", "sweep_forfeited")
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount))
}

fn execute_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    config.owner = deps.api.addr_validate(&owner)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "transfer_ownership")
        .add_attribute("owner", config.owner))
}

// Helpers
fn assert_owner(config: &Config, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.owner {
        return Err(ContractError::NotOwner {});
    }
    Ok(())
}

fn cw20_transfer(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    }))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let now = env.block.time.seconds();
    let res = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::State {} => to_json_binary(&POOL_STATE.load(deps.storage)?),
        QueryMsg::RewardPerToken {} => to_json_binary(&query_reward_per_token(deps, now)?),
        QueryMsg::Staker { address } => to_json_binary(&query_staker(deps, address)?),
        QueryMsg::UserInfo { address } => to_json_binary(&query_user_info(deps, now, address)?),
        QueryMsg::Earned { address } => to_json_binary(&query_earned(deps, now, address)?),
        QueryMsg::CanWithdrawWithoutPenalty { address } => {
            let (config, staker) = load_staker(deps, &address)?;
            to_json_binary(&ledger::can_withdraw_without_penalty(
                &staker,
                config.lock_period,
                now,
            ))
        }
        QueryMsg::TimeUntilUnlock { address } => {
            let (config, staker) = load_staker(deps, &address)?;
            to_json_binary(&ledger::time_until_unlock(&staker, config.lock_period, now))
        }
        QueryMsg::Stakers { start_after, limit } => {
            to_json_binary(&query_stakers(deps, start_after, limit)?)
        }
    }?;
    Ok(res)
}

fn load_staker(deps: Deps, address: &str) -> Result<(Config, Staker), ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let addr = deps.api.addr_validate(address)?;
    let staker = STAKERS.may_load(deps.storage, &addr)?.unwrap_or_default();
    Ok((config, staker))
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        staking_token: config.staking_token,
        reward_token: config.reward_token,
        reward_rate: config.reward_rate,
        lock_period: config.lock_period,
        penalty_rate_bps: config.penalty_rate_bps,
    })
}

fn query_reward_per_token(deps: Deps, now: u64) -> Result<Uint256, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = POOL_STATE.load(deps.storage)?;
    ledger::reward_per_token(&pool, config.reward_rate, now)
}

fn query_staker(deps: Deps, address: String) -> Result<StakerResponse, ContractError> {
    let (_, staker) = load_staker(deps, &address)?;
    Ok(to_staker_response(deps.api.addr_validate(&address)?, staker))
}

fn query_earned(deps: Deps, now: u64, address: String) -> Result<Uint128, ContractError> {
    let (config, staker) = load_staker(deps, &address)?;
    let pool = POOL_STATE.load(deps.storage)?;
    ledger::earned(&pool, &staker, config.reward_rate, now)
}

fn query_user_info(deps: Deps, now: u64, address: String) -> Result<UserInfoResponse, ContractError> {
    let (config, staker) = load_staker(deps, &address)?;
    let pool = POOL_STATE.load(deps.storage)?;
    Ok(UserInfoResponse {
        staked_amount: staker.staked_amount,
        earned: ledger::earned(&pool, &staker, config.reward_rate, now)?,
        stake_timestamp: staker.stake_timestamp,
    })
}

fn query_stakers(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> Result<Vec<StakerResponse>, ContractError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_addr = start_after
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let stakers = STAKERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (addr, staker) = item?;
            Ok(to_staker_response(addr, staker))
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(stakers)
}

fn to_staker_response(address: Addr, staker: Staker) -> StakerResponse {
    StakerResponse {
        address,
        staked_amount: staker.staked_amount,
        reward_per_token_paid: staker.reward_per_token_paid,
        accrued_rewards: staker.accrued_rewards,
        stake_timestamp: staker.stake_timestamp,
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let previous = get_contract_version(deps.storage)?;
    if previous.contract != CONTRACT_NAME {
        return Err(ContractError::InvalidMigration {
            previous_contract: previous.contract,
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("from_version", previous.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
