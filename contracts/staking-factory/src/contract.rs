use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order, Reply,
    Response, StdError, StdResult, SubMsg, SubMsgResponse, Uint128, WasmMsg,
};
use cw2::{get_contract_version, set_contract_version};
use cw_storage_plus::Bound;
use staking_pool::ledger::MAX_PENALTY_BPS;
use staking_pool::msg::InstantiateMsg as PoolInstantiateMsg;

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, MigrateMsg, PoolResponse, QueryMsg,
};
use crate::state::{
    Config, PendingPool, PoolRecord, CONFIG, PENDING_POOL, POOLS, POOL_COUNT,
};

const CONTRACT_NAME: &str = "crates.io:staking-factory";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const INSTANTIATE_POOL_REPLY_ID: u64 = 1;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };

    let config = Config {
        owner,
        pool_code_id: msg.pool_code_id,
    };
    CONFIG.save(deps.storage, &config)?;
    POOL_COUNT.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", config.owner)
        .add_attribute("pool_code_id", config.pool_code_id.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreatePool {
            staking_token,
            reward_token,
            reward_rate,
            lock_period,
            penalty_rate_bps,
        } => execute_create_pool(
            deps,
            env,
            info,
            staking_token,
            reward_token,
            reward_rate,
            lock_period,
            penalty_rate_bps,
        ),
        ExecuteMsg::ActivatePool { index } => execute_set_active(deps, info, index, true),
        ExecuteMsg::DeactivatePool { index } => execute_set_active(deps, info, index, false),
        ExecuteMsg::UpdateConfig {
            owner,
            pool_code_id,
        } => execute_update_config(deps, info, owner, pool_code_id),
    }
}

#[allow(clippy::too_many_arguments)]
fn execute_create_pool(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    staking_token: String,
    reward_token: String,
    reward_rate: Uint128,
    lock_period: u64,
    penalty_rate_bps: u16,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    if penalty_rate_bps > MAX_PENALTY_BPS {
        return Err(ContractError::PenaltyTooHigh {
            rate: penalty_rate_bps,
            max: MAX_PENALTY_BPS,
        });
    }

    let staking_token = deps.api.addr_validate(&staking_token)?;
    let reward_token = deps.api.addr_validate(&reward_token)?;

    let index = POOL_COUNT.load(deps.storage)?;
    POOL_COUNT.save(deps.storage, &(index + 1))?;
    PENDING_POOL.save(
        deps.storage,
        &PendingPool {
            index,
            staking_token: staking_token.clone(),
            reward_token: reward_token.clone(),
        },
    )?;

    // The registry owner also owns and administers every pool it creates
    let instantiate_msg = WasmMsg::Instantiate {
        admin: Some(config.owner.to_string()),
        code_id: config.pool_code_id,
        msg: to_json_binary(&PoolInstantiateMsg {
            owner: config.owner.to_string(),
            staking_token: staking_token.to_string(),
            reward_token: reward_token.to_string(),
            reward_rate,
            lock_period,
            penalty_rate_bps,
        })?,
        funds: vec![],
        label: format!("staking-pool-{}", index),
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(
            instantiate_msg,
            INSTANTIATE_POOL_REPLY_ID,
        ))
        .set_data(to_json_binary(&index)?)
        .add_attribute("action", "create_pool")
        .add_attribute("pool_index", index.to_string())
        .add_attribute("staking_token", staking_token)
        .add_attribute("reward_token", reward_token))
}

fn execute_set_active(
    deps: DepsMut,
    info: MessageInfo,
    index: u64,
    active: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    let mut pool = load_pool(deps.as_ref(), index)?;
    pool.active = active;
    POOLS.save(deps.storage, index, &pool)?;

    let action = if active {
        "activate_pool"
    } else {
        "deactivate_pool"
    };
    Ok(Response::new()
        .add_attribute("action", action)
        .add_attribute("pool_index", index.to_string())
        .add_attribute("pool_address", pool.pool_address))
}

fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    owner: Option<String>,
    pool_code_id: Option<u64>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    assert_owner(&config, &info.sender)?;

    if let Some(o) = owner {
        config.owner = deps.api.addr_validate(&o)?;
    }
    if let Some(code_id) = pool_code_id {
        config.pool_code_id = code_id;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    if msg.id != INSTANTIATE_POOL_REPLY_ID {
        return Err(ContractError::UnknownReplyId { id: msg.id });
    }

    let response = msg.result.into_result().map_err(StdError::generic_err)?;
    let pool_address = deps.api.addr_validate(&instantiated_address(&response)?)?;

    let pending = PENDING_POOL
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingPool {})?;
    PENDING_POOL.remove(deps.storage);

    let record = PoolRecord {
        pool_address,
        staking_token: pending.staking_token,
        reward_token: pending.reward_token,
        active: true,
        created_at: env.block.time.seconds(),
    };
    POOLS.save(deps.storage, pending.index, &record)?;

    Ok(Response::new()
        .add_attribute("action", "register_pool")
        .add_attribute("pool_index", pending.index.to_string())
        .add_attribute("pool_address", record.pool_address))
}

// Helpers
fn assert_owner(config: &Config, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.owner {
        return Err(ContractError::NotOwner {});
    }
    Ok(())
}

fn instantiated_address(response: &SubMsgResponse) -> Result<String, ContractError> {
    response
        .events
        .iter()
        .filter(|event| event.ty == "instantiate")
        .flat_map(|event| event.attributes.iter())
        .find(|attr| attr.key == "_contract_address")
        .map(|attr| attr.value.clone())
        .ok_or(ContractError::MissingPoolAddress {})
}

fn load_pool(deps: Deps, index: u64) -> Result<PoolRecord, ContractError> {
    POOLS
        .may_load(deps.storage, index)?
        .ok_or(ContractError::InvalidIndex { index })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Pool { index } => to_json_binary(&query_pool(deps, index)?),
        QueryMsg::AllPools {} => to_json_binary(&query_pools(deps, None, None)?),
        QueryMsg::Pools { start_after, limit } => {
            let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
            to_json_binary(&query_pools(deps, start_after, Some(limit))?)
        }
        QueryMsg::PoolCount {} => to_json_binary(&POOL_COUNT.load(deps.storage)?),
    }?;
    Ok(res)
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        pool_code_id: config.pool_code_id,
    })
}

fn query_pool(deps: Deps, index: u64) -> Result<PoolResponse, ContractError> {
    let pool = load_pool(deps, index)?;
    Ok(to_pool_response(index, pool))
}

fn query_pools(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<usize>,
) -> StdResult<Vec<PoolResponse>> {
    let start = start_after.map(Bound::exclusive);

    POOLS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit.unwrap_or(usize::MAX))
        .map(|item| {
            let (index, pool) = item?;
            Ok(to_pool_response(index, pool))
        })
        .collect()
}

fn to_pool_response(index: u64, pool: PoolRecord) -> PoolResponse {
    PoolResponse {
        index,
        pool_address: pool.pool_address,
        staking_token: pool.staking_token,
        reward_token: pool.reward_token,
        active: pool.active,
        created_at: pool.created_at,
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
