use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};
use cosmwasm_std::{
    from_json, to_json_binary, CosmosMsg, DepsMut, Event, Reply, ReplyOn, SubMsgResponse,
    SubMsgResult, Uint128, WasmMsg,
};
use cw20::Cw20ReceiveMsg;
use staking_pool::msg::{
    Cw20HookMsg as PoolHookMsg, ExecuteMsg as PoolExecuteMsg,
    InstantiateMsg as PoolInstantiateMsg,
};

use crate::contract::{execute, instantiate, migrate, query, reply, INSTANTIATE_POOL_REPLY_ID};
use crate::error::ContractError;
use crate::msg::{ConfigResponse, ExecuteMsg, InstantiateMsg, MigrateMsg, PoolResponse, QueryMsg};

const OWNER: &str = "owner";
const POOL_CODE_ID: u64 = 7;
const STAKING_TOKEN: &str = "staking_token";
const REWARD_TOKEN: &str = "reward_token";
const REWARD_RATE: u128 = 1_000_000_000_000_000_000;
const LOCK_PERIOD: u64 = 7 * 86_400;
const PENALTY_RATE: u16 = 1000;

fn setup(deps: DepsMut) {
    let msg = InstantiateMsg {
        owner: None,
        pool_code_id: POOL_CODE_ID,
    };
    instantiate(deps, mock_env(), mock_info(OWNER, &[]), msg).unwrap();
}

fn create_pool_msg(reward_rate: u128) -> ExecuteMsg {
    ExecuteMsg::CreatePool {
        staking_token: STAKING_TOKEN.to_string(),
        reward_token: REWARD_TOKEN.to_string(),
        reward_rate: Uint128::new(reward_rate),
        lock_period: LOCK_PERIOD,
        penalty_rate_bps: PENALTY_RATE,
    }
}

fn instantiate_reply(pool_address: &str) -> Reply {
    Reply {
        id: INSTANTIATE_POOL_REPLY_ID,
        result: SubMsgResult::Ok(SubMsgResponse {
            events: vec![Event::new("instantiate")
                .add_attribute("_contract_address", pool_address)
                .add_attribute("code_id", POOL_CODE_ID.to_string())],
            data: None,
        }),
    }
}

/// Runs CreatePool and its instantiate reply, returning the index and the pool's init msg
fn create_pool(
    mut deps: DepsMut,
    reward_rate: u128,
    pool_address: &str,
) -> (u64, PoolInstantiateMsg) {
    let res = execute(
        deps.branch(),
        mock_env(),
        mock_info(OWNER, &[]),
        create_pool_msg(reward_rate),
    )
    .unwrap();
    let index: u64 = from_json(res.data.as_ref().unwrap()).unwrap();

    let pool_msg: PoolInstantiateMsg = match &res.messages[0].msg {
        CosmosMsg::Wasm(WasmMsg::Instantiate { msg, .. }) => from_json(msg).unwrap(),
        other => panic!("unexpected msg: {:?}", other),
    };

    reply(deps, mock_env(), instantiate_reply(pool_address)).unwrap();
    (index, pool_msg)
}

fn get_pool(deps: cosmwasm_std::Deps, index: u64) -> Result<PoolResponse, ContractError> {
    let res = query(deps, mock_env(), QueryMsg::Pool { index })?;
    Ok(from_json(&res)?)
}

#[test]
fn proper_initialization() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let res = query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap();
    let config: ConfigResponse = from_json(&res).unwrap();
    assert_eq!(config.owner, OWNER);
    assert_eq!(config.pool_code_id, POOL_CODE_ID);

    let res = query(deps.as_ref(), mock_env(), QueryMsg::PoolCount {}).unwrap();
    let count: u64 = from_json(&res).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn create_pool_instantiates_pool_contract() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let res = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        create_pool_msg(REWARD_RATE),
    )
    .unwrap();

    assert_eq!(res.messages.len(), 1);
    let sub = &res.messages[0];
    assert_eq!(sub.id, INSTANTIATE_POOL_REPLY_ID);
    assert_eq!(sub.reply_on, ReplyOn::Success);

    let expected = PoolInstantiateMsg {
        owner: OWNER.to_string(),
        staking_token: STAKING_TOKEN.to_string(),
        reward_token: REWARD_TOKEN.to_string(),
        reward_rate: Uint128::new(REWARD_RATE),
        lock_period: LOCK_PERIOD,
        penalty_rate_bps: PENALTY_RATE,
    };
    assert_eq!(
        sub.msg,
        CosmosMsg::Wasm(WasmMsg::Instantiate {
            admin: Some(OWNER.to_string()),
            code_id: POOL_CODE_ID,
            msg: to_json_binary(&expected).unwrap(),
            funds: vec![],
            label: "staking-pool-0".to_string(),
        })
    );
    assert_eq!(res.data, Some(to_json_binary(&0u64).unwrap()));

    // Not listed until the reply arrives
    assert_eq!(
        get_pool(deps.as_ref(), 0).unwrap_err(),
        ContractError::InvalidIndex { index: 0 }
    );

    reply(deps.as_mut(), mock_env(), instantiate_reply("pool_zero")).unwrap();

    let pool = get_pool(deps.as_ref(), 0).unwrap();
    assert_eq!(pool.index, 0);
    assert_eq!(pool.pool_address, "pool_zero");
    assert_eq!(pool.staking_token, STAKING_TOKEN);
    assert_eq!(pool.reward_token, REWARD_TOKEN);
    assert!(pool.active);
    assert_eq!(pool.created_at, mock_env().block.time.seconds());

    let res = query(deps.as_ref(), mock_env(), QueryMsg::PoolCount {}).unwrap();
    let count: u64 = from_json(&res).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn only_owner_can_create_pools() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("user1", &[]),
        create_pool_msg(REWARD_RATE),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::NotOwner {});

    let res = query(deps.as_ref(), mock_env(), QueryMsg::PoolCount {}).unwrap();
    let count: u64 = from_json(&res).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn create_pool_rejects_penalty_above_100_percent() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::CreatePool {
            staking_token: STAKING_TOKEN.to_string(),
            reward_token: REWARD_TOKEN.to_string(),
            reward_rate: Uint128::new(REWARD_RATE),
            lock_period: LOCK_PERIOD,
            penalty_rate_bps: 10_001,
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::PenaltyTooHigh {
            rate: 10_001,
            max: 10_000
        }
    );
}

#[test]
fn pools_are_indexed_by_creation_order() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let (first, msg) = create_pool(deps.as_mut(), REWARD_RATE, "pool_zero");
    assert_eq!(first, 0);
    assert_eq!(msg.reward_rate, Uint128::new(REWARD_RATE));

    let (second, msg) = create_pool(deps.as_mut(), REWARD_RATE * 2, "pool_one");
    assert_eq!(second, 1);
    assert_eq!(msg.reward_rate, Uint128::new(REWARD_RATE * 2));

    create_pool(deps.as_mut(), REWARD_RATE, "pool_two");

    let res = query(deps.as_ref(), mock_env(), QueryMsg::AllPools {}).unwrap();
    let all: Vec<PoolResponse> = from_json(&res).unwrap();
    let addresses: Vec<_> = all.iter().map(|p| p.pool_address.to_string()).collect();
    assert_eq!(addresses, vec!["pool_zero", "pool_one", "pool_two"]);

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::Pools {
            start_after: Some(0),
            limit: Some(1),
        },
    )
    .unwrap();
    let page: Vec<PoolResponse> = from_json(&res).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].index, 1);
    assert_eq!(page[0].pool_address, "pool_one");
}

#[test]
fn activate_and_deactivate_pool() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());
    create_pool(deps.as_mut(), REWARD_RATE, "pool_zero");

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("user1", &[]),
        ExecuteMsg::DeactivatePool { index: 0 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::NotOwner {});

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::DeactivatePool { index: 0 },
    )
    .unwrap();
    assert!(!get_pool(deps.as_ref(), 0).unwrap().active);

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::ActivatePool { index: 0 },
    )
    .unwrap();
    assert!(get_pool(deps.as_ref(), 0).unwrap().active);
}

#[test]
fn invalid_index_is_rejected() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());
    create_pool(deps.as_mut(), REWARD_RATE, "pool_zero");

    assert_eq!(
        get_pool(deps.as_ref(), 1).unwrap_err(),
        ContractError::InvalidIndex { index: 1 }
    );

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::ActivatePool { index: 5 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidIndex { index: 5 });
}

#[test]
fn deactivated_pool_keeps_working() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());
    let (index, pool_msg) = create_pool(deps.as_mut(), 1, "pool_zero");
    assert_eq!(pool_msg.owner, OWNER);

    let mut pool_deps = mock_dependencies();
    staking_pool::contract::instantiate(
        pool_deps.as_mut(),
        mock_env(),
        mock_info("factory", &[]),
        pool_msg,
    )
    .unwrap();

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::DeactivatePool { index },
    )
    .unwrap();
    assert!(!get_pool(deps.as_ref(), index).unwrap().active);

    // The registry flag is informational; the pool itself still accepts stake and withdrawals
    let stake = PoolExecuteMsg::Receive(Cw20ReceiveMsg {
        sender: "user1".to_string(),
        amount: Uint128::new(100),
        msg: to_json_binary(&PoolHookMsg::Stake {}).unwrap(),
    });
    staking_pool::contract::execute(
        pool_deps.as_mut(),
        mock_env(),
        mock_info(STAKING_TOKEN, &[]),
        stake,
    )
    .unwrap();

    let mut later = mock_env();
    later.block.time = later.block.time.plus_seconds(LOCK_PERIOD);
    let res = staking_pool::contract::execute(
        pool_deps.as_mut(),
        later,
        mock_info("user1", &[]),
        PoolExecuteMsg::Withdraw {
            amount: Uint128::new(100),
        },
    )
    .unwrap();
    assert_eq!(res.messages.len(), 1);
}

#[test]
fn reply_errors() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let mut unknown = instantiate_reply("pool_zero");
    unknown.id = 99;
    let err = reply(deps.as_mut(), mock_env(), unknown).unwrap_err();
    assert_eq!(err, ContractError::UnknownReplyId { id: 99 });

    // no CreatePool in flight
    let err = reply(deps.as_mut(), mock_env(), instantiate_reply("pool_zero")).unwrap_err();
    assert_eq!(err, ContractError::NoPendingPool {});

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        create_pool_msg(REWARD_RATE),
    )
    .unwrap();
    let without_address = Reply {
        id: INSTANTIATE_POOL_REPLY_ID,
        result: SubMsgResult::Ok(SubMsgResponse {
            events: vec![Event::new("wasm").add_attribute("action", "instantiate")],
            data: None,
        }),
    };
    let err = reply(deps.as_mut(), mock_env(), without_address).unwrap_err();
    assert_eq!(err, ContractError::MissingPoolAddress {});
}

#[test]
fn update_config() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());

    let msg = ExecuteMsg::UpdateConfig {
        owner: Some("new_owner".to_string()),
        pool_code_id: Some(8),
    };
    let err = execute(deps.as_mut(), mock_env(), mock_info("user1", &[]), msg.clone()).unwrap_err();
    assert_eq!(err, ContractError::NotOwner {});

    execute(deps.as_mut(), mock_env(), mock_info(OWNER, &[]), msg).unwrap();

    let res = query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap();
    let config: ConfigResponse = from_json(&res).unwrap();
    assert_eq!(config.owner, "new_owner");
    assert_eq!(config.pool_code_id, 8);

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        create_pool_msg(REWARD_RATE),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::NotOwner {});
}

#[test]
fn migrate_keeps_registry() {
    let mut deps = mock_dependencies();
    setup(deps.as_mut());
    create_pool(deps.as_mut(), REWARD_RATE, "pool_zero");

    migrate(deps.as_mut(), mock_env(), MigrateMsg {}).unwrap();
    assert_eq!(get_pool(deps.as_ref(), 0).unwrap().pool_address, "pool_zero");
}
