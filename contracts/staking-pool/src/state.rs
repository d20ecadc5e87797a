use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    pub staking_token: Addr,
    pub reward_token: Addr,
    /// Reward units emitted per second, shared across all stake.
    pub reward_rate: Uint128,
    /// Seconds after the latest stake before a penalty-free withdrawal.
    pub lock_period: u64,
    /// Share of withdrawn principal forfeited before unlock, in basis points.
    pub penalty_rate_bps: u16,
}

#[cw_serde]
pub struct PoolState {
    pub total_staked: Uint128,
    /// Cumulative reward per staked unit, scaled by `ledger::SCALE`.
    pub reward_per_token_stored: Uint256,
    pub last_update_time: u64,
    /// Principal kept by the pool from penalized withdrawals and not yet swept.
    pub forfeited_principal: Uint128,
    pub total_rewards_funded: Uint128,
    pub total_rewards_claimed: Uint128,
}

#[cw_serde]
#[derive(Default)]
pub struct Staker {
    pub staked_amount: Uint128,
    pub reward_per_token_paid: Uint256,
    pub accrued_rewards: Uint128,
    pub stake_timestamp: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const POOL_STATE: Item<PoolState> = Item::new("pool_state");
// Records are zeroed on exit, never removed.
pub const STAKERS: Map<&Addr, Staker> = Map::new("stakers");
