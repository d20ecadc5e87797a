use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    /// Code id instantiated for every new pool
    pub pool_code_id: u64,
}

#[cw_serde]
pub struct PoolRecord {
    pub pool_address: Addr,
    pub staking_token: Addr,
    pub reward_token: Addr,
    /// Directory flag only; the pool contract never reads it.
    pub active: bool,
    pub created_at: u64,
}

/// Pool awaiting its instantiate reply
#[cw_serde]
pub struct PendingPool {
    pub index: u64,
    pub staking_token: Addr,
    pub reward_token: Addr,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const POOL_COUNT: Item<u64> = Item::new("pool_count");
// Append-only, keyed by creation order
pub const POOLS: Map<u64, PoolRecord> = Map::new("pools");
pub const PENDING_POOL: Item<PendingPool> = Item::new("pending_pool");
