use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiating address
    pub owner: Option<String>,
    pub pool_code_id: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Instantiate a new staking pool and append it to the registry
    CreatePool {
        staking_token: String,
        reward_token: String,
        reward_rate: Uint128,
        lock_period: u64,
        penalty_rate_bps: u16,
    },

    ActivatePool { index: u64 },

    DeactivatePool { index: u64 },

    UpdateConfig {
        owner: Option<String>,
        pool_code_id: Option<u64>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(PoolResponse)]
    Pool { index: u64 },

    #[returns(Vec<PoolResponse>)]
    AllPools {},

    #[returns(Vec<PoolResponse>)]
    Pools {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(u64)]
    PoolCount {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub pool_code_id: u64,
}

#[cw_serde]
pub struct PoolResponse {
    pub index: u64,
    pub pool_address: Addr,
    pub staking_token: Addr,
    pub reward_token: Addr,
    pub active: bool,
    pub created_at: u64,
}
