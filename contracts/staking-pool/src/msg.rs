use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128, Uint256};
use cw20::Cw20ReceiveMsg;

use crate::state::PoolState;

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub staking_token: String,
    pub reward_token: String,
    pub reward_rate: Uint128,
    pub lock_period: u64,
    pub penalty_rate_bps: u16,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Stake or fund rewards via CW20 Send
    Receive(Cw20ReceiveMsg),

    /// Withdraw part of the stake, penalized while still locked
    Withdraw { amount: Uint128 },

    /// Pay out all accrued rewards
    ClaimRewards {},

    /// Exit the whole stake at the penalty rate and forfeit unclaimed rewards
    EmergencyWithdraw {},

    // Owner Messages
    SetRewardRate { reward_rate: Uint128 },

    SetLockPeriod { lock_period: u64 },

    SetPenaltyRate { penalty_rate_bps: u16 },

    /// Move retained penalty principal out of the pool
    SweepForfeited { recipient: Option<String> },

    TransferOwnership { owner: String },
}

#[cw_serde]
pub enum Cw20HookMsg {
    Stake {},
    FundRewards {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(PoolState)]
    State {},

    /// Accumulator projected to the current block time
    #[returns(Uint256)]
    RewardPerToken {},

    #[returns(StakerResponse)]
    Staker { address: String },

    #[returns(UserInfoResponse)]
    UserInfo { address: String },

    #[returns(Uint128)]
    Earned { address: String },

    #[returns(bool)]
    CanWithdrawWithoutPenalty { address: String },

    /// Seconds left until a penalty-free withdrawal, zero once unlocked
    #[returns(u64)]
    TimeUntilUnlock { address: String },

    #[returns(Vec<StakerResponse>)]
    Stakers {
        start_after: Option<String>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub staking_token: Addr,
    pub reward_token: Addr,
    pub reward_rate: Uint128,
    pub lock_period: u64,
    pub penalty_rate_bps: u16,
}

#[cw_serde]
pub struct StakerResponse {
    pub address: Addr,
    pub staked_amount: Uint128,
    pub reward_per_token_paid: Uint256,
    pub accrued_rewards: Uint128,
    pub stake_timestamp: u64,
}

#[cw_serde]
pub struct UserInfoResponse {
    pub staked_amount: Uint128,
    pub earned: Uint128,
    pub stake_timestamp: u64,
}
