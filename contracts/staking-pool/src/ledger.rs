//! Reward-per-token accounting for a single pool.
//!
//! The pool keeps one global accumulator, `reward_per_token_stored`, that grows by
//! `elapsed * rate / total_staked` whenever it is refreshed. Each staker remembers the
//! accumulator value at its last checkpoint, so its pending reward is
//! `staked * (current - paid)`. Refreshing is O(1) regardless of how many stakers exist.
//!
//! Nothing here touches storage; callers load the records, run these functions and save.

use cosmwasm_std::{Uint128, Uint256};

use crate::error::ContractError;
use crate::state::{PoolState, Staker};

/// Fixed-point scale of the reward-per-token accumulator.
pub const SCALE: Uint256 = Uint256::from_u128(1_000_000_000_000_000_000);

pub const MAX_PENALTY_BPS: u16 = 10_000;

/// Accumulator value as of `now`, without mutating the pool.
pub fn reward_per_token(
    pool: &PoolState,
    reward_rate: Uint128,
    now: u64,
) -> Result<Uint256, ContractError> {
    if pool.total_staked.is_zero() {
        return Ok(pool.reward_per_token_stored);
    }

    let elapsed = now.saturating_sub(pool.last_update_time);
    if elapsed == 0 {
        return Ok(pool.reward_per_token_stored);
    }

    let increase = Uint256::from(reward_rate)
        .checked_mul(Uint256::from(elapsed))?
        .checked_mul(SCALE)?
        .checked_div(Uint256::from(pool.total_staked))?;

    Ok(pool.reward_per_token_stored.checked_add(increase)?)
}

/// Brings the global accumulator up to `now`.
pub fn update_pool(
    pool: &mut PoolState,
    reward_rate: Uint128,
    now: u64,
) -> Result<(), ContractError> {
    pool.reward_per_token_stored = reward_per_token(pool, reward_rate, now)?;
    // time oracle is monotonic, but never rewind the checkpoint
    pool.last_update_time = pool.last_update_time.max(now);
    Ok(())
}

/// Rewards the staker has earned since its last checkpoint.
pub fn pending_rewards(
    staker: &Staker,
    reward_per_token: Uint256,
) -> Result<Uint128, ContractError> {
    let delta = reward_per_token.checked_sub(staker.reward_per_token_paid)?;
    let pending = Uint256::from(staker.staked_amount)
        .checked_mul(delta)?
        .checked_div(SCALE)?;
    Ok(Uint128::try_from(pending)?)
}

/// Moves pending rewards into `accrued_rewards` and checkpoints the staker.
/// Must run against an accumulator already refreshed with `update_pool`.
pub fn settle_staker(staker: &mut Staker, reward_per_token: Uint256) -> Result<(), ContractError> {
    let pending = pending_rewards(staker, reward_per_token)?;
    staker.accrued_rewards = staker.accrued_rewards.checked_add(pending)?;
    staker.reward_per_token_paid = reward_per_token;
    Ok(())
}

/// Read-only projection of `settle_staker` at `now`.
pub fn earned(
    pool: &PoolState,
    staker: &Staker,
    reward_rate: Uint128,
    now: u64,
) -> Result<Uint128, ContractError> {
    let current = reward_per_token(pool, reward_rate, now)?;
    let pending = pending_rewards(staker, current)?;
    Ok(staker.accrued_rewards.checked_add(pending)?)
}

/// `floor(amount * penalty_rate_bps / 10000)`
pub fn penalty(amount: Uint128, penalty_rate_bps: u16) -> Uint128 {
    amount.multiply_ratio(penalty_rate_bps, MAX_PENALTY_BPS)
}

pub fn unlock_time(staker: &Staker, lock_period: u64) -> u64 {
    staker.stake_timestamp.saturating_add(lock_period)
}

pub fn can_withdraw_without_penalty(staker: &Staker, lock_period: u64, now: u64) -> bool {
    now >= unlock_time(staker, lock_period)
}

pub fn time_until_unlock(staker: &Staker, lock_period: u64, now: u64) -> u64 {
    unlock_time(staker, lock_period).saturating_sub(now)
}

pub fn validate_penalty_rate(penalty_rate_bps: u16) -> Result<(), ContractError> {
    if penalty_rate_bps > MAX_PENALTY_BPS {
        return Err(ContractError::PenaltyTooHigh {
            rate: penalty_rate_bps,
            max: MAX_PENALTY_BPS,
        });
    }
    Ok(())
}
