use cosmwasm_std::{ConversionOverflowError, DivideByZeroError, OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    DivideByZero(#[from] DivideByZeroError),

    #[error("{0}")]
    ConversionOverflow(#[from] ConversionOverflowError),

    #[error("Not owner")]
    NotOwner {},

    #[error("Amount must be greater than zero")]
    InvalidAmount {},

    #[error("Insufficient staked balance")]
    InsufficientStake {},

    #[error("Penalty rate too high: {rate} basis points exceeds {max}")]
    PenaltyTooHigh { rate: u16, max: u16 },

    #[error("Token {token} is not accepted for this operation")]
    InvalidToken { token: String },

    #[error("Cannot migrate from {previous_contract}")]
    InvalidMigration { previous_contract: String },
}
