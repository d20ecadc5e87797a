use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Not owner")]
    NotOwner {},

    #[error("No pool at index {index}")]
    InvalidIndex { index: u64 },

    #[error("Penalty rate too high: {rate} basis points exceeds {max}")]
    PenaltyTooHigh { rate: u16, max: u16 },

    #[error("Unknown reply id {id}")]
    UnknownReplyId { id: u64 },

    #[error("Pool instantiation did not report a contract address")]
    MissingPoolAddress {},

    #[error("No pool creation in progress")]
    NoPendingPool {},

    #[error("Cannot migrate from {previous_contract}")]
    InvalidMigration { previous_contract: String },
}
