use fund_types::{Address, U256};
use thiserror::Error;

use crate::shares::ShareError;

/// Rejections raised by the treasury ledger.
///
/// Every variant leaves the ledger exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FundError {
    #[error("Paid amount {paid} does not equal the declared amount {declared}")]
    AmountMismatch { declared: U256, paid: U256 },

    #[error("Minimum first deposit is {minimum}, got {amount}")]
    BelowMinimum { amount: U256, minimum: U256 },

    #[error("Not the admin: {0}")]
    NotAdmin(Address),

    #[error("Not a stakeholder: {0}")]
    NotStakeholder(Address),

    #[error("Spending request {index} does not exist ({count} created)")]
    NotFound { index: u64, count: u64 },

    #[error("{voter} already voted on spending request {index}")]
    DoubleVote { voter: Address, index: u64 },

    #[error("Approval votes not yet met for spending request {0}")]
    QuorumNotMet(u64),

    #[error("Spending request {0} has already been executed")]
    AlreadyExecuted(u64),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Share token error: {0}")]
    Shares(#[from] ShareError),
}

impl FundError {
    /// Stable machine-readable name, used for API payloads and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            FundError::AmountMismatch { .. } => "amount_mismatch",
            FundError::BelowMinimum { .. } => "below_minimum",
            FundError::NotAdmin(_) => "not_admin",
            FundError::NotStakeholder(_) => "not_stakeholder",
            FundError::NotFound { .. } => "not_found",
            FundError::DoubleVote { .. } => "double_vote",
            FundError::QuorumNotMet(_) => "quorum_not_met",
            FundError::AlreadyExecuted(_) => "already_executed",
            FundError::InsufficientBalance { .. } => "insufficient_balance",
            FundError::ArithmeticOverflow(_) => "arithmetic_overflow",
            FundError::InvalidConfig(_) => "invalid_config",
            FundError::Shares(_) => "share_token",
        }
    }
}
