use thiserror::Error;

/// Errors surfaced by a keeper pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeeperError {
    #[error("Liquidation of position {key} failed: {reason}")]
    LiquidationFailed { key: u64, reason: String },

    #[error("Ledger read failed: {0}")]
    Ledger(String),
}
