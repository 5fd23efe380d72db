//! Events emitted by successful ledger operations.

use fund_types::{Address, U256};
use serde::Serialize;

/// Observable record of a committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FundEvent {
    /// A participant's deposit was accepted
    Deposit { participant: Address, amount: U256 },
    /// The admin created a spending request
    NewSpending { recipient: Address, amount: U256 },
    /// Funds for a request were released; `executor` is the admin
    SpendingExecuted { executor: Address, index: u64 },
}

impl FundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FundEvent::Deposit { .. } => "Deposit",
            FundEvent::NewSpending { .. } => "NewSpending",
            FundEvent::SpendingExecuted { .. } => "SpendingExecuted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = FundEvent::SpendingExecuted {
            executor: Address::from_bytes([1u8; 20]),
            index: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "spending_executed");
        assert_eq!(json["index"], 4);
        assert_eq!(event.name(), "SpendingExecuted");
    }
}
