//! Spending requests and the append-only registry that holds them.
//!
//! Requests are addressed by their 0-based position. Nothing is ever removed,
//! so an index, once issued, refers to the same request forever.

use std::collections::BTreeSet;

use fund_types::{Address, U256};
use serde::Serialize;

use crate::error::FundError;

/// A proposed transfer of treasury value, with its voting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingRequest {
    /// Position in the registry
    pub index: u64,
    /// Free-text description
    pub description: String,
    /// Who receives the funds on execution
    pub recipient: Address,
    /// Requested amount
    pub amount: U256,
    /// Number of affirmative voters
    pub yes_count: u64,
    /// Weight of affirmative voters, read when each voted
    pub yes_weight: U256,
    /// Weight of negative voters, informational only
    pub no_weight: U256,
    /// Everyone who has voted, in either direction
    pub voter_record: BTreeSet<Address>,
    /// Result of the last quorum evaluation
    pub approved: bool,
    /// Set once funds are released
    pub executed: bool,
}

impl SpendingRequest {
    fn new(index: u64, recipient: Address, amount: U256, description: String) -> Self {
        Self {
            index,
            description,
            recipient,
            amount,
            yes_count: 0,
            yes_weight: U256::ZERO,
            no_weight: U256::ZERO,
            voter_record: BTreeSet::new(),
            approved: false,
            executed: false,
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voter_record.contains(voter)
    }

    pub fn vote_count(&self) -> usize {
        self.voter_record.len()
    }
}

/// Ordered arena of spending requests.
#[derive(Debug, Default, Clone)]
pub struct ProposalRegistry {
    requests: Vec<SpendingRequest>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh request and return its index.
    pub fn push(&mut self, recipient: Address, amount: U256, description: String) -> u64 {
        let index = self.count();
        self.requests
            .push(SpendingRequest::new(index, recipient, amount, description));
        index
    }

    pub fn count(&self) -> u64 {
        self.requests.len() as u64
    }

    pub fn get(&self, index: u64) -> Result<&SpendingRequest, FundError> {
        let count = self.count();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.requests.get(i))
            .ok_or(FundError::NotFound { index, count })
    }

    pub(crate) fn get_mut(&mut self, index: u64) -> Result<&mut SpendingRequest, FundError> {
        let count = self.count();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.requests.get_mut(i))
            .ok_or(FundError::NotFound { index, count })
    }

    /// Requests with indices in `[start, end)`, clamped to the populated range.
    pub fn list(&self, start: u64, end: u64) -> &[SpendingRequest] {
        let len = self.requests.len();
        let start = usize::try_from(start).unwrap_or(len).min(len);
        let end = usize::try_from(end).unwrap_or(len).min(len);
        if start >= end {
            return &[];
        }
        &self.requests[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpendingRequest> {
        self.requests.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn test_indices_are_sequential() {
        let mut registry = ProposalRegistry::new();
        assert_eq!(registry.push(addr(1), U256::from(10u64), "a".into()), 0);
        assert_eq!(registry.push(addr(2), U256::from(20u64), "b".into()), 1);
        assert_eq!(registry.count(), 2);

        let second = registry.get(1).unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.recipient, addr(2));
        assert!(!second.approved);
        assert!(!second.executed);
        assert_eq!(second.vote_count(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut registry = ProposalRegistry::new();
        assert_eq!(
            registry.get(0),
            Err(FundError::NotFound { index: 0, count: 0 })
        );
        registry.push(addr(1), U256::ONE, "only".into());
        assert!(registry.get(0).is_ok());
        assert_eq!(
            registry.get(1),
            Err(FundError::NotFound { index: 1, count: 1 })
        );
        assert!(registry.get(u64::MAX).is_err());
    }

    #[test]
    fn test_list_clamps_range() {
        let mut registry = ProposalRegistry::new();
        for i in 0..5u8 {
            registry.push(addr(i), U256::from(i as u64), format!("req {i}"));
        }

        let page = registry.list(1, 3);
        assert_eq!(page.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(registry.list(3, 100).len(), 2);
        assert!(registry.list(5, 10).is_empty());
        assert!(registry.list(4, 2).is_empty());
    }
}
