//! Stake ledger: participant -> cumulative deposited weight.

use std::collections::HashMap;

use fund_types::{Address, U256};

use crate::error::FundError;

/// A validated, not yet applied, increase of one participant's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeCredit {
    pub participant: Address,
    pub amount: U256,
    pub new_weight: U256,
    pub new_total: U256,
}

/// Voting weight per participant.
///
/// Weights only ever grow. The running total is kept alongside so quorum
/// checks read the live total stake in O(1).
#[derive(Debug, Default, Clone)]
pub struct StakeLedger {
    weights: HashMap<Address, U256>,
    total: U256,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current weight; zero for unknown participants.
    pub fn weight_of(&self, participant: &Address) -> U256 {
        self.weights.get(participant).copied().unwrap_or(U256::ZERO)
    }

    pub fn is_stakeholder(&self, participant: &Address) -> bool {
        !self.weight_of(participant).is_zero()
    }

    /// Sum of all weights.
    pub fn total(&self) -> U256 {
        self.total
    }

    pub fn stakeholder_count(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.weights.iter()
    }

    /// Compute the effect of crediting `amount` without touching state.
    pub fn plan_credit(&self, participant: Address, amount: U256) -> Result<StakeCredit, FundError> {
        let new_weight = self
            .weight_of(&participant)
            .checked_add(&amount)
            .ok_or(FundError::ArithmeticOverflow("stake weight"))?;
        let new_total = self
            .total
            .checked_add(&amount)
            .ok_or(FundError::ArithmeticOverflow("total stake"))?;

        Ok(StakeCredit {
            participant,
            amount,
            new_weight,
            new_total,
        })
    }

    /// Apply a credit produced by [`plan_credit`](Self::plan_credit).
    ///
    /// The credit must have been planned against the current state.
    pub fn apply(&mut self, credit: StakeCredit) {
        debug_assert_eq!(
            self.total.checked_add(&credit.amount),
            Some(credit.new_total),
            "stake credit planned against stale state"
        );
        if !credit.amount.is_zero() {
            self.weights.insert(credit.participant, credit.new_weight);
        }
        self.total = credit.new_total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn test_credit_accumulates() {
        let mut ledger = StakeLedger::new();
        let credit = ledger.plan_credit(addr(1), U256::from(100u64)).unwrap();
        ledger.apply(credit);
        let credit = ledger.plan_credit(addr(1), U256::from(5u64)).unwrap();
        ledger.apply(credit);
        let credit = ledger.plan_credit(addr(2), U256::from(50u64)).unwrap();
        ledger.apply(credit);

        assert_eq!(ledger.weight_of(&addr(1)), U256::from(105u64));
        assert_eq!(ledger.total(), U256::from(155u64));
        assert_eq!(ledger.stakeholder_count(), 2);
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let ledger = StakeLedger::new();
        let credit = ledger.plan_credit(addr(1), U256::from(10u64)).unwrap();
        assert_eq!(credit.new_weight, U256::from(10u64));
        assert!(!ledger.is_stakeholder(&addr(1)));
        assert_eq!(ledger.total(), U256::ZERO);
    }

    #[test]
    fn test_total_overflow_rejected() {
        let mut ledger = StakeLedger::new();
        let credit = ledger.plan_credit(addr(1), U256::MAX).unwrap();
        ledger.apply(credit);
        assert_eq!(
            ledger.plan_credit(addr(2), U256::ONE),
            Err(FundError::ArithmeticOverflow("total stake"))
        );
    }

    #[test]
    fn test_zero_credit_creates_no_stakeholder() {
        let mut ledger = StakeLedger::new();
        let credit = ledger.plan_credit(addr(1), U256::ZERO).unwrap();
        ledger.apply(credit);
        assert_eq!(ledger.stakeholder_count(), 0);
    }
}
