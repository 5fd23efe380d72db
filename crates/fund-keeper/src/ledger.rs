//! The debt ledger as the keeper sees it.

use crate::error::KeeperError;
use crate::position::{Position, RiskParams};

/// Read and liquidate access to a collateralized-debt ledger.
///
/// Positions are keyed from 0. A missing key, or a position with zero
/// collateral, marks the end of the populated range.
pub trait PositionLedger {
    fn risk_params(&self) -> Result<RiskParams, KeeperError>;

    fn position(&self, key: u64) -> Result<Option<Position>, KeeperError>;

    fn liquidate(&mut self, key: u64) -> Result<(), KeeperError>;
}

/// In-process ledger.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    params: RiskParams,
    positions: Vec<Position>,
    liquidated: Vec<u64>,
}

impl MemoryLedger {
    pub fn new(params: RiskParams) -> Self {
        Self {
            params,
            positions: Vec::new(),
            liquidated: Vec::new(),
        }
    }

    pub fn with_positions(params: RiskParams, positions: Vec<Position>) -> Self {
        Self {
            positions,
            ..Self::new(params)
        }
    }

    /// Append a position and return its key.
    pub fn open(&mut self, position: Position) -> u64 {
        self.positions.push(position);
        (self.positions.len() - 1) as u64
    }

    pub fn set_params(&mut self, params: RiskParams) {
        self.params = params;
    }

    /// Keys liquidated so far, in order.
    pub fn liquidated(&self) -> &[u64] {
        &self.liquidated
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PositionLedger for MemoryLedger {
    fn risk_params(&self) -> Result<RiskParams, KeeperError> {
        Ok(self.params)
    }

    fn position(&self, key: u64) -> Result<Option<Position>, KeeperError> {
        Ok(usize::try_from(key)
            .ok()
            .and_then(|i| self.positions.get(i))
            .cloned())
    }

    fn liquidate(&mut self, key: u64) -> Result<(), KeeperError> {
        let position = usize::try_from(key)
            .ok()
            .and_then(|i| self.positions.get_mut(i))
            .ok_or_else(|| KeeperError::LiquidationFailed {
                key,
                reason: "unknown position".into(),
            })?;

        if !position.active {
            return Err(KeeperError::LiquidationFailed {
                key,
                reason: "position is not active".into(),
            });
        }

        position.active = false;
        self.liquidated.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_types::{Address, U256};

    fn params() -> RiskParams {
        RiskParams {
            liquidation_ratio: 150,
            stability_fee: 0,
            usd_in_wei: U256::ONE,
        }
    }

    fn position() -> Position {
        Position {
            collateral: U256::from(10u64),
            owing: U256::from(100u64),
            borrower: Address::from_bytes([7u8; 20]),
            active: true,
        }
    }

    #[test]
    fn test_open_and_read() {
        let mut ledger = MemoryLedger::new(params());
        assert_eq!(ledger.open(position()), 0);
        assert_eq!(ledger.open(position()), 1);
        assert_eq!(ledger.position(1).unwrap(), Some(position()));
        assert_eq!(ledger.position(2).unwrap(), None);
    }

    #[test]
    fn test_liquidate_once() {
        let mut ledger = MemoryLedger::with_positions(params(), vec![position()]);
        ledger.liquidate(0).unwrap();
        assert!(!ledger.position(0).unwrap().unwrap().active);
        assert_eq!(ledger.liquidated(), &[0]);

        assert!(matches!(
            ledger.liquidate(0),
            Err(KeeperError::LiquidationFailed { key: 0, .. })
        ));
        assert!(ledger.liquidate(9).is_err());
    }
}
