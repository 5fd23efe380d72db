//! Debt positions and the collateralization rule.

use fund_types::{Address, U256};
use serde::{Deserialize, Serialize};

/// One collateralized debt position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Collateral locked, in wei
    pub collateral: U256,
    /// Stablecoin owed
    pub owing: U256,
    /// Borrower address
    pub borrower: Address,
    /// Closed and liquidated positions are inactive
    pub active: bool,
}

/// Ledger-wide risk parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Required collateral over debt value, in percent (e.g. 150)
    pub liquidation_ratio: u16,
    /// Fee added to the debt, in percent
    pub stability_fee: u8,
    /// Price of one unit of debt in wei
    pub usd_in_wei: U256,
}

impl RiskParams {
    /// Collateral a debt of `owing` needs:
    /// `owing * (100 + fee) / 100 * (usd_in_wei * ratio / 100)`.
    ///
    /// `None` when the result does not fit in 256 bits.
    pub fn required_collateral(&self, owing: U256) -> Option<U256> {
        let hundred = U256::from(100u64);
        let with_fee = owing
            .checked_mul(&U256::from(100u64 + self.stability_fee as u64))?
            .checked_div(&hundred)?;
        let price = self
            .usd_in_wei
            .checked_mul(&U256::from(self.liquidation_ratio as u64))?
            .checked_div(&hundred)?;
        with_fee.checked_mul(&price)
    }

    /// Whether `position` should be liquidated.
    pub fn is_liquidatable(&self, position: &Position) -> bool {
        if !position.active {
            return false;
        }
        match self.required_collateral(position.owing) {
            Some(required) => position.collateral < required,
            // The requirement exceeds any representable collateral.
            None => true,
        }
    }
}
