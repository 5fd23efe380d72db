//! Vault holding the fund's value.
//!
//! Tracks the spendable balance and every release of funds. The balance is
//! always the sum of accepted deposits minus the sum of transfers.

use fund_types::{Address, U256};
use serde::Serialize;

use crate::error::FundError;

/// Record of value leaving the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// Spending request that authorised the release
    pub index: u64,
    /// Recipient address
    pub recipient: Address,
    /// Amount
    pub amount: U256,
}

/// Treasury balance and outgoing transfer history.
#[derive(Debug, Default, Clone)]
pub struct Vault {
    balance: U256,
    total_received: U256,
    transfers: Vec<Transfer>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept incoming value.
    pub fn receive(&mut self, amount: U256) -> Result<(), FundError> {
        let balance = self
            .balance
            .checked_add(&amount)
            .ok_or(FundError::ArithmeticOverflow("vault balance"))?;
        let total_received = self
            .total_received
            .checked_add(&amount)
            .ok_or(FundError::ArithmeticOverflow("vault receipts"))?;

        self.balance = balance;
        self.total_received = total_received;
        Ok(())
    }

    /// Release `amount` to `recipient` on behalf of request `index`.
    ///
    /// # Errors
    /// - `InsufficientBalance` when the vault holds less than `amount`
    pub fn release(
        &mut self,
        index: u64,
        recipient: Address,
        amount: U256,
    ) -> Result<Transfer, FundError> {
        let balance = self
            .balance
            .checked_sub(&amount)
            .ok_or(FundError::InsufficientBalance {
                required: amount,
                available: self.balance,
            })?;

        let transfer = Transfer {
            index,
            recipient,
            amount,
        };
        self.balance = balance;
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    /// Spendable balance.
    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn total_received(&self) -> U256 {
        self.total_received
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Total released to `recipient` so far.
    pub fn paid_to(&self, recipient: &Address) -> U256 {
        self.transfers
            .iter()
            .filter(|t| &t.recipient == recipient)
            .fold(U256::ZERO, |acc, t| acc.checked_add(&t.amount).unwrap_or(U256::MAX))
    }
}
