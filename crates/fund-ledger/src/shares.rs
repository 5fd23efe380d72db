//! Share token owned by the fund.
//!
//! The token is created by the deployer, handed to the fund exactly once
//! through [`ShareToken::transfer_ownership`], and from then on only the fund
//! can mint. Shares are minted 1:1 with accepted deposits.

use std::collections::HashMap;

use fund_types::{Address, U256};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the share token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("{caller} is not the token owner ({owner})")]
    NotOwner { caller: Address, owner: Address },

    #[error("Token ownership has already been transferred")]
    OwnershipAlreadyTransferred,

    #[error("Cannot transfer ownership to the zero address")]
    ZeroOwner,

    #[error("Share supply overflow")]
    SupplyOverflow,
}

/// Tradable share token.
#[derive(Debug, Clone, Serialize)]
pub struct ShareToken {
    name: String,
    symbol: String,
    owner: Address,
    handed_over: bool,
    #[serde(skip)]
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

impl ShareToken {
    /// Create a token owned by `owner` (normally the deployer).
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, owner: Address) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            owner,
            handed_over: false,
            balances: HashMap::new(),
            total_supply: U256::ZERO,
        }
    }

    /// Move ownership to `new_owner`. Allowed once per token.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ShareError> {
        self.ensure_owner(caller)?;
        if self.handed_over {
            return Err(ShareError::OwnershipAlreadyTransferred);
        }
        if new_owner.is_zero() {
            return Err(ShareError::ZeroOwner);
        }

        tracing::info!(from = %self.owner, to = %new_owner, symbol = %self.symbol, "Share token ownership transferred");
        self.owner = new_owner;
        self.handed_over = true;
        Ok(())
    }

    /// Mint `amount` shares to `to`. Owner only.
    pub fn mint(&mut self, caller: Address, to: Address, amount: U256) -> Result<(), ShareError> {
        self.ensure_owner(caller)?;

        let supply = self
            .total_supply
            .checked_add(&amount)
            .ok_or(ShareError::SupplyOverflow)?;
        // Individual balances are bounded by the supply.
        let balance = self
            .balance_of(&to)
            .checked_add(&amount)
            .ok_or(ShareError::SupplyOverflow)?;

        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or(U256::ZERO)
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), ShareError> {
        if caller != self.owner {
            return Err(ShareError::NotOwner {
                caller,
                owner: self.owner,
            });
        }
        Ok(())
    }
}
