//! The treasury ledger.
//!
//! `Fund` ties the stake ledger, the proposal registry, the vault and the
//! share token together behind the four governance operations. Every
//! operation takes the caller explicitly, checks access first, and validates
//! everything before the first mutation: a rejected call changes nothing.

use fund_types::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FundError;
use crate::events::FundEvent;
use crate::proposal::{ProposalRegistry, SpendingRequest};
use crate::shares::ShareToken;
use crate::stake::StakeLedger;
use crate::treasury::{Transfer, Vault};
use crate::voting::Ballot;

/// Construction-time parameters, fixed for the life of a fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundConfig {
    /// The fund's own identity; must own the share token
    pub address: Address,
    /// The only identity allowed to create and execute spending requests
    pub admin: Address,
    /// Smallest accepted first deposit
    pub min_deposit: U256,
    /// Required yes-weight over total stake, 0..=100
    pub quorum_percent: u8,
}

impl FundConfig {
    pub fn validate(&self) -> Result<(), FundError> {
        if self.quorum_percent > 100 {
            return Err(FundError::InvalidConfig(format!(
                "quorum percent must be within 0..=100, got {}",
                self.quorum_percent
            )));
        }
        if self.admin.is_zero() {
            return Err(FundError::InvalidConfig("admin cannot be the zero address".into()));
        }
        if self.address.is_zero() {
            return Err(FundError::InvalidConfig("fund address cannot be the zero address".into()));
        }
        if self.address == self.admin {
            return Err(FundError::InvalidConfig("fund address must differ from the admin".into()));
        }
        Ok(())
    }
}

/// Pooled treasury governed by deposit-weighted votes.
#[derive(Debug, Clone)]
pub struct Fund {
    config: FundConfig,
    stakes: StakeLedger,
    registry: ProposalRegistry,
    vault: Vault,
    shares: ShareToken,
    events: Vec<FundEvent>,
}

impl Fund {
    /// Build a fund around a share token whose ownership has already been
    /// handed to `config.address`.
    pub fn new(config: FundConfig, shares: ShareToken) -> Result<Self, FundError> {
        config.validate()?;
        if shares.owner() != config.address {
            return Err(FundError::InvalidConfig(format!(
                "share token is owned by {}, expected the fund {}",
                shares.owner(),
                config.address
            )));
        }

        info!(
            fund = %config.address,
            admin = %config.admin,
            min_deposit = %config.min_deposit,
            quorum_percent = config.quorum_percent,
            shares = shares.symbol(),
            "Fund created"
        );

        Ok(Self {
            config,
            stakes: StakeLedger::new(),
            registry: ProposalRegistry::new(),
            vault: Vault::new(),
            shares,
            events: Vec::new(),
        })
    }

    /// Deposit value and gain the same amount of voting weight.
    ///
    /// `declared` is what the caller intends to deposit and `paid` is the
    /// value actually transferred; the two must match.
    ///
    /// # Errors
    /// - `AmountMismatch` when `paid != declared`
    /// - `BelowMinimum` when this is the participant's first deposit and it is
    ///   smaller than the configured minimum
    pub fn deposit(
        &mut self,
        participant: Address,
        declared: U256,
        paid: U256,
    ) -> Result<U256, FundError> {
        if paid != declared {
            return Err(rejected("deposit", FundError::AmountMismatch { declared, paid }));
        }

        if !self.stakes.is_stakeholder(&participant) && declared < self.config.min_deposit {
            return Err(rejected(
                "deposit",
                FundError::BelowMinimum {
                    amount: declared,
                    minimum: self.config.min_deposit,
                },
            ));
        }

        let credit = self
            .stakes
            .plan_credit(participant, declared)
            .map_err(|e| rejected("deposit", e))?;

        // Share supply mirrors total stake and the vault never holds more than
        // was deposited, so once the credit fits neither step can overflow.
        self.shares
            .mint(self.config.address, participant, declared)
            .map_err(|e| rejected("deposit", e.into()))?;
        self.vault
            .receive(paid)
            .map_err(|e| rejected("deposit", e))?;
        self.stakes.apply(credit);

        info!(
            participant = %participant,
            amount = %declared,
            weight = %credit.new_weight,
            total_stake = %credit.new_total,
            "Deposit accepted"
        );
        self.emit(FundEvent::Deposit {
            participant,
            amount: declared,
        });

        Ok(credit.new_weight)
    }

    /// Append a spending request. Admin only. Returns the new index.
    pub fn create_spending(
        &mut self,
        caller: Address,
        recipient: Address,
        amount: U256,
        description: impl Into<String>,
    ) -> Result<u64, FundError> {
        self.ensure_admin("create_spending", caller)?;

        let description = description.into();
        let index = self.registry.push(recipient, amount, description);

        info!(index, recipient = %recipient, amount = %amount, "Spending request created");
        self.emit(FundEvent::NewSpending { recipient, amount });

        Ok(index)
    }

    /// Cast `caller`'s vote on request `index` and return the re-evaluated
    /// approval status.
    ///
    /// The caller's weight is read now; approval is recomputed against the
    /// current total stake whichever way the vote goes.
    ///
    /// # Errors
    /// - `NotStakeholder` when the caller has no weight
    /// - `NotFound` for an index outside the registry
    /// - `DoubleVote` when the caller already voted on this request
    pub fn approve_spending(
        &mut self,
        caller: Address,
        index: u64,
        ballot: Ballot,
    ) -> Result<bool, FundError> {
        let weight = self.stakes.weight_of(&caller);
        if weight.is_zero() {
            return Err(rejected("approve_spending", FundError::NotStakeholder(caller)));
        }

        let total_stake = self.stakes.total();
        let quorum_percent = self.config.quorum_percent;
        let request = self
            .registry
            .get_mut(index)
            .map_err(|e| rejected("approve_spending", e))?;

        let approved = request
            .record_vote(caller, ballot, weight, total_stake, quorum_percent)
            .map_err(|e| rejected("approve_spending", e))?;

        info!(
            index,
            voter = %caller,
            ballot = ?ballot,
            weight = %weight,
            yes_weight = %request.yes_weight,
            total_stake = %total_stake,
            approved,
            "Vote recorded"
        );

        Ok(approved)
    }

    /// Release the funds of an approved request to its recipient. Admin only.
    ///
    /// # Errors
    /// - `NotAdmin`, `NotFound`
    /// - `QuorumNotMet` when the request is not approved right now
    /// - `AlreadyExecuted` on any second attempt
    /// - `InsufficientBalance` when the vault cannot cover the amount
    pub fn execute_spending(&mut self, caller: Address, index: u64) -> Result<Transfer, FundError> {
        self.ensure_admin("execute_spending", caller)?;

        let request = self
            .registry
            .get(index)
            .map_err(|e| rejected("execute_spending", e))?;
        if !request.approved {
            return Err(rejected("execute_spending", FundError::QuorumNotMet(index)));
        }
        if request.executed {
            return Err(rejected("execute_spending", FundError::AlreadyExecuted(index)));
        }
        let (recipient, amount) = (request.recipient, request.amount);

        let transfer = self
            .vault
            .release(index, recipient, amount)
            .map_err(|e| rejected("execute_spending", e))?;
        self.registry.get_mut(index)?.executed = true;

        info!(index, recipient = %recipient, amount = %amount, balance = %self.vault.balance(), "Spending executed");
        self.emit(FundEvent::SpendingExecuted {
            executor: caller,
            index,
        });

        Ok(transfer)
    }

    /// Look up a request by index.
    pub fn spending(&self, index: u64) -> Result<&SpendingRequest, FundError> {
        self.registry.get(index)
    }

    /// Requests with indices in `[start, end)`, clamped to what exists.
    pub fn spendings(&self, start: u64, end: u64) -> &[SpendingRequest] {
        self.registry.list(start, end)
    }

    pub fn spending_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn has_voted(&self, index: u64, voter: &Address) -> Result<bool, FundError> {
        Ok(self.registry.get(index)?.has_voted(voter))
    }

    pub fn stake_of(&self, participant: &Address) -> U256 {
        self.stakes.weight_of(participant)
    }

    pub fn is_stakeholder(&self, participant: &Address) -> bool {
        self.stakes.is_stakeholder(participant)
    }

    pub fn total_stake(&self) -> U256 {
        self.stakes.total()
    }

    pub fn stakeholder_count(&self) -> usize {
        self.stakes.stakeholder_count()
    }

    /// Spendable vault balance.
    pub fn balance(&self) -> U256 {
        self.vault.balance()
    }

    pub fn transfers(&self) -> &[Transfer] {
        self.vault.transfers()
    }

    pub fn paid_to(&self, recipient: &Address) -> U256 {
        self.vault.paid_to(recipient)
    }

    pub fn events(&self) -> &[FundEvent] {
        &self.events
    }

    /// Read-only view of the owned share token.
    pub fn shares(&self) -> &ShareToken {
        &self.shares
    }

    pub fn config(&self) -> &FundConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn admin(&self) -> Address {
        self.config.admin
    }

    pub fn min_deposit(&self) -> U256 {
        self.config.min_deposit
    }

    pub fn quorum_percent(&self) -> u8 {
        self.config.quorum_percent
    }

    fn ensure_admin(&self, op: &'static str, caller: Address) -> Result<(), FundError> {
        if caller != self.config.admin {
            return Err(rejected(op, FundError::NotAdmin(caller)));
        }
        Ok(())
    }

    fn emit(&mut self, event: FundEvent) {
        debug!(event = event.name(), "Event emitted");
        self.events.push(event);
    }
}

fn rejected(op: &'static str, err: FundError) -> FundError {
    debug!(op, kind = err.kind(), "Rejected: {}", err);
    err
}
