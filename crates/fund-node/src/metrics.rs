//! Metrics collection and reporting.
//!
//! Uses Prometheus for metrics collection and exposition.

use fund_keeper::{KeeperError, PassReport};
use fund_ledger::Fund;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector.
pub struct Metrics {
    /// Prometheus registry
    registry: Registry,
    /// Accepted deposits
    pub deposits: Counter,
    /// Spending requests created
    pub spending_requests: Counter,
    /// Votes recorded
    pub votes: Counter,
    /// Spending requests executed
    pub executions: Counter,
    /// Rejected operations by operation and error kind
    pub rejected: CounterVec,
    /// Positions liquidated by the keeper
    pub liquidations: Counter,
    /// Keeper passes that ended in an error
    pub keeper_failures: Counter,
    /// Vault balance (lossy)
    pub vault_balance: Gauge,
    /// Total stake (lossy)
    pub total_stake: Gauge,
}

impl Metrics {
    /// Create new metrics collector.
    pub fn new() -> anyhow::Result<Arc<Self>> {
        let registry = Registry::new();

        let deposits = Counter::new("fund_deposits_total", "Total number of accepted deposits")?;
        registry.register(Box::new(deposits.clone()))?;

        let spending_requests = Counter::new(
            "fund_spending_requests_total",
            "Total number of spending requests created",
        )?;
        registry.register(Box::new(spending_requests.clone()))?;

        let votes = Counter::new("fund_votes_total", "Total number of votes recorded")?;
        registry.register(Box::new(votes.clone()))?;

        let executions = Counter::new(
            "fund_executions_total",
            "Total number of spending requests executed",
        )?;
        registry.register(Box::new(executions.clone()))?;

        let rejected = CounterVec::new(
            Opts::new("fund_rejected_total", "Rejected operations"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(rejected.clone()))?;

        let liquidations = Counter::new(
            "fund_keeper_liquidations_total",
            "Total number of positions liquidated",
        )?;
        registry.register(Box::new(liquidations.clone()))?;

        let keeper_failures = Counter::new(
            "fund_keeper_failed_passes_total",
            "Keeper passes aborted by an error",
        )?;
        registry.register(Box::new(keeper_failures.clone()))?;

        let vault_balance = Gauge::new("fund_vault_balance", "Vault balance in wei")?;
        registry.register(Box::new(vault_balance.clone()))?;

        let total_stake = Gauge::new("fund_total_stake", "Sum of all stakeholder weight")?;
        registry.register(Box::new(total_stake.clone()))?;

        Ok(Arc::new(Self {
            registry,
            deposits,
            spending_requests,
            votes,
            executions,
            rejected,
            liquidations,
            keeper_failures,
            vault_balance,
            total_stake,
        }))
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Refresh the balance gauges from the ledger.
    pub fn observe_fund(&self, fund: &Fund) {
        self.vault_balance.set(fund.balance().to_f64_lossy());
        self.total_stake.set(fund.total_stake().to_f64_lossy());
    }

    /// Count a rejected operation.
    pub fn record_rejection(&self, operation: &str, kind: &str) {
        self.rejected.with_label_values(&[operation, kind]).inc();
    }

    /// Count the outcome of a keeper pass.
    pub fn record_keeper_pass(&self, result: &Result<PassReport, KeeperError>) {
        match result {
            Ok(report) => self.liquidations.inc_by(report.liquidated.len() as f64),
            Err(_) => self.keeper_failures.inc(),
        }
    }
}
