//! Liquidation passes and the interval loop that drives them.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::KeeperError;
use crate::ledger::PositionLedger;

/// Default time between passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Outcome of one successful pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Positions read
    pub scanned: u64,
    /// Keys flagged as under-collateralized
    pub flagged: Vec<u64>,
    /// Keys liquidated (equals `flagged` on success)
    pub liquidated: Vec<u64>,
}

/// Read every position and return `(scanned, flagged keys)`.
///
/// The scan stops at the first missing key or the first position with zero
/// collateral.
pub fn scan<L: PositionLedger + ?Sized>(ledger: &L) -> Result<(u64, Vec<u64>), KeeperError> {
    let params = ledger.risk_params()?;
    let mut flagged = Vec::new();
    let mut key = 0u64;

    while let Some(position) = ledger.position(key)? {
        if position.collateral.is_zero() {
            break;
        }
        if params.is_liquidatable(&position) {
            debug!(key, collateral = %position.collateral, owing = %position.owing, "Position under-collateralized");
            flagged.push(key);
        }
        key += 1;
    }

    Ok((key, flagged))
}

/// Scan, then liquidate every flagged key in order.
///
/// The first failed liquidation ends the pass; later keys wait for the next one.
pub fn run_pass<L: PositionLedger + ?Sized>(ledger: &mut L) -> Result<PassReport, KeeperError> {
    let (scanned, flagged) = scan(ledger)?;
    let mut liquidated = Vec::with_capacity(flagged.len());

    for &key in &flagged {
        ledger.liquidate(key)?;
        info!(key, "Position liquidated");
        liquidated.push(key);
    }

    Ok(PassReport {
        scanned,
        flagged,
        liquidated,
    })
}

type PassObserver = Box<dyn Fn(&Result<PassReport, KeeperError>) + Send + Sync>;

/// Runs a pass on a fixed interval until told to stop.
pub struct Keeper<L> {
    ledger: L,
    period: Duration,
    passes: u64,
    failures: u64,
    observer: Option<PassObserver>,
}

impl<L: PositionLedger> Keeper<L> {
    pub fn new(ledger: L, period: Duration) -> Self {
        Self {
            ledger,
            period,
            passes: 0,
            failures: 0,
            observer: None,
        }
    }

    /// Called with the result of every pass.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Result<PassReport, KeeperError>) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run a single pass now.
    pub fn tick(&mut self) -> Result<PassReport, KeeperError> {
        self.passes += 1;
        let result = run_pass(&mut self.ledger);

        match &result {
            Ok(report) if report.flagged.is_empty() => {
                debug!(pass = self.passes, scanned = report.scanned, "Nothing to liquidate");
            }
            Ok(report) => {
                info!(
                    pass = self.passes,
                    scanned = report.scanned,
                    liquidated = report.liquidated.len(),
                    "Liquidation pass complete"
                );
            }
            Err(e) => {
                self.failures += 1;
                error!(pass = self.passes, error = %e, "Liquidation pass failed");
            }
        }

        if let Some(observer) = &self.observer {
            observer(&result);
        }
        result
    }

    /// Tick every period until a message arrives on `shutdown` or its sender
    /// is dropped. The first pass runs immediately.
    pub async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.period, "Keeper started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = ticker.tick() => {
                    // A failed pass is already logged; the next tick runs as usual.
                    if self.tick().is_err() {
                        warn!(failures = self.failures, "Retrying on next tick");
                    }
                }
            }
        }

        info!(passes = self.passes, failures = self.failures, "Keeper stopped");
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::position::{Position, RiskParams};
    use fund_types::{Address, U256};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn params() -> RiskParams {
        // required = owing * 150
        RiskParams {
            liquidation_ratio: 150,
            stability_fee: 0,
            usd_in_wei: U256::from(100u64),
        }
    }

    fn position(collateral: u64, owing: u64) -> Position {
        Position {
            collateral: U256::from(collateral),
            owing: U256::from(owing),
            borrower: Address::from_bytes([3u8; 20]),
            active: true,
        }
    }

    /// Refuses to liquidate the keys it is given.
    struct Stubborn {
        inner: MemoryLedger,
        refuse: Vec<u64>,
        attempts: Vec<u64>,
    }

    impl PositionLedger for Stubborn {
        fn risk_params(&self) -> Result<RiskParams, KeeperError> {
            self.inner.risk_params()
        }

        fn position(&self, key: u64) -> Result<Option<Position>, KeeperError> {
            self.inner.position(key)
        }

        fn liquidate(&mut self, key: u64) -> Result<(), KeeperError> {
            self.attempts.push(key);
            if self.refuse.contains(&key) {
                return Err(KeeperError::LiquidationFailed {
                    key,
                    reason: "rejected".into(),
                });
            }
            self.inner.liquidate(key)
        }
    }

    #[test]
    fn test_scan_flags_under_collateralized() {
        let ledger = MemoryLedger::with_positions(
            params(),
            vec![position(1500, 10), position(1499, 10), position(5000, 10)],
        );
        assert_eq!(scan(&ledger).unwrap(), (3, vec![1]));
    }

    #[test]
    fn test_scan_stops_at_zero_collateral() {
        let ledger = MemoryLedger::with_positions(
            params(),
            vec![position(1, 10), position(0, 10), position(1, 10)],
        );
        assert_eq!(scan(&ledger).unwrap(), (1, vec![0]));
    }

    #[test]
    fn test_pass_liquidates_in_key_order() {
        let mut ledger = MemoryLedger::with_positions(
            params(),
            vec![position(1, 10), position(9000, 10), position(2, 10)],
        );
        let report = run_pass(&mut ledger).unwrap();
        assert_eq!(report.flagged, vec![0, 2]);
        assert_eq!(report.liquidated, vec![0, 2]);
        assert_eq!(ledger.liquidated(), &[0, 2]);

        // Liquidated positions are inactive and not flagged again.
        let report = run_pass(&mut ledger).unwrap();
        assert!(report.flagged.is_empty());
    }

    #[test]
    fn test_first_failure_aborts_pass() {
        let mut ledger = Stubborn {
            inner: MemoryLedger::with_positions(
                params(),
                vec![position(1, 10), position(1, 10), position(1, 10)],
            ),
            refuse: vec![1],
            attempts: Vec::new(),
        };

        let err = run_pass(&mut ledger).unwrap_err();
        assert_eq!(
            err,
            KeeperError::LiquidationFailed {
                key: 1,
                reason: "rejected".into()
            }
        );
        assert_eq!(ledger.attempts, vec![0, 1]);
        assert_eq!(ledger.inner.liquidated(), &[0]);
    }

    #[test]
    fn test_failed_tick_counts_and_recovers() {
        let ledger = Stubborn {
            inner: MemoryLedger::with_positions(params(), vec![position(1, 10)]),
            refuse: vec![0],
            attempts: Vec::new(),
        };
        let mut keeper = Keeper::new(ledger, DEFAULT_INTERVAL);

        assert!(keeper.tick().is_err());
        assert_eq!(keeper.failures(), 1);

        keeper.ledger_mut().refuse.clear();
        let report = keeper.tick().unwrap();
        assert_eq!(report.liquidated, vec![0]);
        assert_eq!(keeper.passes(), 2);
        assert_eq!(keeper.failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_shutdown() {
        let seen = Arc::new(AtomicU64::new(0));
        let counter = seen.clone();

        let ledger = MemoryLedger::with_positions(params(), vec![position(9000, 10)]);
        let mut keeper = Keeper::new(ledger, Duration::from_secs(30)).with_observer(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            keeper.run(rx).await;
            keeper
        });

        // Passes at 0s, 30s and 60s.
        tokio::time::sleep(Duration::from_secs(75)).await;
        tx.send(()).await.unwrap();

        let keeper = handle.await.unwrap();
        assert_eq!(keeper.passes(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let ledger = MemoryLedger::new(params());
        let mut keeper = Keeper::new(ledger, Duration::from_secs(30));

        let (tx, rx) = mpsc::channel::<()>(1);
        drop(tx);
        keeper.run(rx).await;
        assert!(keeper.passes() <= 1);
    }
}
