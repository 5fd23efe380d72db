//! Long-running tasks: the API server and the liquidation keeper.

use std::sync::Arc;

use fund_keeper::{Keeper, MemoryLedger};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::{router, ApiState};
use crate::bootstrap;
use crate::config::{KeeperConfig, NodeConfig};
use crate::metrics::Metrics;

/// Build a keeper over the in-memory ledger described by `config`.
pub fn build_keeper(config: &KeeperConfig, metrics: Arc<Metrics>) -> Keeper<MemoryLedger> {
    let ledger = MemoryLedger::with_positions(config.risk_params(), config.positions.clone());
    info!(positions = ledger.len(), interval = ?config.interval(), "Keeper ledger loaded");

    Keeper::new(ledger, config.interval())
        .with_observer(move |result| metrics.record_keeper_pass(result))
}

/// Deploy the fund and serve the API until Ctrl+C.
pub async fn serve(config: NodeConfig) -> anyhow::Result<()> {
    let fund = bootstrap::deploy(&config.fund)?;
    let metrics = Metrics::new()?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let keeper_task = if config.keeper.enabled {
        let mut keeper = build_keeper(&config.keeper, metrics.clone());
        Some(tokio::spawn(async move { keeper.run(shutdown_rx).await }))
    } else {
        None
    };

    let state = ApiState::new(fund, metrics);
    let app = router(state, config.api.cors, config.metrics.enabled);

    let listener = tokio::net::TcpListener::bind(config.api.addr).await?;
    info!(addr = %config.api.addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received");
            }
        })
        .await?;

    // Dropping the sender would also stop the keeper; send for a clean log line.
    let _ = shutdown_tx.send(()).await;
    if let Some(task) = keeper_task {
        if let Err(e) = task.await {
            error!("Keeper task failed: {}", e);
        }
    }

    info!("Fund node shutdown complete");
    Ok(())
}

/// Run only the keeper until Ctrl+C.
pub async fn run_keeper(config: NodeConfig) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let mut keeper = build_keeper(&config.keeper, metrics);

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
        }
        let _ = shutdown_tx.send(()).await;
    });

    keeper.run(shutdown_rx).await;

    info!(
        passes = keeper.passes(),
        liquidated = keeper.ledger().liquidated().len(),
        "Keeper shutdown complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_keeper::{Position, PositionLedger};
    use fund_types::{Address, U256};

    #[test]
    fn test_build_keeper_seeds_positions_and_reports() {
        let mut config = KeeperConfig::default();
        config.positions = vec![
            Position {
                collateral: U256::ONE,
                owing: U256::from(1_000u64),
                borrower: Address::derive(b"under"),
                active: true,
            },
            Position {
                collateral: U256::MAX,
                owing: U256::ONE,
                borrower: Address::derive(b"safe"),
                active: true,
            },
        ];

        let metrics = Metrics::new().unwrap();
        let mut keeper = build_keeper(&config, metrics.clone());
        let report = keeper.tick().unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.liquidated, vec![0]);
        assert!(!keeper.ledger().position(0).unwrap().unwrap().active);
        assert_eq!(metrics.liquidations.get(), 1.0);
    }
}
