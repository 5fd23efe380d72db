//! Fund Keeper - liquidation agent for a collateralized-debt ledger.
//!
//! Every pass reads all positions, flags the active ones whose collateral is
//! below the required threshold, and liquidates them in key order. The first
//! failed liquidation ends the pass. Passes repeat on a fixed interval.

pub mod error;
pub mod keeper;
pub mod ledger;
pub mod position;

pub use error::KeeperError;
pub use keeper::{run_pass, scan, Keeper, PassReport};
pub use ledger::{MemoryLedger, PositionLedger};
pub use position::{Position, RiskParams};
