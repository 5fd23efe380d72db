//! Fund Ledger - stake-weighted treasury governance.
//!
//! This crate provides:
//! - Stake ledger (deposits become voting weight)
//! - Append-only registry of spending requests
//! - Weighted quorum voting, re-evaluated on every vote
//! - Admin-gated, single-shot execution against the vault
//! - The share token handed to the fund at construction

pub mod error;
pub mod events;
pub mod fund;
pub mod proposal;
pub mod shares;
pub mod stake;
pub mod treasury;
pub mod voting;

pub use error::FundError;
pub use events::FundEvent;
pub use fund::{Fund, FundConfig};
pub use proposal::SpendingRequest;
pub use shares::{ShareError, ShareToken};
pub use treasury::Transfer;
pub use voting::{meets_quorum, Ballot};
