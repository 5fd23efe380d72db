//! Fund Node - serves a treasury over HTTP and runs the liquidation keeper.
//!
//! The binary in `main.rs` is a thin CLI over these modules.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod metrics;
pub mod runner;
pub mod telemetry;
