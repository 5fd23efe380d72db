//! Fund Types - primitive values shared by every Fund crate.
//!
//! - Addresses (20-byte, Bech32m encoded with the `fund` prefix)
//! - U256 (256-bit unsigned amounts, checked arithmetic only)

pub mod address;
pub mod u256;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use u256::U256;
pub use error::TypesError;
