//! Serde implementations for fund-types.
//!
//! Both types travel as strings: amounts as base-10 digits so JSON clients
//! never lose precision, addresses in their Bech32m form.

use crate::{Address, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        U256::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_json_is_decimal_string() {
        let amount = U256::from(10u128.pow(18));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1000000000000000000\"");
        let back: U256 = serde_json::from_str("\"0x0de0b6b3a7640000\"").unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_address_json_accepts_hex() {
        let addr = Address::from_bytes([3u8; 20]);
        let parsed: Address =
            serde_json::from_str(&format!("\"0x{}\"", addr.to_hex())).unwrap();
        assert_eq!(parsed, addr);
        assert!(serde_json::from_str::<Address>("\"bob\"").is_err());
    }
}
