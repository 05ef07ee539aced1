use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// 20-byte account or token address, rendered as 0x-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if stripped.len() != 40 {
            return Err(AppError::InvalidAddress(s.to_string()));
        }
        let bytes = hex::decode(stripped).map_err(|_| AppError::InvalidAddress(s.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| de::Error::custom(format!("invalid address: {raw}")))
    }
}

/// Serde adapter for `u128` token amounts.
///
/// Amounts cross the wire as decimal strings: JSON numbers lose precision
/// past 2^53 and token base units routinely exceed that.
pub mod amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n as u128),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid amount: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_checksummed_input() {
        let addr: Address = "0xa5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff".parse().unwrap();
        assert_eq!(addr.to_string(), "0xa5e0829caced8ffdd4de3c43696c57f7d7a678ff");
    }

    #[test]
    fn accepts_unprefixed_hex() {
        let addr: Address = "9c3C9283D3e44854697Cd22D3Faa240Cfb032889".parse().unwrap();
        assert_eq!(addr.to_string(), "0x9c3c9283d3e44854697cd22d3faa240cfb032889");
    }

    #[test]
    fn rejects_wrong_length_and_bad_hex() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz3C9283D3e44854697Cd22D3Faa240Cfb032889".parse::<Address>().is_err());
    }

    #[test]
    fn amount_round_trips_as_string() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "super::amount")]
            value: u128,
        }

        let json = serde_json::to_string(&Wrapper { value: u128::MAX }).unwrap();
        assert!(json.contains(&u128::MAX.to_string()));
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, u128::MAX);
    }
}
