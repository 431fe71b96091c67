//! Common types used across Paygate
//!
//! Account addresses and the identities built on top of them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of hex digits in an account address (20 bytes)
pub const ADDRESS_HEX_LEN: usize = 40;

/// Account address (`0x` + 40 hex digits), stored lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Parse and normalise an address
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyAddress);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| Error::MalformedAddress(trimmed.to_string()))?;

        if digits.len() != ADDRESS_HEX_LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::MalformedAddress(trimmed.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_lowercase())))
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Node identity, addressed by its account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity {
    pub address: Address,
}

impl Identity {
    /// Create an identity from an already validated address
    pub fn from_address(address: Address) -> Self {
        Self { address }
    }

    /// Parse an identity from its address string
    pub fn parse(s: &str) -> Result<Self> {
        Address::parse(s).map(Self::from_address)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
