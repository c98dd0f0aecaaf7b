//! # Account Addresses
//!
//! Every account on an XSTRO chain (externally-owned or contract) is named
//! by a 20-byte [`Address`]. Addresses render as `0x`-prefixed lowercase hex
//! and parse from the same form, with or without the prefix.
//!
//! Two derivations are provided:
//!
//! - [`Address::from_label`] — deterministic accounts from human names, used
//!   by simulations, configs and tests (`"alice"` is always the same account).
//! - [`Address::contract`] — the address a contract lands at, derived from
//!   the deployer and the deployer's deployment nonce.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Domain separators so label-derived and contract-derived addresses can
/// never collide for the same input bytes.
const LABEL_DOMAIN: &[u8] = b"xstro/address/label";
const CONTRACT_DOMAIN: &[u8] = b"xstro/address/contract";

/// Errors produced when parsing an address from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The input was not valid hex.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    /// The decoded byte length was not [`ADDRESS_LENGTH`].
    #[error("invalid address length: expected {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address. Never derived by either constructor in practice.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wraps raw bytes as an address.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives a deterministic account address from a human-readable label.
    ///
    /// ```
    /// use xstro_protocol::Address;
    ///
    /// assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
    /// assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
    /// ```
    pub fn from_label(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(LABEL_DOMAIN);
        hasher.update(label.as_bytes());
        Self::from_digest(hasher.finalize().as_bytes())
    }

    /// Derives the address of a contract deployed by `deployer` as its
    /// `nonce`-th deployment.
    pub fn contract(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(CONTRACT_DOMAIN);
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_be_bytes());
        Self::from_digest(hasher.finalize().as_bytes())
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the address as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    // Takes the trailing 20 bytes of a 32-byte digest.
    fn from_digest(digest: &[u8; 32]) -> Self {
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest[32 - ADDRESS_LENGTH..]);
        Self(out)
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
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; ADDRESS_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_derivation_is_deterministic() {
        let a = Address::from_label("alice");
        let b = Address::from_label("alice");
        assert_eq!(a, b);
        assert_ne!(a, Address::from_label("Alice"));
    }

    #[test]
    fn contract_address_depends_on_nonce() {
        let deployer = Address::from_label("deployer");
        let first = Address::contract(&deployer, 0);
        let second = Address::contract(&deployer, 1);
        assert_ne!(first, second);
        assert_ne!(first, deployer);
    }

    #[test]
    fn hex_display_parses_back() {
        let addr = Address::from_label("bob");
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 2 + ADDRESS_LENGTH * 2);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_accepts_unprefixed_hex() {
        let addr = Address::from_label("carol");
        let bare = hex::encode(addr.as_bytes());
        assert_eq!(bare.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
        assert_eq!(
            "0x0102".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        );
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address::from_label("dave");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
