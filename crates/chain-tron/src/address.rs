//! TRON address derivation and parsing.
//!
//! A TRON address shares the EVM derivation (Keccak-256 over the 64-byte
//! public key, last 20 bytes), prefixed with `0x41` for mainnet. The display
//! form is Base58Check over the full 21-byte payload, which always yields a
//! `T…` string; the hex form is the 21 bytes with an optional `0x` prefix.

use std::fmt;
use std::str::FromStr;

use crypto_utils::base58;
use crypto_utils::hash::keccak256;

use crate::error::TronError;

/// Mainnet address prefix byte.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// A 21-byte TRON account address (prefix byte included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; 21]);

impl TronAddress {
    /// Derives the address from a 65-byte uncompressed secp256k1 public key.
    pub fn from_public_key(uncompressed_pubkey: &[u8]) -> Result<Self, TronError> {
        if uncompressed_pubkey.len() != 65 || uncompressed_pubkey[0] != 0x04 {
            return Err(TronError::InvalidPublicKey(
                "expected 65 bytes starting with 0x04".into(),
            ));
        }
        let hash = keccak256(&uncompressed_pubkey[1..]);
        let mut addr = [0u8; 21];
        addr[0] = ADDRESS_PREFIX;
        addr[1..].copy_from_slice(&hash[12..]);
        Ok(Self(addr))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TronError> {
        let addr: [u8; 21] = bytes.try_into().map_err(|_| {
            TronError::InvalidAddress(format!("expected 21 bytes, got {}", bytes.len()))
        })?;
        if addr[0] != ADDRESS_PREFIX {
            return Err(TronError::InvalidAddress(format!(
                "leading byte 0x{:02x}, expected 0x41",
                addr[0]
            )));
        }
        Ok(Self(addr))
    }

    pub fn as_bytes(&self) -> &[u8; 21] {
        &self.0
    }

    /// Base58Check display form (`T…`).
    pub fn to_base58(&self) -> String {
        base58::encode_check_raw(&self.0)
    }

    /// The 21-byte payload as lowercase hex, `41`-prefixed.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses either the Base58Check form (`T…`) or the 42-character hex
    /// form (optionally `0x`-prefixed).
    pub fn parse(s: &str) -> Result<Self, TronError> {
        if s.starts_with('T') {
            let payload = base58::decode_check(s)?;
            return Self::from_bytes(&payload);
        }

        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex_part.len() != 42 {
            return Err(TronError::InvalidAddress(format!(
                "expected T-address or 42 hex characters, got {} characters",
                hex_part.len()
            )));
        }
        let bytes = hex::decode(hex_part)
            .map_err(|_| TronError::InvalidAddress("non-hex characters".into()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for TronAddress {
    type Err = TronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
