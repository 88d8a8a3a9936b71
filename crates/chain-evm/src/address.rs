//! EVM address derivation and EIP-55 checksum casing.
//!
//! An address is the last 20 bytes of Keccak-256 over the 64-byte public key
//! (the uncompressed SEC1 encoding without its 0x04 prefix). Display always
//! uses EIP-55 mixed-case; parsing accepts any casing with or without the
//! `0x` prefix, and verifies the checksum when the input is mixed-case.

use std::fmt;
use std::str::FromStr;

use crypto_utils::hash::keccak256;

use crate::error::EvmError;

/// A 20-byte EVM account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmAddress([u8; 20]);

impl EvmAddress {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the address from a 65-byte uncompressed secp256k1 public key.
    pub fn from_public_key(uncompressed_pubkey: &[u8]) -> Result<Self, EvmError> {
        if uncompressed_pubkey.len() != 65 || uncompressed_pubkey[0] != 0x04 {
            return Err(EvmError::InvalidPublicKey(
                "expected 65 bytes starting with 0x04".into(),
            ));
        }
        let hash = keccak256(&uncompressed_pubkey[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        Ok(Self(addr))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EvmError> {
        let addr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| EvmError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len())))?;
        Ok(Self(addr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksummed display form, `0x`-prefixed.
    pub fn to_checksum_string(&self) -> String {
        let hex_lower = hex::encode(self.0);
        let hash = keccak256(hex_lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in hex_lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Parses an address string. Mixed-case inputs must carry a valid EIP-55
    /// checksum; uniform-case inputs are accepted as-is.
    pub fn parse(s: &str) -> Result<Self, EvmError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if hex_part.len() != 40 {
            return Err(EvmError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                hex_part.len()
            )));
        }
        let bytes = hex::decode(hex_part)
            .map_err(|_| EvmError::InvalidAddress("non-hex characters".into()))?;

        let addr = Self::from_bytes(&bytes)?;

        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = addr.to_checksum_string();
            if expected[2..] != *hex_part {
                return Err(EvmError::ChecksumMismatch);
            }
        }
        Ok(addr)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum_string())
    }
}

impl FromStr for EvmAddress {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Re-cases an address string into its EIP-55 checksummed form.
pub fn to_checksum(address: &str) -> Result<String, EvmError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .to_lowercase();

    if hex_part.len() != 40 {
        return Err(EvmError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }
    let bytes = hex::decode(&hex_part)
        .map_err(|_| EvmError::InvalidAddress("non-hex characters".into()))?;
    Ok(EvmAddress::from_bytes(&bytes)?.to_checksum_string())
}
