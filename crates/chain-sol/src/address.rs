//! Solana addresses.
//!
//! An address is the raw 32-byte Ed25519 public key, displayed as Base58
//! with no checksum or hashing step.

use std::fmt;
use std::str::FromStr;

use crypto_utils::base58;

use crate::error::SolError;

/// A 32-byte Solana account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolanaAddress([u8; 32]);

impl SolanaAddress {
    /// The address bytes are the public key bytes; no transformation.
    pub fn from_public_key(pubkey: &[u8]) -> Result<Self, SolError> {
        let bytes: [u8; 32] = pubkey.try_into().map_err(|_| {
            SolError::InvalidPublicKey(format!("expected 32 bytes, got {}", pubkey.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses a Base58 string that must decode to exactly 32 bytes.
    pub fn parse(s: &str) -> Result<Self, SolError> {
        let bytes = base58::decode(s)
            .map_err(|e| SolError::InvalidAddress(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for SolanaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

impl FromStr for SolanaAddress {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_address_is_all_ones() {
        // 32 zero bytes encode as 32 Base58 '1' characters.
        let addr = SolanaAddress::new([0u8; 32]);
        assert_eq!(addr.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn known_address_roundtrip() {
        // The SPL Token program.
        let s = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let addr = SolanaAddress::parse(s).unwrap();
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn from_public_key_is_identity() {
        let pubkey = [0x17u8; 32];
        let addr = SolanaAddress::from_public_key(&pubkey).unwrap();
        assert_eq!(addr.as_bytes(), &pubkey);
    }

    #[test]
    fn from_public_key_rejects_wrong_length() {
        assert!(SolanaAddress::from_public_key(&[0u8; 31]).is_err());
        assert!(SolanaAddress::from_public_key(&[0u8; 33]).is_err());
    }

    #[test]
    fn parse_rejects_wrong_length_and_garbage() {
        assert!(SolanaAddress::parse("1").is_err());
        assert!(SolanaAddress::parse("not-an-address!!!").is_err());
        assert!(SolanaAddress::parse("").is_err());
    }

    #[test]
    fn display_is_deterministic() {
        let addr = SolanaAddress::new([0xffu8; 32]);
        assert_eq!(addr.to_string(), addr.to_string());
    }
}
