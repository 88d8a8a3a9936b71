//! Base58 and Base58Check.
//!
//! Raw Base58 comes from `bs58`; the check layer (4-byte double-SHA-256
//! checksum) is layered here so decoding can tell a corrupted checksum apart
//! from a malformed string. TRON payloads already carry their version byte,
//! so [`encode_check_raw`] takes the full payload as-is.

use crate::error::CryptoError;
use crate::hash::sha256d;

/// Raw Base58 with the Bitcoin alphabet. Leading zero bytes become `1`s.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes raw Base58. Fails with `InvalidCharacter` on anything outside the
/// alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| CryptoError::InvalidCharacter(e.to_string()))
}

/// Base58Check over `version || payload`.
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len());
    data.push(version);
    data.extend_from_slice(payload);
    encode_check_raw(&data)
}

/// Base58Check over a payload that already includes its version byte(s).
pub fn encode_check_raw(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..4]);
    encode(&data)
}

/// Decodes a Base58Check string, returning the payload with its version
/// byte(s) still attached (checksum stripped).
pub fn decode_check(s: &str) -> Result<Vec<u8>, CryptoError> {
    let data = decode(s)?;
    if data.len() < 5 {
        return Err(CryptoError::InvalidInput(format!(
            "base58check payload too short: {} bytes",
            data.len()
        )));
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    let expected = sha256d(payload);
    if !crate::bytes::constant_time_eq(checksum, &expected[..4]) {
        return Err(CryptoError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}
