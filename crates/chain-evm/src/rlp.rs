//! RLP building blocks for the legacy transaction encoder.
//!
//! `alloy-rlp` supplies the wire rules (empty bytes -> `0x80`, single byte
//! below `0x80` stands for itself, `0xb7`/`0xf7` long forms, minimal
//! big-endian integers); this module exposes them as plain
//! `bytes -> Vec<u8>` helpers so the transaction encoder can assemble lists
//! field by field.

use alloy_rlp::{Encodable, Header};

/// Encodes a byte string.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 9);
    data.encode(&mut out);
    out
}

/// Encodes an unsigned integer as its minimal big-endian byte string.
/// Zero encodes as the empty string (`0x80`).
pub fn encode_uint(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(17);
    value.encode(&mut out);
    out
}

/// Encodes a fixed-width big-endian integer (e.g. a 32-byte signature
/// scalar) by first stripping its leading zero bytes.
pub fn encode_integer_bytes(be_bytes: &[u8]) -> Vec<u8> {
    let start = be_bytes.iter().position(|&b| b != 0);
    match start {
        Some(pos) => encode_bytes(&be_bytes[pos..]),
        None => encode_bytes(&[]),
    }
}

/// Wraps already-encoded items into an RLP list.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_length: usize = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}
