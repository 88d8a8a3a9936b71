//! # crypto-utils
//!
//! The primitive layer shared by every chain crate: hashing, secp256k1 and
//! Ed25519 signers, Base58/Base58Check and Bech32 codecs, constant-time byte
//! helpers, wipe-on-drop secret containers, and OS-backed randomness.
//!
//! Everything here is pure and CPU-bound; there is no I/O and no global
//! state.

pub mod base58;
pub mod bech32;
pub mod bytes;
pub mod ed25519;
pub mod error;
pub mod hash;
pub mod random;
pub mod secp256k1;
pub mod zeroizing;

pub use error::CryptoError;
pub use random::{random_bytes, random_bytes_fixed};
pub use zeroizing::{SecretBytes, SecretString};
