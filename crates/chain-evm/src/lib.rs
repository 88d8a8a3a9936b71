//! EVM chain support: address derivation with EIP-55 checksums and legacy
//! (EIP-155) transaction encoding and signing.
//!
//! Transactions are assembled by hand over the RLP primitives in [`rlp`];
//! one legacy list layout covers every EIP-155 network, so the full
//! typed-envelope stack stays out of the tree.

pub mod address;
pub mod chains;
pub mod error;
pub mod rlp;
pub mod transaction;

pub use address::{to_checksum, EvmAddress};
pub use error::EvmError;
pub use transaction::{
    build_transfer, encode_signed, encode_unsigned, personal_message_hash, sighash, sign_message,
    sign_transaction, EvmTransaction, SignedEvmTransaction,
};
