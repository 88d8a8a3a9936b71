//! TRON chain support: Base58Check addresses over the shared Keccak
//! derivation, and transaction encoding/signing via a hand-rolled protobuf
//! wire writer; the full TRON protocol stack is far larger than the two
//! contract types a signing core needs.

pub mod address;
pub mod error;
pub mod protobuf;
pub mod transaction;

pub use address::{TronAddress, ADDRESS_PREFIX};
pub use error::TronError;
pub use transaction::{
    sign_transaction, SignedTronTransaction, TronContract, TronTransaction,
    TRANSFER_CONTRACT_TYPE, TRIGGER_SMART_CONTRACT_TYPE,
};
