//! Bitcoin chain support: the five standard address templates over three
//! networks, consensus transaction serialization, and key-spend signing for
//! P2PKH (canonical legacy sighash) and P2WPKH (BIP-143).
//!
//! The wire formats are implemented in-workspace over the shared hash and
//! codec primitives; script evaluation, Taproot script paths, and multisig
//! are out of scope.

pub mod address;
pub mod error;
pub mod network;
pub mod transaction;

pub use address::{tweak_taproot_key, BtcAddress, BtcAddressType};
pub use error::BtcError;
pub use network::BtcNetwork;
pub use transaction::{
    bip143_sighash, der_encode_signature, legacy_sighash, sign_input, sign_transaction,
    signature_with_sighash, txid_from_hex, txid_to_hex, BtcTransaction, SignedBtcTransaction,
    TxInput, TxOutput, SIGHASH_ALL,
};
