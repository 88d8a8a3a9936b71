//! # wallet-core
//!
//! Deterministic multi-chain wallet core: BIP-39 mnemonics, BIP-32 and
//! SLIP-10 HD trees, BIP-44/49/84/86 path conventions, and the account
//! deriver that turns an opaque user id into a reproducible per-chain
//! address plus its signing key.
//!
//! Chain specifics (addresses, wire formats, signing) live in the
//! `chain-*` crates; this crate binds them behind the [`ChainAdapter`] and
//! [`AddressEncoder`] capability traits and their process-wide registries.
//!
//! Everything is synchronous and CPU-bound. Key material is held in
//! wipe-on-drop containers; `destroy` methods wipe eagerly and are
//! idempotent.

pub mod adapter;
pub mod adapters;
pub mod bip32;
pub mod bip44;
pub mod deriver;
pub mod error;
pub mod mnemonic;
pub mod signer;
pub mod slip10;
pub mod types;
pub mod wallet;

pub use adapter::{
    adapter_for, encoder_for, register_adapter, register_encoder, reset_registries,
    AddressEncoder, ChainAdapter, RawTransaction, SignedTransaction,
};
pub use deriver::{user_id_to_account_index, AccountDeriver, DerivedAccount};
pub use error::WalletError;
pub use signer::{DerivedKey, Signature, SigningKey};
pub use types::{ChainType, DeriveOptions, DerivedAddress, PublicKeyFormat, SignatureScheme};
pub use wallet::HdWallet;
