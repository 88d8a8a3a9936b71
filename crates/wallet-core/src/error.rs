use thiserror::Error;

use crate::types::ChainType;

/// Wallet-level errors. Diagnostics never carry key material.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A CKD step produced an out-of-range scalar; callers may retry with
    /// the next index.
    #[error("derivation invalid: {0}")]
    DerivationInvalid(String),

    #[error("derivation failed: {0}")]
    DerivationFailed(String),

    #[error("SLIP-10 only defines hardened derivation (index {0} is not hardened)")]
    HardenedRequired(u32),

    #[error("unsupported chain: {0:?}")]
    UnsupportedChain(ChainType),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("key material has been destroyed")]
    Destroyed,

    #[error("address encoding failed: {0}")]
    AddressEncoding(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<crypto_utils::CryptoError> for WalletError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::Destroyed => WalletError::Destroyed,
            crypto_utils::CryptoError::InvalidInput(msg) => WalletError::InvalidInput(msg),
            other => WalletError::SigningFailed(other.to_string()),
        }
    }
}

impl From<chain_evm::EvmError> for WalletError {
    fn from(e: chain_evm::EvmError) -> Self {
        WalletError::TransactionFailed(format!("EVM: {e}"))
    }
}

impl From<chain_tron::TronError> for WalletError {
    fn from(e: chain_tron::TronError) -> Self {
        WalletError::TransactionFailed(format!("TRON: {e}"))
    }
}

impl From<chain_btc::BtcError> for WalletError {
    fn from(e: chain_btc::BtcError) -> Self {
        WalletError::TransactionFailed(format!("BTC: {e}"))
    }
}

impl From<chain_sol::SolError> for WalletError {
    fn from(e: chain_sol::SolError) -> Self {
        WalletError::TransactionFailed(format!("SOL: {e}"))
    }
}
