use thiserror::Error;

/// EVM chain operation errors.
#[derive(Debug, Error)]
pub enum EvmError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<crypto_utils::CryptoError> for EvmError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        EvmError::SigningError(e.to_string())
    }
}
