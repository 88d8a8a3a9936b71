use thiserror::Error;

/// TRON chain operation errors.
#[derive(Debug, Error)]
pub enum TronError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<crypto_utils::CryptoError> for TronError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::ChecksumMismatch => TronError::ChecksumMismatch,
            other => TronError::SigningError(other.to_string()),
        }
    }
}
