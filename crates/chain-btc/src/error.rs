use thiserror::Error;

/// Bitcoin chain operation errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address is for a different network: {0}")]
    NetworkMismatch(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("unsupported script template: {0}")]
    UnsupportedScript(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<crypto_utils::CryptoError> for BtcError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::ChecksumMismatch => BtcError::ChecksumMismatch,
            crypto_utils::CryptoError::InvalidCharacter(msg) => BtcError::InvalidAddress(msg),
            other => BtcError::SigningError(other.to_string()),
        }
    }
}
