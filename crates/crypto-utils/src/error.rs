use thiserror::Error;

/// Errors raised by the primitive layer (hashing, curves, codecs).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid character: {0}")]
    InvalidCharacter(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("no recovery id reproduces the signing key")]
    RecoveryFailed,

    #[error("key material has been destroyed")]
    Destroyed,

    #[error("signing failed: {0}")]
    SigningFailed(String),
}
