//! Ed25519 signing and verification.
//!
//! Messages are signed directly (Ed25519 hashes internally, there is no
//! pre-hash step). Verification is strict and never reports why it failed.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// An Ed25519 signer bound to one 32-byte seed.
///
/// Same lifecycle as the secp256k1 signer: the seed is wiped on drop, and
/// `destroy` makes every later operation fail with
/// [`CryptoError::Destroyed`].
pub struct Ed25519Signer {
    key: Option<SigningKey>,
}

impl Ed25519Signer {
    pub fn new(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            key: Some(SigningKey::from_bytes(&seed)),
        })
    }

    fn key(&self) -> Result<&SigningKey, CryptoError> {
        self.key.as_ref().ok_or(CryptoError::Destroyed)
    }

    /// The 32-byte public key.
    pub fn public_key(&self) -> Result<[u8; 32], CryptoError> {
        Ok(self.key()?.verifying_key().to_bytes())
    }

    /// Signs an arbitrary-length message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 64], CryptoError> {
        Ok(self.key()?.sign(message).to_bytes())
    }

    /// Wipes the seed. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.key = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.key.is_none()
    }
}

/// Derives the 32-byte public key for a 32-byte seed.
pub fn derive_public_key(seed: &[u8]) -> Result<[u8; 32], CryptoError> {
    Ed25519Signer::new(seed)?.public_key()
}

/// Verifies a signature. Any mis-sized or malformed input yields `false`.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(pk_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(vk) = VerifyingKey::from_bytes(&pk_bytes) else {
        return false;
    };
    vk.verify_strict(message, &Signature::from_bytes(&sig_bytes))
        .is_ok()
}
