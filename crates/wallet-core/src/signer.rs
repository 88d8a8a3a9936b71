//! Key material types: derived keys, polymorphic signing keys, and tagged
//! signatures.
//!
//! A [`DerivedKey`] owns a copy of a derived private scalar and chain code.
//! Converting it into a [`SigningKey`] hands the scalar to the signer and
//! wipes the derived key. Everything here wipes on drop, and `destroy` is
//! explicit and idempotent.

use zeroize::Zeroize;

use crypto_utils::ed25519::Ed25519Signer;
use crypto_utils::secp256k1::{Secp256k1Signature, Secp256k1Signer};

use crate::error::WalletError;
use crate::types::{PublicKeyFormat, SignatureScheme};

/// A signature tagged with its scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Secp256k1(Secp256k1Signature),
    Ed25519([u8; 64]),
}

impl Signature {
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            Signature::Secp256k1(_) => SignatureScheme::Bip32Secp256k1,
            Signature::Ed25519(_) => SignatureScheme::Slip10Ed25519,
        }
    }

    /// `r || s || v` (65 bytes) for secp256k1, the raw 64 bytes for
    /// Ed25519.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Signature::Secp256k1(sig) => sig.to_bytes().to_vec(),
            Signature::Ed25519(bytes) => bytes.to_vec(),
        }
    }
}

/// A scheme-tagged signer holding its private key exclusively.
pub enum SigningKey {
    Secp256k1(Secp256k1Signer),
    Ed25519(Ed25519Signer),
}

impl SigningKey {
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            SigningKey::Secp256k1(_) => SignatureScheme::Bip32Secp256k1,
            SigningKey::Ed25519(_) => SignatureScheme::Slip10Ed25519,
        }
    }

    /// Signs a 32-byte hash (secp256k1) or an arbitrary message (Ed25519).
    pub fn sign(&self, message: &[u8]) -> Result<Signature, WalletError> {
        match self {
            SigningKey::Secp256k1(signer) => Ok(Signature::Secp256k1(signer.sign(message)?)),
            SigningKey::Ed25519(signer) => Ok(Signature::Ed25519(signer.sign(message)?)),
        }
    }

    /// The public key in the requested format; mismatched curve/format
    /// pairs fail with `UnsupportedScheme`.
    pub fn public_key(&self, format: PublicKeyFormat) -> Result<Vec<u8>, WalletError> {
        match (self, format) {
            (SigningKey::Secp256k1(signer), PublicKeyFormat::Uncompressed65) => {
                Ok(signer.public_key(false)?)
            }
            (SigningKey::Secp256k1(signer), PublicKeyFormat::Compressed33) => {
                Ok(signer.public_key(true)?)
            }
            (SigningKey::Ed25519(signer), PublicKeyFormat::Ed25519Raw32) => {
                Ok(signer.public_key()?.to_vec())
            }
            (key, format) => Err(WalletError::UnsupportedScheme(format!(
                "{:?} key cannot produce a {format:?} public key",
                key.scheme()
            ))),
        }
    }

    /// Wipes the private key. Safe to call more than once.
    pub fn destroy(&mut self) {
        match self {
            SigningKey::Secp256k1(signer) => signer.destroy(),
            SigningKey::Ed25519(signer) => signer.destroy(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        match self {
            SigningKey::Secp256k1(signer) => signer.is_destroyed(),
            SigningKey::Ed25519(signer) => signer.is_destroyed(),
        }
    }
}

/// The result of a path derivation: private scalar, chain code, and the
/// canonical path string, tagged with the scheme that produced it.
pub struct DerivedKey {
    private_key: [u8; 32],
    chain_code: [u8; 32],
    path: String,
    scheme: SignatureScheme,
    destroyed: bool,
}

impl DerivedKey {
    pub(crate) fn new(
        private_key: [u8; 32],
        chain_code: [u8; 32],
        path: String,
        scheme: SignatureScheme,
    ) -> Self {
        Self {
            private_key,
            chain_code,
            path,
            scheme,
            destroyed: false,
        }
    }

    fn ensure_alive(&self) -> Result<(), WalletError> {
        if self.destroyed {
            Err(WalletError::Destroyed)
        } else {
            Ok(())
        }
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Copy of the private scalar (or Ed25519 seed).
    pub fn private_key(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.private_key)
    }

    /// Copy of the chain code.
    pub fn chain_code(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.chain_code)
    }

    /// The public key in the requested format.
    pub fn public_key(&self, format: PublicKeyFormat) -> Result<Vec<u8>, WalletError> {
        self.ensure_alive()?;
        match (self.scheme, format) {
            (SignatureScheme::Bip32Secp256k1, PublicKeyFormat::Uncompressed65) => {
                Ok(crypto_utils::secp256k1::derive_public_key(&self.private_key, false)?)
            }
            (SignatureScheme::Bip32Secp256k1, PublicKeyFormat::Compressed33) => {
                Ok(crypto_utils::secp256k1::derive_public_key(&self.private_key, true)?)
            }
            (SignatureScheme::Slip10Ed25519, PublicKeyFormat::Ed25519Raw32) => {
                Ok(crypto_utils::ed25519::derive_public_key(&self.private_key)?.to_vec())
            }
            (scheme, format) => Err(WalletError::UnsupportedScheme(format!(
                "{scheme:?} key cannot produce a {format:?} public key"
            ))),
        }
    }

    /// Hands the key material to a signer and wipes this copy.
    pub fn into_signing_key(mut self) -> Result<SigningKey, WalletError> {
        self.ensure_alive()?;
        let signing_key = match self.scheme {
            SignatureScheme::Bip32Secp256k1 => {
                SigningKey::Secp256k1(Secp256k1Signer::new(&self.private_key)?)
            }
            SignatureScheme::Slip10Ed25519 => {
                SigningKey::Ed25519(Ed25519Signer::new(&self.private_key)?)
            }
        };
        self.destroy();
        Ok(signing_key)
    }

    /// Wipes the key material in place. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.private_key.zeroize();
        self.chain_code.zeroize();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.chain_code.zeroize();
    }
}
