//! secp256k1 ECDSA signing, verification, and public key recovery.
//!
//! Signatures use RFC 6979 deterministic nonces and are always emitted in
//! low-S form with a recovery id in 0..=3. The recovery id is cross-checked
//! by recovering the public key and comparing it against the signer's own.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// A recoverable secp256k1 signature: `r || s || v` with `v` in 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Secp256k1Signature {
    /// Serializes to the 65-byte compact form `r || s || v`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Parses the 65-byte compact form produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidInput(format!(
                "signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        let v = bytes[64];
        if v > 3 {
            return Err(CryptoError::InvalidInput(format!(
                "recovery id {v} out of range"
            )));
        }
        Ok(Self { r, s, v })
    }

    /// EIP-155 `v`: `35 + 2 * chain_id + recovery_id`.
    pub fn to_eip155(&self, chain_id: u64) -> u64 {
        35 + 2 * chain_id + u64::from(self.v)
    }

    /// Pre-EIP-155 Ethereum `v`: `27 + recovery_id`.
    pub fn to_ethereum_v(&self) -> u8 {
        27 + self.v
    }
}

/// A secp256k1 signer bound to one private scalar.
///
/// The scalar lives inside the signer and is wiped when the signer is
/// dropped or destroyed. `destroy` is idempotent; any operation after it
/// fails with [`CryptoError::Destroyed`].
pub struct Secp256k1Signer {
    key: Option<SigningKey>,
}

impl Secp256k1Signer {
    /// Builds a signer from a 32-byte scalar in `[1, n-1]`.
    pub fn new(private_key: &[u8]) -> Result<Self, CryptoError> {
        if private_key.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let key =
            SigningKey::from_slice(private_key).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { key: Some(key) })
    }

    fn key(&self) -> Result<&SigningKey, CryptoError> {
        self.key.as_ref().ok_or(CryptoError::Destroyed)
    }

    /// SEC1 public key: 33 bytes compressed or 65 bytes uncompressed.
    pub fn public_key(&self, compressed: bool) -> Result<Vec<u8>, CryptoError> {
        let key = self.key()?;
        Ok(key
            .verifying_key()
            .to_encoded_point(compressed)
            .as_bytes()
            .to_vec())
    }

    /// Signs a 32-byte message hash.
    pub fn sign(&self, msg_hash: &[u8]) -> Result<Secp256k1Signature, CryptoError> {
        if msg_hash.len() != 32 {
            return Err(CryptoError::InvalidInput(format!(
                "message hash must be 32 bytes, got {}",
                msg_hash.len()
            )));
        }
        let key = self.key()?;

        let (mut sig, mut recid): (EcdsaSignature, RecoveryId) = key
            .sign_prehash(msg_hash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        // Low-S form; negating s flips the recovery id parity.
        if let Some(normalized) = sig.normalize_s() {
            sig = normalized;
            recid = RecoveryId::from_byte(recid.to_byte() ^ 1)
                .ok_or(CryptoError::RecoveryFailed)?;
        }

        // The recovery id is only trusted once it round-trips to our key.
        let recovered = VerifyingKey::recover_from_prehash(msg_hash, &sig, recid)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        if &recovered != key.verifying_key() {
            return Err(CryptoError::RecoveryFailed);
        }

        Ok(Secp256k1Signature {
            r: sig.r().to_bytes().into(),
            s: sig.s().to_bytes().into(),
            v: recid.to_byte(),
        })
    }

    /// Wipes the private scalar. Safe to call more than once.
    pub fn destroy(&mut self) {
        // SigningKey zeroizes its scalar on drop.
        self.key = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.key.is_none()
    }
}

/// Standard ECDSA verification. Returns `false` for any malformed input.
pub fn verify(msg_hash: &[u8], r: &[u8; 32], s: &[u8; 32], public_key: &[u8]) -> bool {
    let Ok(vk) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = EcdsaSignature::from_scalars(*r, *s) else {
        return false;
    };
    vk.verify_prehash(msg_hash, &sig).is_ok()
}

/// Recovers the uncompressed public key from a recoverable signature.
///
/// Returns `None` when `v` is out of range, the hash is not 32 bytes, or no
/// valid curve point corresponds to `(r, s, v)`.
pub fn recover_public_key(
    msg_hash: &[u8],
    r: &[u8; 32],
    s: &[u8; 32],
    v: u8,
) -> Option<[u8; 65]> {
    if msg_hash.len() != 32 {
        return None;
    }
    let recid = RecoveryId::from_byte(v)?;
    let sig = EcdsaSignature::from_scalars(*r, *s).ok()?;
    let vk = VerifyingKey::recover_from_prehash(msg_hash, &sig, recid).ok()?;
    let point = vk.to_encoded_point(false);
    point.as_bytes().try_into().ok()
}

/// Derives the SEC1 public key for a raw 32-byte private scalar.
pub fn derive_public_key(private_key: &[u8], compressed: bool) -> Result<Vec<u8>, CryptoError> {
    let signer = Secp256k1Signer::new(private_key)?;
    signer.public_key(compressed)
}
