//! The unified HD wallet: one seed, two lazily-built master keys.
//!
//! Master keys are initialized on first use behind a per-scheme mutex
//! (double-checked by the `Option` inside), after which derivations only
//! read them; concurrent `derive_path` calls from multiple threads sharing
//! one wallet are fine. Destroying the wallet wipes the seed and both
//! masters.

use std::sync::{Mutex, PoisonError};

use crypto_utils::SecretBytes;
use zeroize::Zeroize;

use crate::bip32::{self, ExtendedKey};
use crate::error::WalletError;
use crate::mnemonic;
use crate::signer::DerivedKey;
use crate::slip10::Slip10ExtendedKey;
use crate::types::SignatureScheme;

/// A seed-backed wallet serving both derivation schemes.
pub struct HdWallet {
    seed: Mutex<Option<SecretBytes>>,
    secp256k1_master: Mutex<Option<ExtendedKey>>,
    ed25519_master: Mutex<Option<Slip10ExtendedKey>>,
}

impl HdWallet {
    /// Builds a wallet from a BIP-39 seed (16..=64 bytes, typically 64).
    pub fn from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(WalletError::InvalidInput(format!(
                "seed must be 16..=64 bytes, got {}",
                seed.len()
            )));
        }
        Ok(Self {
            seed: Mutex::new(Some(SecretBytes::from(seed))),
            secp256k1_master: Mutex::new(None),
            ed25519_master: Mutex::new(None),
        })
    }

    /// Convenience constructor: mnemonic + passphrase.
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self, WalletError> {
        let mut seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
        let wallet = Self::from_seed(&seed);
        seed.zeroize();
        wallet
    }

    fn seed_copy(&self) -> Result<SecretBytes, WalletError> {
        let guard = self.seed.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().cloned().ok_or(WalletError::Destroyed)
    }

    /// Derives a key along `path` under the given scheme.
    pub fn derive_path(
        &self,
        path: &str,
        scheme: SignatureScheme,
    ) -> Result<DerivedKey, WalletError> {
        let segments = bip32::parse_path(path)?;
        let canonical = bip32::format_path(&segments);

        match scheme {
            SignatureScheme::Bip32Secp256k1 => {
                let mut guard = self
                    .secp256k1_master
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if guard.is_none() {
                    let seed = self.seed_copy()?;
                    *guard = Some(ExtendedKey::master_from_seed(&seed)?);
                }
                let master = guard.as_ref().ok_or(WalletError::Destroyed)?;
                let child = master.derive_path(&segments)?;
                Ok(DerivedKey::new(
                    child.private_key()?,
                    child.chain_code()?,
                    canonical,
                    scheme,
                ))
            }
            SignatureScheme::Slip10Ed25519 => {
                let mut guard = self
                    .ed25519_master
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if guard.is_none() {
                    let seed = self.seed_copy()?;
                    *guard = Some(Slip10ExtendedKey::master_from_seed(&seed)?);
                }
                let master = guard.as_ref().ok_or(WalletError::Destroyed)?;
                let child = master.derive_path(&segments)?;
                Ok(DerivedKey::new(
                    child.private_key()?,
                    child.chain_code()?,
                    canonical,
                    scheme,
                ))
            }
        }
    }

    /// Derives `count` siblings of `base_path`, replacing its last segment
    /// with `start..start+count` (keeping the segment's hardening), in
    /// ascending index order.
    pub fn derive_range(
        &self,
        base_path: &str,
        start: u32,
        count: u32,
        scheme: SignatureScheme,
    ) -> Result<Vec<DerivedKey>, WalletError> {
        let mut segments = bip32::parse_path(base_path)?;
        let last = segments.pop().ok_or_else(|| {
            WalletError::InvalidInput("base path needs at least one segment".into())
        })?;
        let hardened_bit = last & bip32::HARDENED_OFFSET;

        let mut keys = Vec::with_capacity(count as usize);
        for i in 0..count {
            let index = start.checked_add(i).ok_or_else(|| {
                WalletError::InvalidInput("address index overflow".into())
            })?;
            if index >= bip32::HARDENED_OFFSET {
                return Err(WalletError::InvalidInput(format!(
                    "address index {index} exceeds 2^31 - 1"
                )));
            }
            segments.push(index | hardened_bit);
            let path = bip32::format_path(&segments);
            segments.pop();
            keys.push(self.derive_path(&path, scheme)?);
        }
        Ok(keys)
    }

    /// Wipes the seed and both cached masters.
    pub fn destroy(&self) {
        if let Some(mut seed) = self
            .seed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            seed.wipe();
        }
        if let Some(mut master) = self
            .secp256k1_master
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            master.destroy();
        }
        if let Some(mut master) = self
            .ed25519_master
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            master.destroy();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.seed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Drop for HdWallet {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn wallet() -> HdWallet {
        HdWallet::from_mnemonic(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn derive_path_matches_direct_derivation() {
        let w = wallet();
        let derived = w
            .derive_path("m/44'/60'/0'/0/0", SignatureScheme::Bip32Secp256k1)
            .unwrap();

        let seed = mnemonic::mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let direct = bip32::derive_from_seed(&seed, "m/44'/60'/0'/0/0").unwrap();
        assert_eq!(
            derived.private_key().unwrap(),
            direct.private_key().unwrap()
        );
        assert_eq!(derived.path(), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn hardening_markers_normalize() {
        let w = wallet();
        let a = w
            .derive_path("m/44'/60'/0'/0/0", SignatureScheme::Bip32Secp256k1)
            .unwrap();
        let b = w
            .derive_path("m/44h/60h/0h/0/0", SignatureScheme::Bip32Secp256k1)
            .unwrap();
        assert_eq!(a.private_key().unwrap(), b.private_key().unwrap());
        assert_eq!(b.path(), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn schemes_produce_different_keys() {
        let w = wallet();
        let secp = w
            .derive_path("m/44'/501'/0'/0'", SignatureScheme::Bip32Secp256k1)
            .unwrap();
        let ed = w
            .derive_path("m/44'/501'/0'/0'", SignatureScheme::Slip10Ed25519)
            .unwrap();
        assert_ne!(secp.private_key().unwrap(), ed.private_key().unwrap());
    }

    #[test]
    fn slip10_rejects_non_hardened_path() {
        let w = wallet();
        assert!(matches!(
            w.derive_path("m/44'/501'/0'/0", SignatureScheme::Slip10Ed25519),
            Err(WalletError::HardenedRequired(_))
        ));
    }

    #[test]
    fn derive_range_is_ascending_and_keeps_hardening() {
        let w = wallet();
        let keys = w
            .derive_range("m/44'/501'/0'/0'", 0, 3, SignatureScheme::Slip10Ed25519)
            .unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].path(), "m/44'/501'/0'/0'");
        assert_eq!(keys[1].path(), "m/44'/501'/0'/1'");
        assert_eq!(keys[2].path(), "m/44'/501'/0'/2'");

        let keys = w
            .derive_range("m/84'/0'/0'/0/0", 5, 2, SignatureScheme::Bip32Secp256k1)
            .unwrap();
        assert_eq!(keys[0].path(), "m/84'/0'/0'/0/5");
        assert_eq!(keys[1].path(), "m/84'/0'/0'/0/6");
    }

    #[test]
    fn derive_range_matches_individual_derivation() {
        let w = wallet();
        let ranged = w
            .derive_range("m/44'/60'/0'/0/0", 0, 2, SignatureScheme::Bip32Secp256k1)
            .unwrap();
        let direct = w
            .derive_path("m/44'/60'/0'/0/1", SignatureScheme::Bip32Secp256k1)
            .unwrap();
        assert_eq!(
            ranged[1].private_key().unwrap(),
            direct.private_key().unwrap()
        );
    }

    #[test]
    fn concurrent_derivations_agree() {
        let w = Arc::new(wallet());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let w = Arc::clone(&w);
            handles.push(std::thread::spawn(move || {
                let key = w
                    .derive_path("m/44'/60'/0'/0/0", SignatureScheme::Bip32Secp256k1)
                    .unwrap();
                key.private_key().unwrap()
            }));
        }
        let results: Vec<[u8; 32]> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn destroy_blocks_later_derivations() {
        let w = wallet();
        // Force secp master initialization, leave ed25519 uninitialized.
        let _ = w
            .derive_path("m/0'", SignatureScheme::Bip32Secp256k1)
            .unwrap();
        w.destroy();
        assert!(w.is_destroyed());
        // Cached master is gone too, not just the seed.
        assert!(w
            .derive_path("m/0'", SignatureScheme::Bip32Secp256k1)
            .is_err());
        assert!(w
            .derive_path("m/0'", SignatureScheme::Slip10Ed25519)
            .is_err());
        w.destroy();
    }

    #[test]
    fn from_seed_rejects_bad_lengths() {
        assert!(HdWallet::from_seed(&[0u8; 8]).is_err());
        assert!(HdWallet::from_seed(&[0u8; 65]).is_err());
        assert!(HdWallet::from_seed(&[0u8; 64]).is_ok());
    }
}
