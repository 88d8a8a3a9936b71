//! SLIP-10 hierarchical derivation for Ed25519.
//!
//! ```text
//! master: I = HMAC-SHA512("ed25519 seed", seed)
//! child:  I = HMAC-SHA512(c_par, 0x00 || k_par || ser32(i)),  i >= 2^31
//! ```
//!
//! Ed25519 defines hardened derivation only; a non-hardened index is a
//! [`WalletError::HardenedRequired`]. Unlike BIP-32 there are no modular
//! constraints on `I_L`.

use zeroize::Zeroize;

use crypto_utils::hash::hmac_sha512;

use crate::bip32::HARDENED_OFFSET;
use crate::error::WalletError;

/// A SLIP-10 Ed25519 extended key.
pub struct Slip10ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
    depth: u8,
    path: String,
    destroyed: bool,
}

impl Slip10ExtendedKey {
    /// Master key: HMAC-SHA512 of the seed under "ed25519 seed".
    pub fn master_from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.is_empty() {
            return Err(WalletError::InvalidInput("empty seed".into()));
        }
        let i = hmac_sha512(b"ed25519 seed", seed)?;
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self {
            key,
            chain_code,
            depth: 0,
            path: "m".to_string(),
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<(), WalletError> {
        if self.destroyed {
            Err(WalletError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// One hardened CKD step.
    pub fn derive_child(&self, index: u32) -> Result<Self, WalletError> {
        self.ensure_alive()?;
        if index < HARDENED_OFFSET {
            return Err(WalletError::HardenedRequired(index));
        }

        let mut data = Vec::with_capacity(37);
        data.push(0x00);
        data.extend_from_slice(&self.key);
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data)?;
        data.zeroize();

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);

        Ok(Self {
            key,
            chain_code,
            depth: self.depth + 1,
            path: format!("{}/{}'", self.path, index - HARDENED_OFFSET),
            destroyed: false,
        })
    }

    /// Derives along `segments`; every index must be hardened.
    pub fn derive_path(&self, segments: &[u32]) -> Result<Self, WalletError> {
        self.ensure_alive()?;
        let mut current = Self {
            key: self.key,
            chain_code: self.chain_code,
            depth: self.depth,
            path: self.path.clone(),
            destroyed: false,
        };
        for &index in segments {
            current = current.derive_child(index)?;
        }
        Ok(current)
    }

    /// Copy of the 32-byte key (the Ed25519 seed).
    pub fn private_key(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.key)
    }

    /// Copy of the chain code.
    pub fn chain_code(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.chain_code)
    }

    /// The 32-byte Ed25519 public key.
    pub fn public_key(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(crypto_utils::ed25519::derive_public_key(&self.key)?)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wipes the key material in place. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for Slip10ExtendedKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SLIP-10 Ed25519 test vector 1 seed.
    fn vector1_seed() -> Vec<u8> {
        hex::decode("000102030405060708090a0b0c0d0e0f").unwrap()
    }

    #[test]
    fn vector1_master() {
        let master = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        assert_eq!(
            hex::encode(master.private_key().unwrap()),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(master.chain_code().unwrap()),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
    }

    #[test]
    fn vector1_first_hardened_child() {
        let master = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        let child = master.derive_child(HARDENED_OFFSET).unwrap();
        assert_eq!(
            hex::encode(child.private_key().unwrap()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
        assert_eq!(
            hex::encode(child.chain_code().unwrap()),
            "8b59aa11380b624e81507a27fedda59fea6d0b779a778918a2fd3590e16e9c69"
        );
        assert_eq!(child.path(), "m/0'");
    }

    #[test]
    fn non_hardened_index_is_rejected() {
        let master = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        assert!(matches!(
            master.derive_child(0),
            Err(WalletError::HardenedRequired(0))
        ));
        assert!(matches!(
            master.derive_child(HARDENED_OFFSET - 1),
            Err(WalletError::HardenedRequired(_))
        ));
        // The same rule applies mid-path.
        assert!(master
            .derive_path(&[44 | HARDENED_OFFSET, 501])
            .is_err());
    }

    #[test]
    fn derive_path_matches_stepwise() {
        let master = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        let stepped = master
            .derive_child(44 | HARDENED_OFFSET)
            .unwrap()
            .derive_child(501 | HARDENED_OFFSET)
            .unwrap();
        let direct = master
            .derive_path(&[44 | HARDENED_OFFSET, 501 | HARDENED_OFFSET])
            .unwrap();
        assert_eq!(
            stepped.private_key().unwrap(),
            direct.private_key().unwrap()
        );
        assert_eq!(direct.path(), "m/44'/501'");
        assert_eq!(direct.depth(), 2);
    }

    #[test]
    fn public_key_is_32_bytes_and_deterministic() {
        let master = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        let a = master.public_key().unwrap();
        let b = master.public_key().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn destroy_blocks_use() {
        let mut key = Slip10ExtendedKey::master_from_seed(&vector1_seed()).unwrap();
        key.destroy();
        key.destroy();
        assert!(matches!(key.private_key(), Err(WalletError::Destroyed)));
        assert!(matches!(
            key.derive_child(HARDENED_OFFSET),
            Err(WalletError::Destroyed)
        ));
    }

    #[test]
    fn empty_seed_is_rejected() {
        assert!(Slip10ExtendedKey::master_from_seed(&[]).is_err());
    }
}
