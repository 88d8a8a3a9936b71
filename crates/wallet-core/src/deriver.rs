//! The account deriver: opaque user ids to reproducible per-chain accounts.
//!
//! A user id maps to an account index by hashing: the big-endian u32 of
//! `SHA-256(id)[0..4]`, reduced modulo `2^31 - 1`, so the index always fits
//! the unhardened BIP-32 domain and the mapping is pure. The deriver then
//! builds the chain's path, derives the key under the chain's scheme, and
//! materializes the address through the registered encoder.

use crypto_utils::hash::sha256;

use crate::adapter;
use crate::bip44;
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, DerivedAddress};
use crate::wallet::HdWallet;

/// A fully-materialized account: the caller owns (and must destroy) the
/// signing key.
pub struct DerivedAccount {
    pub user_id: String,
    pub account_index: u32,
    pub path: String,
    pub chain: ChainType,
    pub address: String,
    pub signing_key: SigningKey,
}

/// Maps a user id onto `[0, 2^31 - 1)`. Pure; rejects empty ids.
pub fn user_id_to_account_index(user_id: &str) -> Result<u32, WalletError> {
    if user_id.is_empty() {
        return Err(WalletError::InvalidInput("empty user id".into()));
    }
    let hash = sha256(user_id.as_bytes());
    let word = u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]);
    Ok((u64::from(word) % 0x7fff_ffff) as u32)
}

/// Seed-backed deriver over a [`HdWallet`].
pub struct AccountDeriver {
    wallet: HdWallet,
}

impl AccountDeriver {
    pub fn new(wallet: HdWallet) -> Self {
        Self { wallet }
    }

    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self, WalletError> {
        Ok(Self::new(HdWallet::from_mnemonic(phrase, passphrase)?))
    }

    pub fn wallet(&self) -> &HdWallet {
        &self.wallet
    }

    /// Derives the account for `user_id` on `chain`. The returned signing
    /// key is the caller's responsibility.
    pub fn derive_for_user(
        &self,
        user_id: &str,
        chain: ChainType,
        options: &DeriveOptions,
    ) -> Result<DerivedAccount, WalletError> {
        let account_index = user_id_to_account_index(user_id)?;
        let path = bip44::path_for_chain(chain, account_index, 0, 0, options);
        let encoder = adapter::encoder_for(chain)?;

        let key = self.wallet.derive_path(&path, chain.scheme())?;
        let public_key = key.public_key(encoder.required_format())?;
        let address = encoder.encode(&public_key, options)?;
        let path = key.path().to_string();
        let signing_key = key.into_signing_key()?;

        Ok(DerivedAccount {
            user_id: user_id.to_string(),
            account_index,
            path,
            chain,
            address,
            signing_key,
        })
    }

    /// Like [`Self::derive_for_user`], but only the address string leaves;
    /// the key is destroyed before returning.
    pub fn derive_address(
        &self,
        user_id: &str,
        chain: ChainType,
        options: &DeriveOptions,
    ) -> Result<String, WalletError> {
        let mut account = self.derive_for_user(user_id, chain, options)?;
        account.signing_key.destroy();
        Ok(account.address)
    }

    /// Derives `count` consecutive addresses for one account, in strictly
    /// ascending address-index order.
    pub fn derive_addresses(
        &self,
        chain: ChainType,
        account_index: u32,
        start: u32,
        count: u32,
        options: &DeriveOptions,
    ) -> Result<Vec<DerivedAddress>, WalletError> {
        let encoder = adapter::encoder_for(chain)?;
        let base_path = bip44::path_for_chain(chain, account_index, 0, start, options);
        let keys = self
            .wallet
            .derive_range(&base_path, start, count, chain.scheme())?;

        let mut out = Vec::with_capacity(keys.len());
        for (i, key) in keys.into_iter().enumerate() {
            let public_key = key.public_key(encoder.required_format())?;
            let address = encoder.encode(&public_key, options)?;
            out.push(DerivedAddress {
                chain,
                address,
                path: key.path().to_string(),
                account_index,
                address_index: start + i as u32,
            });
            // `key` drops (and wipes) here.
        }
        Ok(out)
    }
}
