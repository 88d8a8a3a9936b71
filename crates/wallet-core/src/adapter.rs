//! Chain adapter and address encoder capability traits, plus the
//! process-wide registries that map [`ChainType`] to implementations.
//!
//! Registries are read-mostly: they are seeded with the built-in chains on
//! first touch, reads take a shared lock, and (re-)registration replaces a
//! whole entry, last writer wins. `reset_registries` restores the defaults
//! for tests.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use chain_btc::{BtcNetwork, BtcTransaction, SignedBtcTransaction};
use chain_evm::{EvmTransaction, SignedEvmTransaction};
use chain_sol::{SignedSolTransaction, SolTransaction};
use chain_tron::{SignedTronTransaction, TronTransaction};

use crate::adapters;
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, PublicKeyFormat};

/// An unsigned transaction, tagged by chain.
#[derive(Debug, Clone)]
pub enum RawTransaction {
    Evm(EvmTransaction),
    Tron(TronTransaction),
    Btc {
        tx: BtcTransaction,
        network: BtcNetwork,
    },
    Sol(SolTransaction),
}

/// A signed transaction, tagged by chain.
#[derive(Debug, Clone)]
pub enum SignedTransaction {
    Evm(SignedEvmTransaction),
    Tron(SignedTronTransaction),
    Btc(SignedBtcTransaction),
    Sol(SignedSolTransaction),
}

impl SignedTransaction {
    /// The sender address string, derived from the signing key.
    pub fn from_address(&self) -> &str {
        match self {
            SignedTransaction::Evm(tx) => &tx.from,
            SignedTransaction::Tron(tx) => &tx.from,
            SignedTransaction::Btc(tx) => &tx.from,
            SignedTransaction::Sol(tx) => &tx.from,
        }
    }
}

/// Signing and wire-format capability for one chain.
pub trait ChainAdapter: Send + Sync {
    fn chain_type(&self) -> ChainType;

    /// Signs a raw transaction. Fails with `UnsupportedChain` for a foreign
    /// raw-transaction variant and `UnsupportedScheme` for the wrong curve.
    fn sign(&self, tx: &RawTransaction, key: &SigningKey)
        -> Result<SignedTransaction, WalletError>;

    /// The broadcastable wire bytes.
    fn raw_bytes(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError>;

    /// The chain's transaction identifier.
    fn tx_hash(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError>;
}

/// Public-key-to-address capability for one chain.
pub trait AddressEncoder: Send + Sync {
    fn chain_type(&self) -> ChainType;

    /// The public key encoding this encoder consumes.
    fn required_format(&self) -> PublicKeyFormat;

    fn encode(&self, public_key: &[u8], options: &DeriveOptions) -> Result<String, WalletError>;
}

type AdapterMap = HashMap<ChainType, Arc<dyn ChainAdapter>>;
type EncoderMap = HashMap<ChainType, Arc<dyn AddressEncoder>>;

static ADAPTERS: LazyLock<RwLock<AdapterMap>> =
    LazyLock::new(|| RwLock::new(adapters::default_adapters()));

static ENCODERS: LazyLock<RwLock<EncoderMap>> =
    LazyLock::new(|| RwLock::new(adapters::default_encoders()));

/// Registers (or replaces) the adapter for its chain.
pub fn register_adapter(adapter: Arc<dyn ChainAdapter>) {
    ADAPTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(adapter.chain_type(), adapter);
}

/// Registers (or replaces) the encoder for its chain.
pub fn register_encoder(encoder: Arc<dyn AddressEncoder>) {
    ENCODERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(encoder.chain_type(), encoder);
}

/// Looks up the adapter for a chain.
pub fn adapter_for(chain: ChainType) -> Result<Arc<dyn ChainAdapter>, WalletError> {
    ADAPTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&chain)
        .cloned()
        .ok_or(WalletError::UnsupportedChain(chain))
}

/// Looks up the address encoder for a chain.
pub fn encoder_for(chain: ChainType) -> Result<Arc<dyn AddressEncoder>, WalletError> {
    ENCODERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&chain)
        .cloned()
        .ok_or(WalletError::UnsupportedChain(chain))
}

/// Restores both registries to the built-in defaults.
pub fn reset_registries() {
    *ADAPTERS.write().unwrap_or_else(PoisonError::into_inner) = adapters::default_adapters();
    *ENCODERS.write().unwrap_or_else(PoisonError::into_inner) = adapters::default_encoders();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_four_chains() {
        for chain in [ChainType::Evm, ChainType::Tron, ChainType::Btc, ChainType::Sol] {
            assert!(adapter_for(chain).is_ok(), "{chain:?} adapter");
            assert!(encoder_for(chain).is_ok(), "{chain:?} encoder");
            assert_eq!(adapter_for(chain).unwrap().chain_type(), chain);
        }
    }

    #[test]
    fn unregistered_chains_fail() {
        assert!(matches!(
            adapter_for(ChainType::Cosmos),
            Err(WalletError::UnsupportedChain(ChainType::Cosmos))
        ));
        assert!(matches!(
            encoder_for(ChainType::Near),
            Err(WalletError::UnsupportedChain(ChainType::Near))
        ));
    }

    #[test]
    fn encoder_formats_follow_the_chain() {
        assert_eq!(
            encoder_for(ChainType::Evm).unwrap().required_format(),
            PublicKeyFormat::Uncompressed65
        );
        assert_eq!(
            encoder_for(ChainType::Tron).unwrap().required_format(),
            PublicKeyFormat::Uncompressed65
        );
        assert_eq!(
            encoder_for(ChainType::Btc).unwrap().required_format(),
            PublicKeyFormat::Compressed33
        );
        assert_eq!(
            encoder_for(ChainType::Sol).unwrap().required_format(),
            PublicKeyFormat::Ed25519Raw32
        );
    }

    #[test]
    fn registration_replaces_and_reset_restores() {
        // Registered against a chain no other test resolves an encoder
        // for, since the registry is process-wide and tests run in
        // parallel.
        struct Dummy;
        impl AddressEncoder for Dummy {
            fn chain_type(&self) -> ChainType {
                ChainType::Cosmos
            }
            fn required_format(&self) -> PublicKeyFormat {
                PublicKeyFormat::Compressed33
            }
            fn encode(&self, _: &[u8], _: &DeriveOptions) -> Result<String, WalletError> {
                Ok("dummy".into())
            }
        }

        register_encoder(Arc::new(Dummy));
        assert_eq!(
            encoder_for(ChainType::Cosmos).unwrap().required_format(),
            PublicKeyFormat::Compressed33
        );

        reset_registries();
        assert!(encoder_for(ChainType::Cosmos).is_err());
    }
}
