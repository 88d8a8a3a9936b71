use chain_sol::SolanaAddress;

use crate::adapter::{AddressEncoder, ChainAdapter, RawTransaction, SignedTransaction};
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, PublicKeyFormat};

/// Solana chain adapter: compiles and signs the message with Ed25519.
pub struct SolChainAdapter;

impl ChainAdapter for SolChainAdapter {
    fn chain_type(&self) -> ChainType {
        ChainType::Sol
    }

    fn sign(
        &self,
        tx: &RawTransaction,
        key: &SigningKey,
    ) -> Result<SignedTransaction, WalletError> {
        let RawTransaction::Sol(tx) = tx else {
            return Err(WalletError::UnsupportedChain(ChainType::Sol));
        };
        let SigningKey::Ed25519(signer) = key else {
            return Err(WalletError::UnsupportedScheme(
                "Solana signing requires an Ed25519 key".into(),
            ));
        };
        let signed = chain_sol::sign_transaction(tx, signer)?;
        Ok(SignedTransaction::Sol(signed))
    }

    fn raw_bytes(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Sol(tx) => Ok(tx.raw.clone()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Sol)),
        }
    }

    fn tx_hash(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Sol(tx) => Ok(tx.tx_hash.to_vec()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Sol)),
        }
    }
}

/// Solana address encoder: the 32-byte public key in Base58.
pub struct SolEncoder;

impl AddressEncoder for SolEncoder {
    fn chain_type(&self) -> ChainType {
        ChainType::Sol
    }

    fn required_format(&self) -> PublicKeyFormat {
        PublicKeyFormat::Ed25519Raw32
    }

    fn encode(&self, public_key: &[u8], _options: &DeriveOptions) -> Result<String, WalletError> {
        let address = SolanaAddress::from_public_key(public_key)
            .map_err(|e| WalletError::AddressEncoding(e.to_string()))?;
        Ok(address.to_string())
    }
}
