use chain_evm::EvmAddress;

use crate::adapter::{AddressEncoder, ChainAdapter, RawTransaction, SignedTransaction};
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, PublicKeyFormat};

/// EVM chain adapter: legacy/EIP-155 signing over the secp256k1 signer.
pub struct EvmChainAdapter;

impl ChainAdapter for EvmChainAdapter {
    fn chain_type(&self) -> ChainType {
        ChainType::Evm
    }

    fn sign(
        &self,
        tx: &RawTransaction,
        key: &SigningKey,
    ) -> Result<SignedTransaction, WalletError> {
        let RawTransaction::Evm(tx) = tx else {
            return Err(WalletError::UnsupportedChain(ChainType::Evm));
        };
        let SigningKey::Secp256k1(signer) = key else {
            return Err(WalletError::UnsupportedScheme(
                "EVM signing requires a secp256k1 key".into(),
            ));
        };
        let signed = chain_evm::sign_transaction(tx, signer)?;
        Ok(SignedTransaction::Evm(signed))
    }

    fn raw_bytes(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Evm(tx) => Ok(tx.raw.clone()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Evm)),
        }
    }

    fn tx_hash(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Evm(tx) => Ok(tx.tx_hash.to_vec()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Evm)),
        }
    }
}

/// EVM address encoder: Keccak over the uncompressed key, EIP-55 casing.
pub struct EvmEncoder;

impl AddressEncoder for EvmEncoder {
    fn chain_type(&self) -> ChainType {
        ChainType::Evm
    }

    fn required_format(&self) -> PublicKeyFormat {
        PublicKeyFormat::Uncompressed65
    }

    fn encode(&self, public_key: &[u8], _options: &DeriveOptions) -> Result<String, WalletError> {
        let address = EvmAddress::from_public_key(public_key)
            .map_err(|e| WalletError::AddressEncoding(e.to_string()))?;
        Ok(address.to_checksum_string())
    }
}
