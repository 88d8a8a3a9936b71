use chain_tron::TronAddress;

use crate::adapter::{AddressEncoder, ChainAdapter, RawTransaction, SignedTransaction};
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, PublicKeyFormat};

/// TRON chain adapter: protobuf encoding, SHA-256 txid, recoverable
/// secp256k1 signature.
pub struct TronChainAdapter;

impl ChainAdapter for TronChainAdapter {
    fn chain_type(&self) -> ChainType {
        ChainType::Tron
    }

    fn sign(
        &self,
        tx: &RawTransaction,
        key: &SigningKey,
    ) -> Result<SignedTransaction, WalletError> {
        let RawTransaction::Tron(tx) = tx else {
            return Err(WalletError::UnsupportedChain(ChainType::Tron));
        };
        let SigningKey::Secp256k1(signer) = key else {
            return Err(WalletError::UnsupportedScheme(
                "TRON signing requires a secp256k1 key".into(),
            ));
        };
        let signed = chain_tron::sign_transaction(tx, signer)?;
        Ok(SignedTransaction::Tron(signed))
    }

    fn raw_bytes(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Tron(tx) => Ok(tx.raw.clone()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Tron)),
        }
    }

    fn tx_hash(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Tron(tx) => Ok(tx.tx_hash.to_vec()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Tron)),
        }
    }
}

/// TRON address encoder: Keccak derivation with the 0x41 prefix,
/// Base58Check display.
pub struct TronEncoder;

impl AddressEncoder for TronEncoder {
    fn chain_type(&self) -> ChainType {
        ChainType::Tron
    }

    fn required_format(&self) -> PublicKeyFormat {
        PublicKeyFormat::Uncompressed65
    }

    fn encode(&self, public_key: &[u8], _options: &DeriveOptions) -> Result<String, WalletError> {
        let address = TronAddress::from_public_key(public_key)
            .map_err(|e| WalletError::AddressEncoding(e.to_string()))?;
        Ok(address.to_base58())
    }
}
