use chain_btc::BtcAddress;

use crate::adapter::{AddressEncoder, ChainAdapter, RawTransaction, SignedTransaction};
use crate::error::WalletError;
use crate::signer::SigningKey;
use crate::types::{ChainType, DeriveOptions, PublicKeyFormat};

/// Bitcoin chain adapter: P2PKH / P2WPKH key-spend signing.
pub struct BtcChainAdapter;

impl ChainAdapter for BtcChainAdapter {
    fn chain_type(&self) -> ChainType {
        ChainType::Btc
    }

    fn sign(
        &self,
        tx: &RawTransaction,
        key: &SigningKey,
    ) -> Result<SignedTransaction, WalletError> {
        let RawTransaction::Btc { tx, network } = tx else {
            return Err(WalletError::UnsupportedChain(ChainType::Btc));
        };
        let SigningKey::Secp256k1(signer) = key else {
            return Err(WalletError::UnsupportedScheme(
                "Bitcoin signing requires a secp256k1 key".into(),
            ));
        };
        let signed = chain_btc::sign_transaction(tx, signer, *network)?;
        Ok(SignedTransaction::Btc(signed))
    }

    fn raw_bytes(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Btc(tx) => Ok(tx.raw.clone()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Btc)),
        }
    }

    fn tx_hash(&self, tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
        match tx {
            SignedTransaction::Btc(tx) => Ok(tx.txid.to_vec()),
            _ => Err(WalletError::UnsupportedChain(ChainType::Btc)),
        }
    }
}

/// Bitcoin address encoder: the template and network come from the
/// derivation options.
pub struct BtcEncoder;

impl AddressEncoder for BtcEncoder {
    fn chain_type(&self) -> ChainType {
        ChainType::Btc
    }

    fn required_format(&self) -> PublicKeyFormat {
        PublicKeyFormat::Compressed33
    }

    fn encode(&self, public_key: &[u8], options: &DeriveOptions) -> Result<String, WalletError> {
        let address =
            BtcAddress::from_pubkey(public_key, options.btc_address_type, options.btc_network)
                .map_err(|e| WalletError::AddressEncoding(e.to_string()))?;
        Ok(address.to_string())
    }
}
