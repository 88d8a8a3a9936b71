use chain_btc::{BtcAddressType, BtcNetwork};
use serde::{Deserialize, Serialize};

/// Supported chain families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainType {
    /// Ethereum and every EIP-155 network (differentiated by chain id at
    /// the transaction level).
    Evm,
    Tron,
    Btc,
    Sol,
    Cosmos,
    Aptos,
    Near,
}

impl ChainType {
    /// BIP-44 coin type.
    pub fn coin_type(&self) -> u32 {
        match self {
            ChainType::Evm => 60,
            ChainType::Tron => 195,
            ChainType::Btc => 0,
            ChainType::Sol => 501,
            ChainType::Cosmos => 118,
            ChainType::Aptos => 637,
            ChainType::Near => 397,
        }
    }

    /// The derivation scheme for this chain: Solana derives Ed25519 keys
    /// through SLIP-10, everything else secp256k1 through BIP-32.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            ChainType::Sol => SignatureScheme::Slip10Ed25519,
            _ => SignatureScheme::Bip32Secp256k1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChainType::Evm => "EVM",
            ChainType::Tron => "TRON",
            ChainType::Btc => "Bitcoin",
            ChainType::Sol => "Solana",
            ChainType::Cosmos => "Cosmos",
            ChainType::Aptos => "Aptos",
            ChainType::Near => "NEAR",
        }
    }
}

/// An (algorithm, curve) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Bip32Secp256k1,
    Slip10Ed25519,
}

/// The public key encoding an address encoder consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// 65-byte SEC1 uncompressed (0x04-prefixed).
    Uncompressed65,
    /// 33-byte SEC1 compressed.
    Compressed33,
    /// Raw 32-byte Ed25519 key.
    Ed25519Raw32,
}

/// Per-derivation options; only Bitcoin consumes them today.
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    pub btc_address_type: BtcAddressType,
    pub btc_network: BtcNetwork,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            btc_address_type: BtcAddressType::P2wpkh,
            btc_network: BtcNetwork::Mainnet,
        }
    }
}

/// A derived address and the path it came from (no key material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub chain: ChainType,
    pub address: String,
    pub path: String,
    pub account_index: u32,
    pub address_index: u32,
}
