//! BIP-44/49/84/86 path conventions and coin-type constants.

use chain_btc::{BtcAddressType, BtcNetwork};

use crate::types::{ChainType, DeriveOptions};

pub const PURPOSE_BIP44: u32 = 44;
pub const PURPOSE_BIP49: u32 = 49;
pub const PURPOSE_BIP84: u32 = 84;
pub const PURPOSE_BIP86: u32 = 86;

pub const COIN_BTC: u32 = 0;
pub const COIN_BTC_TESTNET: u32 = 1;
pub const COIN_EVM: u32 = 60;
pub const COIN_COSMOS: u32 = 118;
pub const COIN_TRON: u32 = 195;
pub const COIN_NEAR: u32 = 397;
pub const COIN_SOL: u32 = 501;
pub const COIN_APTOS: u32 = 637;

/// The BIP purpose field for each Bitcoin address template.
pub fn purpose_for_btc_address_type(address_type: BtcAddressType) -> u32 {
    match address_type {
        BtcAddressType::P2pkh => PURPOSE_BIP44,
        BtcAddressType::P2shP2wpkh => PURPOSE_BIP49,
        BtcAddressType::P2wpkh | BtcAddressType::P2wsh => PURPOSE_BIP84,
        BtcAddressType::P2tr => PURPOSE_BIP86,
    }
}

/// Builds the derivation path for a chain.
///
/// Solana uses the hardened-only 4-level form (no change level); Bitcoin
/// routes the purpose by address type and the coin type by network; every
/// other chain uses the standard 5-level BIP-44 template.
pub fn path_for_chain(
    chain: ChainType,
    account: u32,
    change: u32,
    address_index: u32,
    options: &DeriveOptions,
) -> String {
    match chain {
        ChainType::Sol => format!("m/44'/{}'/{account}'/{address_index}'", COIN_SOL),
        ChainType::Btc => {
            let purpose = purpose_for_btc_address_type(options.btc_address_type);
            let coin = match options.btc_network {
                BtcNetwork::Mainnet => COIN_BTC,
                BtcNetwork::Testnet | BtcNetwork::Regtest => COIN_BTC_TESTNET,
            };
            format!("m/{purpose}'/{coin}'/{account}'/{change}/{address_index}")
        }
        other => format!(
            "m/44'/{}'/{account}'/{change}/{address_index}",
            other.coin_type()
        ),
    }
}
