/// Supported Bitcoin networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtcNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

impl BtcNetwork {
    /// Base58Check version byte for P2PKH addresses.
    pub fn p2pkh_version(self) -> u8 {
        match self {
            BtcNetwork::Mainnet => 0x00,
            BtcNetwork::Testnet | BtcNetwork::Regtest => 0x6f,
        }
    }

    /// Base58Check version byte for P2SH addresses.
    pub fn p2sh_version(self) -> u8 {
        match self {
            BtcNetwork::Mainnet => 0x05,
            BtcNetwork::Testnet | BtcNetwork::Regtest => 0xc4,
        }
    }

    /// Bech32 human-readable part for SegWit addresses.
    pub fn hrp(self) -> &'static str {
        match self {
            BtcNetwork::Mainnet => "bc",
            BtcNetwork::Testnet => "tb",
            BtcNetwork::Regtest => "bcrt",
        }
    }

    /// Resolves a bech32 human-readable part back to a network.
    pub fn from_hrp(hrp: &str) -> Option<Self> {
        match hrp {
            "bc" => Some(BtcNetwork::Mainnet),
            "tb" => Some(BtcNetwork::Testnet),
            "bcrt" => Some(BtcNetwork::Regtest),
            _ => None,
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
            BtcNetwork::Testnet => write!(f, "testnet"),
            BtcNetwork::Regtest => write!(f, "regtest"),
        }
    }
}
