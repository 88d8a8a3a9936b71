//! Bitcoin addresses across the five standard output templates.
//!
//! [`BtcAddress`] is a sum type over P2PKH, P2SH, P2WPKH, P2WSH, and P2TR,
//! each variant carrying its network. Construction always starts from the
//! compressed public key (or a script for P2WSH); parsing dispatches on the
//! string prefix and validates checksum, program length, and network.
//!
//! P2TR uses the BIP-341 key-path-only construction: the output key is
//! `lift_x(internal) + tagged_hash("TapTweak", internal) * G`, encoded as
//! its x-coordinate. A tweak that fails to produce a valid point is an
//! error, never a fallback to the untweaked key.

use std::fmt;

use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{ProjectivePoint, PublicKey, Scalar};

use crypto_utils::base58;
use crypto_utils::bech32;
use crypto_utils::hash::{hash160, sha256, tagged_hash};

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// The address templates a key can be materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtcAddressType {
    /// Legacy pay-to-pubkey-hash (BIP-44).
    P2pkh,
    /// P2WPKH nested in P2SH (BIP-49).
    P2shP2wpkh,
    /// Native SegWit v0 pay-to-witness-pubkey-hash (BIP-84).
    P2wpkh,
    /// Native SegWit v0 pay-to-witness-script-hash.
    P2wsh,
    /// Taproot key-path output (BIP-86).
    P2tr,
}

/// A parsed or derived Bitcoin address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtcAddress {
    P2pkh {
        hash: [u8; 20],
        network: BtcNetwork,
    },
    P2sh {
        hash: [u8; 20],
        network: BtcNetwork,
    },
    P2wpkh {
        program: [u8; 20],
        network: BtcNetwork,
    },
    P2wsh {
        program: [u8; 32],
        network: BtcNetwork,
    },
    P2tr {
        output_key: [u8; 32],
        network: BtcNetwork,
    },
}

fn compressed_key(pubkey: &[u8]) -> Result<[u8; 33], BtcError> {
    let key: [u8; 33] = pubkey.try_into().map_err(|_| {
        BtcError::InvalidPublicKey(format!("expected 33 bytes, got {}", pubkey.len()))
    })?;
    if key[0] != 0x02 && key[0] != 0x03 {
        return Err(BtcError::InvalidPublicKey(format!(
            "compressed key prefix 0x{:02x}",
            key[0]
        )));
    }
    Ok(key)
}

/// Computes the BIP-341 output key for an x-only internal key.
pub fn tweak_taproot_key(x_only: &[u8; 32]) -> Result<[u8; 32], BtcError> {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    compressed[1..].copy_from_slice(x_only);
    let internal = PublicKey::from_sec1_bytes(&compressed).map_err(|_| {
        BtcError::InvalidPublicKey("x-only key is not on the curve".into())
    })?;

    let tweak = tagged_hash("TapTweak", x_only);
    let scalar = Option::<Scalar>::from(Scalar::from_repr(tweak.into())).ok_or_else(|| {
        BtcError::InvalidPublicKey("tap tweak exceeds the curve order".into())
    })?;

    let output = internal.to_projective() + ProjectivePoint::GENERATOR * scalar;
    if bool::from(output.is_identity()) {
        return Err(BtcError::InvalidPublicKey(
            "tweaked key is the point at infinity".into(),
        ));
    }

    let encoded = output.to_affine().to_encoded_point(true);
    let mut out = [0u8; 32];
    out.copy_from_slice(&encoded.as_bytes()[1..33]);
    Ok(out)
}

impl BtcAddress {
    /// Legacy P2PKH from a compressed public key.
    pub fn p2pkh_from_pubkey(pubkey: &[u8], network: BtcNetwork) -> Result<Self, BtcError> {
        let key = compressed_key(pubkey)?;
        Ok(BtcAddress::P2pkh {
            hash: hash160(&key),
            network,
        })
    }

    /// P2SH-wrapped P2WPKH from a compressed public key.
    ///
    /// The redeem script is the 22-byte `OP_0 <20-byte key hash>` witness
    /// program; the address commits to HASH160 of that script.
    pub fn p2sh_p2wpkh_from_pubkey(pubkey: &[u8], network: BtcNetwork) -> Result<Self, BtcError> {
        let key = compressed_key(pubkey)?;
        let key_hash = hash160(&key);
        let mut redeem = Vec::with_capacity(22);
        redeem.push(0x00);
        redeem.push(0x14);
        redeem.extend_from_slice(&key_hash);
        Ok(BtcAddress::P2sh {
            hash: hash160(&redeem),
            network,
        })
    }

    /// Native SegWit v0 P2WPKH from a compressed public key.
    pub fn p2wpkh_from_pubkey(pubkey: &[u8], network: BtcNetwork) -> Result<Self, BtcError> {
        let key = compressed_key(pubkey)?;
        Ok(BtcAddress::P2wpkh {
            program: hash160(&key),
            network,
        })
    }

    /// Native SegWit v0 P2WSH committing to SHA-256 of `script`.
    pub fn p2wsh_from_script(script: &[u8], network: BtcNetwork) -> Self {
        BtcAddress::P2wsh {
            program: sha256(script),
            network,
        }
    }

    /// Taproot key-path output from a compressed public key (BIP-86).
    pub fn p2tr_from_pubkey(pubkey: &[u8], network: BtcNetwork) -> Result<Self, BtcError> {
        let key = compressed_key(pubkey)?;
        let mut x_only = [0u8; 32];
        x_only.copy_from_slice(&key[1..]);
        Ok(BtcAddress::P2tr {
            output_key: tweak_taproot_key(&x_only)?,
            network,
        })
    }

    /// Materializes a compressed public key into the requested template.
    /// P2WSH has no key form and is rejected here.
    pub fn from_pubkey(
        pubkey: &[u8],
        address_type: BtcAddressType,
        network: BtcNetwork,
    ) -> Result<Self, BtcError> {
        match address_type {
            BtcAddressType::P2pkh => Self::p2pkh_from_pubkey(pubkey, network),
            BtcAddressType::P2shP2wpkh => Self::p2sh_p2wpkh_from_pubkey(pubkey, network),
            BtcAddressType::P2wpkh => Self::p2wpkh_from_pubkey(pubkey, network),
            BtcAddressType::P2wsh => Err(BtcError::UnsupportedScript(
                "P2WSH is derived from a script, not a public key".into(),
            )),
            BtcAddressType::P2tr => Self::p2tr_from_pubkey(pubkey, network),
        }
    }

    pub fn network(&self) -> BtcNetwork {
        match self {
            BtcAddress::P2pkh { network, .. }
            | BtcAddress::P2sh { network, .. }
            | BtcAddress::P2wpkh { network, .. }
            | BtcAddress::P2wsh { network, .. }
            | BtcAddress::P2tr { network, .. } => *network,
        }
    }

    pub fn address_type(&self) -> BtcAddressType {
        match self {
            BtcAddress::P2pkh { .. } => BtcAddressType::P2pkh,
            // A parsed P2SH hash does not reveal its redeem script; the
            // nested-SegWit constructor is the only P2SH form we produce.
            BtcAddress::P2sh { .. } => BtcAddressType::P2shP2wpkh,
            BtcAddress::P2wpkh { .. } => BtcAddressType::P2wpkh,
            BtcAddress::P2wsh { .. } => BtcAddressType::P2wsh,
            BtcAddress::P2tr { .. } => BtcAddressType::P2tr,
        }
    }

    /// The scriptPubKey this address stands for.
    pub fn script_pubkey(&self) -> Vec<u8> {
        match self {
            BtcAddress::P2pkh { hash, .. } => {
                let mut s = Vec::with_capacity(25);
                s.extend_from_slice(&[0x76, 0xa9, 0x14]);
                s.extend_from_slice(hash);
                s.extend_from_slice(&[0x88, 0xac]);
                s
            }
            BtcAddress::P2sh { hash, .. } => {
                let mut s = Vec::with_capacity(23);
                s.extend_from_slice(&[0xa9, 0x14]);
                s.extend_from_slice(hash);
                s.push(0x87);
                s
            }
            BtcAddress::P2wpkh { program, .. } => {
                let mut s = Vec::with_capacity(22);
                s.extend_from_slice(&[0x00, 0x14]);
                s.extend_from_slice(program);
                s
            }
            BtcAddress::P2wsh { program, .. } => {
                let mut s = Vec::with_capacity(34);
                s.extend_from_slice(&[0x00, 0x20]);
                s.extend_from_slice(program);
                s
            }
            BtcAddress::P2tr { output_key, .. } => {
                let mut s = Vec::with_capacity(34);
                s.extend_from_slice(&[0x51, 0x20]);
                s.extend_from_slice(output_key);
                s
            }
        }
    }

    /// Parses an address string, dispatching on its prefix.
    ///
    /// With `expected_network` set, an otherwise-valid address on another
    /// network fails with [`BtcError::NetworkMismatch`].
    pub fn from_string(s: &str, expected_network: Option<BtcNetwork>) -> Result<Self, BtcError> {
        let lower = s.to_lowercase();
        let address = if lower.starts_with("bc1") || lower.starts_with("tb1") || lower.starts_with("bcrt1")
        {
            Self::parse_segwit(s)?
        } else {
            Self::parse_base58(s, expected_network)?
        };

        if let Some(expected) = expected_network {
            if address.network() != expected {
                return Err(BtcError::NetworkMismatch(format!(
                    "expected {expected}, address is {}",
                    address.network()
                )));
            }
        }
        Ok(address)
    }

    fn parse_segwit(s: &str) -> Result<Self, BtcError> {
        let (hrp, version, program) = bech32::decode_segwit(s)?;
        let network = BtcNetwork::from_hrp(&hrp)
            .ok_or_else(|| BtcError::InvalidAddress(format!("unknown prefix '{hrp}'")))?;

        match (version, program.len()) {
            (0, 20) => Ok(BtcAddress::P2wpkh {
                program: program.as_slice().try_into().map_err(|_| {
                    BtcError::InvalidAddress("witness program length".into())
                })?,
                network,
            }),
            (0, 32) => Ok(BtcAddress::P2wsh {
                program: program.as_slice().try_into().map_err(|_| {
                    BtcError::InvalidAddress("witness program length".into())
                })?,
                network,
            }),
            (1, 32) => Ok(BtcAddress::P2tr {
                output_key: program.as_slice().try_into().map_err(|_| {
                    BtcError::InvalidAddress("witness program length".into())
                })?,
                network,
            }),
            (v, len) => Err(BtcError::InvalidAddress(format!(
                "unsupported witness version {v} with program length {len}"
            ))),
        }
    }

    fn parse_base58(s: &str, expected_network: Option<BtcNetwork>) -> Result<Self, BtcError> {
        let payload = base58::decode_check(s)?;
        if payload.len() != 21 {
            return Err(BtcError::InvalidAddress(format!(
                "payload length {}",
                payload.len()
            )));
        }
        let version = payload[0];
        let hash: [u8; 20] = payload[1..]
            .try_into()
            .map_err(|_| BtcError::InvalidAddress("hash length".into()))?;

        // Testnet and regtest share version bytes; prefer the caller's
        // expectation when it is consistent with the version.
        let resolve = |testnet_default: BtcNetwork| match expected_network {
            Some(BtcNetwork::Regtest) => BtcNetwork::Regtest,
            _ => testnet_default,
        };

        match version {
            0x00 => Ok(BtcAddress::P2pkh {
                hash,
                network: BtcNetwork::Mainnet,
            }),
            0x6f => Ok(BtcAddress::P2pkh {
                hash,
                network: resolve(BtcNetwork::Testnet),
            }),
            0x05 => Ok(BtcAddress::P2sh {
                hash,
                network: BtcNetwork::Mainnet,
            }),
            0xc4 => Ok(BtcAddress::P2sh {
                hash,
                network: resolve(BtcNetwork::Testnet),
            }),
            other => Err(BtcError::InvalidAddress(format!(
                "unknown version byte 0x{other:02x}"
            ))),
        }
    }

    fn encode(&self) -> String {
        match self {
            BtcAddress::P2pkh { hash, network } => {
                base58::encode_check(network.p2pkh_version(), hash)
            }
            BtcAddress::P2sh { hash, network } => {
                base58::encode_check(network.p2sh_version(), hash)
            }
            BtcAddress::P2wpkh { program, network } => {
                // Program lengths are fixed by construction, so encoding
                // cannot fail.
                bech32::encode_segwit(network.hrp(), 0, program).unwrap_or_default()
            }
            BtcAddress::P2wsh { program, network } => {
                bech32::encode_segwit(network.hrp(), 0, program).unwrap_or_default()
            }
            BtcAddress::P2tr {
                output_key,
                network,
            } => bech32::encode_segwit(network.hrp(), 1, output_key).unwrap_or_default(),
        }
    }
}

impl fmt::Display for BtcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compressed public key for the secp256k1 scalar 1.
    fn generator_pubkey() -> Vec<u8> {
        hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
            .unwrap()
    }

    #[test]
    fn p2pkh_mainnet_vector() {
        let addr = BtcAddress::p2pkh_from_pubkey(&generator_pubkey(), BtcNetwork::Mainnet)
            .unwrap();
        assert_eq!(addr.to_string(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn p2wpkh_mainnet_vector() {
        let addr = BtcAddress::p2wpkh_from_pubkey(&generator_pubkey(), BtcNetwork::Mainnet)
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
        );
    }

    #[test]
    fn p2wpkh_testnet_prefix() {
        let addr = BtcAddress::p2wpkh_from_pubkey(&generator_pubkey(), BtcNetwork::Testnet)
            .unwrap();
        assert!(addr.to_string().starts_with("tb1q"));
        let addr = BtcAddress::p2wpkh_from_pubkey(&generator_pubkey(), BtcNetwork::Regtest)
            .unwrap();
        assert!(addr.to_string().starts_with("bcrt1q"));
    }

    #[test]
    fn p2sh_p2wpkh_structure() {
        let addr = BtcAddress::p2sh_p2wpkh_from_pubkey(&generator_pubkey(), BtcNetwork::Mainnet)
            .unwrap();
        let s = addr.to_string();
        assert!(s.starts_with('3'), "got {s}");

        // The committed hash must be HASH160 of the 22-byte witness program.
        let key_hash = hash160(&generator_pubkey());
        let mut redeem = vec![0x00, 0x14];
        redeem.extend_from_slice(&key_hash);
        match addr {
            BtcAddress::P2sh { hash, .. } => assert_eq!(hash, hash160(&redeem)),
            _ => panic!("expected P2SH"),
        }
    }

    #[test]
    fn p2tr_produces_tweaked_key() {
        let addr =
            BtcAddress::p2tr_from_pubkey(&generator_pubkey(), BtcNetwork::Mainnet).unwrap();
        let s = addr.to_string();
        assert!(s.starts_with("bc1p"), "got {s}");
        match addr {
            BtcAddress::P2tr { output_key, .. } => {
                // The tweak must move the key.
                assert_ne!(&output_key[..], &generator_pubkey()[1..]);
            }
            _ => panic!("expected P2TR"),
        }
    }

    #[test]
    fn taproot_tweak_is_deterministic() {
        let x_only: [u8; 32] = generator_pubkey()[1..].try_into().unwrap();
        assert_eq!(
            tweak_taproot_key(&x_only).unwrap(),
            tweak_taproot_key(&x_only).unwrap()
        );
    }

    #[test]
    fn taproot_tweak_rejects_off_curve_key() {
        // Not every 32-byte string is a valid x-coordinate; this one is not.
        let bad = [0xffu8; 32];
        assert!(tweak_taproot_key(&bad).is_err());
    }

    #[test]
    fn from_string_roundtrip_all_types() {
        let pubkey = generator_pubkey();
        let addresses = [
            BtcAddress::p2pkh_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap(),
            BtcAddress::p2sh_p2wpkh_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap(),
            BtcAddress::p2wpkh_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap(),
            BtcAddress::p2wsh_from_script(&[0x51], BtcNetwork::Mainnet),
            BtcAddress::p2tr_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap(),
        ];
        for addr in addresses {
            let parsed = BtcAddress::from_string(&addr.to_string(), None).unwrap();
            assert_eq!(parsed, addr);
        }
    }

    #[test]
    fn from_string_testnet_roundtrip() {
        let pubkey = generator_pubkey();
        for addr in [
            BtcAddress::p2pkh_from_pubkey(&pubkey, BtcNetwork::Testnet).unwrap(),
            BtcAddress::p2sh_p2wpkh_from_pubkey(&pubkey, BtcNetwork::Testnet).unwrap(),
            BtcAddress::p2wpkh_from_pubkey(&pubkey, BtcNetwork::Testnet).unwrap(),
        ] {
            let parsed =
                BtcAddress::from_string(&addr.to_string(), Some(BtcNetwork::Testnet)).unwrap();
            assert_eq!(parsed, addr);
        }
    }

    #[test]
    fn from_string_network_mismatch() {
        let result = BtcAddress::from_string(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            Some(BtcNetwork::Testnet),
        );
        assert!(matches!(result, Err(BtcError::NetworkMismatch(_))));
    }

    #[test]
    fn from_string_rejects_corrupted_checksum() {
        assert!(BtcAddress::from_string("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMJ", None).is_err());
        assert!(
            BtcAddress::from_string("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5", None).is_err()
        );
    }

    #[test]
    fn from_string_rejects_garbage() {
        assert!(BtcAddress::from_string("", None).is_err());
        assert!(BtcAddress::from_string("hello", None).is_err());
        assert!(BtcAddress::from_string("bc1zzzz", None).is_err());
    }

    #[test]
    fn regtest_base58_resolves_with_expectation() {
        let pubkey = generator_pubkey();
        let addr = BtcAddress::p2pkh_from_pubkey(&pubkey, BtcNetwork::Regtest).unwrap();
        let parsed =
            BtcAddress::from_string(&addr.to_string(), Some(BtcNetwork::Regtest)).unwrap();
        assert_eq!(parsed.network(), BtcNetwork::Regtest);
    }

    #[test]
    fn script_pubkey_templates() {
        let pubkey = generator_pubkey();
        let key_hash = hash160(&pubkey);

        let p2pkh = BtcAddress::p2pkh_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap();
        let spk = p2pkh.script_pubkey();
        assert_eq!(spk.len(), 25);
        assert_eq!(&spk[..3], &[0x76, 0xa9, 0x14]);
        assert_eq!(&spk[3..23], &key_hash);
        assert_eq!(&spk[23..], &[0x88, 0xac]);

        let p2wpkh = BtcAddress::p2wpkh_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap();
        let spk = p2wpkh.script_pubkey();
        assert_eq!(spk.len(), 22);
        assert_eq!(&spk[..2], &[0x00, 0x14]);

        let p2tr = BtcAddress::p2tr_from_pubkey(&pubkey, BtcNetwork::Mainnet).unwrap();
        let spk = p2tr.script_pubkey();
        assert_eq!(spk.len(), 34);
        assert_eq!(&spk[..2], &[0x51, 0x20]);
    }

    #[test]
    fn from_pubkey_dispatch() {
        let pubkey = generator_pubkey();
        for t in [
            BtcAddressType::P2pkh,
            BtcAddressType::P2shP2wpkh,
            BtcAddressType::P2wpkh,
            BtcAddressType::P2tr,
        ] {
            let addr = BtcAddress::from_pubkey(&pubkey, t, BtcNetwork::Mainnet).unwrap();
            assert_eq!(addr.address_type(), t);
        }
        assert!(
            BtcAddress::from_pubkey(&pubkey, BtcAddressType::P2wsh, BtcNetwork::Mainnet).is_err()
        );
    }

    #[test]
    fn rejects_uncompressed_key() {
        let uncompressed = hex::decode(
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        )
        .unwrap();
        assert!(BtcAddress::p2wpkh_from_pubkey(&uncompressed, BtcNetwork::Mainnet).is_err());
    }
}
