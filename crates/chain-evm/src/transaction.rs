//! Legacy (EIP-155) transaction encoding and signing.
//!
//! Wire layout:
//!
//! ```text
//! sighash preimage (chain_id > 0):
//!   rlp([nonce, gas_price, gas_limit, to, value, data, chain_id, 0, 0])
//! signed transaction:
//!   rlp([nonce, gas_price, gas_limit, to, value, data, v, r, s])
//!     where v = 35 + 2 * chain_id + recovery_id
//! txid = keccak256(signed rlp)
//! ```
//!
//! With `chain_id == 0` the preimage is the six-field pre-EIP-155 list and
//! `v = 27 + recovery_id`.

use crypto_utils::hash::keccak256;
use crypto_utils::secp256k1::{self, Secp256k1Signer};

use crate::address::EvmAddress;
use crate::error::EvmError;
use crate::rlp;

/// An unsigned legacy EVM transaction.
#[derive(Debug, Clone)]
pub struct EvmTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<EvmAddress>,
    /// Transfer value in wei.
    pub value: u128,
    /// Calldata (empty for plain transfers).
    pub data: Vec<u8>,
    /// EIP-155 chain id; 0 disables replay protection.
    pub chain_id: u64,
}

/// A signed legacy EVM transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedEvmTransaction {
    pub tx: EvmTransaction,
    /// EIP-55 checksummed sender address.
    pub from: String,
    /// RLP-encoded signed transaction bytes.
    pub raw: Vec<u8>,
    /// Keccak-256 of `raw`.
    pub tx_hash: [u8; 32],
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Builds an unsigned native-value transfer.
#[allow(clippy::too_many_arguments)]
pub fn build_transfer(
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: &str,
    value_wei: u128,
    data: Vec<u8>,
) -> Result<EvmTransaction, EvmError> {
    let to = EvmAddress::parse(to)?;
    Ok(EvmTransaction {
        nonce,
        gas_price,
        gas_limit,
        to: Some(to),
        value: value_wei,
        data,
        chain_id,
    })
}

fn encode_common_fields(tx: &EvmTransaction) -> Vec<Vec<u8>> {
    let to_bytes: &[u8] = match &tx.to {
        Some(addr) => addr.as_bytes(),
        None => &[],
    };
    vec![
        rlp::encode_uint(tx.nonce.into()),
        rlp::encode_uint(tx.gas_price),
        rlp::encode_uint(tx.gas_limit.into()),
        rlp::encode_bytes(to_bytes),
        rlp::encode_uint(tx.value),
        rlp::encode_bytes(&tx.data),
    ]
}

/// RLP preimage whose Keccak-256 is signed.
pub fn encode_unsigned(tx: &EvmTransaction) -> Vec<u8> {
    let mut items = encode_common_fields(tx);
    if tx.chain_id > 0 {
        items.push(rlp::encode_uint(tx.chain_id.into()));
        items.push(rlp::encode_uint(0));
        items.push(rlp::encode_uint(0));
    }
    rlp::encode_list(&items)
}

/// The 32-byte signing hash of the transaction.
pub fn sighash(tx: &EvmTransaction) -> [u8; 32] {
    keccak256(&encode_unsigned(tx))
}

/// RLP encoding of the signed transaction.
pub fn encode_signed(tx: &EvmTransaction, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut items = encode_common_fields(tx);
    items.push(rlp::encode_uint(v.into()));
    items.push(rlp::encode_integer_bytes(r));
    items.push(rlp::encode_integer_bytes(s));
    rlp::encode_list(&items)
}

/// Signs the transaction and assembles the broadcastable RLP.
pub fn sign_transaction(
    tx: &EvmTransaction,
    signer: &Secp256k1Signer,
) -> Result<SignedEvmTransaction, EvmError> {
    let hash = sighash(tx);
    let sig = signer.sign(&hash)?;

    let v = if tx.chain_id > 0 {
        sig.to_eip155(tx.chain_id)
    } else {
        u64::from(sig.to_ethereum_v())
    };

    let raw = encode_signed(tx, v, &sig.r, &sig.s);
    let tx_hash = keccak256(&raw);

    let pubkey = signer.public_key(false)?;
    let from = EvmAddress::from_public_key(&pubkey)?.to_checksum_string();

    Ok(SignedEvmTransaction {
        tx: tx.clone(),
        from,
        raw,
        tx_hash,
        v,
        r: sig.r,
        s: sig.s,
    })
}

impl SignedEvmTransaction {
    /// Recovers the sender address from the embedded signature.
    pub fn recover_from(&self) -> Result<EvmAddress, EvmError> {
        let hash = sighash(&self.tx);
        let recovery_id = recovery_id_from_v(self.v, self.tx.chain_id)?;
        let pubkey = secp256k1::recover_public_key(&hash, &self.r, &self.s, recovery_id)
            .ok_or_else(|| EvmError::SigningError("public key recovery failed".into()))?;
        EvmAddress::from_public_key(&pubkey)
    }
}

fn recovery_id_from_v(v: u64, chain_id: u64) -> Result<u8, EvmError> {
    let recovery_id = if v >= 35 {
        let base = 35 + 2 * chain_id;
        v.checked_sub(base)
            .ok_or_else(|| EvmError::SigningError(format!("v {v} below chain id base")))?
    } else if v >= 27 {
        v - 27
    } else {
        v
    };
    if recovery_id > 3 {
        return Err(EvmError::SigningError(format!(
            "recovery id {recovery_id} out of range"
        )));
    }
    Ok(recovery_id as u8)
}

/// EIP-191 `personal_sign` hash:
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut payload = Vec::with_capacity(prefix.len() + message.len());
    payload.extend_from_slice(prefix.as_bytes());
    payload.extend_from_slice(message);
    keccak256(&payload)
}

/// Signs a message with EIP-191, returning the 65-byte `r || s || v`
/// signature with `v` in {27, 28}.
pub fn sign_message(message: &[u8], signer: &Secp256k1Signer) -> Result<Vec<u8>, EvmError> {
    let hash = personal_message_hash(message);
    let sig = signer.sign(&hash)?;
    let mut out = Vec::with_capacity(65);
    out.extend_from_slice(&sig.r);
    out.extend_from_slice(&sig.s);
    out.push(sig.to_ethereum_v());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example from the EIP-155 specification.
    fn eip155_example_tx() -> EvmTransaction {
        build_transfer(
            1,
            9,
            20_000_000_000,
            21_000,
            "0x3535353535353535353535353535353535353535",
            1_000_000_000_000_000_000,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn eip155_example_sighash() {
        let tx = eip155_example_tx();
        assert_eq!(
            hex::encode(sighash(&tx)),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn eip155_example_signed_raw() {
        let tx = eip155_example_tx();
        let signer = Secp256k1Signer::new(&[0x46u8; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        assert_eq!(signed.v, 37);
        assert_eq!(
            hex::encode(&signed.raw),
            "f86c098504a817c800825208943535353535353535353535353535353535353535\
             880de0b6b3a764000080\
             25\
             a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276\
             a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(
            signed.from.to_lowercase(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }

    #[test]
    fn txid_is_keccak_of_raw() {
        let tx = eip155_example_tx();
        let signer = Secp256k1Signer::new(&[0x46u8; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();
        assert_eq!(signed.tx_hash, keccak256(&signed.raw));
    }

    #[test]
    fn recover_from_matches_signer() {
        let tx = eip155_example_tx();
        let signer = Secp256k1Signer::new(&[0x46u8; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        let recovered = signed.recover_from().unwrap();
        assert_eq!(recovered.to_checksum_string(), signed.from);
    }

    #[test]
    fn pre_eip155_uses_six_field_preimage() {
        let mut tx = eip155_example_tx();
        tx.chain_id = 0;
        let signer = Secp256k1Signer::new(&[0x46u8; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();
        assert!(signed.v == 27 || signed.v == 28);
        assert_eq!(signed.recover_from().unwrap().to_checksum_string(), signed.from);
    }

    #[test]
    fn contract_creation_encodes_empty_to() {
        let tx = EvmTransaction {
            nonce: 0,
            gas_price: 1,
            gas_limit: 100_000,
            to: None,
            value: 0,
            data: vec![0x60, 0x00],
            chain_id: 1,
        };
        let encoded = encode_unsigned(&tx);
        // The `to` slot must be the empty string marker 0x80 (after the three
        // integer fields).
        assert!(encoded.contains(&0x80));
        let signer = Secp256k1Signer::new(&[0x11u8; 32]).unwrap();
        assert!(sign_transaction(&tx, &signer).is_ok());
    }

    #[test]
    fn different_chain_ids_change_sighash() {
        let mut a = eip155_example_tx();
        let mut b = eip155_example_tx();
        a.chain_id = 1;
        b.chain_id = 137;
        assert_ne!(sighash(&a), sighash(&b));
    }

    #[test]
    fn build_transfer_rejects_bad_address() {
        assert!(build_transfer(1, 0, 1, 21_000, "0x1234", 1, vec![]).is_err());
    }

    #[test]
    fn personal_sign_roundtrip() {
        let signer = Secp256k1Signer::new(&[0x42u8; 32]).unwrap();
        let message = b"hello world";
        let sig = sign_message(message, &signer).unwrap();
        assert_eq!(sig.len(), 65);
        assert!(sig[64] == 27 || sig[64] == 28);

        let hash = personal_message_hash(message);
        let r: [u8; 32] = sig[..32].try_into().unwrap();
        let s: [u8; 32] = sig[32..64].try_into().unwrap();
        let recovered =
            crypto_utils::secp256k1::recover_public_key(&hash, &r, &s, sig[64] - 27).unwrap();
        assert_eq!(
            recovered.to_vec(),
            signer.public_key(false).unwrap()
        );
    }
}
