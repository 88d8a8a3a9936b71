//! Bitcoin transaction serialization and signing.
//!
//! Wire layout (consensus serialization):
//!
//! ```text
//! version        i32 LE
//! [marker 0x00, flag 0x01]          (only when witness data is serialized)
//! in_count       CompactSize
//! inputs         prev_txid[32] | vout u32 LE | script_sig | sequence u32 LE
//! out_count      CompactSize
//! outputs        value u64 LE | script_pubkey
//! [witness stacks, one per input]   (only when witness data is serialized)
//! lock_time      u32 LE
//! ```
//!
//! Signing covers the two key-spend templates: legacy P2PKH (canonical
//! pre-SegWit sighash) and P2WPKH (BIP-143, with the real previous output
//! value per input). Each input carries its previous output's value and
//! scriptPubKey so the right sighash and script template can be chosen per
//! input.

use crypto_utils::hash::{hash160, sha256d};
use crypto_utils::secp256k1::{Secp256k1Signature, Secp256k1Signer};

use crate::address::BtcAddress;
use crate::error::BtcError;
use crate::network::BtcNetwork;

/// SIGHASH_ALL, the only sighash type produced here.
pub const SIGHASH_ALL: u32 = 0x01;

/// A transaction input, including the previous output data needed for
/// signing.
#[derive(Debug, Clone)]
pub struct TxInput {
    /// Previous transaction id in wire order (reversed display hex).
    pub prev_txid: [u8; 32],
    pub prev_vout: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Witness stack; empty for non-SegWit inputs.
    pub witness: Vec<Vec<u8>>,
    /// Value of the previous output in satoshis (BIP-143 commits to it).
    pub prev_amount: u64,
    /// scriptPubKey of the previous output; selects the signing template.
    pub prev_script_pubkey: Vec<u8>,
}

impl TxInput {
    /// Builds an unsigned input from a display-order (big-endian) txid hex
    /// string.
    pub fn new(
        txid_hex: &str,
        vout: u32,
        prev_amount: u64,
        prev_script_pubkey: Vec<u8>,
    ) -> Result<Self, BtcError> {
        Ok(Self {
            prev_txid: txid_from_hex(txid_hex)?,
            prev_vout: vout,
            script_sig: Vec::new(),
            sequence: 0xffff_ffff,
            witness: Vec::new(),
            prev_amount,
            prev_script_pubkey,
        })
    }
}

/// A transaction output.
#[derive(Debug, Clone)]
pub struct TxOutput {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

/// A Bitcoin transaction (unsigned or signed).
#[derive(Debug, Clone)]
pub struct BtcTransaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

/// A signed transaction with its identifying hashes.
#[derive(Debug, Clone)]
pub struct SignedBtcTransaction {
    pub tx: BtcTransaction,
    /// Address form of the signing key for the first input's template.
    pub from: String,
    /// Broadcast bytes (witness serialization when any input has one).
    pub raw: Vec<u8>,
    /// Double SHA-256 of the witness-stripped serialization.
    pub txid: [u8; 32],
    /// Double SHA-256 of the full serialization; equals `txid` without
    /// witnesses.
    pub wtxid: [u8; 32],
    pub vsize: usize,
}

/// Parses a display-order txid into wire order.
pub fn txid_from_hex(s: &str) -> Result<[u8; 32], BtcError> {
    let mut bytes: Vec<u8> = hex::decode(s)
        .map_err(|_| BtcError::TransactionBuildError("txid is not hex".into()))?;
    if bytes.len() != 32 {
        return Err(BtcError::TransactionBuildError(format!(
            "txid must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    bytes.reverse();
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Renders a wire-order hash in display order.
pub fn txid_to_hex(txid: &[u8; 32]) -> String {
    let mut bytes = *txid;
    bytes.reverse();
    hex::encode(bytes)
}

/// Appends a CompactSize integer.
pub fn write_varint(buf: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => buf.push(value as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

impl BtcTransaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 2,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    /// Consensus serialization. Witness data (with the 0x00/0x01
    /// marker/flag pair) is included only when requested and present.
    pub fn serialize(&self, include_witness: bool) -> Vec<u8> {
        let witness = include_witness && self.has_witness();
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(&self.version.to_le_bytes());
        if witness {
            buf.push(0x00);
            buf.push(0x01);
        }

        write_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(&input.prev_txid);
            buf.extend_from_slice(&input.prev_vout.to_le_bytes());
            write_var_bytes(&mut buf, &input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(&mut buf, &output.script_pubkey);
        }

        if witness {
            for input in &self.inputs {
                write_varint(&mut buf, input.witness.len() as u64);
                for item in &input.witness {
                    write_var_bytes(&mut buf, item);
                }
            }
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Transaction id: double SHA-256 of the witness-stripped encoding.
    pub fn txid(&self) -> [u8; 32] {
        sha256d(&self.serialize(false))
    }

    /// Witness transaction id; equals [`Self::txid`] for non-SegWit
    /// transactions.
    pub fn wtxid(&self) -> [u8; 32] {
        sha256d(&self.serialize(true))
    }

    /// BIP-141 weight: 3x the stripped size plus the total size.
    pub fn weight(&self) -> usize {
        let base = self.serialize(false).len();
        let total = self.serialize(true).len();
        base * 3 + total
    }

    /// Virtual size: weight divided by four, rounded up.
    pub fn vsize(&self) -> usize {
        (self.weight() + 3) / 4
    }
}

/// Canonical legacy sighash: the signing input's scriptSig is replaced with
/// `script_code`, every other scriptSig is emptied, and the 4-byte sighash
/// type is appended before double SHA-256.
pub fn legacy_sighash(
    tx: &BtcTransaction,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
) -> Result<[u8; 32], BtcError> {
    if input_index >= tx.inputs.len() {
        return Err(BtcError::SigningError(format!(
            "input index {input_index} out of range"
        )));
    }

    let mut preimage_tx = tx.clone();
    for (i, input) in preimage_tx.inputs.iter_mut().enumerate() {
        input.script_sig = if i == input_index {
            script_code.to_vec()
        } else {
            Vec::new()
        };
        input.witness.clear();
    }

    let mut preimage = preimage_tx.serialize(false);
    preimage.extend_from_slice(&sighash_type.to_le_bytes());
    Ok(sha256d(&preimage))
}

/// BIP-143 sighash for SegWit v0 inputs.
pub fn bip143_sighash(
    tx: &BtcTransaction,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    sighash_type: u32,
) -> Result<[u8; 32], BtcError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        BtcError::SigningError(format!("input index {input_index} out of range"))
    })?;

    let mut prevouts = Vec::with_capacity(tx.inputs.len() * 36);
    let mut sequences = Vec::with_capacity(tx.inputs.len() * 4);
    for i in &tx.inputs {
        prevouts.extend_from_slice(&i.prev_txid);
        prevouts.extend_from_slice(&i.prev_vout.to_le_bytes());
        sequences.extend_from_slice(&i.sequence.to_le_bytes());
    }
    let hash_prevouts = sha256d(&prevouts);
    let hash_sequence = sha256d(&sequences);

    let mut outputs = Vec::with_capacity(tx.outputs.len() * 34);
    for o in &tx.outputs {
        outputs.extend_from_slice(&o.value.to_le_bytes());
        write_var_bytes(&mut outputs, &o.script_pubkey);
    }
    let hash_outputs = sha256d(&outputs);

    let mut preimage = Vec::with_capacity(160 + script_code.len());
    preimage.extend_from_slice(&tx.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);
    preimage.extend_from_slice(&input.prev_txid);
    preimage.extend_from_slice(&input.prev_vout.to_le_bytes());
    write_var_bytes(&mut preimage, script_code);
    preimage.extend_from_slice(&amount.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs);
    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&sighash_type.to_le_bytes());

    Ok(sha256d(&preimage))
}

/// DER-encodes `(r, s)`: integers are stripped of leading zeros and given a
/// 0x00 pad byte when their high bit is set.
pub fn der_encode_signature(sig: &Secp256k1Signature) -> Vec<u8> {
    fn push_int(out: &mut Vec<u8>, bytes: &[u8; 32]) {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(31);
        let mut int_bytes = bytes[start..].to_vec();
        if int_bytes[0] & 0x80 != 0 {
            int_bytes.insert(0, 0x00);
        }
        out.push(0x02);
        out.push(int_bytes.len() as u8);
        out.extend_from_slice(&int_bytes);
    }

    let mut body = Vec::with_capacity(70);
    push_int(&mut body, &sig.r);
    push_int(&mut body, &sig.s);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x30);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

/// DER signature with the SIGHASH_ALL byte appended, as placed in scriptSig
/// or witness stacks.
pub fn signature_with_sighash(sig: &Secp256k1Signature) -> Vec<u8> {
    let mut out = der_encode_signature(sig);
    out.push(SIGHASH_ALL as u8);
    out
}

/// The P2PKH script template over a 20-byte key hash; doubles as the
/// BIP-143 scriptCode for P2WPKH inputs.
pub fn p2pkh_script_code(key_hash: &[u8; 20]) -> Vec<u8> {
    let mut s = Vec::with_capacity(25);
    s.extend_from_slice(&[0x76, 0xa9, 0x14]);
    s.extend_from_slice(key_hash);
    s.extend_from_slice(&[0x88, 0xac]);
    s
}

fn is_p2pkh(script: &[u8]) -> bool {
    script.len() == 25
        && script[0] == 0x76
        && script[1] == 0xa9
        && script[2] == 0x14
        && script[23] == 0x88
        && script[24] == 0xac
}

fn is_p2wpkh(script: &[u8]) -> bool {
    script.len() == 22 && script[0] == 0x00 && script[1] == 0x14
}

/// Signs one input in place, choosing the template from the previous
/// output's scriptPubKey. Only P2PKH and P2WPKH key spends are supported.
pub fn sign_input(
    tx: &mut BtcTransaction,
    input_index: usize,
    signer: &Secp256k1Signer,
) -> Result<(), BtcError> {
    let prev_script = tx
        .inputs
        .get(input_index)
        .ok_or_else(|| BtcError::SigningError(format!("input index {input_index} out of range")))?
        .prev_script_pubkey
        .clone();

    let pubkey = signer.public_key(true)?;

    if is_p2wpkh(&prev_script) {
        let mut program = [0u8; 20];
        program.copy_from_slice(&prev_script[2..22]);
        if hash160(&pubkey) != program {
            return Err(BtcError::SigningError(
                "signing key does not match the witness program".into(),
            ));
        }
        let script_code = p2pkh_script_code(&program);
        let amount = tx.inputs[input_index].prev_amount;
        let sighash = bip143_sighash(tx, input_index, &script_code, amount, SIGHASH_ALL)?;
        let sig = signer.sign(&sighash)?;

        let input = &mut tx.inputs[input_index];
        input.script_sig.clear();
        input.witness = vec![signature_with_sighash(&sig), pubkey];
        Ok(())
    } else if is_p2pkh(&prev_script) {
        let mut key_hash = [0u8; 20];
        key_hash.copy_from_slice(&prev_script[3..23]);
        if hash160(&pubkey) != key_hash {
            return Err(BtcError::SigningError(
                "signing key does not match the output key hash".into(),
            ));
        }
        let sighash = legacy_sighash(tx, input_index, &prev_script, SIGHASH_ALL)?;
        let sig = signer.sign(&sighash)?;
        let sig_bytes = signature_with_sighash(&sig);

        let mut script_sig = Vec::with_capacity(sig_bytes.len() + pubkey.len() + 2);
        script_sig.push(sig_bytes.len() as u8);
        script_sig.extend_from_slice(&sig_bytes);
        script_sig.push(pubkey.len() as u8);
        script_sig.extend_from_slice(&pubkey);

        let input = &mut tx.inputs[input_index];
        input.script_sig = script_sig;
        input.witness.clear();
        Ok(())
    } else {
        Err(BtcError::UnsupportedScript(format!(
            "cannot sign scriptPubKey {}",
            hex::encode(&prev_script)
        )))
    }
}

/// Signs every input with the same key and assembles the broadcast form.
pub fn sign_transaction(
    tx: &BtcTransaction,
    signer: &Secp256k1Signer,
    network: BtcNetwork,
) -> Result<SignedBtcTransaction, BtcError> {
    if tx.inputs.is_empty() {
        return Err(BtcError::TransactionBuildError("no inputs".into()));
    }

    let mut signed = tx.clone();
    for index in 0..signed.inputs.len() {
        sign_input(&mut signed, index, signer)?;
    }

    let pubkey = signer.public_key(true)?;
    let from = if is_p2pkh(&tx.inputs[0].prev_script_pubkey) {
        BtcAddress::p2pkh_from_pubkey(&pubkey, network)?
    } else {
        BtcAddress::p2wpkh_from_pubkey(&pubkey, network)?
    };

    let raw = signed.serialize(true);
    let txid = signed.txid();
    let wtxid = signed.wtxid();
    let vsize = signed.vsize();

    Ok(SignedBtcTransaction {
        tx: signed,
        from: from.to_string(),
        raw,
        txid,
        wtxid,
        vsize,
    })
}
