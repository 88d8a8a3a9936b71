//! Solana transaction message compilation, wire serialization, and signing.
//!
//! The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        program_id_index u8
//!                           | compact-u16 account indices
//!                           | compact-u16 data
//! ```
//!
//! Message compilation collects the fee payer, every instruction account,
//! and every program id; deduplicates by key (permission bits OR together);
//! and orders them writable-signers, readonly-signers, writable-non-signers,
//! readonly-non-signers. The fee payer is always index 0, and ties inside a
//! group break by lexicographic key order, so the layout is a pure function
//! of the inputs.

use crypto_utils::ed25519::Ed25519Signer;

use crate::error::SolError;

/// The System Program public key: 32 zero bytes
/// (`11111111111111111111111111111111`).
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encodes a `u16` in the compact-u16 (shortvec) format: 7-bit groups,
/// little-endian, continuation bit 0x80.
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);
    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }
    out
}

/// Decodes a compact-u16, returning `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError("unexpected end of compact-u16".into())
        })?;
        consumed += 1;
        value |= u32::from(byte & 0x7f) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
        if consumed >= 3 {
            break;
        }
    }

    if value > u32::from(u16::MAX) {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }
    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Transaction model
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction before compilation.
#[derive(Debug, Clone)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// An uncompiled Solana transaction.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    pub recent_blockhash: [u8; 32],
    /// Pays the fee; always the first signer and account index 0.
    pub fee_payer: [u8; 32],
    pub instructions: Vec<SolInstruction>,
}

/// An instruction whose account references have been replaced by indices
/// into the message's account table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled message: the bytes that get signed.
#[derive(Debug, Clone)]
pub struct SolMessage {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    pub account_keys: Vec<[u8; 32]>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

/// A signed transaction in wire form.
#[derive(Debug, Clone)]
pub struct SignedSolTransaction {
    pub message: SolMessage,
    /// Base58 fee-payer address.
    pub from: String,
    /// `compact_array(signatures) || message` wire bytes.
    pub raw: Vec<u8>,
    /// One 64-byte slot per required signer; unsigned slots are zero.
    pub signatures: Vec<[u8; 64]>,
    /// The fee payer's signature, Solana's transaction identifier.
    pub tx_hash: [u8; 64],
}

// ---------------------------------------------------------------------------
// Message compilation
// ---------------------------------------------------------------------------

struct AccountEntry {
    pubkey: [u8; 32],
    is_signer: bool,
    is_writable: bool,
}

fn permission_rank(e: &AccountEntry) -> u8 {
    match (e.is_signer, e.is_writable) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}

/// Compiles a transaction into its canonical message.
pub fn compile_message(tx: &SolTransaction) -> Result<SolMessage, SolError> {
    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(tx.fee_payer, true, true);
    for ix in &tx.instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        // Program ids are read-only non-signers.
        upsert(ix.program_id, false, false);
    }

    // Group order, with lexicographic keys inside each group so the layout
    // does not depend on instruction order.
    entries.sort_by(|a, b| {
        permission_rank(a)
            .cmp(&permission_rank(b))
            .then_with(|| a.pubkey.cmp(&b.pubkey))
    });

    // Fee payer is pinned to index 0 inside the first group.
    let pos = entries
        .iter()
        .position(|e| e.pubkey == tx.fee_payer)
        .ok_or_else(|| SolError::TransactionBuildError("fee payer missing".into()))?;
    let fee_payer_entry = entries.remove(pos);
    entries.insert(0, fee_payer_entry);

    let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &[u8; 32]| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError("account not collected".into()))
    };

    let mut compiled = Vec::with_capacity(tx.instructions.len());
    for ix in &tx.instructions {
        let program_id_index = index_of(&ix.program_id)?;
        let mut account_indices = Vec::with_capacity(ix.accounts.len());
        for meta in &ix.accounts {
            account_indices.push(index_of(&meta.pubkey)?);
        }
        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolMessage {
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        account_keys,
        recent_blockhash: tx.recent_blockhash,
        instructions: compiled,
    })
}

impl SolMessage {
    /// Serializes the message (the signed bytes).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + 32 * self.account_keys.len());

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&encode_compact_u16(self.account_keys.len() as u16));
        for key in &self.account_keys {
            buf.extend_from_slice(key);
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&encode_compact_u16(self.instructions.len() as u16));
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
            buf.extend_from_slice(&ix.account_indices);
            buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
            buf.extend_from_slice(&ix.data);
        }

        buf
    }
}

// ---------------------------------------------------------------------------
// Building and signing
// ---------------------------------------------------------------------------

/// Builds a native SOL transfer via the System Program.
pub fn build_sol_transfer(
    from_pubkey: &[u8; 32],
    to_pubkey: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuildError(
            "lamports must be > 0".into(),
        ));
    }

    // Instruction data: u32 LE index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(SolTransaction {
        recent_blockhash: *recent_blockhash,
        fee_payer: *from_pubkey,
        instructions: vec![SolInstruction {
            program_id: SYSTEM_PROGRAM_ID,
            accounts: vec![
                SolAccountMeta {
                    pubkey: *from_pubkey,
                    is_signer: true,
                    is_writable: true,
                },
                SolAccountMeta {
                    pubkey: *to_pubkey,
                    is_signer: false,
                    is_writable: true,
                },
            ],
            data,
        }],
    })
}

/// Signs the transaction with the fee payer's key and assembles the wire
/// bytes. Other required signature slots, if any, are left zeroed for
/// later counter-signing.
pub fn sign_transaction(
    tx: &SolTransaction,
    signer: &Ed25519Signer,
) -> Result<SignedSolTransaction, SolError> {
    let message = compile_message(tx)?;
    let message_bytes = message.serialize();

    let our_pubkey = signer.public_key()?;
    let num_signers = message.num_required_signatures as usize;
    let slot = message.account_keys[..num_signers]
        .iter()
        .position(|k| *k == our_pubkey)
        .ok_or_else(|| {
            SolError::SigningError("signing key is not a required signer".into())
        })?;

    let signature = signer.sign(&message_bytes)?;

    let mut signatures = vec![[0u8; 64]; num_signers];
    signatures[slot] = signature;

    let fee_payer_sig = signatures[0];

    let mut raw =
        Vec::with_capacity(3 + 64 * num_signers + message_bytes.len());
    raw.extend_from_slice(&encode_compact_u16(num_signers as u16));
    for sig in &signatures {
        raw.extend_from_slice(sig);
    }
    raw.extend_from_slice(&message_bytes);

    Ok(SignedSolTransaction {
        message,
        from: crate::address::SolanaAddress::new(tx.fee_payer).to_string(),
        raw,
        signatures,
        tx_hash: fee_payer_sig,
    })
}

/// Signs a pre-built wire-format transaction in place.
///
/// Locates our signature slot among the required signers, signs the message
/// bytes, and overwrites that slot. Fails when the key is not a required
/// signer or the wire bytes are malformed.
pub fn sign_raw_transaction(
    signer: &Ed25519Signer,
    raw_tx: &[u8],
) -> Result<Vec<u8>, SolError> {
    let our_pubkey = signer.public_key()?;

    let (num_sigs, prefix_len) = decode_compact_u16(raw_tx)?;
    if num_sigs == 0 {
        return Err(SolError::TransactionBuildError(
            "transaction has zero signatures".into(),
        ));
    }

    let sigs_end = prefix_len + usize::from(num_sigs) * 64;
    if sigs_end > raw_tx.len() {
        return Err(SolError::SerializationError(
            "signature slots exceed transaction length".into(),
        ));
    }
    let message_bytes = &raw_tx[sigs_end..];
    if message_bytes.len() < 4 {
        return Err(SolError::SerializationError("message too short".into()));
    }

    let num_required = usize::from(message_bytes[0]);
    let (num_accounts, accounts_prefix) = decode_compact_u16(&message_bytes[3..])?;
    let accounts_start = 3 + accounts_prefix;
    let accounts_end = accounts_start + usize::from(num_accounts) * 32;
    if accounts_end > message_bytes.len() {
        return Err(SolError::SerializationError(
            "message too short for account keys".into(),
        ));
    }

    let slot = (0..num_required.min(usize::from(num_accounts)))
        .find(|i| {
            let start = accounts_start + i * 32;
            message_bytes[start..start + 32] == our_pubkey
        })
        .ok_or_else(|| {
            SolError::SigningError("signing key not found among transaction signers".into())
        })?;

    let signature = signer.sign(message_bytes)?;

    let mut signed = raw_tx.to_vec();
    let offset = prefix_len + slot * 64;
    signed[offset..offset + 64].copy_from_slice(&signature);
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_utils::ed25519;

    fn signer_with_pubkey(seed: [u8; 32]) -> (Ed25519Signer, [u8; 32]) {
        let signer = Ed25519Signer::new(&seed).unwrap();
        let pubkey = signer.public_key().unwrap();
        (signer, pubkey)
    }

    // -- compact-u16 --------------------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(0x80), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn compact_u16_roundtrip() {
        for value in [0u16, 1, 127, 128, 255, 256, 16383, 16384, 65535] {
            let encoded = encode_compact_u16(value);
            let (decoded, len) = decode_compact_u16(&encoded).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(len, encoded.len());
        }
    }

    #[test]
    fn compact_u16_decode_rejects_truncation() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
    }

    // -- compilation --------------------------------------------------------

    #[test]
    fn transfer_compiles_with_fee_payer_first() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let tx = build_sol_transfer(&from, &to, 1000, &[0xaa; 32]).unwrap();
        let msg = compile_message(&tx).unwrap();

        assert_eq!(msg.account_keys.len(), 3);
        assert_eq!(msg.account_keys[0], from);
        assert_eq!(msg.num_required_signatures, 1);
        assert_eq!(msg.num_readonly_signed, 0);
        assert_eq!(msg.num_readonly_unsigned, 1);

        let ix = &msg.instructions[0];
        let sys_idx = msg
            .account_keys
            .iter()
            .position(|k| *k == SYSTEM_PROGRAM_ID)
            .unwrap() as u8;
        assert_eq!(ix.program_id_index, sys_idx);
        assert_eq!(ix.account_indices, vec![0, 1]);
    }

    #[test]
    fn self_transfer_deduplicates() {
        let key = [7u8; 32];
        let tx = build_sol_transfer(&key, &key, 5, &[0u8; 32]).unwrap();
        let msg = compile_message(&tx).unwrap();
        assert_eq!(msg.account_keys.len(), 2);
        assert_eq!(msg.num_required_signatures, 1);
    }

    #[test]
    fn account_order_is_lexicographic_within_groups() {
        let fee_payer = [9u8; 32];
        let writable_b = [5u8; 32];
        let writable_a = [3u8; 32];
        let tx = SolTransaction {
            recent_blockhash: [0u8; 32],
            fee_payer,
            instructions: vec![SolInstruction {
                program_id: [0xeeu8; 32],
                accounts: vec![
                    SolAccountMeta {
                        pubkey: writable_b,
                        is_signer: false,
                        is_writable: true,
                    },
                    SolAccountMeta {
                        pubkey: writable_a,
                        is_signer: false,
                        is_writable: true,
                    },
                ],
                data: vec![],
            }],
        };
        let msg = compile_message(&tx).unwrap();
        // Fee payer first, then the writable non-signers in key order, then
        // the program id.
        assert_eq!(msg.account_keys, vec![fee_payer, writable_a, writable_b, [0xeeu8; 32]]);

        // Swapping the metas must not change the layout.
        let mut swapped = tx.clone();
        swapped.instructions[0].accounts.reverse();
        let msg2 = compile_message(&swapped).unwrap();
        assert_eq!(msg2.account_keys, msg.account_keys);
    }

    #[test]
    fn permission_bits_merge_on_duplicates() {
        let fee_payer = [1u8; 32];
        let dual = [2u8; 32];
        let tx = SolTransaction {
            recent_blockhash: [0u8; 32],
            fee_payer,
            instructions: vec![SolInstruction {
                program_id: [0xeeu8; 32],
                accounts: vec![
                    SolAccountMeta {
                        pubkey: dual,
                        is_signer: false,
                        is_writable: true,
                    },
                    SolAccountMeta {
                        pubkey: dual,
                        is_signer: true,
                        is_writable: false,
                    },
                ],
                data: vec![],
            }],
        };
        let msg = compile_message(&tx).unwrap();
        // Merged into one signer+writable entry.
        assert_eq!(msg.num_required_signatures, 2);
        assert_eq!(msg.account_keys[1], dual);
    }

    // -- serialization ------------------------------------------------------

    #[test]
    fn message_layout() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let blockhash = [0xccu8; 32];
        let tx = build_sol_transfer(&from, &to, 500, &blockhash).unwrap();
        let msg = compile_message(&tx).unwrap();
        let bytes = msg.serialize();

        assert_eq!(bytes[0], msg.num_required_signatures);
        assert_eq!(bytes[1], msg.num_readonly_signed);
        assert_eq!(bytes[2], msg.num_readonly_unsigned);

        // Blockhash sits after header + compact len + keys.
        let n = msg.account_keys.len();
        let offset = 3 + encode_compact_u16(n as u16).len() + 32 * n;
        assert_eq!(&bytes[offset..offset + 32], &blockhash);
    }

    #[test]
    fn zero_instruction_transaction_serializes() {
        let tx = SolTransaction {
            recent_blockhash: [0u8; 32],
            fee_payer: [1u8; 32],
            instructions: vec![],
        };
        let msg = compile_message(&tx).unwrap();
        let bytes = msg.serialize();
        // header(3) + count(1) + key(32) + blockhash(32) + ix count(1)
        assert_eq!(bytes.len(), 69);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    // -- signing ------------------------------------------------------------

    #[test]
    fn sign_produces_verifiable_wire_bytes() {
        let (signer, from) = signer_with_pubkey([0x42u8; 32]);
        let tx = build_sol_transfer(&from, &[0xbb; 32], 1_000_000, &[0xcc; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        // compact-u16(1) then the signature then the message.
        assert_eq!(signed.raw[0], 0x01);
        let sig = &signed.raw[1..65];
        let message = &signed.raw[65..];
        assert!(ed25519::verify(message, sig, &from));
        assert_eq!(signed.tx_hash.as_slice(), sig);
        assert_eq!(signed.signatures.len(), 1);
    }

    #[test]
    fn tx_hash_is_fee_payer_signature_base58_addressable() {
        let (signer, from) = signer_with_pubkey([0x55u8; 32]);
        let tx = build_sol_transfer(&from, &[0x77; 32], 42, &[0x99; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();
        assert_eq!(signed.from, crate::address::SolanaAddress::new(from).to_string());
        assert_eq!(signed.tx_hash, signed.signatures[0]);
    }

    #[test]
    fn signing_is_deterministic() {
        let (signer, from) = signer_with_pubkey([0x55u8; 32]);
        let tx = build_sol_transfer(&from, &[0x77; 32], 42, &[0x99; 32]).unwrap();
        let a = sign_transaction(&tx, &signer).unwrap();
        let b = sign_transaction(&tx, &signer).unwrap();
        assert_eq!(a.raw, b.raw);
    }

    #[test]
    fn sign_rejects_non_signer_key() {
        let (_, from) = signer_with_pubkey([0x11u8; 32]);
        let (other_signer, _) = signer_with_pubkey([0x22u8; 32]);
        let tx = build_sol_transfer(&from, &[0xbb; 32], 1000, &[0xcc; 32]).unwrap();
        assert!(sign_transaction(&tx, &other_signer).is_err());
    }

    #[test]
    fn build_transfer_rejects_zero_lamports() {
        assert!(build_sol_transfer(&[1u8; 32], &[2u8; 32], 0, &[0u8; 32]).is_err());
    }

    // -- raw re-signing -----------------------------------------------------

    #[test]
    fn raw_resign_matches_direct_signing() {
        let (signer, from) = signer_with_pubkey([0x42u8; 32]);
        let tx = build_sol_transfer(&from, &[0xbb; 32], 1_000_000, &[0xcc; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        // Blank the signature slot as a dApp-provided unsigned tx would be.
        let mut unsigned = signed.raw.clone();
        for b in &mut unsigned[1..65] {
            *b = 0;
        }

        let resigned = sign_raw_transaction(&signer, &unsigned).unwrap();
        assert_eq!(resigned, signed.raw);
    }

    #[test]
    fn raw_resign_rejects_wrong_key_and_malformed_input() {
        let (signer, from) = signer_with_pubkey([0x11u8; 32]);
        let (other, _) = signer_with_pubkey([0x22u8; 32]);
        let tx = build_sol_transfer(&from, &[0xbb; 32], 1000, &[0xcc; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        assert!(sign_raw_transaction(&other, &signed.raw).is_err());
        assert!(sign_raw_transaction(&signer, &[]).is_err());
        assert!(sign_raw_transaction(&signer, &[0x01]).is_err());
        assert!(sign_raw_transaction(&signer, &[0x00, 0x01, 0x00, 0x00]).is_err());
    }
}
