//! TRON transaction encoding and signing.
//!
//! A transaction is a protobuf `Transaction` message whose `raw_data` holds
//! one contract. The transaction id is SHA-256 over the encoded `raw_data`,
//! and the signature is the 65-byte recoverable `r || s || v` over that id.
//!
//! ```text
//! TransferContract     { 1: owner_address, 2: to_address, 3: amount }
//! TriggerSmartContract { 1: owner_address, 2: contract_address,
//!                        3: call_value, 4: data }
//! Any         { 1: type_url, 2: value }
//! Contract    { 1: type, 2: parameter (Any) }
//! raw         { 1: ref_block_bytes, 4: ref_block_hash, 8: expiration,
//!               11: contract, 14: timestamp, 18: fee_limit (non-zero only) }
//! Transaction { 1: raw_data, 2: signature }
//! ```

use crypto_utils::hash::sha256;
use crypto_utils::secp256k1::Secp256k1Signer;

use crate::address::TronAddress;
use crate::error::TronError;
use crate::protobuf::MessageWriter;

/// `Transaction.Contract.ContractType` values used here.
pub const TRANSFER_CONTRACT_TYPE: i64 = 1;
pub const TRIGGER_SMART_CONTRACT_TYPE: i64 = 31;

const TRANSFER_TYPE_URL: &str = "type.googleapis.com/protocol.TransferContract";
const TRIGGER_TYPE_URL: &str = "type.googleapis.com/protocol.TriggerSmartContract";

/// The contract carried by a transaction.
#[derive(Debug, Clone)]
pub enum TronContract {
    /// Native TRX transfer (amount in sun).
    Transfer {
        owner: TronAddress,
        to: TronAddress,
        amount: i64,
    },
    /// Smart-contract call with opaque call data (e.g. a TRC-20 transfer).
    TriggerSmartContract {
        owner: TronAddress,
        contract: TronAddress,
        call_value: i64,
        data: Vec<u8>,
    },
}

impl TronContract {
    pub fn owner(&self) -> &TronAddress {
        match self {
            TronContract::Transfer { owner, .. } => owner,
            TronContract::TriggerSmartContract { owner, .. } => owner,
        }
    }

    fn contract_type(&self) -> i64 {
        match self {
            TronContract::Transfer { .. } => TRANSFER_CONTRACT_TYPE,
            TronContract::TriggerSmartContract { .. } => TRIGGER_SMART_CONTRACT_TYPE,
        }
    }

    fn type_url(&self) -> &'static str {
        match self {
            TronContract::Transfer { .. } => TRANSFER_TYPE_URL,
            TronContract::TriggerSmartContract { .. } => TRIGGER_TYPE_URL,
        }
    }

    /// Encodes the inner parameter message (the `Any.value` payload).
    fn encode_parameter(&self) -> Vec<u8> {
        let mut w = MessageWriter::new();
        match self {
            TronContract::Transfer { owner, to, amount } => {
                w.bytes(1, owner.as_bytes())
                    .bytes(2, to.as_bytes())
                    .int64(3, *amount);
            }
            TronContract::TriggerSmartContract {
                owner,
                contract,
                call_value,
                data,
            } => {
                w.bytes(1, owner.as_bytes())
                    .bytes(2, contract.as_bytes())
                    .int64(3, *call_value)
                    .bytes(4, data);
            }
        }
        w.into_bytes()
    }

    /// Encodes the `Contract` message with its `Any`-wrapped parameter.
    fn encode(&self) -> Vec<u8> {
        let mut any = MessageWriter::new();
        any.string(1, self.type_url())
            .bytes(2, &self.encode_parameter());

        let mut contract = MessageWriter::new();
        contract
            .int64(1, self.contract_type())
            .message(2, &any.into_bytes());
        contract.into_bytes()
    }
}

/// An unsigned TRON transaction (`Transaction.raw`).
#[derive(Debug, Clone)]
pub struct TronTransaction {
    /// Two bytes of the reference block height.
    pub ref_block_bytes: Vec<u8>,
    /// Eight bytes of the reference block hash.
    pub ref_block_hash: Vec<u8>,
    /// Expiration, milliseconds since epoch.
    pub expiration: i64,
    /// Creation timestamp, milliseconds since epoch.
    pub timestamp: i64,
    /// Energy ceiling for contract calls; 0 means unset and is not emitted.
    pub fee_limit: i64,
    pub contract: TronContract,
}

/// A signed TRON transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTronTransaction {
    pub tx: TronTransaction,
    /// Base58Check owner address recovered from the signing key.
    pub from: String,
    /// Encoded protobuf `Transaction` (raw_data + signature).
    pub raw: Vec<u8>,
    /// SHA-256 of the encoded `raw_data`.
    pub tx_hash: [u8; 32],
    /// 65-byte `r || s || v` signature.
    pub signature: [u8; 65],
}

impl TronTransaction {
    pub fn new_transfer(
        owner: TronAddress,
        to: TronAddress,
        amount: i64,
        ref_block_bytes: Vec<u8>,
        ref_block_hash: Vec<u8>,
        expiration: i64,
        timestamp: i64,
    ) -> Result<Self, TronError> {
        if amount <= 0 {
            return Err(TronError::TransactionBuildError(
                "transfer amount must be positive".into(),
            ));
        }
        Ok(Self {
            ref_block_bytes,
            ref_block_hash,
            expiration,
            timestamp,
            fee_limit: 0,
            contract: TronContract::Transfer { owner, to, amount },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_trigger_smart_contract(
        owner: TronAddress,
        contract: TronAddress,
        call_value: i64,
        data: Vec<u8>,
        fee_limit: i64,
        ref_block_bytes: Vec<u8>,
        ref_block_hash: Vec<u8>,
        expiration: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            ref_block_bytes,
            ref_block_hash,
            expiration,
            timestamp,
            fee_limit,
            contract: TronContract::TriggerSmartContract {
                owner,
                contract,
                call_value,
                data,
            },
        }
    }

    /// Encodes the `raw` message whose SHA-256 is the transaction id.
    pub fn encode_raw(&self) -> Vec<u8> {
        let mut w = MessageWriter::new();
        w.bytes(1, &self.ref_block_bytes)
            .bytes(4, &self.ref_block_hash)
            .int64(8, self.expiration)
            .message(11, &self.contract.encode())
            .int64(14, self.timestamp)
            .int64(18, self.fee_limit);
        w.into_bytes()
    }

    /// The transaction id: SHA-256 over the encoded `raw_data`.
    pub fn txid(&self) -> [u8; 32] {
        sha256(&self.encode_raw())
    }
}

/// Signs the transaction and assembles the protobuf `Transaction`.
pub fn sign_transaction(
    tx: &TronTransaction,
    signer: &Secp256k1Signer,
) -> Result<SignedTronTransaction, TronError> {
    let raw_data = tx.encode_raw();
    let tx_hash = sha256(&raw_data);

    let sig = signer.sign(&tx_hash)?;
    let signature = sig.to_bytes();

    let pubkey = signer.public_key(false)?;
    let from = TronAddress::from_public_key(&pubkey)?;

    let mut w = MessageWriter::new();
    w.message(1, &raw_data).bytes(2, &signature);

    Ok(SignedTronTransaction {
        tx: tx.clone(),
        from: from.to_base58(),
        raw: w.into_bytes(),
        tx_hash,
        signature,
    })
}
