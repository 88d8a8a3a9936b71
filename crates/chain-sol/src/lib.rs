//! Solana chain support.
//!
//! Implements Solana's compact binary wire format by hand; the official
//! SDK drags in an async runtime and hundreds of transitive dependencies a
//! signing core has no use for. Ed25519 signing and Base58 come from the
//! shared primitive layer.

pub mod address;
pub mod error;
pub mod transaction;

pub use address::SolanaAddress;
pub use error::SolError;
pub use transaction::{
    build_sol_transfer, compile_message, decode_compact_u16, encode_compact_u16,
    sign_raw_transaction, sign_transaction, CompiledInstruction, SignedSolTransaction,
    SolAccountMeta, SolInstruction, SolMessage, SolTransaction, SYSTEM_PROGRAM_ID,
};
