//! Built-in chain adapter and address encoder implementations.

mod btc;
mod evm;
mod sol;
mod tron;

use std::collections::HashMap;
use std::sync::Arc;

pub use btc::{BtcChainAdapter, BtcEncoder};
pub use evm::{EvmChainAdapter, EvmEncoder};
pub use sol::{SolChainAdapter, SolEncoder};
pub use tron::{TronChainAdapter, TronEncoder};

use crate::adapter::{AddressEncoder, ChainAdapter};
use crate::types::ChainType;

pub(crate) fn default_adapters() -> HashMap<ChainType, Arc<dyn ChainAdapter>> {
    let adapters: [Arc<dyn ChainAdapter>; 4] = [
        Arc::new(EvmChainAdapter),
        Arc::new(TronChainAdapter),
        Arc::new(BtcChainAdapter),
        Arc::new(SolChainAdapter),
    ];
    adapters
        .into_iter()
        .map(|a| (a.chain_type(), a))
        .collect()
}

pub(crate) fn default_encoders() -> HashMap<ChainType, Arc<dyn AddressEncoder>> {
    let encoders: [Arc<dyn AddressEncoder>; 4] = [
        Arc::new(EvmEncoder),
        Arc::new(TronEncoder),
        Arc::new(BtcEncoder),
        Arc::new(SolEncoder),
    ];
    encoders
        .into_iter()
        .map(|e| (e.chain_type(), e))
        .collect()
}
