//! Bridge state
//!
//! Every store the core owns, mutated only under the service write lock.

use crate::domain::{
    AttestationStore, BatchStore, ConfirmationStore, DenomMap, HeightVotes, KeyRegistry,
    LivenessMonitor, NonceArena, Params, SignerSetStore, TransferPool,
};
use crate::events::BridgeEvent;
use std::collections::BTreeMap;

pub struct BridgeState {
    pub params: Params,
    /// Height of the block being executed
    pub block_height: u64,
    pub keys: KeyRegistry,
    pub attestations: AttestationStore,
    pub denoms: DenomMap,
    pub pool: TransferPool,
    pub batches: BatchStore,
    pub signer_sets: SignerSetStore,
    pub confirmations: ConfirmationStore,
    pub heights: HeightVotes,
    pub liveness: LivenessMonitor,
    pub nonces: NonceArena,
    /// Invalidation scope -> highest executed invalidation nonce
    pub contract_calls: BTreeMap<Vec<u8>, u64>,
    /// Buffered module events, drained by the host
    pub events: Vec<BridgeEvent>,
}

impl BridgeState {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            block_height: 0,
            keys: KeyRegistry::new(),
            attestations: AttestationStore::new(),
            denoms: DenomMap::new(),
            pool: TransferPool::new(),
            batches: BatchStore::new(),
            signer_sets: SignerSetStore::new(),
            confirmations: ConfirmationStore::new(),
            heights: HeightVotes::new(),
            liveness: LivenessMonitor::new(),
            nonces: NonceArena::new(),
            contract_calls: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }
}
