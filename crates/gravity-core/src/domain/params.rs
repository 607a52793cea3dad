//! Bridge parameters
//!
//! Windows and periods are in blocks, times in milliseconds, fractions in
//! basis points (1/10000).

use crate::error::{BridgeError, BridgeResult};
use crate::domain::liveness::LivenessCategory;
use serde::{Deserialize, Serialize};
use shared_types::EthAddress;

/// Basis-point denominator
pub const BPS_DENOMINATOR: u32 = 10_000;

/// `gravity_id` is packed into a single `bytes32` checkpoint word
pub const MAX_GRAVITY_ID_LEN: usize = 32;

/// Governance-controlled bridge parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Bridge identifier, first word of every checkpoint
    pub gravity_id: String,
    /// External bridge contract
    pub bridge_ethereum_address: EthAddress,
    /// External chain id
    pub bridge_chain_id: u64,
    /// Liveness window for signer-set confirmations
    pub signed_signer_set_txs_window: u64,
    /// Liveness window for batch confirmations
    pub signed_batches_window: u64,
    /// Liveness window for event votes
    pub ethereum_signatures_window: u64,
    /// Batch lifetime on the external chain (ms)
    pub target_eth_tx_timeout: u64,
    /// This chain's block time (ms)
    pub average_block_time: u64,
    /// External chain block time (ms)
    pub average_ethereum_block_time: u64,
    pub slash_fraction_signer_set_tx_bps: u32,
    pub slash_fraction_batch_bps: u32,
    pub slash_fraction_ethereum_signature_bps: u32,
    /// Accept new outgoing transfers
    pub bridge_active: bool,
    /// Automatic batch creation period; 0 disables it
    pub batch_creation_period: u64,
    /// Max transfers per batch
    pub batch_max_element: usize,
    /// External height consensus period
    pub observe_ethereum_height_period: u64,
    /// Relative power change that triggers a new signer set
    pub signer_set_power_change_threshold_bps: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            gravity_id: "gravity-bridge".to_string(),
            bridge_ethereum_address: EthAddress::default(),
            bridge_chain_id: 1,
            signed_signer_set_txs_window: 10_000,
            signed_batches_window: 10_000,
            ethereum_signatures_window: 10_000,
            target_eth_tx_timeout: 43_200_000,
            average_block_time: 5_000,
            average_ethereum_block_time: 15_000,
            slash_fraction_signer_set_tx_bps: 10,
            slash_fraction_batch_bps: 10,
            slash_fraction_ethereum_signature_bps: 10,
            bridge_active: true,
            batch_creation_period: 10,
            batch_max_element: 100,
            observe_ethereum_height_period: 50,
            signer_set_power_change_threshold_bps: 500,
        }
    }
}

impl Params {
    pub fn validate(&self) -> BridgeResult<()> {
        if self.gravity_id.is_empty() {
            return Err(BridgeError::InvalidParams("gravity_id is empty".into()));
        }
        if self.gravity_id.len() > MAX_GRAVITY_ID_LEN {
            return Err(BridgeError::InvalidParams(format!(
                "gravity_id is {} bytes, at most {} allowed",
                self.gravity_id.len(),
                MAX_GRAVITY_ID_LEN
            )));
        }
        for (name, value) in [
            ("signed_signer_set_txs_window", self.signed_signer_set_txs_window),
            ("signed_batches_window", self.signed_batches_window),
            ("ethereum_signatures_window", self.ethereum_signatures_window),
            ("average_block_time", self.average_block_time),
            ("average_ethereum_block_time", self.average_ethereum_block_time),
            ("observe_ethereum_height_period", self.observe_ethereum_height_period),
        ] {
            if value == 0 {
                return Err(BridgeError::InvalidParams(format!("{} must be positive", name)));
            }
        }
        for (name, bps) in [
            ("slash_fraction_signer_set_tx_bps", self.slash_fraction_signer_set_tx_bps),
            ("slash_fraction_batch_bps", self.slash_fraction_batch_bps),
            (
                "slash_fraction_ethereum_signature_bps",
                self.slash_fraction_ethereum_signature_bps,
            ),
            (
                "signer_set_power_change_threshold_bps",
                self.signer_set_power_change_threshold_bps,
            ),
        ] {
            if bps > BPS_DENOMINATOR {
                return Err(BridgeError::InvalidParams(format!(
                    "{} = {} exceeds {}",
                    name, bps, BPS_DENOMINATOR
                )));
            }
        }
        if self.batch_max_element == 0 {
            return Err(BridgeError::InvalidParams("batch_max_element must be >= 1".into()));
        }
        Ok(())
    }

    /// Liveness window for a category.
    pub fn window(&self, category: LivenessCategory) -> u64 {
        match category {
            LivenessCategory::EventVote => self.ethereum_signatures_window,
            LivenessCategory::SignerSetConfirmation => self.signed_signer_set_txs_window,
            LivenessCategory::BatchConfirmation => self.signed_batches_window,
        }
    }

    /// Slash fraction for a category.
    pub fn slash_fraction_bps(&self, category: LivenessCategory) -> u32 {
        match category {
            LivenessCategory::EventVote => self.slash_fraction_ethereum_signature_bps,
            LivenessCategory::SignerSetConfirmation => self.slash_fraction_signer_set_tx_bps,
            LivenessCategory::BatchConfirmation => self.slash_fraction_batch_bps,
        }
    }

    /// Batch lifetime in external blocks.
    pub fn batch_timeout_blocks(&self) -> u64 {
        self.target_eth_tx_timeout / self.average_ethereum_block_time.max(1)
    }
}
