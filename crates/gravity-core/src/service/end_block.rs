//! Scheduled per-block work

use super::BridgeService;
use crate::domain::{normalize_signers, Duty, LivenessCategory, NonceKey, SignerSetTx};
use crate::events::BridgeEvent;
use crate::metrics;
use crate::ports::inbound::EndBlockReport;
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use shared_types::{EthAddress, ValidatorAddress};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    /// Run the end-of-block schedule for `height`.
    pub fn end_block(&self, height: u64) -> EndBlockReport {
        let mut state = self.state.write();
        state.block_height = height;
        let mut report = EndBlockReport::default();

        // Bonded power may have moved since the last vote
        report.observed_events = self.observe_ready_events(&mut state);

        if height % state.params.observe_ethereum_height_period == 0 {
            let total = self.staking.total_power();
            if let Some(observed) = state.heights.observe(|v| self.power_of(v), total, height) {
                info!(ethereum_height = observed, "[gravity] ethereum height observed");
                state.emit(BridgeEvent::EthereumHeightObserved {
                    ethereum_height: observed,
                });
                report.observed_ethereum_height = Some(observed);
            }
        }

        let ethereum_height = state.heights.observed().ethereum_height;
        if ethereum_height > 0 {
            for (contract, nonce) in state.batches.timed_out(ethereum_height) {
                if self.cancel_batch(&mut state, contract, nonce) {
                    report.timed_out_batches.push((contract, nonce));
                }
            }
        }

        let period = state.params.batch_creation_period;
        if period > 0 && height % period == 0 {
            for contract in state.pool.contracts() {
                match self.build_batch(&mut state, contract) {
                    Ok(batch) => report.created_batches.push((contract, batch.batch_nonce)),
                    Err(err) => debug!(contract = %contract, error = %err, "[gravity] no batch"),
                }
            }
        }

        report.signer_set_created = self
            .create_signer_set(&mut state, false)
            .map(|set| set.nonce);

        report.slashed = self.punish_inactive(&mut state, height);
        report
    }

    /// Snapshot the current signer set unconditionally.
    pub fn create_signer_set_tx(&self) -> Option<SignerSetTx> {
        let mut state = self.state.write();
        self.create_signer_set(&mut state, true)
    }

    /// Bonded validators with registered keys and their raw power.
    fn current_signers(&self, state: &BridgeState) -> Vec<(ValidatorAddress, EthAddress, u64)> {
        self.staking
            .bonded_validators()
            .into_iter()
            .filter_map(|(validator, power)| {
                state
                    .keys
                    .ethereum_address(&validator)
                    .map(|eth| (validator, eth, power))
            })
            .collect()
    }

    fn create_signer_set(&self, state: &mut BridgeState, force: bool) -> Option<SignerSetTx> {
        let members = self.current_signers(state);
        let raw: Vec<(EthAddress, u64)> = members.iter().map(|(_, eth, p)| (*eth, *p)).collect();
        let signers = normalize_signers(&raw);
        if signers.is_empty() {
            return None;
        }

        if !force {
            if let Some(latest) = state.signer_sets.latest() {
                let old: BTreeSet<EthAddress> =
                    latest.signers.iter().map(|s| s.ethereum_address).collect();
                let new: BTreeSet<EthAddress> =
                    signers.iter().map(|s| s.ethereum_address).collect();
                let threshold =
                    u64::from(state.params.signer_set_power_change_threshold_bps).max(1);
                if old == new && latest.power_diff_bps(&signers) < threshold {
                    return None;
                }
            }
        }

        let nonce = state.nonces.next(NonceKey::SignerSet);
        let set = SignerSetTx::new(nonce, state.block_height, signers);
        let required = members.into_iter().map(|(v, _, _)| v).collect();
        state.liveness.register(
            Duty::SignerSet { nonce },
            state.block_height,
            required,
            BTreeSet::new(),
        );
        state.signer_sets.insert(set.clone());

        info!(
            nonce,
            members = set.signers.len(),
            "[gravity] signer set created"
        );
        state.emit(BridgeEvent::SignerSetCreated {
            nonce,
            members: set.signers.len(),
        });
        Some(set)
    }

    /// Slash and jail validators that skipped every duty of a category that
    /// has been open for at least a full window as of `height`.
    fn punish_inactive(&self, state: &mut BridgeState, height: u64) -> Vec<ValidatorAddress> {
        let mut slashed = Vec::new();
        if height == 0 {
            return slashed;
        }

        for category in LivenessCategory::ALL {
            let window = state.params.window(category);
            if height % window != 0 {
                continue;
            }
            let Some(settled_through) = height.checked_sub(window) else {
                continue;
            };
            let fraction_bps = state.params.slash_fraction_bps(category);
            let delinquent = state.liveness.delinquent(category, settled_through);

            for validator in delinquent {
                if self.staking.power(&validator).is_none() || self.staking.is_jailed(&validator) {
                    continue;
                }
                self.staking.slash(&validator, height, fraction_bps);
                self.staking.jail(&validator);
                warn!(
                    validator = %validator,
                    category = category.label(),
                    fraction_bps,
                    "[gravity] validator missed liveness window"
                );
                state.emit(BridgeEvent::ValidatorSlashed {
                    validator,
                    category,
                    fraction_bps,
                });
                metrics::record_validator_slashed(category.label());
                if !slashed.contains(&validator) {
                    slashed.push(validator);
                }
            }
            state.liveness.prune(category, settled_through);
            if category == LivenessCategory::EventVote {
                let pruned = state.attestations.prune_settled(settled_through);
                debug!(pruned, "[gravity] settled attestations pruned");
            }
        }
        slashed
    }
}
