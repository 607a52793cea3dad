//! Read-only queries

use super::BridgeService;
use crate::domain::{
    Attestation, BatchTx, Confirmation, LatestEthereumHeight, OrchestratorBinding, Page,
    Pagination, Params, SendToEthereum, SignerSetTx, SubjectRef,
};
use crate::error::{BridgeError, BridgeResult};
use crate::ports::inbound::BridgeQuery;
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use shared_types::{AccountAddress, EthAddress, ValidatorAddress};

impl<V, T, A> BridgeQuery for BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    fn params(&self) -> Params {
        self.state.read().params.clone()
    }

    fn denom_to_contract(&self, denom: &str) -> BridgeResult<EthAddress> {
        self.state
            .read()
            .denoms
            .resolve_denom(denom)
            .map(|origin| origin.contract())
            .ok_or_else(|| BridgeError::UnknownAsset(denom.to_string()))
    }

    fn contract_to_denom(&self, contract: &EthAddress) -> (String, bool) {
        let origin = self.state.read().denoms.resolve_contract(contract);
        (origin.denom().to_string(), origin.is_native())
    }

    fn latest_signer_set_tx(&self) -> Option<SignerSetTx> {
        self.state.read().signer_sets.latest().cloned()
    }

    fn signer_set_tx(&self, nonce: u64) -> Option<SignerSetTx> {
        self.state.read().signer_sets.get(nonce).cloned()
    }

    fn last_observed_signer_set_tx(&self) -> Option<SignerSetTx> {
        self.state.read().signer_sets.last_observed().cloned()
    }

    fn last_batch_tx(&self, contract: &EthAddress) -> Option<BatchTx> {
        self.state.read().batches.last_for(contract).cloned()
    }

    fn batch_tx(&self, contract: &EthAddress, nonce: u64) -> Option<BatchTx> {
        self.state.read().batches.get(contract, nonce).cloned()
    }

    fn batch_txs(&self, contract: &EthAddress) -> Vec<BatchTx> {
        self.state
            .read()
            .batches
            .for_contract(contract)
            .cloned()
            .collect()
    }

    fn confirmations(&self, subject: &SubjectRef) -> Vec<Confirmation> {
        self.state.read().confirmations.for_subject(subject)
    }

    fn unbatched_transfers(
        &self,
        sender: &AccountAddress,
        page: Pagination,
    ) -> Page<SendToEthereum> {
        self.state.read().pool.by_sender(sender, page)
    }

    fn last_observed_event_nonce(&self) -> u64 {
        self.state.read().attestations.last_observed_nonce()
    }

    fn last_event_nonce_by_validator(&self, validator: &ValidatorAddress) -> u64 {
        self.state.read().attestations.last_vote_nonce(validator)
    }

    fn attestations_at(&self, nonce: u64) -> Vec<Attestation> {
        self.state
            .read()
            .attestations
            .at_nonce(nonce)
            .map(|(_, a)| a.clone())
            .collect()
    }

    fn delegate_keys_by_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Option<OrchestratorBinding> {
        self.state.read().keys.binding(validator).cloned()
    }

    fn validator_by_orchestrator(&self, orchestrator: &AccountAddress) -> Option<ValidatorAddress> {
        self.state.read().keys.validator_for_orchestrator(orchestrator)
    }

    fn validator_by_ethereum_address(&self, address: &EthAddress) -> Option<ValidatorAddress> {
        self.state.read().keys.validator_for_ethereum(address)
    }

    fn latest_ethereum_height(&self) -> LatestEthereumHeight {
        self.state.read().heights.observed()
    }
}
