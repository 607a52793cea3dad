//! Shared fixtures: a bridge service wired to in-memory collaborators,
//! plus one orchestrator key set per validator.

use gravity_core::adapters::{InMemoryAccounts, InMemoryBank, InMemoryStaking};
use gravity_core::domain::{voucher_denom, AssetDeposited, DelegateKeysSignMsg, SubjectRef};
use gravity_core::ports::inbound::{
    EndBlockReport, EventVoteResult, MsgDelegateKeys, MsgSubmitEthereumEvent,
    MsgSubmitEthereumTxConfirmation,
};
use gravity_core::ports::{AccountSequenceSource, BridgeApi, BridgeQuery};
use gravity_core::{BridgeDependencies, BridgeResult, BridgeService, EthereumEvent, Params};
use primitive_types::U256;
use shared_crypto::EthSigner;
use shared_types::{AccountAddress, EthAddress, Hash, ValidatorAddress};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub type TestService = BridgeService<InMemoryStaking, InMemoryBank, InMemoryAccounts>;

/// Asset contract used by most flows.
pub const TOKEN: EthAddress = EthAddress::new([0xEE; 20]);

/// Install a test log writer once; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parameters with short periods and automatic batching off.
pub fn test_params() -> Params {
    Params {
        gravity_id: "gravity-test".to_string(),
        batch_creation_period: 0,
        observe_ethereum_height_period: 1,
        batch_max_element: 2,
        target_eth_tx_timeout: 150_000,
        average_ethereum_block_time: 15_000,
        ..Default::default()
    }
}

pub struct Orchestrator {
    pub validator: ValidatorAddress,
    pub account: AccountAddress,
    pub signer: EthSigner,
}

pub struct TestNet {
    pub service: Arc<TestService>,
    pub staking: Arc<InMemoryStaking>,
    pub bank: Arc<InMemoryBank>,
    pub accounts: Arc<InMemoryAccounts>,
    pub orchestrators: Vec<Orchestrator>,
    height: u64,
    next_event_nonce: u64,
}

impl TestNet {
    /// One validator per entry of `powers`, each with delegated keys,
    /// positioned at the start of block 1.
    pub fn new(powers: &[u64], params: Params) -> Self {
        init_tracing();

        let validators: Vec<(ValidatorAddress, u64)> = powers
            .iter()
            .enumerate()
            .map(|(i, power)| (ValidatorAddress::new([i as u8 + 1; 20]), *power))
            .collect();
        let staking = Arc::new(InMemoryStaking::with_validators(&validators));
        let bank = Arc::new(InMemoryBank::new());
        let accounts = Arc::new(InMemoryAccounts::new());
        let service = Arc::new(
            BridgeService::new(BridgeDependencies {
                staking: staking.clone(),
                ledger: bank.clone(),
                accounts: accounts.clone(),
                params,
            })
            .expect("test params are valid"),
        );
        service.begin_block(1);

        let orchestrators: Vec<Orchestrator> = validators
            .iter()
            .enumerate()
            .map(|(i, (validator, _))| Orchestrator {
                validator: *validator,
                account: AccountAddress::new([0x10 + i as u8; 20]),
                signer: EthSigner::generate(),
            })
            .collect();

        let net = Self {
            service,
            staking,
            bank,
            accounts,
            orchestrators,
            height: 1,
            next_event_nonce: 1,
        };
        for orchestrator in &net.orchestrators {
            net.service
                .delegate_keys(net.delegate_keys_msg(orchestrator))
                .expect("delegate keys");
        }
        net
    }

    /// Signed key registration for `orchestrator` at the current sequence.
    pub fn delegate_keys_msg(&self, orchestrator: &Orchestrator) -> MsgDelegateKeys {
        let sequence = self.accounts.sequence(&orchestrator.validator.account());
        let challenge = DelegateKeysSignMsg::new(orchestrator.validator, sequence)
            .challenge_hash()
            .expect("challenge encodes");
        MsgDelegateKeys {
            validator: orchestrator.validator,
            orchestrator: orchestrator.account,
            ethereum_address: orchestrator.signer.address(),
            eth_signature: orchestrator.signer.sign_hash(&challenge).expect("sign"),
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Finish the current block and open the next one.
    pub fn end_block(&mut self) -> EndBlockReport {
        let report = self.service.end_block(self.height);
        self.height += 1;
        self.service.begin_block(self.height);
        report
    }

    /// Finish blocks until `height` has been ended.
    pub fn run_through(&mut self, height: u64) -> Vec<EndBlockReport> {
        let mut reports = Vec::new();
        while self.height <= height {
            reports.push(self.end_block());
        }
        reports
    }

    pub fn next_event_nonce(&mut self) -> u64 {
        let nonce = self.next_event_nonce;
        self.next_event_nonce += 1;
        nonce
    }

    /// Deposit of `amount` of [`TOKEN`] to `receiver` at the next nonce.
    pub fn deposit(&mut self, receiver: AccountAddress, amount: u64) -> EthereumEvent {
        self.deposit_of(TOKEN, receiver, amount)
    }

    pub fn deposit_of(
        &mut self,
        contract: EthAddress,
        receiver: AccountAddress,
        amount: u64,
    ) -> EthereumEvent {
        EthereumEvent::AssetDeposited(AssetDeposited {
            event_nonce: self.next_event_nonce(),
            token_contract: contract,
            amount: U256::from(amount),
            ethereum_sender: EthAddress::new([0x01; 20]),
            cosmos_receiver: receiver,
            ethereum_height: 100,
        })
    }

    pub fn vote(&self, index: usize, event: &EthereumEvent) -> BridgeResult<EventVoteResult> {
        self.service.submit_ethereum_event(MsgSubmitEthereumEvent {
            signer: self.orchestrators[index].account,
            event: event.clone(),
        })
    }

    pub fn vote_all(&self, event: &EthereumEvent) {
        for index in 0..self.orchestrators.len() {
            self.vote(index, event).expect("vote accepted");
        }
    }

    /// Checkpoint of a stored signer set or batch.
    pub fn checkpoint(&self, subject: &SubjectRef) -> Hash {
        let gravity_id = self.service.params().gravity_id;
        match *subject {
            SubjectRef::SignerSet { nonce } => self
                .service
                .signer_set_tx(nonce)
                .expect("signer set exists")
                .checkpoint(&gravity_id),
            SubjectRef::Batch {
                token_contract,
                nonce,
            } => self
                .service
                .batch_tx(&token_contract, nonce)
                .expect("batch exists")
                .checkpoint(&gravity_id),
        }
    }

    pub fn confirmation_msg(
        &self,
        index: usize,
        subject: SubjectRef,
    ) -> MsgSubmitEthereumTxConfirmation {
        let checkpoint = self.checkpoint(&subject);
        MsgSubmitEthereumTxConfirmation {
            signer: self.orchestrators[index].account,
            subject,
            signature: self.orchestrators[index]
                .signer
                .sign_hash(&checkpoint)
                .expect("sign"),
        }
    }

    pub fn confirm(&self, index: usize, subject: SubjectRef) -> BridgeResult<()> {
        self.service
            .submit_ethereum_tx_confirmation(self.confirmation_msg(index, subject))
    }

    pub fn voucher(&self) -> String {
        voucher_denom(&TOKEN)
    }
}
