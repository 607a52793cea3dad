//! # Attestation Flows
//!
//! Event voting from orchestrators through observation and its effects:
//!
//! 1. **Threshold**: 40% + 35% of power observes; a late 25% vote adds
//!    its weight without a second effect
//! 2. **Staleness**: conflicting votes at an observed nonce never mutate state
//! 3. **Cascade**: a waiting supermajority finalizes as soon as its
//!    predecessor does
//! 4. **Native assets**: deployment maps the denom, deposits release escrow

#[cfg(test)]
mod tests {
    use crate::fixtures::{test_params, TestNet, TOKEN};
    use gravity_core::domain::{AssetContractDeployed, AssetDeposited, BatchExecuted, SubjectRef};
    use gravity_core::ports::inbound::{
        BridgeMsg, MsgRequestBatchTx, MsgResponse, MsgSendToEthereum, MsgSubmitEthereumEvent,
    };
    use gravity_core::ports::{BridgeApi, BridgeQuery, TokenLedger};
    use gravity_core::{BridgeError, BridgeEvent, EthereumEvent};
    use primitive_types::U256;
    use shared_types::{AccountAddress, Coin, EthAddress};

    fn receiver() -> AccountAddress {
        AccountAddress::new([0xAA; 20])
    }

    // =============================================================================
    // THRESHOLD
    // =============================================================================

    #[test]
    fn test_deposit_observed_once_with_late_vote() {
        let mut net = TestNet::new(&[40, 35, 25], test_params());
        let event = net.deposit(receiver(), 500);

        let v = net.vote(0, &event).unwrap();
        assert_eq!(v.tally, 40);
        assert!(v.observed.is_empty());
        assert_eq!(net.bank.balance(&receiver(), &net.voucher()), U256::zero());

        let w = net.vote(1, &event).unwrap();
        assert_eq!(w.tally, 75);
        assert_eq!(w.observed, vec![1]);
        assert_eq!(net.service.last_observed_event_nonce(), 1);

        let x = net.vote(2, &event).unwrap();
        assert_eq!(x.tally, 100);
        assert!(x.observed.is_empty());

        assert_eq!(net.bank.balance(&receiver(), &net.voucher()), U256::from(500u64));
        assert_eq!(net.bank.supply(&net.voucher()), U256::from(500u64));
        let observed = net
            .service
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, BridgeEvent::EventObserved { .. }))
            .count();
        assert_eq!(observed, 1);
        assert_eq!(
            net.service.last_event_nonce_by_validator(&net.orchestrators[2].validator),
            1
        );
    }

    #[test]
    fn test_minority_does_not_observe() {
        let mut net = TestNet::new(&[40, 35, 25], test_params());
        let event = net.deposit(receiver(), 500);

        net.vote(0, &event).unwrap();
        net.vote(2, &event).unwrap();

        // 65% < 2/3
        assert_eq!(net.service.last_observed_event_nonce(), 0);
        let attestations = net.service.attestations_at(1);
        assert_eq!(attestations.len(), 1);
        assert!(!attestations[0].observed);
        assert_eq!(attestations[0].votes.len(), 2);
    }

    // =============================================================================
    // STALENESS
    // =============================================================================

    #[test]
    fn test_conflicting_vote_after_observation_is_rejected() {
        let mut net = TestNet::new(&[40, 35, 25], test_params());
        let event = net.deposit(receiver(), 500);
        net.vote(0, &event).unwrap();
        net.vote(1, &event).unwrap();

        let forged = EthereumEvent::AssetDeposited(AssetDeposited {
            event_nonce: 1,
            token_contract: TOKEN,
            amount: U256::from(1_000_000u64),
            ethereum_sender: EthAddress::new([0x01; 20]),
            cosmos_receiver: net.orchestrators[2].account,
            ethereum_height: 100,
        });
        let err = net.vote(2, &forged).unwrap_err();
        assert!(matches!(err, BridgeError::StaleEvent { nonce: 1, last: 1 }));

        assert_eq!(net.service.attestations_at(1).len(), 1);
        assert_eq!(
            net.service.last_event_nonce_by_validator(&net.orchestrators[2].validator),
            0
        );
        assert_eq!(net.bank.supply(&net.voucher()), U256::from(500u64));
    }

    #[test]
    fn test_validator_cannot_revote_lower_nonce() {
        let mut net = TestNet::new(&[40, 35, 25], test_params());
        let first = net.deposit(receiver(), 1);
        let second = net.deposit(receiver(), 2);

        net.vote(0, &second).unwrap();
        assert!(matches!(
            net.vote(0, &first),
            Err(BridgeError::StaleEvent { nonce: 1, last: 2 })
        ));
    }

    // =============================================================================
    // CASCADE
    // =============================================================================

    #[test]
    fn test_cascade_through_deliver() {
        let mut net = TestNet::new(&[25, 25, 25, 25], test_params());
        let first = net.deposit(receiver(), 10);
        let second = net.deposit(receiver(), 20);
        let third = net.deposit(receiver(), 30);
        let mut disputed = first.clone();
        if let EthereumEvent::AssetDeposited(e) = &mut disputed {
            e.amount = U256::from(11u64);
        }

        let deliver = |index: usize, event: &EthereumEvent| {
            net.service
                .deliver(BridgeMsg::SubmitEthereumEvent(MsgSubmitEthereumEvent {
                    signer: net.orchestrators[index].account,
                    event: event.clone(),
                }))
                .unwrap()
        };

        deliver(0, &first);
        deliver(1, &first);
        deliver(2, &disputed);
        for index in 0..3 {
            deliver(index, &second);
            deliver(index, &third);
        }
        assert_eq!(net.service.last_observed_event_nonce(), 0);
        assert_eq!(net.service.attestations_at(1).len(), 2);

        match deliver(3, &first) {
            MsgResponse::EventVote(result) => assert_eq!(result.observed, vec![1, 2, 3]),
            other => panic!("unexpected response {:?}", other),
        }
        assert_eq!(net.service.last_observed_event_nonce(), 3);
        assert_eq!(net.bank.balance(&receiver(), &net.voucher()), U256::from(60u64));
    }

    // =============================================================================
    // NATIVE ASSETS
    // =============================================================================

    #[test]
    fn test_native_asset_round_trip() {
        let mut net = TestNet::new(&[50, 50], test_params());
        let contract = EthAddress::new([0x42; 20]);
        let sender = AccountAddress::new([0xBB; 20]);
        net.bank.fund(sender, Coin::new("stake", 1_000u64));

        let deployed = EthereumEvent::AssetContractDeployed(AssetContractDeployed {
            event_nonce: net.next_event_nonce(),
            cosmos_denom: "stake".into(),
            token_contract: contract,
            erc20_name: "Stake".into(),
            erc20_symbol: "STK".into(),
            erc20_decimals: 6,
            ethereum_height: 90,
        });
        net.vote_all(&deployed);
        assert_eq!(net.service.denom_to_contract("stake").unwrap(), contract);
        assert!(net.bank.has_denom("stake"));

        let id = net
            .service
            .send_to_ethereum(MsgSendToEthereum {
                sender,
                ethereum_recipient: EthAddress::new([0x02; 20]),
                amount: Coin::new("stake", 100u64),
                bridge_fee: Coin::new("stake", 10u64),
            })
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(net.bank.module_balance("stake"), U256::from(110u64));

        let batch = net
            .service
            .request_batch_tx(MsgRequestBatchTx {
                signer: net.orchestrators[0].account,
                denom: "stake".into(),
            })
            .unwrap();
        let subject = SubjectRef::Batch {
            token_contract: contract,
            nonce: batch.batch_nonce,
        };
        net.confirm(0, subject).unwrap();
        net.confirm(1, subject).unwrap();

        let executed = EthereumEvent::BatchExecuted(BatchExecuted {
            event_nonce: net.next_event_nonce(),
            token_contract: contract,
            batch_nonce: batch.batch_nonce,
            ethereum_height: 95,
        });
        net.vote_all(&executed);

        // native coins stay locked while they circulate externally
        assert_eq!(net.bank.module_balance("stake"), U256::from(110u64));
        assert_eq!(net.bank.supply("stake"), U256::from(1_000u64));
        assert!(net.service.confirmations(&subject).is_empty());

        let deposit = net.deposit_of(contract, receiver(), 60);
        net.vote_all(&deposit);
        assert_eq!(net.bank.balance(&receiver(), "stake"), U256::from(60u64));
        assert_eq!(net.bank.module_balance("stake"), U256::from(50u64));
        assert_eq!(net.bank.supply("stake"), U256::from(1_000u64));
        assert_eq!(net.service.last_observed_event_nonce(), 3);
    }
}
