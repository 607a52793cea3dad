//! # Liveness Flows
//!
//! Window-based participation checks per duty category. A duty stays open
//! for at least one full window; at the first boundary after that, a
//! validator that was required for settled duties and discharged none of
//! them is penalized.

#[cfg(test)]
mod tests {
    use crate::fixtures::{test_params, TestNet, TOKEN};
    use gravity_core::domain::{LivenessCategory, SubjectRef};
    use gravity_core::ports::inbound::{MsgRequestBatchTx, MsgSendToEthereum};
    use gravity_core::ports::{BridgeApi, BridgeQuery, VotingPowerSource};
    use gravity_core::{BridgeEvent, Params};
    use shared_types::{AccountAddress, Coin, EthAddress, ValidatorAddress};

    const POWER: u64 = 1_000_000;

    fn sender() -> AccountAddress {
        AccountAddress::new([0xAA; 20])
    }

    fn queue_batch(net: &TestNet) -> SubjectRef {
        net.service
            .send_to_ethereum(MsgSendToEthereum {
                sender: sender(),
                ethereum_recipient: EthAddress::new([0x02; 20]),
                amount: Coin::new(net.voucher(), 10u64),
                bridge_fee: Coin::new(net.voucher(), 1u64),
            })
            .unwrap();
        let batch = net
            .service
            .request_batch_tx(MsgRequestBatchTx {
                signer: net.orchestrators[0].account,
                denom: net.voucher(),
            })
            .unwrap();
        SubjectRef::Batch {
            token_contract: TOKEN,
            nonce: batch.batch_nonce,
        }
    }

    /// Run blocks 1..=`last`, building a batch confirmed by `confirmers` at
    /// each height in `batch_heights`. Returns everyone slashed, in order.
    fn run_batches(
        net: &mut TestNet,
        last: u64,
        batch_heights: &[u64],
        confirmers: &[usize],
    ) -> Vec<(u64, ValidatorAddress)> {
        let mut slashed = Vec::new();
        while net.height() <= last {
            if batch_heights.contains(&net.height()) {
                let subject = queue_batch(net);
                for index in confirmers {
                    net.confirm(*index, subject).unwrap();
                }
            }
            let height = net.height();
            for validator in net.end_block().slashed {
                slashed.push((height, validator));
            }
        }
        slashed
    }

    fn batch_window_net(window: u64) -> TestNet {
        let net = TestNet::new(
            &[POWER, POWER, POWER],
            Params {
                signed_batches_window: window,
                ..test_params()
            },
        );
        net.bank.fund(sender(), Coin::new(net.voucher(), 1_000u64));
        net
    }

    #[test]
    fn test_only_absent_validator_slashed() {
        let mut net = batch_window_net(10);
        let absent = net.orchestrators[2].validator;

        let slashed = run_batches(&mut net, 20, &[2, 6], &[0, 1]);
        assert_eq!(slashed, vec![(20, absent)]);

        assert!(net.staking.is_jailed(&absent));
        assert!(!net.staking.is_jailed(&net.orchestrators[0].validator));
        assert!(!net.staking.is_jailed(&net.orchestrators[1].validator));

        let slashes = net.staking.slashes();
        assert_eq!(slashes.len(), 1);
        assert_eq!(slashes[0].infraction_height, 20);
        assert_eq!(slashes[0].fraction_bps, 10);
        assert_eq!(slashes[0].amount, POWER / 1_000);

        assert!(net
            .service
            .drain_events()
            .contains(&BridgeEvent::ValidatorSlashed {
                validator: absent,
                category: LivenessCategory::BatchConfirmation,
                fraction_bps: 10,
            }));
    }

    #[test]
    fn test_duties_stay_open_for_a_full_window() {
        let mut net = batch_window_net(10);
        let absent = net.orchestrators[2].validator;

        // a batch due just before the first boundary is not judged there
        let slashed = run_batches(&mut net, 10, &[9], &[0]);
        assert!(slashed.is_empty());

        let subject = SubjectRef::Batch {
            token_contract: TOKEN,
            nonce: 1,
        };
        net.confirm(1, subject).unwrap();
        assert_eq!(net.service.confirmations(&subject).len(), 2);

        let slashed = run_batches(&mut net, 20, &[], &[]);
        assert_eq!(slashed, vec![(20, absent)]);
        assert!(!net.staking.is_jailed(&net.orchestrators[1].validator));
    }

    #[test]
    fn test_confirmations_after_boundary_count() {
        let mut net = batch_window_net(10);
        net.run_through(8);
        let subject = queue_batch(&net);
        net.run_through(13);
        for index in 0..3 {
            net.confirm(index, subject).unwrap();
        }

        let slashed = run_batches(&mut net, 30, &[], &[]);
        assert!(slashed.is_empty());
        assert_eq!(net.staking.total_power(), 3 * POWER);
    }

    #[test]
    fn test_jailed_validator_leaves_signer_set() {
        let mut net = batch_window_net(10);
        run_batches(&mut net, 20, &[2, 6], &[0, 1]);

        let report = net.end_block();
        assert_eq!(report.signer_set_created, Some(2));
        let set = net.service.latest_signer_set_tx().unwrap();
        assert_eq!(set.signers.len(), 2);
        assert!(!set.contains(&net.orchestrators[2].signer.address()));
    }

    #[test]
    fn test_single_confirmation_in_window_is_enough() {
        let mut net = batch_window_net(10);
        let slashed = run_batches(&mut net, 3, &[2], &[0, 1]);
        assert!(slashed.is_empty());

        // the third validator confirms just one of the three batches
        let subject = queue_batch(&net);
        for index in 0..3 {
            net.confirm(index, subject).unwrap();
        }
        let slashed = run_batches(&mut net, 20, &[7], &[0, 1]);
        assert!(slashed.is_empty());
        assert!(net.staking.slashes().is_empty());
    }

    #[test]
    fn test_no_duties_no_penalty() {
        let mut net = batch_window_net(5);
        let slashed = run_batches(&mut net, 20, &[], &[]);
        assert!(slashed.is_empty());
    }

    #[test]
    fn test_unbonded_validator_skipped() {
        let mut net = batch_window_net(10);
        run_batches(&mut net, 3, &[2], &[0, 1]);
        net.staking.set_power(net.orchestrators[2].validator, 0);

        let slashed = run_batches(&mut net, 20, &[], &[]);
        assert!(slashed.is_empty());
        assert!(net.staking.slashes().is_empty());
    }

    #[test]
    fn test_signer_set_confirmations() {
        let mut net = TestNet::new(
            &[POWER, POWER, POWER],
            Params {
                signed_signer_set_txs_window: 5,
                ..test_params()
            },
        );
        // signer set 1 is created at the end of block 1
        net.end_block();
        let subject = SubjectRef::SignerSet { nonce: 1 };
        net.confirm(0, subject).unwrap();

        let mut slashed = Vec::new();
        while net.height() <= 10 {
            if net.height() == 7 {
                // after the first boundary, before the set is judged
                net.confirm(1, subject).unwrap();
            }
            slashed.extend(net.end_block().slashed);
        }
        assert_eq!(slashed, vec![net.orchestrators[2].validator]);
        assert_eq!(net.service.confirmations(&subject).len(), 2);
    }

    #[test]
    fn test_missed_event_votes() {
        let mut net = TestNet::new(
            &[40, 35, 25],
            Params {
                ethereum_signatures_window: 5,
                ..test_params()
            },
        );
        let receiver = AccountAddress::new([0xCC; 20]);

        net.end_block();
        let event = net.deposit(receiver, 1);
        net.vote(0, &event).unwrap();
        net.vote(1, &event).unwrap();

        let mut slashed = Vec::new();
        while net.height() <= 10 {
            slashed.extend(net.end_block().slashed);
        }
        assert_eq!(slashed, vec![net.orchestrators[2].validator]);
        assert!(net.staking.is_jailed(&net.orchestrators[2].validator));
    }

    #[test]
    fn test_late_event_vote_after_boundary_counts() {
        let mut net = TestNet::new(
            &[40, 35, 25],
            Params {
                ethereum_signatures_window: 5,
                ..test_params()
            },
        );
        let receiver = AccountAddress::new([0xCC; 20]);

        net.run_through(4);
        let event = net.deposit(receiver, 1);
        net.vote(0, &event).unwrap();
        net.vote(1, &event).unwrap();
        net.run_through(6);
        net.vote(2, &event).unwrap();

        let mut slashed = Vec::new();
        while net.height() <= 15 {
            slashed.extend(net.end_block().slashed);
        }
        assert!(slashed.is_empty());
        assert_eq!(net.service.last_observed_event_nonce(), 1);
    }
}
