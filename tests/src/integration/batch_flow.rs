//! # Outgoing Batch Flows
//!
//! Transfers from escrow to execution on the external chain:
//!
//! 1. **Selection**: highest fees first, bounded size, monotonic nonces
//! 2. **Cancellation**: refund exactly once, never after batching
//! 3. **Execution**: confirmations collected, voucher escrow burned
//! 4. **Timeout**: agreed external height dissolves stale batches

#[cfg(test)]
mod tests {
    use crate::fixtures::{test_params, TestNet, TOKEN};
    use gravity_core::domain::{BatchExecuted, Pagination, SubjectRef};
    use gravity_core::ports::inbound::{
        BridgeMsg, MsgCancelSendToEthereum, MsgEthereumHeightVote, MsgRequestBatchTx,
        MsgResponse, MsgSendToEthereum,
    };
    use gravity_core::ports::{BridgeApi, BridgeQuery};
    use gravity_core::{BridgeError, BridgeEvent, EthereumEvent, Params};
    use primitive_types::U256;
    use shared_types::{AccountAddress, Coin, EthAddress};

    fn sender() -> AccountAddress {
        AccountAddress::new([0xAA; 20])
    }

    fn funded_net(powers: &[u64], params: Params) -> TestNet {
        let net = TestNet::new(powers, params);
        net.bank.fund(sender(), Coin::new(net.voucher(), 10_000u64));
        net
    }

    fn send(net: &TestNet, amount: u64, fee: u64) -> u64 {
        net.service
            .send_to_ethereum(MsgSendToEthereum {
                sender: sender(),
                ethereum_recipient: EthAddress::new([0x02; 20]),
                amount: Coin::new(net.voucher(), amount),
                bridge_fee: Coin::new(net.voucher(), fee),
            })
            .unwrap()
    }

    fn request_batch(net: &TestNet) -> MsgResponse {
        net.service
            .deliver(BridgeMsg::RequestBatchTx(MsgRequestBatchTx {
                signer: net.orchestrators[0].account,
                denom: net.voucher(),
            }))
            .unwrap()
    }

    // =============================================================================
    // SELECTION
    // =============================================================================

    #[test]
    fn test_batch_takes_highest_fees() {
        let net = funded_net(&[100], test_params());
        send(&net, 100, 5);
        let cheap = send(&net, 100, 1);
        send(&net, 100, 3);

        assert_eq!(
            request_batch(&net),
            MsgResponse::BatchCreated {
                token_contract: TOKEN,
                batch_nonce: 1
            }
        );
        let batch = net.service.batch_tx(&TOKEN, 1).unwrap();
        let fees: Vec<U256> = batch.transactions.iter().map(|t| t.fee.amount).collect();
        assert_eq!(fees, vec![U256::from(5u64), U256::from(3u64)]);

        let pending = net.service.unbatched_transfers(&sender(), Pagination::default());
        assert_eq!(pending.total, 1);
        assert_eq!(pending.items[0].id, cheap);
    }

    #[test]
    fn test_equal_fees_keep_submission_order() {
        let net = funded_net(&[100], test_params());
        let first = send(&net, 10, 4);
        let second = send(&net, 10, 4);
        send(&net, 10, 4);

        request_batch(&net);
        let ids: Vec<u64> = net
            .service
            .batch_tx(&TOKEN, 1)
            .unwrap()
            .transactions
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_batch_nonces_increase_by_one() {
        let net = funded_net(&[100], test_params());
        for expected in 1..=4u64 {
            send(&net, 10, expected);
            match request_batch(&net) {
                MsgResponse::BatchCreated { batch_nonce, .. } => assert_eq!(batch_nonce, expected),
                other => panic!("unexpected response {:?}", other),
            }
        }
        assert_eq!(net.service.batch_txs(&TOKEN).len(), 4);
        assert!(matches!(
            net.service.request_batch_tx(MsgRequestBatchTx {
                signer: net.orchestrators[0].account,
                denom: net.voucher(),
            }),
            Err(BridgeError::NothingToBatch(_))
        ));
    }

    #[test]
    fn test_unbatched_pagination() {
        let net = funded_net(&[100], test_params());
        for fee in 1..=5u64 {
            send(&net, 10, fee);
        }
        let page = net
            .service
            .unbatched_transfers(&sender(), Pagination { offset: 3, limit: 10 });
        assert_eq!(page.total, 5);
        let ids: Vec<u64> = page.items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    // =============================================================================
    // CANCELLATION
    // =============================================================================

    #[test]
    fn test_cancel_refunds_once() {
        let net = funded_net(&[100], test_params());
        let id = send(&net, 100, 5);
        assert_eq!(net.bank.balance(&sender(), &net.voucher()), U256::from(9_895u64));

        let cancel = MsgCancelSendToEthereum { sender: sender(), id };
        net.service.cancel_send_to_ethereum(cancel.clone()).unwrap();
        assert_eq!(net.bank.balance(&sender(), &net.voucher()), U256::from(10_000u64));

        assert!(matches!(
            net.service.cancel_send_to_ethereum(cancel),
            Err(BridgeError::TransferNotFound(_))
        ));
        assert_eq!(net.bank.balance(&sender(), &net.voucher()), U256::from(10_000u64));
        assert_eq!(net.bank.module_balance(&net.voucher()), U256::zero());
    }

    #[test]
    fn test_cancel_after_batching_rejected() {
        let net = funded_net(&[100], test_params());
        let id = send(&net, 100, 5);
        request_batch(&net);

        let err = net
            .service
            .cancel_send_to_ethereum(MsgCancelSendToEthereum { sender: sender(), id })
            .unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyBatched { batch_nonce: 1, .. }));
        assert_eq!(net.bank.balance(&sender(), &net.voucher()), U256::from(9_895u64));
    }

    // =============================================================================
    // EXECUTION
    // =============================================================================

    #[test]
    fn test_confirmed_batch_executes_and_burns() {
        let mut net = funded_net(&[40, 35, 25], test_params());
        send(&net, 100, 5);
        send(&net, 200, 7);
        request_batch(&net);
        let subject = SubjectRef::Batch {
            token_contract: TOKEN,
            nonce: 1,
        };

        for index in 0..3 {
            net.confirm(index, subject).unwrap();
        }
        let confirmations = net.service.confirmations(&subject);
        assert_eq!(confirmations.len(), 3);
        for (index, orchestrator) in net.orchestrators.iter().enumerate() {
            assert!(
                confirmations
                    .iter()
                    .any(|c| c.ethereum_signer == orchestrator.signer.address()),
                "missing confirmation from orchestrator {}",
                index
            );
        }

        let executed = EthereumEvent::BatchExecuted(BatchExecuted {
            event_nonce: net.next_event_nonce(),
            token_contract: TOKEN,
            batch_nonce: 1,
            ethereum_height: 120,
        });
        net.vote_all(&executed);

        assert!(net.service.batch_tx(&TOKEN, 1).is_none());
        assert!(net.service.confirmations(&subject).is_empty());
        assert_eq!(net.bank.module_balance(&net.voucher()), U256::zero());
        assert_eq!(net.bank.supply(&net.voucher()), U256::from(10_000u64 - 312));
        assert!(net
            .service
            .drain_events()
            .contains(&BridgeEvent::BatchExecuted {
                token_contract: TOKEN,
                batch_nonce: 1
            }));
    }

    #[test]
    fn test_confirmation_from_wrong_key_rejected() {
        let net = funded_net(&[50, 50], test_params());
        send(&net, 100, 5);
        request_batch(&net);
        let subject = SubjectRef::Batch {
            token_contract: TOKEN,
            nonce: 1,
        };

        let mut msg = net.confirmation_msg(0, subject);
        msg.signer = net.orchestrators[1].account;
        assert!(matches!(
            net.service.submit_ethereum_tx_confirmation(msg),
            Err(BridgeError::InvalidSignature(_))
        ));
        assert!(net.service.confirmations(&subject).is_empty());

        let missing = SubjectRef::Batch {
            token_contract: TOKEN,
            nonce: 9,
        };
        let mut msg = net.confirmation_msg(0, subject);
        msg.subject = missing;
        assert!(matches!(
            net.service.submit_ethereum_tx_confirmation(msg),
            Err(BridgeError::UnknownSubject(_))
        ));
    }

    // =============================================================================
    // TIMEOUT
    // =============================================================================

    #[test]
    fn test_batch_times_out_at_agreed_height() {
        let mut net = funded_net(&[40, 35, 25], test_params());
        send(&net, 100, 5);
        request_batch(&net);
        // 150s at 15s per block
        assert_eq!(net.service.batch_tx(&TOKEN, 1).unwrap().timeout, 10);

        // one report is not consensus
        net.service
            .ethereum_height_vote(MsgEthereumHeightVote {
                signer: net.orchestrators[0].account,
                ethereum_height: 50,
            })
            .unwrap();
        let report = net.end_block();
        assert_eq!(report.observed_ethereum_height, None);
        assert!(report.timed_out_batches.is_empty());

        net.service
            .ethereum_height_vote(MsgEthereumHeightVote {
                signer: net.orchestrators[1].account,
                ethereum_height: 40,
            })
            .unwrap();
        let report = net.end_block();
        assert_eq!(report.observed_ethereum_height, Some(40));
        assert_eq!(report.timed_out_batches, vec![(TOKEN, 1)]);
        assert_eq!(net.service.latest_ethereum_height().ethereum_height, 40);

        let pending = net.service.unbatched_transfers(&sender(), Pagination::default());
        assert_eq!(pending.total, 1);
        assert_eq!(request_batch(&net), MsgResponse::BatchCreated {
            token_contract: TOKEN,
            batch_nonce: 2
        });
        assert_eq!(net.service.batch_tx(&TOKEN, 2).unwrap().timeout, 50);
    }

    #[test]
    fn test_automatic_batching() {
        let mut net = funded_net(
            &[100],
            Params {
                batch_creation_period: 3,
                ..test_params()
            },
        );
        send(&net, 10, 1);

        let reports = net.run_through(3);
        assert!(reports[0].created_batches.is_empty());
        assert!(reports[1].created_batches.is_empty());
        assert_eq!(reports[2].created_batches, vec![(TOKEN, 1)]);
        assert!(net.service.last_batch_tx(&TOKEN).is_some());
    }
}
