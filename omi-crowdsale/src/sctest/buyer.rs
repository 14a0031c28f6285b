use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    fn locked(calls: &LedgerCalls) -> Vec<(Duration, u128)> {
        calls
            .locks
            .borrow()
            .iter()
            .map(|params| (params.duration, params.amount.0))
            .collect()
    }

    #[concordium_test]
    /// A pre-sale purchase is paid to the wallet and locked in three tranches.
    fn test_buy_in_pre_sale() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let amount = Amount::from_micro_ccd(150_000_000);
        host.set_self_balance(amount);

        let ctx = receive_ctx(BUYER1, &[], PRE_SALE_TIME);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");

        claim_eq!(host.get_transfers(), [(WALLET_ACC, amount)]);
        claim_eq!(
            locked(&calls),
            vec![
                (Duration::from_days(30), 8_333),
                (Duration::from_days(60), 8_333),
                (Duration::from_days(90), 8_334),
            ]
        );
        claim!(calls
            .locks
            .borrow()
            .iter()
            .all(|params| params.beneficiary == BUYER1 && params.anchor == LockAnchor::SaleFinish));
        claim_eq!(calls.finished.get(), 0, "Sale should stay open");

        claim_eq!(host.state().tokens_sold, 25_000);
        claim_eq!(host.state().purchase_record(&BUYER1).to_vec(), vec![25_000, 0, 0]);
        claim_eq!(
            logger.logs,
            vec![to_bytes(&SaleEvent::Purchase(PurchaseEvent {
                payer: BUYER1,
                beneficiary: BUYER1,
                value: amount,
                tokens: 25_000,
                stage: Stage::PreSale1,
                rate: 6_000,
            }))]
        );
    }

    #[concordium_test]
    fn test_buy_rejections() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let amount = Amount::from_micro_ccd(150_000_000);
        host.set_self_balance(amount);

        let ctx = receive_ctx(BUYER2, &[], PRE_SALE_TIME);
        claim_eq!(
            contract_buy(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::NotWhitelisted.into())
        );

        let params = to_bytes(&BUYER2);
        let ctx = receive_ctx(BUYER1, &params, PRE_SALE_TIME);
        claim_eq!(
            contract_buy_tokens(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::BeneficiaryMismatch.into())
        );

        let ctx = receive_ctx(BUYER1, &[], PRE_SALE_TIME);
        claim_eq!(
            contract_buy(&ctx, &mut host, Amount::from_micro_ccd(6_000), &mut logger),
            Err(CustomContractError::BelowMinimumPurchase.into())
        );

        host.state_mut().paused = true;
        claim_eq!(
            contract_buy(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );

        host.state_mut().paused = false;
        host.state_mut().current_stage = Stage::MainSale;
        claim_eq!(
            contract_buy(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::SaleNotStarted.into())
        );

        claim!(host.get_transfers().is_empty(), "Nothing should be paid");
        claim!(calls.locks.borrow().is_empty());
        claim!(logger.logs.is_empty());
        claim_eq!(host.state().tokens_sold, 0);
    }

    #[concordium_test]
    /// A purchase taking exactly the remaining stage tokens advances the stage.
    fn test_buy_up_to_stage_cap() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.stages.pre_sale_1.sold = 50_000_000 - 30_000;
        let mut host = TestHost::new(state, state_builder);
        let _calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let ctx = receive_ctx(BUYER1, &[], PRE_SALE_TIME);

        let amount = Amount::from_micro_ccd(30_001 * 6_000);
        host.set_self_balance(amount);
        claim_eq!(
            contract_buy(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::StageCapExceeded.into())
        );

        let amount = Amount::from_micro_ccd(30_000 * 6_000);
        host.set_self_balance(amount);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().current_stage, Stage::PreSale2);
        claim_eq!(host.state().stages.pre_sale_1.sold, 50_000_000);
        claim_eq!(logger.logs.len(), 2);
        claim_eq!(
            logger.logs[1],
            to_bytes(&SaleEvent::StageAdvanced(StageAdvancedEvent {
                from: Stage::PreSale1,
                to: Stage::PreSale2,
            }))
        );

        // priced with the discount of the second pre-sale
        let amount = Amount::from_micro_ccd(25_000 * 7_000);
        host.set_self_balance(amount);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().purchase_record(&BUYER1).to_vec(), vec![30_000, 25_000, 0]);
    }

    #[concordium_test]
    /// Reaching the USD goal finalizes the sale and finishes the ledger.
    fn test_buy_reaching_usd_goal() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.usd_raised = FUNDING_GOAL_USD;
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let amount = Amount::from_micro_ccd(150_000_000);
        host.set_self_balance(amount);

        let ctx = receive_ctx(BUYER1, &[], PRE_SALE_TIME);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim!(host.state().finalized);
        claim_eq!(calls.finished.get(), 1);
        claim_eq!(calls.locks.borrow().len(), 3);
        claim_eq!(logger.logs.len(), 2, "Purchase and finalization");

        host.set_self_balance(amount);
        claim_eq!(
            contract_buy(&ctx, &mut host, amount, &mut logger),
            Err(CustomContractError::SaleFinalized.into())
        );
        claim_eq!(calls.finished.get(), 1);
    }

    #[concordium_test]
    /// A purchase at the end time opens the main sale and finalizes it at once.
    fn test_buy_at_end_time() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let amount = Amount::from_micro_ccd(25_000_000);
        host.set_self_balance(amount);

        let ctx = receive_ctx(BUYER1, &[], SALE_END_MILLIS);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");

        claim_eq!(locked(&calls), vec![(Duration::from_days(7), 2_500)]);
        claim_eq!(calls.finished.get(), 1);
        claim_eq!(
            logger.logs,
            vec![
                to_bytes(&SaleEvent::StageAdvanced(StageAdvancedEvent {
                    from: Stage::PreSale1,
                    to: Stage::MainSale,
                })),
                to_bytes(&SaleEvent::Purchase(PurchaseEvent {
                    payer: BUYER1,
                    beneficiary: BUYER1,
                    value: amount,
                    tokens: 2_500,
                    stage: Stage::MainSale,
                    rate: 10_000,
                })),
                to_bytes(&SaleEvent::Finalized(FinalizedEvent {
                    at: Timestamp::from_timestamp_millis(SALE_END_MILLIS),
                    tokens_sold: 2_500,
                    usd_raised: 0,
                })),
            ]
        );
    }

    #[concordium_test]
    fn test_buy_for_third_party() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.allow_third_party = true;
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();
        let amount = Amount::from_micro_ccd(150_000_000);
        host.set_self_balance(amount);

        let params = to_bytes(&BUYER1);
        let ctx = receive_ctx(BUYER2, &params, PRE_SALE_TIME);
        let ret = contract_buy_tokens(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");

        claim!(calls.locks.borrow().iter().all(|params| params.beneficiary == BUYER1));
        claim_eq!(host.state().purchase_record(&BUYER1).to_vec(), vec![25_000, 0, 0]);
        claim_eq!(host.state().purchase_record(&BUYER2).to_vec(), vec![0, 0, 0]);
    }
}
