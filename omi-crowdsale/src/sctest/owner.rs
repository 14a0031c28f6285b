use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    const OWNER: Address = Address::Account(OWNER_ACC);

    #[concordium_test]
    fn test_set_rate() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&20_000u64);
        let ctx = receive_ctx(BUYER1, &params, 0);
        claim_eq!(
            contract_set_rate(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let zero = to_bytes(&0u64);
        let ctx = receive_ctx(OWNER, &zero, 0);
        claim_eq!(
            contract_set_rate(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InvalidRate.into())
        );

        let ctx = receive_ctx(OWNER, &params, 0);
        claim!(contract_set_rate(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().rate, 20_000);
        claim_eq!(host.state().effective_rate(Stage::PreSale1), Ok(12_000));
        claim_eq!(
            logger.logs,
            vec![to_bytes(&SaleEvent::RateUpdated(RateUpdatedEvent {
                old_rate: DEFAULT_RATE,
                new_rate: 20_000,
            }))]
        );
    }

    #[concordium_test]
    fn test_manage_whitelist() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let params = to_bytes(&BUYER2);
        let ctx = receive_ctx(BUYER2, &params, 0);
        claim_eq!(
            contract_add_to_whitelist(&ctx, &mut host),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(OWNER, &params, 0);
        claim!(contract_add_to_whitelist(&ctx, &mut host).is_ok());
        claim!(host.state().is_whitelisted(&BUYER2));

        claim!(contract_remove_from_whitelist(&ctx, &mut host).is_ok());
        claim!(!host.state().is_whitelisted(&BUYER2));
        claim!(host.state().is_whitelisted(&BUYER1));

        let many = to_bytes(&vec![BUYER2, Address::Contract(TOKEN)]);
        let ctx = receive_ctx(OWNER, &many, 0);
        claim!(contract_add_many_to_whitelist(&ctx, &mut host).is_ok());
        claim!(host.state().is_whitelisted(&BUYER2));
        claim!(host.state().is_whitelisted(&Address::Contract(TOKEN)));
    }

    #[concordium_test]
    /// A buyer can purchase right after being whitelisted.
    fn test_whitelisted_buyer_can_buy() {
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
        let ctx = receive_ctx(OWNER, &params, PRE_SALE_TIME);
        claim!(contract_add_to_whitelist(&ctx, &mut host).is_ok());

        let ctx = receive_ctx(BUYER2, &[], PRE_SALE_TIME);
        let ret = contract_buy(&ctx, &mut host, amount, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.get_transfers(), [(WALLET_ACC, amount)]);
        claim_eq!(calls.locks.borrow().len(), 3);
        claim_eq!(host.state().purchase_record(&BUYER2).to_vec(), vec![25_000, 0, 0]);
    }

    #[concordium_test]
    fn test_pause_and_unpause() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let ctx = receive_ctx(OWNER, &[], 0);
        claim_eq!(
            contract_unpause(&ctx, &mut host),
            Err(CustomContractError::ContractNotPaused.into())
        );
        claim!(contract_pause(&ctx, &mut host).is_ok());
        claim_eq!(
            contract_pause(&ctx, &mut host),
            Err(CustomContractError::ContractPaused.into())
        );
        claim!(contract_unpause(&ctx, &mut host).is_ok());

        let ctx = receive_ctx(BUYER1, &[], 0);
        claim_eq!(contract_pause(&ctx, &mut host), Err(ContractError::Unauthorized));
    }

    #[concordium_test]
    /// The owner can close the sale once the reported USD reaches the goal.
    fn test_finalize_after_usd_report() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(OWNER, &[], PRE_SALE_TIME);
        claim_eq!(
            contract_finalize(&ctx, &mut host, &mut logger),
            Err(CustomContractError::SaleNotClosed.into())
        );

        let params = to_bytes(&FUNDING_GOAL_USD);
        let ctx = receive_ctx(BUYER1, &params, PRE_SALE_TIME);
        claim_eq!(
            contract_set_usd_raised(&ctx, &mut host),
            Err(ContractError::Unauthorized)
        );
        let ctx = receive_ctx(OWNER, &params, PRE_SALE_TIME);
        claim!(contract_set_usd_raised(&ctx, &mut host).is_ok());
        claim_eq!(host.state().usd_raised, FUNDING_GOAL_USD);

        let ctx = receive_ctx(OWNER, &[], PRE_SALE_TIME);
        claim!(contract_finalize(&ctx, &mut host, &mut logger).is_ok());
        claim!(host.state().finalized);
        claim_eq!(calls.finished.get(), 1);
        claim_eq!(
            logger.logs,
            vec![to_bytes(&SaleEvent::Finalized(FinalizedEvent {
                at: Timestamp::from_timestamp_millis(PRE_SALE_TIME),
                tokens_sold: 0,
                usd_raised: FUNDING_GOAL_USD,
            }))]
        );

        claim_eq!(
            contract_finalize(&ctx, &mut host, &mut logger),
            Err(CustomContractError::SaleFinalized.into())
        );
        claim_eq!(calls.finished.get(), 1);
    }

    #[concordium_test]
    fn test_finalize_after_end_time() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        let calls = mock_ledger(&mut host);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(BUYER1, &[], SALE_END_MILLIS);
        claim_eq!(
            contract_finalize(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(OWNER, &[], SALE_END_MILLIS);
        claim!(contract_finalize(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(calls.finished.get(), 1);
    }
}
