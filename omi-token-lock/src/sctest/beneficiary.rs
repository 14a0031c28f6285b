use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    const DAY: u64 = 24 * 60 * 60 * 1000;

    #[concordium_test]
    /// A grant is not released before its maturity and exactly once after it.
    fn test_release_tokens_after_maturity() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        let start = LockAnchor::Fixed(Timestamp::from_timestamp_millis(0));
        state.add_lock(&USER1, start, Duration::from_days(30), 100.into()).unwrap();
        state.add_lock(&USER1, start, Duration::from_days(60), 200.into()).unwrap();
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        // no transfer is mocked, so the call must not invoke the token
        let ctx = receive_ctx(USER1, &[], 30 * DAY - 1);
        let ret = contract_release_tokens(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 300.into());
        claim!(logger.logs.is_empty(), "Nothing should be released");

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER1, 100)]),
        );
        let ctx = receive_ctx(USER1, &[], 30 * DAY);
        let ret = contract_release_tokens(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 200.into());
        claim_eq!(
            logger.logs,
            vec![to_bytes(&LockEvent::Released {
                beneficiary: USER1,
                index: 0,
                amount: 100.into(),
            })]
        );

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER1, 200)]),
        );
        let ctx = receive_ctx(USER1, &[], 90 * DAY);
        let ret = contract_release_tokens(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 0.into());
        claim_eq!(host.state().active_amount(&USER1), 0.into());

        let ret = contract_release_tokens(&ctx, &mut host, &mut logger);
        claim_eq!(
            ret,
            Err(CustomContractError::NoLocks.into()),
            "Everything is released already"
        );
    }

    #[concordium_test]
    fn test_release_without_locks() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(USER2, &[], 0);
        claim_eq!(
            contract_release_tokens(&ctx, &mut host, &mut logger),
            Err(CustomContractError::NoLocks.into())
        );
    }

    #[concordium_test]
    /// Sale-anchored grants mature from the recorded finish time.
    fn test_release_sale_anchored_grant() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state
            .add_lock(&USER1, LockAnchor::SaleFinish, Duration::from_days(7), 50.into())
            .unwrap();
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(USER1, &[], 365 * DAY);
        claim!(contract_release_tokens(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().total_locked, 50.into(), "Sale is not finished");

        host.state_mut().finished_at = Some(Timestamp::from_timestamp_millis(400 * DAY));
        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER1, 50)]),
        );
        let ctx = receive_ctx(USER1, &[], 407 * DAY);
        claim!(contract_release_tokens(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().total_locked, 0.into());
    }

    #[concordium_test]
    fn test_release_tokens_while_paused() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state
            .add_lock(
                &USER1,
                LockAnchor::Fixed(Timestamp::from_timestamp_millis(0)),
                Duration::from_millis(1),
                10.into(),
            )
            .unwrap();
        state.paused = true;
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(USER1, &[], 10);
        claim_eq!(
            contract_release_tokens(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );
        claim_eq!(host.state().total_locked, 10.into());
    }
}
