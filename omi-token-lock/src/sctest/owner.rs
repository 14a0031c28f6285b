use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    fn fixed(millis: u64) -> LockAnchor {
        LockAnchor::Fixed(Timestamp::from_timestamp_millis(millis))
    }

    #[concordium_test]
    fn test_set_addresses_owner_only() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);
        let new_crowdsale = ContractAddress::new(9, 0);

        let params = to_bytes(&new_crowdsale);
        let ctx = receive_ctx(USER1, &params, 0);
        claim_eq!(
            contract_set_crowdsale_address(&ctx, &mut host),
            Err(ContractError::Unauthorized)
        );
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 0);
        claim!(contract_set_crowdsale_address(&ctx, &mut host).is_ok());
        claim_eq!(host.state().crowdsale, Some(new_crowdsale));

        let params = to_bytes(&USER3);
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 0);
        claim!(contract_set_allowance_address(&ctx, &mut host).is_ok());
        claim_eq!(host.state().allowance_provider, USER3);
    }

    #[concordium_test]
    fn test_pause_and_unpause() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);

        let ctx = receive_ctx(Address::Account(OWNER_ACC), &[], 0);
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

        let ctx = receive_ctx(USER1, &[], 0);
        claim_eq!(contract_pause(&ctx, &mut host), Err(ContractError::Unauthorized));
    }

    #[concordium_test]
    /// The owner can unwind matured grants while the ledger is paused.
    fn test_release_by_address_while_paused() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state.add_lock(&USER1, fixed(0), Duration::from_millis(10), 10.into()).unwrap();
        state.add_lock(&USER1, fixed(0), Duration::from_millis(20), 20.into()).unwrap();
        state.paused = true;
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();
        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER1, 30)]),
        );

        let params = to_bytes(&USER1);
        let ctx = receive_ctx(USER1, &params, 20);
        claim_eq!(
            contract_release_tokens_by_address(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 20);
        let ret = contract_release_tokens_by_address(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 0.into());
        claim_eq!(logger.logs.len(), 2, "One event per released grant");
    }

    #[concordium_test]
    /// A contract beneficiary is paid through its CIS-2 receive hook.
    fn test_release_to_contract_beneficiary() {
        let vault = ContractAddress::new(7, 0);
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state
            .add_lock(&Address::Contract(vault), fixed(0), Duration::from_millis(10), 15.into())
            .unwrap();
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();
        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            MockFn::new_v1(move |parameter, _amount, _balance, _state| {
                let params: ContractTransferParams = match from_bytes(parameter.as_ref()) {
                    Ok(params) => params,
                    Err(_) => return Err(CallContractError::Trap),
                };
                let to_hook = params.0.iter().all(|transfer| match &transfer.to {
                    Receiver::Contract(address, entrypoint) => {
                        *address == vault
                            && entrypoint.as_entrypoint_name()
                                == EntrypointName::new_unchecked("onReceivingCIS2")
                    },
                    Receiver::Account(_) => false,
                });
                if params.0.len() != 1 || !to_hook {
                    return Err(CallContractError::Trap);
                }
                Ok((false, ()))
            }),
        );

        let params = to_bytes(&Address::Contract(vault));
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 10);
        let ret = contract_release_tokens_by_address(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 0.into());
    }

    #[concordium_test]
    /// Beneficiaries without active grants are skipped, the rest are paid in one transfer.
    fn test_release_all() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state.add_lock(&USER1, fixed(0), Duration::from_millis(10), 10.into()).unwrap();
        state.add_lock(&USER2, fixed(0), Duration::from_millis(10), 20.into()).unwrap();
        state.add_lock(&USER3, fixed(0), Duration::from_millis(10), 30.into()).unwrap();
        state.add_lock(&USER3, fixed(0), Duration::from_millis(99), 40.into()).unwrap();
        state.revoke(&USER2, 0, Timestamp::from_timestamp_millis(5)).unwrap();
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&ReleaseRangeParams { from: 0, to: 4 });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 10);
        claim_eq!(
            contract_release_all(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InvalidIndexRange.into())
        );
        let params = to_bytes(&ReleaseRangeParams { from: 2, to: 2 });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 10);
        claim_eq!(
            contract_release_all(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InvalidIndexRange.into())
        );

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER1, 10), (USER3, 30)]),
        );
        let params = to_bytes(&ReleaseRangeParams { from: 0, to: 3 });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 10);
        let ret = contract_release_all(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_locked, 40.into());
        claim_eq!(host.state().active_amount(&USER3), 40.into());
    }

    #[concordium_test]
    fn test_revoke_and_withdraw() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder, FundingMode::Allowance);
        state.add_lock(&USER1, fixed(0), Duration::from_millis(100), 70.into()).unwrap();
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&RevokeLockParams {
            beneficiary: USER1,
            index: 0,
        });
        let ctx = receive_ctx(USER1, &params, 50);
        claim_eq!(
            contract_revoke_lock_by_index(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 50);
        claim!(contract_revoke_lock_by_index(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().total_locked, 0.into());
        claim_eq!(host.state().unallocated, 70.into());
        claim_eq!(
            logger.logs,
            vec![to_bytes(&LockEvent::Revoked {
                beneficiary: USER1,
                index: 0,
                amount: 70.into(),
            })]
        );

        let params = to_bytes(&WithdrawParams {
            to: USER3,
            amount: 71.into(),
        });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 60);
        claim_eq!(
            contract_withdraw_unallocated(&ctx, &mut host),
            Err(CustomContractError::InsufficientDeposit.into())
        );

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER3, 70)]),
        );
        let params = to_bytes(&WithdrawParams {
            to: USER3,
            amount: 70.into(),
        });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 60);
        claim!(contract_withdraw_unallocated(&ctx, &mut host).is_ok());
        claim_eq!(host.state().unallocated, 0.into());
    }
}
