use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    fn lock_params(beneficiary: Address, amount: u128) -> LockTokensParams {
        LockTokensParams {
            beneficiary,
            anchor: LockAnchor::SaleFinish,
            duration: Duration::from_days(30),
            amount: amount.into(),
        }
    }

    #[concordium_test]
    /// The grant is recorded first, then the tokens are pulled from the provider.
    /// The pulled tokens arrive through the receive hook and leave the pool again.
    fn test_lock_tokens_with_allowance() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transferFrom".into()),
            MockFn::new_v1(|parameter, _amount, _balance, state: &mut State<_>| {
                let params: TransferFromParams = match from_bytes(parameter.as_ref()) {
                    Ok(params) => params,
                    Err(_) => return Err(CallContractError::Trap),
                };
                if params.owner != PROVIDER
                    || params.to.address() != Address::Contract(SELF_ADDRESS)
                    || state.total_locked != params.amount
                {
                    return Err(CallContractError::Trap);
                }
                state.credit_deposit(params.amount);
                Ok((true, ()))
            }),
        );

        let params = to_bytes(&lock_params(USER1, 8_333));
        let ctx = receive_ctx(Address::Contract(CROWDSALE), &params, 0);
        let ret = contract_lock_tokens(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");

        claim_eq!(host.state().lock_count(&USER1), 1);
        claim_eq!(host.state().beneficiary_count, 1);
        claim_eq!(host.state().unallocated, 0.into());
        claim_eq!(
            host.state().get_lock(&USER1, 0),
            Some(TokenLock {
                amount: 8_333.into(),
                anchor: LockAnchor::SaleFinish,
                duration: Duration::from_days(30),
                released: false,
                revoked: false,
            })
        );
        claim_eq!(
            logger.logs,
            vec![to_bytes(&LockEvent::Locked {
                beneficiary: USER1,
                index: 0,
                amount: 8_333.into(),
                anchor: LockAnchor::SaleFinish,
                duration: Duration::from_days(30),
            })]
        );
    }

    #[concordium_test]
    fn test_lock_tokens_rejections() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Deposit);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&lock_params(USER1, 10));
        let ctx = receive_ctx(USER1, &params, 0);
        claim_eq!(
            contract_lock_tokens(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized),
            "Only the crowdsale or the owner may lock"
        );

        let ctx = receive_ctx(Address::Contract(CROWDSALE), &params, 0);
        claim_eq!(
            contract_lock_tokens(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InsufficientDeposit.into())
        );

        let params = to_bytes(&lock_params(USER1, 0));
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 0);
        claim_eq!(
            contract_lock_tokens(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InvalidInput.into())
        );

        host.state_mut().paused = true;
        let params = to_bytes(&lock_params(USER1, 10));
        let ctx = receive_ctx(Address::Contract(CROWDSALE), &params, 0);
        claim_eq!(
            contract_lock_tokens(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Deposits from the token fund later grants without any token call.
    fn test_lock_tokens_from_deposit() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Deposit);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let deposit = to_bytes(&OnReceivingCis2Params {
            token_id: TokenIdUnit(),
            amount: ContractTokenAmount::from(1_000),
            from: PROVIDER,
            data: AdditionalData::empty(),
        });
        let ctx = receive_ctx(Address::Contract(CROWDSALE), &deposit, 0);
        claim_eq!(
            contract_on_receiving_cis2(&ctx, &mut host),
            Err(ContractError::Unauthorized),
            "Only the token may deposit"
        );
        let ctx = receive_ctx(PROVIDER, &deposit, 0);
        claim_eq!(
            contract_on_receiving_cis2(&ctx, &mut host),
            Err(CustomContractError::ContractOnly.into())
        );

        let ctx = receive_ctx(Address::Contract(TOKEN), &deposit, 0);
        claim!(contract_on_receiving_cis2(&ctx, &mut host).is_ok());
        claim_eq!(host.state().unallocated, 1_000.into());

        let params = to_bytes(&lock_params(USER2, 600));
        let ctx = receive_ctx(Address::Contract(CROWDSALE), &params, 0);
        claim!(contract_lock_tokens(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().unallocated, 400.into());
        claim_eq!(host.state().total_locked, 600.into());
    }

    #[concordium_test]
    fn test_finish_crowdsale_once() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(USER1, &[], 500);
        claim_eq!(
            contract_finish_crowdsale(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(Address::Account(OWNER_ACC), &[], 500);
        claim_eq!(
            contract_finish_crowdsale(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized),
            "The registered crowdsale alone finishes the sale"
        );

        let ctx = receive_ctx(Address::Contract(CROWDSALE), &[], 500);
        claim!(contract_finish_crowdsale(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(
            host.state().finished_at,
            Some(Timestamp::from_timestamp_millis(500))
        );

        let ctx = receive_ctx(Address::Contract(CROWDSALE), &[], 600);
        claim_eq!(
            contract_finish_crowdsale(&ctx, &mut host, &mut logger),
            Err(CustomContractError::AlreadyFinished.into())
        );
        claim_eq!(
            logger.logs,
            vec![to_bytes(&LockEvent::CrowdsaleFinished {
                at: Timestamp::from_timestamp_millis(500)
            })]
        );
    }

    #[concordium_test]
    /// Without a registered crowdsale the owner finishes the sale,
    /// and no crowdsale can be registered afterwards.
    fn test_owner_finishes_without_crowdsale() {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, TOKEN, PROVIDER, FundingMode::Deposit);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(Address::Account(OWNER_ACC), &[], 500);
        claim!(contract_finish_crowdsale(&ctx, &mut host, &mut logger).is_ok());

        let params = to_bytes(&CROWDSALE);
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 600);
        claim_eq!(
            contract_set_crowdsale_address(&ctx, &mut host),
            Err(CustomContractError::AlreadyFinished.into())
        );
        claim_eq!(host.state().crowdsale, None);
    }

    #[concordium_test]
    /// Tokens sent to the ledger outside of a pull can be withdrawn.
    fn test_stray_receipt_with_allowance() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, FundingMode::Allowance);
        let mut host = TestHost::new(state, state_builder);

        let receipt = to_bytes(&OnReceivingCis2Params {
            token_id: TokenIdUnit(),
            amount: ContractTokenAmount::from(250),
            from: USER2,
            data: AdditionalData::empty(),
        });
        let ctx = receive_ctx(Address::Contract(TOKEN), &receipt, 0);
        claim!(contract_on_receiving_cis2(&ctx, &mut host).is_ok());
        claim_eq!(host.state().unallocated, 250.into());
        claim_eq!(host.state().total_locked, 0.into());

        host.setup_mock_entrypoint(
            TOKEN,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            expect_transfers(vec![(USER2, 250)]),
        );
        let params = to_bytes(&WithdrawParams {
            to: USER2,
            amount: 250.into(),
        });
        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params, 10);
        claim!(contract_withdraw_unallocated(&ctx, &mut host).is_ok());
        claim_eq!(host.state().unallocated, 0.into());
    }
}
