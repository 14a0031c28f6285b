use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;
    use concordium_cis2::AdditionalData;

    fn transfer_params(from: Address, to: Receiver, amount: u128) -> ContractTransferParams {
        TransferParams::from(vec![Transfer {
            token_id: TokenIdUnit(),
            amount: amount.into(),
            from,
            to,
            data: AdditionalData::empty(),
        }])
    }

    #[concordium_test]
    fn test_transfer() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 1_000);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&transfer_params(ALICE, Receiver::from_account(BOB_ACC), 400));
        let ctx = receive_ctx(ALICE, &params);
        let ret = contract_transfer(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");

        claim_eq!(host.state().balance(&ALICE), 600.into());
        claim_eq!(host.state().balance(&BOB), 400.into());
        claim_eq!(
            logger.logs,
            vec![to_bytes(&TokenEvent::Cis2(Cis2Event::Transfer(
                TransferEvent {
                    token_id: TokenIdUnit(),
                    amount: 400.into(),
                    from: ALICE,
                    to: BOB,
                }
            )))]
        );
    }

    #[concordium_test]
    fn test_transfer_rejections() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 1_000);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        // someone else's tokens
        let params = to_bytes(&transfer_params(ALICE, Receiver::from_account(BOB_ACC), 1));
        let ctx = receive_ctx(BOB, &params);
        claim_eq!(
            contract_transfer(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let params = to_bytes(&transfer_params(ALICE, Receiver::from_account(BOB_ACC), 1_001));
        let ctx = receive_ctx(ALICE, &params);
        claim_eq!(
            contract_transfer(&ctx, &mut host, &mut logger),
            Err(ContractError::InsufficientFunds)
        );

        host.state_mut().paused = true;
        let params = to_bytes(&transfer_params(ALICE, Receiver::from_account(BOB_ACC), 1));
        let ctx = receive_ctx(ALICE, &params);
        claim_eq!(
            contract_transfer(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );
        claim_eq!(host.state().balance(&ALICE), 1_000.into());
    }

    #[concordium_test]
    /// The receiving contract already sees its new balance when the hook runs.
    fn test_transfer_to_contract_invokes_hook() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 1_000);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();
        let receiver_address = Address::Contract(RECEIVER_CONTRACT);

        host.setup_mock_entrypoint(
            RECEIVER_CONTRACT,
            OwnedEntrypointName::new_unchecked("onReceivingCIS2".into()),
            MockFn::new_v1(move |parameter, _amount, _balance, state: &mut State<_>| {
                let params: OnReceivingCis2Params<ContractTokenId, ContractTokenAmount> =
                    match from_bytes(parameter.as_ref()) {
                        Ok(params) => params,
                        Err(_) => return Err(CallContractError::Trap),
                    };
                if params.from != ALICE || state.balance(&receiver_address) != params.amount {
                    return Err(CallContractError::Trap);
                }
                Ok((false, ()))
            }),
        );

        let to = Receiver::from_contract(
            RECEIVER_CONTRACT,
            OwnedEntrypointName::new_unchecked("onReceivingCIS2".into()),
        );
        let params = to_bytes(&transfer_params(ALICE, to, 250));
        let ctx = receive_ctx(ALICE, &params);
        let ret = contract_transfer(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().balance(&receiver_address), 250.into());
    }

    #[concordium_test]
    fn test_transfer_from_spends_allowance() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 1_000);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&AllowanceParams {
            spender: BOB,
            amount: 300.into(),
        });
        let ctx = receive_ctx(ALICE, &params);
        claim!(contract_approve(&ctx, &mut host, &mut logger).is_ok());

        let params = to_bytes(&TransferFromParams {
            owner: ALICE,
            to: Receiver::from_account(BOB_ACC),
            amount: 301.into(),
        });
        let ctx = receive_ctx(BOB, &params);
        claim_eq!(
            contract_transfer_from(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InsufficientAllowance.into())
        );

        let params = to_bytes(&TransferFromParams {
            owner: ALICE,
            to: Receiver::from_account(BOB_ACC),
            amount: 200.into(),
        });
        let ctx = receive_ctx(BOB, &params);
        claim!(contract_transfer_from(&ctx, &mut host, &mut logger).is_ok());

        claim_eq!(host.state().balance(&BOB), 200.into());
        claim_eq!(host.state().allowance(&ALICE, &BOB), 100.into());
        claim!(logger.logs.contains(&to_bytes(&TokenEvent::Approval(ApprovalEvent {
            owner: ALICE,
            spender: BOB,
            amount: 100.into(),
        }))));

        host.state_mut().paused = true;
        let params = to_bytes(&TransferFromParams {
            owner: ALICE,
            to: Receiver::from_account(BOB_ACC),
            amount: 1.into(),
        });
        let ctx = receive_ctx(BOB, &params);
        claim_eq!(
            contract_transfer_from(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );
    }

    #[concordium_test]
    fn test_increase_and_decrease_allowance() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();
        // allowances are not affected by the pause
        host.state_mut().paused = true;

        let params = to_bytes(&AllowanceParams {
            spender: BOB,
            amount: 70.into(),
        });
        let ctx = receive_ctx(ALICE, &params);
        claim!(contract_increase_allowance(&ctx, &mut host, &mut logger).is_ok());
        claim!(contract_increase_allowance(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().allowance(&ALICE, &BOB), 140.into());

        claim!(contract_decrease_allowance(&ctx, &mut host, &mut logger).is_ok());
        claim!(contract_decrease_allowance(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().allowance(&ALICE, &BOB), 0.into());
        claim_eq!(
            contract_decrease_allowance(&ctx, &mut host, &mut logger),
            Err(CustomContractError::InsufficientAllowance.into())
        );
    }

    #[concordium_test]
    fn test_burn() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 1_000);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&ContractTokenAmount::from(400));
        let ctx = receive_ctx(ALICE, &params);
        claim!(contract_burn(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(host.state().total_supply, 600.into());
        claim_eq!(host.state().total_minted, 1_000.into());

        let params = to_bytes(&ContractTokenAmount::from(601));
        let ctx = receive_ctx(ALICE, &params);
        claim_eq!(
            contract_burn(&ctx, &mut host, &mut logger),
            Err(ContractError::InsufficientFunds)
        );

        host.state_mut().paused = true;
        let params = to_bytes(&ContractTokenAmount::from(1));
        let ctx = receive_ctx(ALICE, &params);
        claim_eq!(
            contract_burn(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into())
        );
    }
}
