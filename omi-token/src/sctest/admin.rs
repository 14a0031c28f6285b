use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    #[concordium_test]
    /// Minting up to the cap is accepted, one unit more is rejected.
    fn test_mint_respects_cap() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&MintParams {
            owner: ALICE,
            amount: (TOKEN_CAP + 1).into(),
        });
        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &params);
        let ret = contract_mint(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(CustomContractError::CapExceeded.into()));

        let params = to_bytes(&MintParams {
            owner: ALICE,
            amount: TOKEN_CAP.into(),
        });
        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &params);
        let ret = contract_mint(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().balance(&ALICE), TOKEN_CAP.into());

        let params = to_bytes(&MintParams {
            owner: BOB,
            amount: 1.into(),
        });
        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &params);
        let ret = contract_mint(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(CustomContractError::CapExceeded.into()));

        claim_eq!(logger.logs.len(), 1, "Only the accepted mint is logged");
    }

    #[concordium_test]
    fn test_mint_requires_minter_role() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let params = to_bytes(&MintParams {
            owner: ALICE,
            amount: 10.into(),
        });
        let ctx = receive_ctx(ALICE, &params);
        let ret = contract_mint(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(ContractError::Unauthorized));

        host.state_mut().grant_role(ALICE, Role::Minter);
        let ret = contract_mint(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "Results in rejection");
        claim_eq!(host.state().total_minted, 10.into());
    }

    #[concordium_test]
    /// Minting continues while transfers are paused.
    fn test_mint_while_paused() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &[]);
        claim!(contract_pause(&ctx, &mut host, &mut logger).is_ok());
        claim_eq!(
            contract_pause(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractPaused.into()),
            "Pausing twice should be rejected"
        );

        let params = to_bytes(&MintParams {
            owner: ALICE,
            amount: 10.into(),
        });
        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &params);
        claim!(contract_mint(&ctx, &mut host, &mut logger).is_ok());

        claim!(logger
            .logs
            .contains(&to_bytes(&TokenEvent::Pause(PauseEvent { paused: true }))));
    }

    #[concordium_test]
    fn test_pause_requires_pauser_role() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);
        let mut logger = TestLogger::init();

        let ctx = receive_ctx(BOB, &[]);
        claim_eq!(
            contract_pause(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );
        claim_eq!(
            contract_unpause(&ctx, &mut host, &mut logger),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &[]);
        claim_eq!(
            contract_unpause(&ctx, &mut host, &mut logger),
            Err(CustomContractError::ContractNotPaused.into()),
            "Unpausing an unpaused token should be rejected"
        );
    }

    #[concordium_test]
    /// Roles are administered by the instance owner only.
    fn test_grant_and_revoke_role() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder, 0);
        let mut host = TestHost::new(state, state_builder);

        let params = to_bytes(&RoleParams {
            address: BOB,
            role: Role::Pauser,
        });
        let ctx = receive_ctx(Address::Account(ORIGIN_ACC), &params);
        claim_eq!(
            contract_grant_role(&ctx, &mut host),
            Err(ContractError::Unauthorized)
        );

        let ctx = receive_ctx(Address::Account(OWNER_ACC), &params);
        claim!(contract_grant_role(&ctx, &mut host).is_ok());
        claim!(host.state().has_role(&BOB, Role::Pauser));
        claim!(!host.state().has_role(&BOB, Role::Minter));

        claim!(contract_revoke_role(&ctx, &mut host).is_ok());
        claim!(!host.state().has_role(&BOB, Role::Pauser));
    }
}
