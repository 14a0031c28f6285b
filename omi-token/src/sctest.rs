use crate::{test_infrastructure::*, *};

const ORIGIN_ACC: AccountAddress = AccountAddress([0u8; 32]);
const OWNER_ACC: AccountAddress = AccountAddress([1u8; 32]);
const ALICE_ACC: AccountAddress = AccountAddress([10u8; 32]);
const ALICE: Address = Address::Account(ALICE_ACC);
const BOB_ACC: AccountAddress = AccountAddress([11u8; 32]);
const BOB: Address = Address::Account(BOB_ACC);
const SELF_ADDRESS: ContractAddress = ContractAddress {
    index: 1,
    subindex: 0,
};
const RECEIVER_CONTRACT: ContractAddress = ContractAddress {
    index: 50,
    subindex: 0,
};

/// A state where `ORIGIN_ACC` holds both roles and `ALICE` owns `alice_balance`.
fn initial_state<S: HasStateApi>(
    state_builder: &mut StateBuilder<S>,
    alice_balance: u128,
) -> State<S> {
    let mut state = State::new(state_builder, ORIGIN_ACC);
    if alice_balance > 0 {
        state.mint(&ALICE, alice_balance.into()).unwrap_abort();
    }
    state
}

fn receive_ctx<'a>(sender: Address, parameter: &'a [u8]) -> TestReceiveContext<'a> {
    let mut ctx = TestReceiveContext::empty();
    ctx.set_self_address(SELF_ADDRESS);
    ctx.set_owner(OWNER_ACC);
    ctx.set_sender(sender);
    ctx.set_parameter(parameter);
    ctx
}

mod admin;
mod holder;

#[concordium_cfg_test]
mod test_init {
    use super::*;

    #[concordium_test]
    fn test_init_origin_holds_roles() {
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(ORIGIN_ACC);
        let mut state_builder = TestStateBuilder::new();

        let state = contract_init(&ctx, &mut state_builder).unwrap_abort();

        claim!(state.has_role(&Address::Account(ORIGIN_ACC), Role::Minter));
        claim!(state.has_role(&Address::Account(ORIGIN_ACC), Role::Pauser));
        claim!(!state.paused, "Should start unpaused");
        claim_eq!(state.total_supply, 0.into());

        let mut expected_builder = TestStateBuilder::new();
        claim_eq!(state, State::new(&mut expected_builder, ORIGIN_ACC));
    }
}
