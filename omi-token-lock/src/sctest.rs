use crate::{test_infrastructure::*, *};

const OWNER_ACC: AccountAddress = AccountAddress([1u8; 32]);
const PROVIDER: Address = Address::Account(AccountAddress([2u8; 32]));
const TOKEN: ContractAddress = ContractAddress {
    index: 1,
    subindex: 0,
};
const SELF_ADDRESS: ContractAddress = ContractAddress {
    index: 2,
    subindex: 0,
};
const CROWDSALE: ContractAddress = ContractAddress {
    index: 3,
    subindex: 0,
};
const USER1_ACC: AccountAddress = AccountAddress([10u8; 32]);
const USER1: Address = Address::Account(USER1_ACC);
const USER2_ACC: AccountAddress = AccountAddress([11u8; 32]);
const USER2: Address = Address::Account(USER2_ACC);
const USER3: Address = Address::Account(AccountAddress([12u8; 32]));

type ContractTransferParams = TransferParams<ContractTokenId, ContractTokenAmount>;

fn initial_state<S: HasStateApi>(
    state_builder: &mut StateBuilder<S>,
    funding: FundingMode,
) -> State<S> {
    let mut state = State::new(state_builder, TOKEN, PROVIDER, funding);
    state.crowdsale = Some(CROWDSALE);
    state
}

fn receive_ctx<'a>(sender: Address, parameter: &'a [u8], now: u64) -> TestReceiveContext<'a> {
    let mut ctx = TestReceiveContext::empty();
    ctx.set_self_address(SELF_ADDRESS);
    ctx.set_owner(OWNER_ACC);
    ctx.set_sender(sender);
    ctx.set_parameter(parameter);
    ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(now));
    ctx
}

/// A token mock accepting `transfer` only with exactly the expected payouts.
fn expect_transfers<S>(expected: Vec<(Address, u128)>) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _amount, _balance, _state| {
        let params: ContractTransferParams = match from_bytes(parameter.as_ref()) {
            Ok(params) => params,
            Err(_) => return Err(CallContractError::Trap),
        };
        let payouts: Vec<(Address, u128)> = params
            .0
            .iter()
            .map(|transfer| (transfer.to.address(), transfer.amount.0))
            .collect();
        if payouts != expected {
            return Err(CallContractError::Trap);
        }
        Ok((false, ()))
    })
}

mod beneficiary;
mod crowdsale;
mod owner;

#[concordium_cfg_test]
mod test_init {
    use super::*;

    #[concordium_test]
    fn test_init() {
        let params = to_bytes(&InitParams {
            token: TOKEN,
            allowance_provider: PROVIDER,
            funding: FundingMode::Deposit,
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_parameter(&params);
        let mut state_builder = TestStateBuilder::new();

        let state = contract_init(&ctx, &mut state_builder).unwrap_abort();

        let mut expected_builder = TestStateBuilder::new();
        claim_eq!(
            state,
            State::new(&mut expected_builder, TOKEN, PROVIDER, FundingMode::Deposit)
        );
        claim_eq!(state.crowdsale, None, "No crowdsale before it is registered");
    }
}
