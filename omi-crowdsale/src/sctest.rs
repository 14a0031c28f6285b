use crate::{test_infrastructure::*, *};
use sale_utils::{
    DEFAULT_RATE, DEFAULT_STAGES, FUNDING_GOAL_USD, MAIN_SALE_VESTING_DAYS,
    PRE_SALE_VESTING_DAYS, SALE_END_MILLIS, SALE_START_MILLIS, TOKEN_GOAL,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

const OWNER_ACC: AccountAddress = AccountAddress([1u8; 32]);
const WALLET_ACC: AccountAddress = AccountAddress([2u8; 32]);
const TOKEN: ContractAddress = ContractAddress {
    index: 1,
    subindex: 0,
};
const TOKEN_LOCK: ContractAddress = ContractAddress {
    index: 2,
    subindex: 0,
};
const SELF_ADDRESS: ContractAddress = ContractAddress {
    index: 3,
    subindex: 0,
};
const BUYER1_ACC: AccountAddress = AccountAddress([10u8; 32]);
pub(crate) const BUYER1: Address = Address::Account(BUYER1_ACC);
const BUYER2_ACC: AccountAddress = AccountAddress([11u8; 32]);
const BUYER2: Address = Address::Account(BUYER2_ACC);

/// Just before the main sale starts.
const PRE_SALE_TIME: u64 = SALE_START_MILLIS - 1;

fn stage_config(i: usize) -> StageConfig {
    let (discount, minimum, maximum, cap) = DEFAULT_STAGES[i];
    StageConfig {
        discount,
        minimum,
        maximum,
        cap,
    }
}

fn init_params() -> InitParams {
    InitParams {
        rate: DEFAULT_RATE,
        wallet: WALLET_ACC,
        token: TOKEN,
        token_lock: TOKEN_LOCK,
        start: Timestamp::from_timestamp_millis(SALE_START_MILLIS),
        end: Timestamp::from_timestamp_millis(SALE_END_MILLIS),
        funding_goal_usd: FUNDING_GOAL_USD,
        token_goal: TOKEN_GOAL,
        stages: StageConfigs {
            pre_sale_1: stage_config(0),
            pre_sale_2: stage_config(1),
            main_sale: stage_config(2),
        },
        vesting: VestingPlan {
            pre_sale: PRE_SALE_VESTING_DAYS
                .iter()
                .map(|d| Duration::from_days(*d))
                .collect(),
            main_sale: MAIN_SALE_VESTING_DAYS
                .iter()
                .map(|d| Duration::from_days(*d))
                .collect(),
        },
        allow_third_party: false,
    }
}

/// The default OMI sale with `BUYER1` whitelisted.
pub(crate) fn initial_state<S: HasStateApi>(state_builder: &mut StateBuilder<S>) -> State<S> {
    let params = init_params();
    let mut state = State::new(
        state_builder,
        params.rate,
        params.wallet,
        params.token,
        params.token_lock,
        SaleSchedule::new(params.start, params.end).unwrap_abort(),
        SaleGoals {
            usd: params.funding_goal_usd,
            tokens: params.token_goal,
        },
        StageTable::new(params.stages).unwrap_abort(),
        params.vesting,
        params.allow_third_party,
    );
    state.whitelist.insert(BUYER1);
    state
}

pub(crate) fn receive_ctx<'a>(
    sender: Address,
    parameter: &'a [u8],
    now: u64,
) -> TestReceiveContext<'a> {
    let mut ctx = TestReceiveContext::empty();
    ctx.set_self_address(SELF_ADDRESS);
    ctx.set_owner(OWNER_ACC);
    ctx.set_sender(sender);
    ctx.set_parameter(parameter);
    ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(now));
    ctx
}

/// Calls the mocked vesting ledger received.
#[derive(Default)]
struct LedgerCalls {
    locks: Rc<RefCell<Vec<LockTokensParams>>>,
    finished: Rc<Cell<u32>>,
}

/// Mocks `lockTokens` and `finishCrowdsale` of the ledger, recording every call.
fn mock_ledger(host: &mut TestHost<State<TestStateApi>>) -> LedgerCalls {
    let calls = LedgerCalls::default();

    let locks = calls.locks.clone();
    host.setup_mock_entrypoint(
        TOKEN_LOCK,
        OwnedEntrypointName::new_unchecked("lockTokens".into()),
        MockFn::new_v1(move |parameter, _amount, _balance, _state| {
            let params: LockTokensParams = match from_bytes(parameter.as_ref()) {
                Ok(params) => params,
                Err(_) => return Err(CallContractError::Trap),
            };
            locks.borrow_mut().push(params);
            Ok((false, ()))
        }),
    );

    let finished = calls.finished.clone();
    host.setup_mock_entrypoint(
        TOKEN_LOCK,
        OwnedEntrypointName::new_unchecked("finishCrowdsale".into()),
        MockFn::new_v1(move |_parameter, _amount, _balance, _state| {
            finished.set(finished.get() + 1);
            Ok((false, ()))
        }),
    );

    calls
}

mod buyer;
mod owner;

#[concordium_cfg_test]
mod test_init {
    use super::*;

    #[concordium_test]
    fn test_init_with_defaults() {
        let params = to_bytes(&init_params());
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_parameter(&params);
        let mut state_builder = TestStateBuilder::new();

        let state = contract_init(&ctx, &mut state_builder).unwrap_abort();

        claim_eq!(state.current_stage, Stage::PreSale1);
        claim_eq!(state.rate, DEFAULT_RATE);
        claim_eq!(state.stages.main_sale.cap, 362_500_000);
        claim!(!state.finalized, "Should start open");
        claim!(!state.is_whitelisted(&BUYER1));
    }

    fn init_fails(params: InitParams) -> bool {
        let bytes = to_bytes(&params);
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();
        contract_init(&ctx, &mut state_builder).is_err()
    }

    #[concordium_test]
    fn test_init_rejects_invalid_params() {
        let mut params = init_params();
        params.rate = 0;
        claim!(init_fails(params), "Zero rate");

        let mut params = init_params();
        params.end = params.start;
        claim!(init_fails(params), "Empty schedule");

        let mut params = init_params();
        params.stages.pre_sale_2.minimum = 0;
        claim!(init_fails(params), "Zero minimum");

        let mut params = init_params();
        params.vesting.main_sale.clear();
        claim!(init_fails(params), "No tranches");
    }
}
