use crate::state::{State, *};
use concordium_std::*;

#[derive(Debug, Serialize, SchemaType)]
struct ViewResponse {
    paused: bool,
    finalized: bool,
    rate: MicroCcd,
    wallet: AccountAddress,
    token: ContractAddress,
    token_lock: ContractAddress,
    schedule: SaleSchedule,
    goals: SaleGoals,
    current_stage: Stage,
    vesting: VestingPlan,
    allow_third_party: bool,
    usd_raised: UsdAmount,
    tokens_sold: u64,
    ccd_raised: Amount,
}

#[receive(
    contract = "omi_crowdsale",
    name = "view",
    return_value = "ViewResponse"
)]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        paused: state.paused,
        finalized: state.finalized,
        rate: state.rate,
        wallet: state.wallet,
        token: state.token,
        token_lock: state.token_lock,
        schedule: state.schedule.clone(),
        goals: state.goals.clone(),
        current_stage: state.current_stage,
        vesting: state.vesting.clone(),
        allow_third_party: state.allow_third_party,
        usd_raised: state.usd_raised,
        tokens_sold: state.tokens_sold,
        ccd_raised: state.ccd_raised,
    })
}

// ------------------------------------------

/// Effective rate of the current stage.
#[receive(
    contract = "omi_crowdsale",
    name = "rate",
    return_value = "MicroCcd",
    error = "ContractError"
)]
fn contract_rate<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<MicroCcd> {
    let state = host.state();
    Ok(state.effective_rate(state.current_stage)?)
}

#[receive(
    contract = "omi_crowdsale",
    name = "currentStage",
    return_value = "Stage"
)]
fn contract_current_stage<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Stage> {
    Ok(host.state().current_stage)
}

// ------------------------------------------

/// Stage by index: 0 and 1 are the pre-sales, 2 is the main sale.
#[receive(
    contract = "omi_crowdsale",
    name = "stages",
    parameter = "u8",
    return_value = "StageInfo",
    error = "ContractError"
)]
fn contract_stages<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<StageInfo> {
    let index: u8 = ctx.parameter_cursor().get()?;
    let stage = Stage::try_from(index)?;
    Ok(host.state().stages.get(stage).clone())
}

#[receive(
    contract = "omi_crowdsale",
    name = "getTokensSold",
    parameter = "u8",
    return_value = "u64",
    error = "ContractError"
)]
fn contract_get_tokens_sold<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<u64> {
    let index: u8 = ctx.parameter_cursor().get()?;
    let stage = Stage::try_from(index)?;
    Ok(host.state().stages.get(stage).sold)
}

// ------------------------------------------

/// Tokens bought by a beneficiary, one entry per stage.
#[receive(
    contract = "omi_crowdsale",
    name = "getPurchaseRecords",
    parameter = "Address",
    return_value = "Vec<u64>",
    error = "ContractError"
)]
fn contract_get_purchase_records<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Vec<u64>> {
    let beneficiary: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().purchase_record(&beneficiary).to_vec())
}

#[receive(
    contract = "omi_crowdsale",
    name = "isWhitelisted",
    parameter = "Address",
    return_value = "bool",
    error = "ContractError"
)]
fn contract_is_whitelisted<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<bool> {
    let addr: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().is_whitelisted(&addr))
}

#[receive(
    contract = "omi_crowdsale",
    name = "totalUSDRaised",
    return_value = "UsdAmount"
)]
fn contract_total_usd_raised<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<UsdAmount> {
    Ok(host.state().usd_raised)
}

#[receive(
    contract = "omi_crowdsale",
    name = "isFinalized",
    return_value = "bool"
)]
fn contract_is_finalized<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().finalized)
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::{sctest::*, test_infrastructure::*};

    #[concordium_test]
    fn test_stage_views() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let host = TestHost::new(state, state_builder);

        let params = to_bytes(&1u8);
        let ctx = receive_ctx(BUYER1, &params, 0);
        let info = contract_stages(&ctx, &host).expect_report("stages");
        claim_eq!(info.discount, 30);
        claim_eq!(info.cap, 50_000_000);
        claim_eq!(contract_get_tokens_sold(&ctx, &host), Ok(0));

        let params = to_bytes(&3u8);
        let ctx = receive_ctx(BUYER1, &params, 0);
        claim_eq!(
            contract_stages(&ctx, &host),
            Err(CustomContractError::InvalidStage.into())
        );

        let ctx = receive_ctx(BUYER1, &[], 0);
        claim_eq!(contract_rate(&ctx, &host), Ok(6_000));
        claim_eq!(contract_current_stage(&ctx, &host), Ok(Stage::PreSale1));
    }
}
