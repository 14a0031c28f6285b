use crate::state::{State, *};
use concordium_std::*;

#[derive(Debug, Serialize, SchemaType)]
struct ViewResponse {
    token: ContractAddress,
    crowdsale: Option<ContractAddress>,
    allowance_provider: Address,
    funding: FundingMode,
    paused: bool,
    finished_at: Option<Timestamp>,
    total_locked: ContractTokenAmount,
    unallocated: ContractTokenAmount,
    beneficiary_count: u32,
}

#[receive(
    contract = "omi_token_lock",
    name = "view",
    return_value = "ViewResponse"
)]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        token: state.token,
        crowdsale: state.crowdsale,
        allowance_provider: state.allowance_provider,
        funding: state.funding,
        paused: state.paused,
        finished_at: state.finished_at,
        total_locked: state.total_locked,
        unallocated: state.unallocated,
        beneficiary_count: state.beneficiary_count,
    })
}

// ------------------------------------------

#[receive(
    contract = "omi_token_lock",
    name = "getNumberOfLocks",
    parameter = "Address",
    return_value = "u32",
    error = "ContractError"
)]
fn contract_get_number_of_locks<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<u32> {
    let beneficiary: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().lock_count(&beneficiary))
}

// ------------------------------------------

#[derive(Debug, Serialize, SchemaType)]
pub struct LockIndexParams {
    pub beneficiary: Address,
    pub index: u32,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct LockResponse {
    pub amount: ContractTokenAmount,
    pub duration: Duration,
    pub released: bool,
    pub revoked: bool,
    pub anchor: LockAnchor,
    /// `None` while the grant waits for the sale to finish
    pub maturity: Option<Timestamp>,
}

#[receive(
    contract = "omi_token_lock",
    name = "getLockByIndex",
    parameter = "LockIndexParams",
    return_value = "LockResponse",
    error = "ContractError"
)]
fn contract_get_lock_by_index<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<LockResponse> {
    let params: LockIndexParams = ctx.parameter_cursor().get()?;
    let state = host.state();

    let lock = state
        .get_lock(&params.beneficiary, params.index)
        .ok_or(ContractError::from(CustomContractError::LockNotFound))?;

    Ok(LockResponse {
        amount: lock.amount,
        duration: lock.duration,
        released: lock.released,
        revoked: lock.revoked,
        anchor: lock.anchor,
        maturity: lock.maturity(state.finished_at),
    })
}

// ------------------------------------------

/// Amount still locked for a beneficiary.
#[receive(
    contract = "omi_token_lock",
    name = "getTokenBalance",
    parameter = "Address",
    return_value = "ContractTokenAmount",
    error = "ContractError"
)]
fn contract_get_token_balance<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ContractTokenAmount> {
    let beneficiary: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().active_amount(&beneficiary))
}

#[receive(
    contract = "omi_token_lock",
    name = "totalTokensLocked",
    return_value = "ContractTokenAmount"
)]
fn contract_total_tokens_locked<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ContractTokenAmount> {
    Ok(host.state().total_locked)
}

#[receive(
    contract = "omi_token_lock",
    name = "allowanceProvider",
    return_value = "Address"
)]
fn contract_allowance_provider<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Address> {
    Ok(host.state().allowance_provider)
}
