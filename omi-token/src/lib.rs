//! The capped, pausable OMI token.
//! CIS-2 transfers and balances for a single token, extended with allowances.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_cis2::{
    BurnEvent, Cis2Event, MintEvent, OnReceivingCis2Params, Receiver, TokenIdUnit, Transfer,
    TransferEvent, TransferParams,
};
use concordium_std::*;
use state::{State, *};

type ContractTransferParams = TransferParams<ContractTokenId, ContractTokenAmount>;

/// The parameter for `mint`.
#[derive(Debug, Serialize, SchemaType)]
pub struct MintParams {
    /// Who receives the minted tokens
    pub owner: Address,
    pub amount: ContractTokenAmount,
}

/// The parameter for `approve`, `increaseAllowance` and `decreaseAllowance`.
/// The owner is always the sender.
#[derive(Debug, Serialize, SchemaType)]
pub struct AllowanceParams {
    pub spender: Address,
    pub amount: ContractTokenAmount,
}

#[derive(Debug, Serialize, SchemaType)]
pub struct RoleParams {
    pub address: Address,
    pub role: Role,
}

/// # Init Function
/// The account initializing the contract becomes minter and pauser.
#[init(contract = "omi_token", event = "TokenEvent")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    Ok(State::new(state_builder, ctx.init_origin()))
}

/// Invoke the CIS-2 receive hook when tokens are sent to a contract.
fn notify_receiver<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    from: Address,
    to: &Receiver,
    amount: ContractTokenAmount,
    data: concordium_cis2::AdditionalData,
) -> ContractResult<()> {
    if let Receiver::Contract(address, function) = to {
        let parameter = OnReceivingCis2Params {
            token_id: TokenIdUnit(),
            amount,
            from,
            data,
        };
        host.invoke_contract(
            address,
            &parameter,
            function.as_entrypoint_name(),
            Amount::zero(),
        )?;
    }
    Ok(())
}

// ==============================================
// For minters and pausers
// ==========================================

/// Mint new tokens to `owner`. Minting is allowed while paused.
///
/// Caller: minters only
/// Reject if:
/// - Fails to parse parameter
/// - The sender does not hold the minter role
/// - The total ever minted would exceed the cap
#[receive(
    contract = "omi_token",
    name = "mint",
    parameter = "MintParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_mint<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: MintParams = ctx.parameter_cursor().get()?;
    let state = host.state_mut();
    ensure!(
        state.has_role(&ctx.sender(), Role::Minter),
        ContractError::Unauthorized
    );

    state.mint(&params.owner, params.amount)?;

    logger.log(&TokenEvent::Cis2(Cis2Event::Mint(MintEvent {
        token_id: TokenIdUnit(),
        amount: params.amount,
        owner: params.owner,
    })))?;
    Ok(())
}

/// Caller: pausers only
/// Reject if:
/// - The sender does not hold the pauser role
/// - Already paused
#[receive(
    contract = "omi_token",
    name = "pause",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_pause<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(
        state.has_role(&ctx.sender(), Role::Pauser),
        ContractError::Unauthorized
    );
    ensure!(!state.paused, CustomContractError::ContractPaused.into());
    state.paused = true;

    logger.log(&TokenEvent::Pause(PauseEvent { paused: true }))?;
    Ok(())
}

/// Caller: pausers only
/// Reject if:
/// - The sender does not hold the pauser role
/// - Not paused
#[receive(
    contract = "omi_token",
    name = "unpause",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_unpause<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(
        state.has_role(&ctx.sender(), Role::Pauser),
        ContractError::Unauthorized
    );
    ensure!(state.paused, CustomContractError::ContractNotPaused.into());
    state.paused = false;

    logger.log(&TokenEvent::Pause(PauseEvent { paused: false }))?;
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_token",
    name = "grantRole",
    parameter = "RoleParams",
    error = "ContractError",
    mutable
)]
fn contract_grant_role<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let params: RoleParams = ctx.parameter_cursor().get()?;
    host.state_mut().grant_role(params.address, params.role);
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_token",
    name = "revokeRole",
    parameter = "RoleParams",
    error = "ContractError",
    mutable
)]
fn contract_revoke_role<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let params: RoleParams = ctx.parameter_cursor().get()?;
    host.state_mut().revoke_role(&params.address, params.role);
    Ok(())
}

// ==============================================
// For holders
// ==========================================

/// CIS-2 transfer. Contract receivers get their hook invoked once
/// the balances of that transfer are updated.
///
/// Caller: the owner of the tokens (`from`)
/// Reject if:
/// - Contract is paused
/// - Fails to parse parameter
/// - `from` is not the sender
/// - Insufficient balance
/// - A receive hook rejects
#[receive(
    contract = "omi_token",
    name = "transfer",
    parameter = "ContractTransferParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_transfer<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        !host.state().paused,
        CustomContractError::ContractPaused.into()
    );
    let TransferParams(transfers): ContractTransferParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    for Transfer {
        token_id,
        amount,
        from,
        to,
        data,
    } in transfers
    {
        ensure!(from == sender, ContractError::Unauthorized);
        let to_address = to.address();
        host.state_mut().transfer(&from, &to_address, amount)?;

        logger.log(&TokenEvent::Cis2(Cis2Event::Transfer(TransferEvent {
            token_id,
            amount,
            from,
            to: to_address,
        })))?;

        notify_receiver(host, from, &to, amount, data)?;
    }
    Ok(())
}

/// Spend an allowance on the tokens of `owner`.
/// The allowance is decreased before the receive hook is invoked.
///
/// Caller: a spender with enough allowance
/// Reject if:
/// - Contract is paused
/// - Fails to parse parameter
/// - Insufficient allowance
/// - Insufficient balance of `owner`
/// - The receive hook rejects
#[receive(
    contract = "omi_token",
    name = "transferFrom",
    parameter = "TransferFromParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_transfer_from<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: TransferFromParams = ctx.parameter_cursor().get()?;
    let spender = ctx.sender();
    let to_address = params.to.address();

    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());
    let remaining = state.spend_allowance(&params.owner, &spender, params.amount)?;
    state.transfer(&params.owner, &to_address, params.amount)?;

    logger.log(&TokenEvent::Cis2(Cis2Event::Transfer(TransferEvent {
        token_id: TokenIdUnit(),
        amount: params.amount,
        from: params.owner,
        to: to_address,
    })))?;
    logger.log(&TokenEvent::Approval(ApprovalEvent {
        owner: params.owner,
        spender,
        amount: remaining,
    }))?;

    notify_receiver(
        host,
        params.owner,
        &params.to,
        params.amount,
        concordium_cis2::AdditionalData::empty(),
    )
}

/// Set the allowance of `spender` on the sender's tokens.
/// Allowances can be changed while paused.
///
/// Caller: Anyone
/// Reject if:
/// - Fails to parse parameter
#[receive(
    contract = "omi_token",
    name = "approve",
    parameter = "AllowanceParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_approve<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: AllowanceParams = ctx.parameter_cursor().get()?;
    let owner = ctx.sender();
    host.state_mut()
        .set_allowance(&owner, &params.spender, params.amount);

    logger.log(&TokenEvent::Approval(ApprovalEvent {
        owner,
        spender: params.spender,
        amount: params.amount,
    }))?;
    Ok(())
}

/// Caller: Anyone
/// Reject if:
/// - Fails to parse parameter
/// - The allowance would overflow
#[receive(
    contract = "omi_token",
    name = "increaseAllowance",
    parameter = "AllowanceParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_increase_allowance<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: AllowanceParams = ctx.parameter_cursor().get()?;
    let owner = ctx.sender();
    let state = host.state_mut();

    let amount = state
        .allowance(&owner, &params.spender)
        .0
        .checked_add(params.amount.0)
        .ok_or(ContractError::from(CustomContractError::OverflowError))?;
    state.set_allowance(&owner, &params.spender, amount.into());

    logger.log(&TokenEvent::Approval(ApprovalEvent {
        owner,
        spender: params.spender,
        amount: amount.into(),
    }))?;
    Ok(())
}

/// Caller: Anyone
/// Reject if:
/// - Fails to parse parameter
/// - The allowance would go below zero
#[receive(
    contract = "omi_token",
    name = "decreaseAllowance",
    parameter = "AllowanceParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_decrease_allowance<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: AllowanceParams = ctx.parameter_cursor().get()?;
    let owner = ctx.sender();

    let amount = host
        .state_mut()
        .spend_allowance(&owner, &params.spender, params.amount)?;

    logger.log(&TokenEvent::Approval(ApprovalEvent {
        owner,
        spender: params.spender,
        amount,
    }))?;
    Ok(())
}

/// Burn tokens of the sender. Total minted stays as it is.
///
/// Caller: Anyone holding tokens
/// Reject if:
/// - Contract is paused
/// - Fails to parse parameter
/// - Insufficient balance
#[receive(
    contract = "omi_token",
    name = "burn",
    parameter = "ContractTokenAmount",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_burn<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let amount: ContractTokenAmount = ctx.parameter_cursor().get()?;
    let owner = ctx.sender();
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());

    state.burn(&owner, amount)?;

    logger.log(&TokenEvent::Cis2(Cis2Event::Burn(BurnEvent {
        token_id: TokenIdUnit(),
        amount,
        owner,
    })))?;
    Ok(())
}
