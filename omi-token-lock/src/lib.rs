//! Vesting ledger for the OMI sale.
//! Holds purchased tokens and hands them out to beneficiaries once their grants mature.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_cis2::{
    AdditionalData, OnReceivingCis2Params, Receiver, TokenIdUnit, Transfer, TransferParams,
};
use concordium_std::*;
use state::{State, *};

/// The parameter schema for `init` function.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// The OMI token contract
    pub token: ContractAddress,
    /// Whose allowance `lockTokens` spends in `FundingMode::Allowance`
    pub allowance_provider: Address,
    pub funding: FundingMode,
}

#[derive(Debug, Serialize, SchemaType)]
pub struct ReleaseRangeParams {
    /// First beneficiary index, inclusive
    pub from: u32,
    /// Last beneficiary index, exclusive
    pub to: u32,
}

#[derive(Debug, Serialize, SchemaType)]
pub struct RevokeLockParams {
    pub beneficiary: Address,
    pub index: u32,
}

#[derive(Debug, Serialize, SchemaType)]
pub struct WithdrawParams {
    pub to: Address,
    pub amount: ContractTokenAmount,
}

/// # Init Function
#[init(contract = "omi_token_lock", parameter = "InitParams", event = "LockEvent")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;

    Ok(State::new(
        state_builder,
        params.token,
        params.allowance_provider,
        params.funding,
    ))
}

fn receiver_of(address: Address) -> Receiver {
    match address {
        Address::Account(account_addr) => Receiver::from_account(account_addr),
        Address::Contract(contract_addr) => Receiver::from_contract(
            contract_addr,
            OwnedEntrypointName::new_unchecked("onReceivingCIS2".to_owned()),
        ),
    }
}

/// Send tokens held by the ledger with one batched CIS-2 transfer.
/// Nothing is invoked when there is nothing to send.
fn send_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    payouts: Vec<(Address, ContractTokenAmount)>,
) -> ContractResult<()> {
    let transfers: Vec<_> = payouts
        .into_iter()
        .filter(|(_, amount)| *amount > 0.into())
        .map(|(to, amount)| Transfer {
            from: Address::from(ctx.self_address()),
            to: receiver_of(to),
            token_id: TokenIdUnit(),
            amount,
            data: AdditionalData::empty(),
        })
        .collect();
    if transfers.is_empty() {
        return Ok(());
    }

    let token = host.state().token;
    let _ = host.invoke_contract(
        &token,
        &TransferParams::from(transfers),
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )?;
    Ok(())
}

fn log_release(logger: &mut impl HasLogger, release: &Release) -> ContractResult<()> {
    for (index, amount) in release.grants.iter() {
        logger.log(&LockEvent::Released {
            beneficiary: release.beneficiary,
            index: *index,
            amount: *amount,
        })?;
    }
    Ok(())
}

// ==============================================
// For the ledger owner
// ==========================================

/// Register the crowdsale allowed to lock tokens.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The sale is already finished
#[receive(
    contract = "omi_token_lock",
    name = "setCrowdsaleAddress",
    parameter = "ContractAddress",
    error = "ContractError",
    mutable
)]
fn contract_set_crowdsale_address<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let addr: ContractAddress = ctx.parameter_cursor().get()?;
    let state = host.state_mut();
    ensure!(
        state.finished_at.is_none(),
        CustomContractError::AlreadyFinished.into()
    );
    state.crowdsale = Some(addr);
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_token_lock",
    name = "setAllowanceAddress",
    parameter = "Address",
    error = "ContractError",
    mutable
)]
fn contract_set_allowance_address<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let addr: Address = ctx.parameter_cursor().get()?;
    host.state_mut().allowance_provider = addr;
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
/// - Already paused
#[receive(
    contract = "omi_token_lock",
    name = "pause",
    error = "ContractError",
    mutable
)]
fn contract_pause<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());
    state.paused = true;
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
/// - Not paused
#[receive(
    contract = "omi_token_lock",
    name = "unpause",
    error = "ContractError",
    mutable
)]
fn contract_unpause<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let state = host.state_mut();
    ensure!(state.paused, CustomContractError::ContractNotPaused.into());
    state.paused = false;
    Ok(())
}

/// Release the matured grants of any beneficiary. Works while paused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The beneficiary has no active grant
#[receive(
    contract = "omi_token_lock",
    name = "releaseTokensByAddress",
    parameter = "Address",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_release_tokens_by_address<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let beneficiary: Address = ctx.parameter_cursor().get()?;

    let release = host
        .state_mut()
        .release(&beneficiary, ctx.metadata().slot_time())?;
    log_release(logger, &release)?;

    send_tokens(ctx, host, vec![(release.beneficiary, release.amount)])
}

/// Release the matured grants of the beneficiaries `from..to` in insertion order.
/// Beneficiaries without anything to release are skipped. Works while paused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The range is empty or exceeds the number of beneficiaries
#[receive(
    contract = "omi_token_lock",
    name = "releaseAll",
    parameter = "ReleaseRangeParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_release_all<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let params: ReleaseRangeParams = ctx.parameter_cursor().get()?;
    let now = ctx.metadata().slot_time();

    let state = host.state_mut();
    ensure!(
        params.from < params.to && params.to <= state.beneficiary_count,
        CustomContractError::InvalidIndexRange.into()
    );

    let mut payouts = Vec::new();
    for index in params.from..params.to {
        let beneficiary = state
            .beneficiary_at(index)
            .ok_or(ContractError::from(CustomContractError::InvalidIndexRange))?;
        match state.release(&beneficiary, now) {
            Ok(release) => {
                log_release(logger, &release)?;
                payouts.push((release.beneficiary, release.amount));
            }
            Err(ContractError::Custom(CustomContractError::NoLocks)) => continue,
            Err(e) => bail!(e),
        }
    }

    send_tokens(ctx, host, payouts)
}

/// Revoke a grant that has not matured yet.
/// Its tokens go back to the unallocated pool.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The grant does not exist, is released, revoked or matured
#[receive(
    contract = "omi_token_lock",
    name = "revokeLockByIndex",
    parameter = "RevokeLockParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_revoke_lock_by_index<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let params: RevokeLockParams = ctx.parameter_cursor().get()?;

    let amount = host.state_mut().revoke(
        &params.beneficiary,
        params.index,
        ctx.metadata().slot_time(),
    )?;

    logger.log(&LockEvent::Revoked {
        beneficiary: params.beneficiary,
        index: params.index,
        amount,
    })?;
    Ok(())
}

/// Send tokens out of the unallocated pool.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The pool holds less than `amount`
#[receive(
    contract = "omi_token_lock",
    name = "withdrawUnallocated",
    parameter = "WithdrawParams",
    error = "ContractError",
    mutable
)]
fn contract_withdraw_unallocated<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let params: WithdrawParams = ctx.parameter_cursor().get()?;
    host.state_mut().take_unallocated(params.amount)?;

    send_tokens(ctx, host, vec![(params.to, params.amount)])
}

// ==============================================
// For the crowdsale (or the owner)
// ==========================================

/// Create a grant for `beneficiary` and fund it.
/// State is updated before the tokens are pulled with `transferFrom`.
///
/// Caller: the registered crowdsale or the contract instance owner
/// Reject if:
/// - Contract is paused
/// - Fails to parse parameter
/// - The sender is neither the crowdsale nor the owner
/// - `amount` is zero
/// - `FundingMode::Deposit` and the unallocated pool does not cover `amount`
/// - `FundingMode::Allowance` and the token rejects `transferFrom`
#[receive(
    contract = "omi_token_lock",
    name = "lockTokens",
    parameter = "LockTokensParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_lock_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: LockTokensParams = ctx.parameter_cursor().get()?;
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());
    ensure!(
        state.is_locker(&ctx.sender(), &ctx.owner()),
        ContractError::Unauthorized
    );

    let index = state.add_lock(
        &params.beneficiary,
        params.anchor,
        params.duration,
        params.amount,
    )?;
    let funding = state.funding;
    let token = state.token;
    let provider = state.allowance_provider;

    logger.log(&LockEvent::Locked {
        beneficiary: params.beneficiary,
        index,
        amount: params.amount,
        anchor: params.anchor,
        duration: params.duration,
    })?;

    if funding == FundingMode::Allowance {
        let transfer_from = TransferFromParams {
            owner: provider,
            to: Receiver::from_contract(
                ctx.self_address(),
                OwnedEntrypointName::new_unchecked("onReceivingCIS2".to_owned()),
            ),
            amount: params.amount,
        };
        let _ = host.invoke_contract(
            &token,
            &transfer_from,
            EntrypointName::new_unchecked("transferFrom"),
            Amount::zero(),
        )?;
        // the hook credited the pulled tokens to the pool
        host.state_mut().take_unallocated(params.amount)?;
    }
    Ok(())
}

/// Record the end of the sale. Grants anchored to the sale finish
/// mature from this moment on.
///
/// Caller: the registered crowdsale, or the contract instance owner while none is registered
/// Reject if:
/// - The sender is not allowed to finish the sale
/// - Already finished
#[receive(
    contract = "omi_token_lock",
    name = "finishCrowdsale",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_finish_crowdsale<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(
        state.is_finisher(&ctx.sender(), &ctx.owner()),
        ContractError::Unauthorized
    );

    let now = ctx.metadata().slot_time();
    state.finish(now)?;

    logger.log(&LockEvent::CrowdsaleFinished { at: now })?;
    Ok(())
}

/// CIS-2 receive hook. Every receipt is credited to the unallocated pool,
/// so tokens sent to the ledger can always be withdrawn by the owner.
///
/// Caller: the OMI token contract only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the token contract
#[receive(
    contract = "omi_token_lock",
    name = "onReceivingCIS2",
    parameter = "OnReceivingCis2Params<ContractTokenId, ContractTokenAmount>",
    error = "ContractError",
    mutable
)]
fn contract_on_receiving_cis2<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    let sender = if let Address::Contract(contract) = ctx.sender() {
        contract
    } else {
        bail!(CustomContractError::ContractOnly.into())
    };
    let state = host.state_mut();
    ensure!(sender == state.token, ContractError::Unauthorized);

    let params: OnReceivingCis2Params<ContractTokenId, ContractTokenAmount> =
        ctx.parameter_cursor().get()?;
    state.credit_deposit(params.amount);
    Ok(())
}

// ==============================================
// For beneficiaries
// ==========================================

/// Release the matured grants of the sender.
/// Succeeds without a transfer when no active grant has matured yet.
///
/// Caller: Anyone with grants
/// Reject if:
/// - Contract is paused
/// - The sender has no active grant
#[receive(
    contract = "omi_token_lock",
    name = "releaseTokens",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_release_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());

    let release = state.release(&ctx.sender(), ctx.metadata().slot_time())?;
    log_release(logger, &release)?;

    send_tokens(ctx, host, vec![(release.beneficiary, release.amount)])
}
