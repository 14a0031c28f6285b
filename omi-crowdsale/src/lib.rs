//! Staged crowdsale of the OMI token.
//! Accepts CCD from whitelisted buyers, forwards it to the wallet and
//! locks the purchased tokens on the vesting ledger in tranches.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_std::*;
use state::{State, *};

/// The parameter schema for `init` function.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// Micro CCD per token before any discount
    pub rate: MicroCcd,
    /// Account receiving every payment
    pub wallet: AccountAddress,
    /// The OMI token contract
    pub token: ContractAddress,
    /// The vesting ledger purchased tokens are locked on
    pub token_lock: ContractAddress,
    /// Start of the main sale
    pub start: Timestamp,
    /// End of the sale
    pub end: Timestamp,
    pub funding_goal_usd: UsdAmount,
    pub token_goal: u64,
    pub stages: StageConfigs,
    pub vesting: VestingPlan,
    /// Allow buying for another beneficiary
    pub allow_third_party: bool,
}

/// # Init Function
#[init(contract = "omi_crowdsale", parameter = "InitParams", event = "SaleEvent")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;
    ensure!(params.rate > 0, CustomContractError::InvalidRate.into());

    let schedule = SaleSchedule::new(params.start, params.end)?;
    let stages = StageTable::new(params.stages)?;
    params.vesting.validate()?;

    Ok(State::new(
        state_builder,
        params.rate,
        params.wallet,
        params.token,
        params.token_lock,
        schedule,
        SaleGoals {
            usd: params.funding_goal_usd,
            tokens: params.token_goal,
        },
        stages,
        params.vesting,
        params.allow_third_party,
    ))
}

// ==============================================
// For the sale owner
// ==========================================

/// Change the base rate. Already accepted purchases keep their price.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The new rate is zero
#[receive(
    contract = "omi_crowdsale",
    name = "setRate",
    parameter = "MicroCcd",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_set_rate<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let new_rate: MicroCcd = ctx.parameter_cursor().get()?;
    ensure!(new_rate > 0, CustomContractError::InvalidRate.into());

    let state = host.state_mut();
    let old_rate = state.rate;
    state.rate = new_rate;

    logger.log(&SaleEvent::RateUpdated(RateUpdatedEvent { old_rate, new_rate }))?;
    Ok(())
}

/// Report the USD raised so far. The value replaces the previous one.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_crowdsale",
    name = "setUSDRaised",
    parameter = "UsdAmount",
    error = "ContractError",
    mutable
)]
fn contract_set_usd_raised<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let usd_raised: UsdAmount = ctx.parameter_cursor().get()?;
    host.state_mut().usd_raised = usd_raised;
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_crowdsale",
    name = "addToWhitelist",
    parameter = "Address",
    error = "ContractError",
    mutable
)]
fn contract_add_to_whitelist<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let addr: Address = ctx.parameter_cursor().get()?;
    host.state_mut().whitelist.insert(addr);
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_crowdsale",
    name = "addManyToWhitelist",
    parameter = "Vec<Address>",
    error = "ContractError",
    mutable
)]
fn contract_add_many_to_whitelist<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let addrs: Vec<Address> = ctx.parameter_cursor().get()?;
    let state = host.state_mut();
    for addr in addrs {
        state.whitelist.insert(addr);
    }
    Ok(())
}

/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "omi_crowdsale",
    name = "removeFromWhitelist",
    parameter = "Address",
    error = "ContractError",
    mutable
)]
fn contract_remove_from_whitelist<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let addr: Address = ctx.parameter_cursor().get()?;
    host.state_mut().whitelist.remove(&addr);
    Ok(())
}

/// Purchases are rejected while paused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
/// - Already paused
#[receive(
    contract = "omi_crowdsale",
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
    contract = "omi_crowdsale",
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

/// Close the sale without a purchase and tell the ledger it is finished.
///
/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
/// - Already finalized
/// - Neither a goal nor the end time is reached
/// - The ledger rejects `finishCrowdsale`
#[receive(
    contract = "omi_crowdsale",
    name = "finalize",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_finalize<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    let now = ctx.metadata().slot_time();
    let state = host.state_mut();
    state.finalize(now)?;

    logger.log(&SaleEvent::Finalized(FinalizedEvent {
        at: now,
        tokens_sold: state.tokens_sold,
        usd_raised: state.usd_raised,
    }))?;

    let token_lock = state.token_lock;
    finish_ledger(host, &token_lock)
}

// ==============================================
// For buyers
// ==========================================

fn finish_ledger<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    token_lock: &ContractAddress,
) -> ContractResult<()> {
    let _ = host.invoke_contract(
        token_lock,
        &(),
        EntrypointName::new_unchecked("finishCrowdsale"),
        Amount::zero(),
    )?;
    Ok(())
}

fn log_transitions(
    logger: &mut impl HasLogger,
    transitions: &[&(Stage, Stage)],
) -> ContractResult<()> {
    for (from, to) in transitions {
        logger.log(&SaleEvent::StageAdvanced(StageAdvancedEvent {
            from: *from,
            to: *to,
        }))?;
    }
    Ok(())
}

/// All checks and state changes happen before any outgoing call.
fn buy_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    payer: Address,
    beneficiary: Address,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let now = ctx.metadata().slot_time();
    let state = host.state_mut();
    let purchase = state.buy(&payer, &beneficiary, amount, now)?;
    let wallet = state.wallet;
    let token_lock = state.token_lock;

    // a jump to the main sale happens before pricing, a full stage after it
    let (before, after): (Vec<_>, Vec<_>) = purchase
        .transitions
        .iter()
        .partition(|(_, to)| *to == purchase.stage);
    log_transitions(logger, &before)?;
    logger.log(&SaleEvent::Purchase(PurchaseEvent {
        payer,
        beneficiary,
        value: amount,
        tokens: purchase.tokens,
        stage: purchase.stage,
        rate: purchase.rate,
    }))?;
    log_transitions(logger, &after)?;
    if purchase.finalized {
        logger.log(&SaleEvent::Finalized(FinalizedEvent {
            at: now,
            tokens_sold: state.tokens_sold,
            usd_raised: state.usd_raised,
        }))?;
    }

    // interactions
    let transfer_result = host.invoke_transfer(&wallet, amount);
    ensure!(
        transfer_result.is_ok(),
        CustomContractError::TransferError.into()
    );

    for (duration, tokens) in purchase.tranches {
        if tokens == 0 {
            continue;
        }
        let params = LockTokensParams {
            beneficiary,
            anchor: LockAnchor::SaleFinish,
            duration,
            amount: ContractTokenAmount::from(tokens as u128),
        };
        let _ = host.invoke_contract(
            &token_lock,
            &params,
            EntrypointName::new_unchecked("lockTokens"),
            Amount::zero(),
        )?;
    }

    if purchase.finalized {
        finish_ledger(host, &token_lock)?;
    }
    Ok(())
}

/// Buy tokens for the sender.
///
/// Caller: Any whitelisted account or contract
/// Reject if:
/// - Contract is paused
/// - The sale is finalized
/// - The sender is not whitelisted
/// - The main sale is current and its start time is not reached
/// - The token amount is outside the purchase limits of the stage
/// - The purchase exceeds the remaining tokens of the stage
/// - Forwarding the payment or locking the tokens fails
#[receive(
    contract = "omi_crowdsale",
    name = "buy",
    error = "ContractError",
    enable_logger,
    mutable,
    payable
)]
fn contract_buy<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let sender = ctx.sender();
    buy_tokens(ctx, host, sender, sender, amount, logger)
}

/// Buy tokens for `beneficiary`.
/// Unless third-party purchases are allowed, it has to be the sender.
///
/// Caller: Any
/// Reject if:
/// - Fails to parse parameter
/// - The beneficiary differs from the sender and third-party purchases are not allowed
/// - Any reason `buy` rejects for, checked against the beneficiary
#[receive(
    contract = "omi_crowdsale",
    name = "buyTokens",
    parameter = "Address",
    error = "ContractError",
    enable_logger,
    mutable,
    payable
)]
fn contract_buy_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let beneficiary: Address = ctx.parameter_cursor().get()?;
    buy_tokens(ctx, host, ctx.sender(), beneficiary, amount, logger)
}
