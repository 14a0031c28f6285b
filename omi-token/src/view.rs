use crate::{
    state::{State, *},
    RoleParams,
};
use concordium_cis2::{BalanceOfQueryParams, BalanceOfQueryResponse};
use concordium_std::*;
use sale_utils::{TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};

type ContractBalanceOfQueryParams = BalanceOfQueryParams<ContractTokenId>;
type ContractBalanceOfQueryResponse = BalanceOfQueryResponse<ContractTokenAmount>;

#[derive(Debug, Serialize, SchemaType)]
struct ViewResponse {
    name: String,
    symbol: String,
    decimals: u8,
    cap: ContractTokenAmount,
    total_supply: ContractTokenAmount,
    total_minted: ContractTokenAmount,
    paused: bool,
}

#[receive(contract = "omi_token", name = "view", return_value = "ViewResponse")]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        name: TOKEN_NAME.to_string(),
        symbol: TOKEN_SYMBOL.to_string(),
        decimals: TOKEN_DECIMALS,
        cap: TOKEN_CAP.into(),
        total_supply: state.total_supply,
        total_minted: state.total_minted,
        paused: state.paused,
    })
}

// ------------------------------------------

#[receive(
    contract = "omi_token",
    name = "balanceOf",
    parameter = "ContractBalanceOfQueryParams",
    return_value = "ContractBalanceOfQueryResponse",
    error = "ContractError"
)]
fn contract_balance_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ContractBalanceOfQueryResponse> {
    let params: ContractBalanceOfQueryParams = ctx.parameter_cursor().get()?;
    let state = host.state();

    let mut response = Vec::with_capacity(params.queries.len());
    for query in params.queries {
        response.push(state.balance(&query.address));
    }
    Ok(BalanceOfQueryResponse::from(response))
}

// ------------------------------------------

#[derive(Debug, Serialize, SchemaType)]
pub struct AllowanceQuery {
    pub owner: Address,
    pub spender: Address,
}

#[receive(
    contract = "omi_token",
    name = "allowance",
    parameter = "AllowanceQuery",
    return_value = "ContractTokenAmount",
    error = "ContractError"
)]
fn contract_allowance<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ContractTokenAmount> {
    let query: AllowanceQuery = ctx.parameter_cursor().get()?;
    Ok(host.state().allowance(&query.owner, &query.spender))
}

// ------------------------------------------

#[receive(
    contract = "omi_token",
    name = "hasRole",
    parameter = "RoleParams",
    return_value = "bool",
    error = "ContractError"
)]
fn contract_has_role<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<bool> {
    let params: RoleParams = ctx.parameter_cursor().get()?;
    Ok(host.state().has_role(&params.address, params.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;
    use concordium_cis2::{BalanceOfQuery, TokenIdUnit};

    #[test]
    fn test_balance_of_and_view() {
        let origin = AccountAddress([0u8; 32]);
        let holder = Address::Account(AccountAddress([10u8; 32]));
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, origin);
        state.mint(&holder, 500.into()).unwrap();
        let host = TestHost::new(state, state_builder);

        let params = ContractBalanceOfQueryParams {
            queries: vec![
                BalanceOfQuery {
                    token_id: TokenIdUnit(),
                    address: holder,
                },
                BalanceOfQuery {
                    token_id: TokenIdUnit(),
                    address: Address::Account(origin),
                },
            ],
        };
        let parameter_bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&parameter_bytes);

        let response = contract_balance_of(&ctx, &host).unwrap();
        assert_eq!(response.0, vec![500.into(), 0.into()]);

        let view = contract_view(&ctx, &host).unwrap();
        assert_eq!(view.total_minted, 500.into());
        assert_eq!(view.cap, TOKEN_CAP.into());
        assert_eq!(view.symbol, "OMI");
    }
}
