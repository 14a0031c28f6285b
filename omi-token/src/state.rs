use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    events::*,
    types::*,
    TOKEN_CAP,
};

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// If `true`, transfers and burns are rejected
    pub(crate) paused: bool,
    /// Everything ever minted. Burning does not decrease this
    pub(crate) total_minted: ContractTokenAmount,
    /// Tokens in circulation
    pub(crate) total_supply: ContractTokenAmount,
    pub(crate) balances: StateMap<Address, ContractTokenAmount, S>,
    /// Keyed by (owner, spender)
    pub(crate) allowances: StateMap<(Address, Address), ContractTokenAmount, S>,
    pub(crate) minters: StateSet<Address, S>,
    pub(crate) pausers: StateSet<Address, S>,
}

impl<S: HasStateApi> State<S> {
    /// The account initializing the contract becomes minter and pauser.
    pub(crate) fn new(state_builder: &mut StateBuilder<S>, origin: AccountAddress) -> Self {
        let mut state = State {
            paused: false,
            total_minted: 0.into(),
            total_supply: 0.into(),
            balances: state_builder.new_map(),
            allowances: state_builder.new_map(),
            minters: state_builder.new_set(),
            pausers: state_builder.new_set(),
        };
        state.minters.insert(Address::Account(origin));
        state.pausers.insert(Address::Account(origin));
        state
    }

    pub(crate) fn balance(&self, address: &Address) -> ContractTokenAmount {
        self.balances
            .get(address)
            .map(|amount| *amount)
            .unwrap_or_else(|| 0.into())
    }

    pub(crate) fn allowance(&self, owner: &Address, spender: &Address) -> ContractTokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .map(|amount| *amount)
            .unwrap_or_else(|| 0.into())
    }

    pub(crate) fn has_role(&self, address: &Address, role: Role) -> bool {
        match role {
            Role::Minter => self.minters.contains(address),
            Role::Pauser => self.pausers.contains(address),
        }
    }

    pub(crate) fn grant_role(&mut self, address: Address, role: Role) {
        match role {
            Role::Minter => self.minters.insert(address),
            Role::Pauser => self.pausers.insert(address),
        };
    }

    pub(crate) fn revoke_role(&mut self, address: &Address, role: Role) {
        match role {
            Role::Minter => self.minters.remove(address),
            Role::Pauser => self.pausers.remove(address),
        };
    }

    /// Cap check is on everything ever minted so burned tokens cannot be re-minted.
    pub(crate) fn mint(
        &mut self,
        owner: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        let minted = self
            .total_minted
            .0
            .checked_add(amount.0)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;
        ensure!(
            minted <= TOKEN_CAP,
            CustomContractError::CapExceeded.into()
        );

        self.total_minted = minted.into();
        self.total_supply += amount;
        let mut balance = self.balances.entry(*owner).or_insert_with(|| 0.into());
        *balance += amount;
        Ok(())
    }

    pub(crate) fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        if amount == 0.into() {
            return Ok(());
        }
        {
            let mut from_balance = self
                .balances
                .entry(*from)
                .occupied_or(ContractError::InsufficientFunds)?;
            ensure!(*from_balance >= amount, ContractError::InsufficientFunds);
            *from_balance -= amount;
        }
        let mut to_balance = self.balances.entry(*to).or_insert_with(|| 0.into());
        *to_balance += amount;
        Ok(())
    }

    pub(crate) fn burn(
        &mut self,
        owner: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        if amount == 0.into() {
            return Ok(());
        }
        let mut balance = self
            .balances
            .entry(*owner)
            .occupied_or(ContractError::InsufficientFunds)?;
        ensure!(*balance >= amount, ContractError::InsufficientFunds);
        *balance -= amount;
        self.total_supply -= amount;
        Ok(())
    }

    pub(crate) fn set_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: ContractTokenAmount,
    ) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Returns the remaining allowance.
    pub(crate) fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<ContractTokenAmount> {
        let current = self.allowance(owner, spender);
        ensure!(
            current >= amount,
            CustomContractError::InsufficientAllowance.into()
        );
        let remaining = current - amount;
        self.set_allowance(owner, spender, remaining);
        Ok(remaining)
    }
}

#[cfg(any(feature = "wasm-test", test))]
/// implements PartialEq for `claim_eq` inside test functions.
impl<S: HasStateApi> PartialEq for State<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.paused != other.paused
            || self.total_minted != other.total_minted
            || self.total_supply != other.total_supply
        {
            return false;
        }
        if self.balances.iter().count() != other.balances.iter().count() {
            return false;
        }
        for (address, amount) in self.balances.iter() {
            match other.balances.get(&address) {
                Some(other_amount) if *other_amount == *amount => {}
                _ => return false,
            }
        }
        if self.allowances.iter().count() != other.allowances.iter().count() {
            return false;
        }
        for (key, amount) in self.allowances.iter() {
            match other.allowances.get(&key) {
                Some(other_amount) if *other_amount == *amount => {}
                _ => return false,
            }
        }
        self.minters.iter().count() == other.minters.iter().count()
            && self.minters.iter().all(|a| other.minters.contains(&a))
            && self.pausers.iter().count() == other.pausers.iter().count()
            && self.pausers.iter().all(|a| other.pausers.contains(&a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;

    const ORIGIN: AccountAddress = AccountAddress([0u8; 32]);
    const ALICE: Address = Address::Account(AccountAddress([10u8; 32]));
    const BOB: Address = Address::Account(AccountAddress([11u8; 32]));

    #[test]
    fn test_new_grants_roles_to_origin() {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, ORIGIN);

        assert!(state.has_role(&Address::Account(ORIGIN), Role::Minter));
        assert!(state.has_role(&Address::Account(ORIGIN), Role::Pauser));
        assert!(!state.has_role(&ALICE, Role::Minter));
        assert_eq!(state.total_minted, 0.into());
    }

    #[test]
    fn test_mint_cap_boundary() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, ORIGIN);

        state.mint(&ALICE, 1_000.into()).unwrap();
        let remaining = TOKEN_CAP - state.total_minted.0;

        assert_eq!(
            state.mint(&BOB, (remaining + 1).into()),
            Err(CustomContractError::CapExceeded.into())
        );
        assert!(state.mint(&BOB, remaining.into()).is_ok());
        assert_eq!(state.total_minted, TOKEN_CAP.into());
        assert_eq!(
            state.mint(&BOB, 1.into()),
            Err(CustomContractError::CapExceeded.into())
        );
    }

    #[test]
    fn test_burned_tokens_stay_minted() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, ORIGIN);

        state.mint(&ALICE, 100.into()).unwrap();
        state.burn(&ALICE, 40.into()).unwrap();

        assert_eq!(state.total_supply, 60.into());
        assert_eq!(state.total_minted, 100.into());
        assert_eq!(state.balance(&ALICE), 60.into());
        assert_eq!(
            state.burn(&ALICE, 61.into()),
            Err(ContractError::InsufficientFunds)
        );
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, ORIGIN);
        state.mint(&ALICE, 100.into()).unwrap();

        state.transfer(&ALICE, &BOB, 30.into()).unwrap();
        assert_eq!(state.balance(&ALICE), 70.into());
        assert_eq!(state.balance(&BOB), 30.into());

        assert_eq!(
            state.transfer(&BOB, &ALICE, 31.into()),
            Err(ContractError::InsufficientFunds)
        );
        // nothing to move from an address without balance, but zero is fine
        assert!(state.transfer(&Address::Account(ORIGIN), &BOB, 0.into()).is_ok());
    }

    #[test]
    fn test_spend_allowance() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, ORIGIN);
        state.set_allowance(&ALICE, &BOB, 50.into());

        assert_eq!(state.spend_allowance(&ALICE, &BOB, 20.into()), Ok(30.into()));
        assert_eq!(state.allowance(&ALICE, &BOB), 30.into());
        assert_eq!(
            state.spend_allowance(&ALICE, &BOB, 31.into()),
            Err(CustomContractError::InsufficientAllowance.into())
        );
        assert_eq!(state.allowance(&BOB, &ALICE), 0.into());
    }
}
