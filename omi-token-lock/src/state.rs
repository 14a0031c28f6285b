use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    events::*,
    types::*,
};

/// A single grant of a beneficiary.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct TokenLock {
    pub(crate) amount: ContractTokenAmount,
    pub(crate) anchor: LockAnchor,
    pub(crate) duration: Duration,
    pub(crate) released: bool,
    pub(crate) revoked: bool,
}

impl TokenLock {
    pub(crate) fn new(amount: ContractTokenAmount, anchor: LockAnchor, duration: Duration) -> Self {
        TokenLock {
            amount,
            anchor,
            duration,
            released: false,
            revoked: false,
        }
    }

    /// Neither released nor revoked.
    pub(crate) fn is_active(&self) -> bool {
        !self.released && !self.revoked
    }

    pub(crate) fn maturity(&self, finished_at: Option<Timestamp>) -> Option<Timestamp> {
        self.anchor.maturity(self.duration, finished_at)
    }

    pub(crate) fn is_matured(&self, now: Timestamp, finished_at: Option<Timestamp>) -> bool {
        match self.maturity(finished_at) {
            Some(maturity) => maturity <= now,
            None => false,
        }
    }
}

/// What a release of one beneficiary produced.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Release {
    pub(crate) beneficiary: Address,
    pub(crate) amount: ContractTokenAmount,
    /// (index, amount) of every grant released
    pub(crate) grants: Vec<(u32, ContractTokenAmount)>,
}

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// The OMI token contract
    pub(crate) token: ContractAddress,
    /// The crowdsale allowed to lock tokens and to finish the sale
    pub(crate) crowdsale: Option<ContractAddress>,
    /// Whose allowance is spent in `FundingMode::Allowance`
    pub(crate) allowance_provider: Address,
    pub(crate) funding: FundingMode,
    /// If `true`, locking and self-service release stop working
    pub(crate) paused: bool,
    /// Set once by `finishCrowdsale`
    pub(crate) finished_at: Option<Timestamp>,
    /// Sum of all active grants
    pub(crate) total_locked: ContractTokenAmount,
    /// Tokens held by the ledger that back no grant
    pub(crate) unallocated: ContractTokenAmount,
    /// Grants per beneficiary, never pruned
    pub(crate) locks: StateMap<Address, Vec<TokenLock>, S>,
    /// Beneficiaries in the order they got their first grant
    pub(crate) beneficiaries: StateMap<u32, Address, S>,
    pub(crate) beneficiary_count: u32,
}

impl<S: HasStateApi> State<S> {
    pub(crate) fn new(
        state_builder: &mut StateBuilder<S>,
        token: ContractAddress,
        allowance_provider: Address,
        funding: FundingMode,
    ) -> Self {
        State {
            token,
            crowdsale: None,
            allowance_provider,
            funding,
            paused: false,
            finished_at: None,
            total_locked: 0.into(),
            unallocated: 0.into(),
            locks: state_builder.new_map(),
            beneficiaries: state_builder.new_map(),
            beneficiary_count: 0,
        }
    }

    /// The registered crowdsale or the instance owner.
    pub(crate) fn is_locker(&self, sender: &Address, owner: &AccountAddress) -> bool {
        if sender.matches_account(owner) {
            return true;
        }
        match (sender, self.crowdsale) {
            (Address::Contract(contract), Some(crowdsale)) => *contract == crowdsale,
            _ => false,
        }
    }

    /// Once a crowdsale is registered it alone may finish the sale.
    /// Before that the instance owner can.
    pub(crate) fn is_finisher(&self, sender: &Address, owner: &AccountAddress) -> bool {
        match self.crowdsale {
            Some(crowdsale) => *sender == Address::Contract(crowdsale),
            None => sender.matches_account(owner),
        }
    }

    /// Appends a grant and returns its index in the list of the beneficiary.
    /// In `FundingMode::Deposit` the grant is taken out of the unallocated pool.
    pub(crate) fn add_lock(
        &mut self,
        beneficiary: &Address,
        anchor: LockAnchor,
        duration: Duration,
        amount: ContractTokenAmount,
    ) -> ContractResult<u32> {
        ensure!(amount > 0.into(), CustomContractError::InvalidInput.into());
        if let LockAnchor::Fixed(start) = anchor {
            ensure!(
                start.checked_add(duration).is_some(),
                CustomContractError::InvalidSchedule.into()
            );
        }

        if self.funding == FundingMode::Deposit {
            ensure!(
                self.unallocated >= amount,
                CustomContractError::InsufficientDeposit.into()
            );
            self.unallocated -= amount;
        }

        let total_locked = self
            .total_locked
            .0
            .checked_add(amount.0)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;
        self.total_locked = total_locked.into();

        if self.locks.get(beneficiary).is_none() {
            self.beneficiaries
                .insert(self.beneficiary_count, *beneficiary);
            self.beneficiary_count += 1;
            self.locks.insert(*beneficiary, Vec::new());
        }

        let mut locks = self
            .locks
            .get_mut(beneficiary)
            .ok_or(ContractError::from(CustomContractError::NoLocks))?;
        let index = u32::try_from(locks.len()).map_err(CustomContractError::from)?;
        locks.push(TokenLock::new(amount, anchor, duration));
        Ok(index)
    }

    /// Marks every matured active grant of `beneficiary` as released.
    /// Rejects with `NoLocks` when the beneficiary has no active grant at all.
    pub(crate) fn release(
        &mut self,
        beneficiary: &Address,
        now: Timestamp,
    ) -> ContractResult<Release> {
        let finished_at = self.finished_at;
        let mut amount: u128 = 0;
        let mut grants = Vec::new();
        {
            let mut locks = self
                .locks
                .get_mut(beneficiary)
                .ok_or(ContractError::from(CustomContractError::NoLocks))?;
            ensure!(
                locks.iter().any(TokenLock::is_active),
                CustomContractError::NoLocks.into()
            );

            for (index, lock) in locks.iter_mut().enumerate() {
                if lock.is_active() && lock.is_matured(now, finished_at) {
                    lock.released = true;
                    amount += lock.amount.0;
                    grants.push((index as u32, lock.amount));
                }
            }
        }
        self.total_locked -= ContractTokenAmount::from(amount);

        Ok(Release {
            beneficiary: *beneficiary,
            amount: amount.into(),
            grants,
        })
    }

    /// Revokes a grant before it matures; the tokens go back to the unallocated pool.
    pub(crate) fn revoke(
        &mut self,
        beneficiary: &Address,
        index: u32,
        now: Timestamp,
    ) -> ContractResult<ContractTokenAmount> {
        let finished_at = self.finished_at;
        let amount = {
            let mut locks = self
                .locks
                .get_mut(beneficiary)
                .ok_or(ContractError::from(CustomContractError::LockNotFound))?;
            let lock = locks
                .iter_mut()
                .nth(index as usize)
                .ok_or(ContractError::from(CustomContractError::LockNotFound))?;

            ensure!(!lock.released, CustomContractError::AlreadyReleased.into());
            ensure!(!lock.revoked, CustomContractError::AlreadyRevoked.into());
            ensure!(
                !lock.is_matured(now, finished_at),
                CustomContractError::AlreadyMatured.into()
            );
            lock.revoked = true;
            lock.amount
        };
        self.total_locked -= amount;
        self.unallocated += amount;
        Ok(amount)
    }

    pub(crate) fn finish(&mut self, now: Timestamp) -> ContractResult<()> {
        ensure!(
            self.finished_at.is_none(),
            CustomContractError::AlreadyFinished.into()
        );
        self.finished_at = Some(now);
        Ok(())
    }

    /// Every receipt lands in the unallocated pool, whatever the funding mode.
    /// `lockTokens` takes its own pull back out in `FundingMode::Allowance`.
    pub(crate) fn credit_deposit(&mut self, amount: ContractTokenAmount) {
        self.unallocated += amount;
    }

    pub(crate) fn take_unallocated(&mut self, amount: ContractTokenAmount) -> ContractResult<()> {
        ensure!(
            self.unallocated >= amount,
            CustomContractError::InsufficientDeposit.into()
        );
        self.unallocated -= amount;
        Ok(())
    }

    pub(crate) fn beneficiary_at(&self, index: u32) -> Option<Address> {
        self.beneficiaries.get(&index).map(|address| *address)
    }

    pub(crate) fn lock_count(&self, beneficiary: &Address) -> u32 {
        self.locks
            .get(beneficiary)
            .map(|locks| locks.len() as u32)
            .unwrap_or(0)
    }

    pub(crate) fn get_lock(&self, beneficiary: &Address, index: u32) -> Option<TokenLock> {
        self.locks
            .get(beneficiary)
            .and_then(|locks| locks.iter().nth(index as usize).cloned())
    }

    /// Sum of the active grants of `beneficiary`.
    pub(crate) fn active_amount(&self, beneficiary: &Address) -> ContractTokenAmount {
        let amount: u128 = self
            .locks
            .get(beneficiary)
            .map(|locks| {
                locks
                    .iter()
                    .filter(|lock| lock.is_active())
                    .map(|lock| lock.amount.0)
                    .sum()
            })
            .unwrap_or(0);
        amount.into()
    }
}

#[cfg(any(feature = "wasm-test", test))]
/// implements PartialEq for `claim_eq` inside test functions.
impl<S: HasStateApi> PartialEq for State<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.token != other.token
            || self.crowdsale != other.crowdsale
            || self.allowance_provider != other.allowance_provider
            || self.funding != other.funding
            || self.paused != other.paused
            || self.finished_at != other.finished_at
            || self.total_locked != other.total_locked
            || self.unallocated != other.unallocated
            || self.beneficiary_count != other.beneficiary_count
        {
            return false;
        }
        for (index, address) in self.beneficiaries.iter() {
            if other.beneficiary_at(*index) != Some(*address) {
                return false;
            }
        }
        for (address, locks) in self.locks.iter() {
            match other.locks.get(&address) {
                Some(other_locks) if *other_locks == *locks => {}
                _ => return false,
            }
        }
        self.locks.iter().count() == other.locks.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;

    const TOKEN: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const CROWDSALE: ContractAddress = ContractAddress {
        index: 3,
        subindex: 0,
    };
    const OWNER_ACC: AccountAddress = AccountAddress([1u8; 32]);
    const PROVIDER: Address = Address::Account(AccountAddress([2u8; 32]));
    const USER1: Address = Address::Account(AccountAddress([10u8; 32]));
    const USER2: Address = Address::Account(AccountAddress([11u8; 32]));

    fn ts(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(millis)
    }

    fn new_state<S: HasStateApi>(
        state_builder: &mut StateBuilder<S>,
        funding: FundingMode,
    ) -> State<S> {
        State::new(state_builder, TOKEN, PROVIDER, funding)
    }

    #[test]
    fn test_release_after_maturity_only_once() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        state
            .add_lock(&USER1, LockAnchor::Fixed(ts(100)), Duration::from_millis(50), 10.into())
            .unwrap();
        assert_eq!(state.total_locked, 10.into());

        let early = state.release(&USER1, ts(149)).unwrap();
        assert_eq!(early.amount, 0.into());
        assert_eq!(state.total_locked, 10.into());

        let release = state.release(&USER1, ts(150)).unwrap();
        assert_eq!(release.amount, 10.into());
        assert_eq!(release.grants, vec![(0, 10.into())]);
        assert_eq!(state.total_locked, 0.into());

        assert_eq!(
            state.release(&USER1, ts(200)),
            Err(CustomContractError::NoLocks.into())
        );
        assert_eq!(
            state.release(&USER2, ts(200)),
            Err(CustomContractError::NoLocks.into())
        );
    }

    #[test]
    fn test_sale_anchored_lock_waits_for_finish() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        state
            .add_lock(&USER1, LockAnchor::SaleFinish, Duration::from_millis(10), 5.into())
            .unwrap();
        assert_eq!(state.release(&USER1, ts(1_000)).unwrap().amount, 0.into());

        state.finish(ts(1_000)).unwrap();
        assert_eq!(
            state.finish(ts(1_001)),
            Err(CustomContractError::AlreadyFinished.into())
        );
        assert_eq!(state.release(&USER1, ts(1_009)).unwrap().amount, 0.into());
        assert_eq!(state.release(&USER1, ts(1_010)).unwrap().amount, 5.into());
    }

    #[test]
    fn test_beneficiary_index_keeps_insertion_order() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        let anchor = LockAnchor::Fixed(ts(0));
        assert_eq!(state.add_lock(&USER2, anchor, Duration::from_millis(1), 1.into()), Ok(0));
        assert_eq!(state.add_lock(&USER1, anchor, Duration::from_millis(1), 1.into()), Ok(0));
        assert_eq!(state.add_lock(&USER2, anchor, Duration::from_millis(2), 1.into()), Ok(1));

        assert_eq!(state.beneficiary_count, 2);
        assert_eq!(state.beneficiary_at(0), Some(USER2));
        assert_eq!(state.beneficiary_at(1), Some(USER1));
        assert_eq!(state.lock_count(&USER2), 2);
        assert_eq!(state.active_amount(&USER2), 2.into());
    }

    #[test]
    fn test_deposit_mode_needs_unallocated_tokens() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Deposit);
        let anchor = LockAnchor::Fixed(ts(0));

        assert_eq!(
            state.add_lock(&USER1, anchor, Duration::from_millis(1), 1.into()),
            Err(CustomContractError::InsufficientDeposit.into())
        );
        state.credit_deposit(100.into());
        assert!(state.add_lock(&USER1, anchor, Duration::from_millis(1), 60.into()).is_ok());
        assert_eq!(state.unallocated, 40.into());
        assert_eq!(
            state.add_lock(&USER1, anchor, Duration::from_millis(1), 41.into()),
            Err(CustomContractError::InsufficientDeposit.into())
        );
    }

    #[test]
    fn test_allowance_mode_keeps_receipts_unallocated() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);
        state.credit_deposit(100.into());
        assert_eq!(state.unallocated, 100.into());

        // grants are funded by the pull, not by the pool
        state
            .add_lock(&USER1, LockAnchor::Fixed(ts(0)), Duration::from_millis(1), 150.into())
            .unwrap();
        assert_eq!(state.unallocated, 100.into());
        assert_eq!(state.total_locked, 150.into());
    }

    #[test]
    fn test_revoke() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);
        let anchor = LockAnchor::Fixed(ts(100));
        state.add_lock(&USER1, anchor, Duration::from_millis(10), 7.into()).unwrap();
        state.add_lock(&USER1, anchor, Duration::from_millis(20), 8.into()).unwrap();

        assert_eq!(
            state.revoke(&USER1, 2, ts(105)),
            Err(CustomContractError::LockNotFound.into())
        );
        assert_eq!(state.revoke(&USER1, 1, ts(105)), Ok(8.into()));
        assert_eq!(
            state.revoke(&USER1, 1, ts(105)),
            Err(CustomContractError::AlreadyRevoked.into())
        );
        assert_eq!(
            state.revoke(&USER1, 0, ts(110)),
            Err(CustomContractError::AlreadyMatured.into())
        );
        assert_eq!(state.total_locked, 7.into());
        assert_eq!(state.unallocated, 8.into());

        // the revoked grant never releases
        let release = state.release(&USER1, ts(1_000)).unwrap();
        assert_eq!(release.grants, vec![(0, 7.into())]);
        assert_eq!(
            state.revoke(&USER1, 0, ts(1_000)),
            Err(CustomContractError::AlreadyReleased.into())
        );
    }

    #[test]
    fn test_is_locker() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        assert!(state.is_locker(&Address::Account(OWNER_ACC), &OWNER_ACC));
        assert!(!state.is_locker(&Address::Contract(CROWDSALE), &OWNER_ACC));
        state.crowdsale = Some(CROWDSALE);
        assert!(state.is_locker(&Address::Contract(CROWDSALE), &OWNER_ACC));
        assert!(!state.is_locker(&USER1, &OWNER_ACC));
    }

    #[test]
    fn test_is_finisher() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        assert!(state.is_finisher(&Address::Account(OWNER_ACC), &OWNER_ACC));
        assert!(!state.is_finisher(&Address::Contract(CROWDSALE), &OWNER_ACC));
        state.crowdsale = Some(CROWDSALE);
        assert!(state.is_finisher(&Address::Contract(CROWDSALE), &OWNER_ACC));
        assert!(!state.is_finisher(&Address::Account(OWNER_ACC), &OWNER_ACC));
        assert!(!state.is_finisher(&USER1, &OWNER_ACC));
    }

    #[test]
    fn test_rejects_empty_and_overflowing_locks() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder, FundingMode::Allowance);

        assert_eq!(
            state.add_lock(&USER1, LockAnchor::SaleFinish, Duration::from_millis(1), 0.into()),
            Err(CustomContractError::InvalidInput.into())
        );
        assert_eq!(
            state.add_lock(
                &USER1,
                LockAnchor::Fixed(ts(u64::MAX)),
                Duration::from_millis(1),
                1.into()
            ),
            Err(CustomContractError::InvalidSchedule.into())
        );
        assert_eq!(state.beneficiary_count, 0);
    }
}
