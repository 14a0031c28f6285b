use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    events::*,
    types::*,
};

/// Parameters of one stage, as given at init.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub struct StageConfig {
    /// Discount on the base rate in percent
    pub discount: DiscountPercentage,
    /// Smallest token amount per purchase
    pub minimum: u64,
    /// Largest token amount per purchase
    pub maximum: u64,
    /// Tokens the stage sells in total
    pub cap: u64,
}

#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub struct StageConfigs {
    pub pre_sale_1: StageConfig,
    pub pre_sale_2: StageConfig,
    pub main_sale: StageConfig,
}

/// A stage with its running total.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct StageInfo {
    pub(crate) discount: DiscountPercentage,
    pub(crate) minimum: u64,
    pub(crate) maximum: u64,
    pub(crate) cap: u64,
    /// Never exceeds `cap`
    pub(crate) sold: u64,
}

impl StageInfo {
    pub(crate) fn new(config: StageConfig) -> Result<Self, CustomContractError> {
        ensure!(config.discount < 100, CustomContractError::InvalidInput);
        ensure!(
            0 < config.minimum && config.minimum <= config.maximum && config.maximum <= config.cap,
            CustomContractError::InvalidInput
        );

        Ok(StageInfo {
            discount: config.discount,
            minimum: config.minimum,
            maximum: config.maximum,
            cap: config.cap,
            sold: 0,
        })
    }

    pub(crate) fn is_full(&self) -> bool {
        self.sold >= self.cap
    }
}

/// The three stages, indexed by `Stage`.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct StageTable {
    pub(crate) pre_sale_1: StageInfo,
    pub(crate) pre_sale_2: StageInfo,
    pub(crate) main_sale: StageInfo,
}

impl StageTable {
    pub(crate) fn new(configs: StageConfigs) -> Result<Self, CustomContractError> {
        Ok(StageTable {
            pre_sale_1: StageInfo::new(configs.pre_sale_1)?,
            pre_sale_2: StageInfo::new(configs.pre_sale_2)?,
            main_sale: StageInfo::new(configs.main_sale)?,
        })
    }

    pub(crate) fn get(&self, stage: Stage) -> &StageInfo {
        match stage {
            Stage::PreSale1 => &self.pre_sale_1,
            Stage::PreSale2 => &self.pre_sale_2,
            Stage::MainSale => &self.main_sale,
        }
    }

    pub(crate) fn get_mut(&mut self, stage: Stage) -> &mut StageInfo {
        match stage {
            Stage::PreSale1 => &mut self.pre_sale_1,
            Stage::PreSale2 => &mut self.pre_sale_2,
            Stage::MainSale => &mut self.main_sale,
        }
    }
}

/// Sale Schedule
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct SaleSchedule {
    /// Start of the main sale. Reaching it ends the pre-sales.
    pub(crate) start: Timestamp,
    /// Reaching it finalizes the sale on the next purchase
    pub(crate) end: Timestamp,
}

impl SaleSchedule {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CustomContractError> {
        ensure!(start < end, CustomContractError::InvalidSchedule);
        Ok(SaleSchedule { start, end })
    }

    pub(crate) fn is_started(&self, now: Timestamp) -> bool {
        self.start <= now
    }

    pub(crate) fn is_ended(&self, now: Timestamp) -> bool {
        self.end <= now
    }
}

#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct SaleGoals {
    /// Finalize once the reported USD raised reaches this
    pub usd: UsdAmount,
    /// Finalize once this many tokens are sold
    pub tokens: u64,
}

/// Lock durations of the tranches a purchase is split into.
/// All tranches count from the sale finish.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct VestingPlan {
    pub pre_sale: Vec<Duration>,
    pub main_sale: Vec<Duration>,
}

impl VestingPlan {
    pub(crate) fn validate(&self) -> Result<(), CustomContractError> {
        ensure!(
            !self.pre_sale.is_empty() && !self.main_sale.is_empty(),
            CustomContractError::InvalidSchedule
        );
        Ok(())
    }

    pub(crate) fn for_stage(&self, stage: Stage) -> &[Duration] {
        if stage.is_pre_sale() {
            &self.pre_sale
        } else {
            &self.main_sale
        }
    }

    /// Splits `tokens` evenly over the tranches of `stage`,
    /// the remainder goes to the last tranche.
    pub(crate) fn split(&self, stage: Stage, tokens: u64) -> Vec<(Duration, u64)> {
        let durations = self.for_stage(stage);
        let count = durations.len() as u64;
        let share = tokens / count;
        let remainder = tokens % count;

        durations
            .iter()
            .enumerate()
            .map(|(i, duration)| {
                if i + 1 == durations.len() {
                    (*duration, share + remainder)
                } else {
                    (*duration, share)
                }
            })
            .collect()
    }
}

/// Tokens bought by one beneficiary in each stage.
#[derive(Debug, Serialize, SchemaType, Clone, Default, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub(crate) pre_sale_1: u64,
    pub(crate) pre_sale_2: u64,
    pub(crate) main_sale: u64,
}

impl PurchaseRecord {
    pub(crate) fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::PreSale1 => self.pre_sale_1,
            Stage::PreSale2 => self.pre_sale_2,
            Stage::MainSale => self.main_sale,
        }
    }

    pub(crate) fn add(&mut self, stage: Stage, tokens: u64) -> Result<(), CustomContractError> {
        let slot = match stage {
            Stage::PreSale1 => &mut self.pre_sale_1,
            Stage::PreSale2 => &mut self.pre_sale_2,
            Stage::MainSale => &mut self.main_sale,
        };
        *slot = slot
            .checked_add(tokens)
            .ok_or(CustomContractError::OverflowError)?;
        Ok(())
    }

    pub(crate) fn to_vec(&self) -> Vec<u64> {
        Stage::ALL.iter().map(|stage| self.get(*stage)).collect()
    }
}

/// Everything an accepted purchase produced.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Purchase {
    pub(crate) stage: Stage,
    pub(crate) tokens: u64,
    /// Effective rate the tokens were priced at
    pub(crate) rate: MicroCcd,
    /// Stage transitions in the order they happened
    pub(crate) transitions: Vec<(Stage, Stage)>,
    pub(crate) finalized: bool,
    /// (lock duration, amount) per tranche
    pub(crate) tranches: Vec<(Duration, u64)>,
}

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// If `true`, purchases are rejected
    pub(crate) paused: bool,
    /// One-way. No purchase is accepted afterwards
    pub(crate) finalized: bool,
    /// Micro CCD per token before the discount of the stage
    pub(crate) rate: MicroCcd,
    /// Reported by the owner, never derived
    pub(crate) usd_raised: UsdAmount,
    /// Account receiving the payments
    pub(crate) wallet: AccountAddress,
    pub(crate) token: ContractAddress,
    pub(crate) token_lock: ContractAddress,
    pub(crate) schedule: SaleSchedule,
    pub(crate) goals: SaleGoals,
    pub(crate) stages: StageTable,
    /// Never moves backwards
    pub(crate) current_stage: Stage,
    pub(crate) vesting: VestingPlan,
    /// If `false`, the beneficiary of a purchase must be the payer
    pub(crate) allow_third_party: bool,
    pub(crate) tokens_sold: u64,
    pub(crate) ccd_raised: Amount,
    pub(crate) whitelist: StateSet<Address, S>,
    pub(crate) purchases: StateMap<Address, PurchaseRecord, S>,
}

impl<S: HasStateApi> State<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        state_builder: &mut StateBuilder<S>,
        rate: MicroCcd,
        wallet: AccountAddress,
        token: ContractAddress,
        token_lock: ContractAddress,
        schedule: SaleSchedule,
        goals: SaleGoals,
        stages: StageTable,
        vesting: VestingPlan,
        allow_third_party: bool,
    ) -> Self {
        State {
            paused: false,
            finalized: false,
            rate,
            usd_raised: 0,
            wallet,
            token,
            token_lock,
            schedule,
            goals,
            stages,
            current_stage: Stage::PreSale1,
            vesting,
            allow_third_party,
            tokens_sold: 0,
            ccd_raised: Amount::zero(),
            whitelist: state_builder.new_set(),
            purchases: state_builder.new_map(),
        }
    }

    /// `rate * (100 - discount) / 100` for `stage`.
    pub(crate) fn effective_rate(&self, stage: Stage) -> Result<MicroCcd, CustomContractError> {
        let discount = self.stages.get(stage).discount as u64;
        let rate = self
            .rate
            .checked_mul(100 - discount)
            .ok_or(CustomContractError::OverflowError)?
            / 100;
        Ok(rate)
    }

    pub(crate) fn is_whitelisted(&self, address: &Address) -> bool {
        self.whitelist.contains(address)
    }

    /// Whether a finalization trigger holds at `now`.
    pub(crate) fn can_finalize(&self, now: Timestamp) -> bool {
        self.usd_raised >= self.goals.usd
            || self.tokens_sold >= self.goals.tokens
            || self.schedule.is_ended(now)
    }

    pub(crate) fn purchase_record(&self, beneficiary: &Address) -> PurchaseRecord {
        self.purchases
            .get(beneficiary)
            .map(|record| record.clone())
            .unwrap_or_default()
    }

    /// The stage a purchase at `now` is priced in.
    /// The main sale takes over once its start time is reached.
    fn synced_stage(&self, now: Timestamp) -> Stage {
        if self.schedule.is_started(now) {
            Stage::MainSale
        } else {
            self.current_stage
        }
    }

    /// Validates a purchase and applies all of its effects on this state.
    /// Nothing is changed if it is rejected.
    pub(crate) fn buy(
        &mut self,
        payer: &Address,
        beneficiary: &Address,
        value: Amount,
        now: Timestamp,
    ) -> ContractResult<Purchase> {
        ensure!(!self.paused, CustomContractError::ContractPaused.into());
        ensure!(!self.finalized, CustomContractError::SaleFinalized.into());
        ensure!(
            self.allow_third_party || payer == beneficiary,
            CustomContractError::BeneficiaryMismatch.into()
        );
        ensure!(
            self.is_whitelisted(beneficiary),
            CustomContractError::NotWhitelisted.into()
        );

        let mut transitions = Vec::new();
        let stage = self.synced_stage(now);
        if stage != self.current_stage {
            transitions.push((self.current_stage, stage));
        }
        ensure!(
            stage != Stage::MainSale || self.schedule.is_started(now),
            CustomContractError::SaleNotStarted.into()
        );

        let rate = self.effective_rate(stage)?;
        ensure!(rate > 0, CustomContractError::InvalidRate.into());
        let tokens = value.micro_ccd / rate;

        let info = self.stages.get(stage);
        ensure!(
            tokens >= info.minimum,
            CustomContractError::BelowMinimumPurchase.into()
        );
        ensure!(
            tokens <= info.maximum,
            CustomContractError::AboveMaximumPurchase.into()
        );
        let stage_sold = info
            .sold
            .checked_add(tokens)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;
        ensure!(
            stage_sold <= info.cap,
            CustomContractError::StageCapExceeded.into()
        );
        let tokens_sold = self
            .tokens_sold
            .checked_add(tokens)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;
        let mut record = self.purchase_record(beneficiary);
        record.add(stage, tokens)?;

        // effects
        self.current_stage = stage;
        self.purchases.insert(*beneficiary, record);
        self.stages.get_mut(stage).sold = stage_sold;
        self.tokens_sold = tokens_sold;
        self.ccd_raised += value;

        if self.stages.get(stage).is_full() {
            if let Some(next) = stage.next() {
                transitions.push((stage, next));
                self.current_stage = next;
            }
        }

        if self.can_finalize(now) {
            self.finalized = true;
        }

        Ok(Purchase {
            stage,
            tokens,
            rate,
            transitions,
            finalized: self.finalized,
            tranches: self.vesting.split(stage, tokens),
        })
    }

    /// Finalize without a purchase.
    pub(crate) fn finalize(&mut self, now: Timestamp) -> ContractResult<()> {
        ensure!(!self.finalized, CustomContractError::SaleFinalized.into());
        ensure!(
            self.can_finalize(now),
            CustomContractError::SaleNotClosed.into()
        );
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;
    use sale_utils::{
        DEFAULT_RATE, DEFAULT_STAGES, FUNDING_GOAL_USD, MAIN_SALE_VESTING_DAYS,
        PRE_SALE_VESTING_DAYS, SALE_END_MILLIS, SALE_START_MILLIS, TOKEN_GOAL,
    };

    const WALLET: AccountAddress = AccountAddress([1u8; 32]);
    const USER1: Address = Address::Account(AccountAddress([10u8; 32]));
    const USER2: Address = Address::Account(AccountAddress([11u8; 32]));

    fn stage_config(i: usize) -> StageConfig {
        let (discount, minimum, maximum, cap) = DEFAULT_STAGES[i];
        StageConfig {
            discount,
            minimum,
            maximum,
            cap,
        }
    }

    fn vesting() -> VestingPlan {
        VestingPlan {
            pre_sale: PRE_SALE_VESTING_DAYS
                .iter()
                .map(|d| Duration::from_days(*d))
                .collect(),
            main_sale: MAIN_SALE_VESTING_DAYS
                .iter()
                .map(|d| Duration::from_days(*d))
                .collect(),
        }
    }

    fn omi_state<S: HasStateApi>(state_builder: &mut StateBuilder<S>) -> State<S> {
        let stages = StageTable::new(StageConfigs {
            pre_sale_1: stage_config(0),
            pre_sale_2: stage_config(1),
            main_sale: stage_config(2),
        })
        .unwrap();
        let schedule = SaleSchedule::new(
            Timestamp::from_timestamp_millis(SALE_START_MILLIS),
            Timestamp::from_timestamp_millis(SALE_END_MILLIS),
        )
        .unwrap();
        let mut state = State::new(
            state_builder,
            DEFAULT_RATE,
            WALLET,
            ContractAddress::new(1, 0),
            ContractAddress::new(2, 0),
            schedule,
            SaleGoals {
                usd: FUNDING_GOAL_USD,
                tokens: TOKEN_GOAL,
            },
            stages,
            vesting(),
            false,
        );
        state.whitelist.insert(USER1);
        state
    }

    fn before_start() -> Timestamp {
        Timestamp::from_timestamp_millis(SALE_START_MILLIS - 1)
    }

    #[test]
    fn test_invalid_configs() {
        let now = Timestamp::from_timestamp_millis(10);
        assert_eq!(
            SaleSchedule::new(now, now),
            Err(CustomContractError::InvalidSchedule)
        );

        let mut config = stage_config(0);
        config.discount = 100;
        assert_eq!(
            StageInfo::new(config),
            Err(CustomContractError::InvalidInput)
        );
        let mut config = stage_config(0);
        config.maximum = config.cap + 1;
        assert_eq!(
            StageInfo::new(config),
            Err(CustomContractError::InvalidInput)
        );

        let plan = VestingPlan {
            pre_sale: vec![],
            main_sale: vec![Duration::from_days(7)],
        };
        assert_eq!(
            plan.validate(),
            Err(CustomContractError::InvalidSchedule)
        );
    }

    #[test]
    fn test_split_gives_remainder_to_last_tranche() {
        let plan = vesting();
        assert_eq!(
            plan.split(Stage::PreSale1, 25_000),
            vec![
                (Duration::from_days(30), 8_333),
                (Duration::from_days(60), 8_333),
                (Duration::from_days(90), 8_334),
            ]
        );
        assert_eq!(
            plan.split(Stage::MainSale, 2_500),
            vec![(Duration::from_days(7), 2_500)]
        );
    }

    #[test]
    fn test_effective_rate() {
        let mut state_builder = TestStateBuilder::new();
        let state = omi_state(&mut state_builder);
        assert_eq!(state.effective_rate(Stage::PreSale1), Ok(6_000));
        assert_eq!(state.effective_rate(Stage::PreSale2), Ok(7_000));
        assert_eq!(state.effective_rate(Stage::MainSale), Ok(10_000));
    }

    #[test]
    fn test_buy_presale() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), before_start())
            .unwrap();
        assert_eq!(purchase.stage, Stage::PreSale1);
        assert_eq!(purchase.tokens, 25_000);
        assert_eq!(purchase.rate, 6_000);
        assert!(purchase.transitions.is_empty());
        assert!(!purchase.finalized);
        assert_eq!(purchase.tranches.len(), 3);

        assert_eq!(state.tokens_sold, 25_000);
        assert_eq!(state.stages.pre_sale_1.sold, 25_000);
        assert_eq!(state.ccd_raised, Amount::from_micro_ccd(150_000_000));
        assert_eq!(state.purchase_record(&USER1).to_vec(), vec![25_000, 0, 0]);
    }

    #[test]
    fn test_buy_limits() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = before_start();

        // 24_999 tokens
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(149_999_999), now),
            Err(CustomContractError::BelowMinimumPurchase.into())
        );
        // 5_000_001 tokens
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(30_000_006_000), now),
            Err(CustomContractError::AboveMaximumPurchase.into())
        );
        assert_eq!(
            state.buy(&USER2, &USER2, Amount::from_micro_ccd(150_000_000), now),
            Err(CustomContractError::NotWhitelisted.into())
        );
        assert_eq!(
            state.buy(&USER1, &USER2, Amount::from_micro_ccd(150_000_000), now),
            Err(CustomContractError::BeneficiaryMismatch.into())
        );
        assert_eq!(state.tokens_sold, 0);
    }

    #[test]
    fn test_stage_cap_boundary_and_advance() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = before_start();
        let rate = 6_000;
        state.stages.pre_sale_1.sold = 50_000_000 - 30_000;

        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(30_001 * rate), now),
            Err(CustomContractError::StageCapExceeded.into())
        );

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(30_000 * rate), now)
            .unwrap();
        assert_eq!(purchase.transitions, vec![(Stage::PreSale1, Stage::PreSale2)]);
        assert_eq!(state.current_stage, Stage::PreSale2);
        assert_eq!(state.stages.pre_sale_1.sold, 50_000_000);
    }

    #[test]
    fn test_start_time_jumps_to_main_sale() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = Timestamp::from_timestamp_millis(SALE_START_MILLIS);

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(25_000_000), now)
            .unwrap();
        assert_eq!(purchase.stage, Stage::MainSale);
        assert_eq!(purchase.rate, 10_000);
        assert_eq!(purchase.tokens, 2_500);
        assert_eq!(purchase.transitions, vec![(Stage::PreSale1, Stage::MainSale)]);
        assert_eq!(purchase.tranches, vec![(Duration::from_days(7), 2_500)]);
    }

    #[test]
    fn test_rejected_purchase_keeps_stage() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = Timestamp::from_timestamp_millis(SALE_START_MILLIS);

        // 2_499 tokens at the main sale rate
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(24_999_999), now),
            Err(CustomContractError::BelowMinimumPurchase.into())
        );
        assert_eq!(state.current_stage, Stage::PreSale1);

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(25_000_000), now)
            .unwrap();
        assert_eq!(purchase.transitions, vec![(Stage::PreSale1, Stage::MainSale)]);
        assert_eq!(state.current_stage, Stage::MainSale);
    }

    #[test]
    fn test_main_sale_before_start_is_rejected() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        state.current_stage = Stage::MainSale;

        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(25_000_000), before_start()),
            Err(CustomContractError::SaleNotStarted.into())
        );
    }

    #[test]
    fn test_finalization_triggers() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = before_start();

        assert_eq!(
            state.finalize(now),
            Err(CustomContractError::SaleNotClosed.into())
        );

        state.usd_raised = FUNDING_GOAL_USD;
        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), now)
            .unwrap();
        assert!(purchase.finalized);
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), now),
            Err(CustomContractError::SaleFinalized.into())
        );
        assert_eq!(
            state.finalize(now),
            Err(CustomContractError::SaleFinalized.into())
        );
    }

    #[test]
    fn test_token_goal_finalizes() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        state.goals.tokens = 50_000;
        let now = before_start();

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), now)
            .unwrap();
        assert!(!purchase.finalized);

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), now)
            .unwrap();
        assert!(purchase.finalized);
        assert!(state.finalized);
        assert_eq!(state.tokens_sold, 50_000);
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), now),
            Err(CustomContractError::SaleFinalized.into())
        );
    }

    #[test]
    fn test_end_time_finalizes() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        let now = Timestamp::from_timestamp_millis(SALE_END_MILLIS);

        let purchase = state
            .buy(&USER1, &USER1, Amount::from_micro_ccd(25_000_000), now)
            .unwrap();
        assert!(purchase.finalized);
        assert_eq!(purchase.stage, Stage::MainSale);
    }

    #[test]
    fn test_paused_purchase() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = omi_state(&mut state_builder);
        state.paused = true;
        assert_eq!(
            state.buy(&USER1, &USER1, Amount::from_micro_ccd(150_000_000), before_start()),
            Err(CustomContractError::ContractPaused.into())
        );
    }
}
