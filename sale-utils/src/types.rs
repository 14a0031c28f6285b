use crate::error::CustomContractError;
use concordium_cis2::{Receiver, TokenAmountU128, TokenIdUnit};
use concordium_std::*;

pub type ContractTokenId = TokenIdUnit;
pub type ContractTokenAmount = TokenAmountU128;
pub type MicroCcd = u64;
pub type UsdAmount = u64;

pub type DiscountPercentage = u8;

/// Phases of the crowdsale, in the order they run.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    PreSale1,
    PreSale2,
    MainSale,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::PreSale1, Stage::PreSale2, Stage::MainSale];

    pub fn index(self) -> u8 {
        match self {
            Stage::PreSale1 => 0,
            Stage::PreSale2 => 1,
            Stage::MainSale => 2,
        }
    }

    /// The stage that follows, `None` for the main sale.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::PreSale1 => Some(Stage::PreSale2),
            Stage::PreSale2 => Some(Stage::MainSale),
            Stage::MainSale => None,
        }
    }

    pub fn is_pre_sale(self) -> bool {
        self != Stage::MainSale
    }
}

impl TryFrom<u8> for Stage {
    type Error = CustomContractError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.index() == n)
            .ok_or(CustomContractError::InvalidStage)
    }
}

/// Base time the duration of a lock counts from.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub enum LockAnchor {
    /// A start time given when the lock is created.
    Fixed(Timestamp),
    /// The moment the crowdsale is finished on the lock ledger.
    SaleFinish,
}

impl LockAnchor {
    /// Time at which a lock of `duration` becomes releasable.
    /// `None` while a sale-anchored lock waits for the sale to finish.
    pub fn maturity(
        &self,
        duration: Duration,
        finished_at: Option<Timestamp>,
    ) -> Option<Timestamp> {
        let base = match self {
            LockAnchor::Fixed(start) => *start,
            LockAnchor::SaleFinish => finished_at?,
        };
        base.checked_add(duration)
    }
}

/// How the lock ledger gets hold of the tokens it locks.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub enum FundingMode {
    /// Pull the tokens from the allowance provider with `transferFrom`.
    Allowance,
    /// Use tokens transferred to the ledger in advance.
    Deposit,
}

#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Minter,
    Pauser,
}

// -----------------------------------------------
// Parameters shared between contracts

/// Parameter of `omi_token_lock.lockTokens`.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct LockTokensParams {
    /// Who receives the tokens once the lock matures
    pub beneficiary: Address,
    /// Start of the lock period
    pub anchor: LockAnchor,
    /// Length of the lock period
    pub duration: Duration,
    /// Locked token amount
    pub amount: ContractTokenAmount,
}

/// Parameter of `omi_token.transferFrom`.
/// The sender spends its allowance on `owner`'s balance.
#[derive(Debug, Serialize, SchemaType)]
pub struct TransferFromParams {
    pub owner: Address,
    pub to: Receiver,
    pub amount: ContractTokenAmount,
}
