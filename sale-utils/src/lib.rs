pub mod error;
pub mod events;
pub mod types;

use types::{DiscountPercentage, MicroCcd, UsdAmount};

pub const TOKEN_NAME: &str = "OMI Token";
pub const TOKEN_SYMBOL: &str = "OMI";
pub const TOKEN_DECIMALS: u8 = 18;
/// 750 billion tokens with 18 decimals.
pub const TOKEN_CAP: u128 = 750_000_000_000 * 1_000_000_000_000_000_000;

// ---------------------------------------
// Defaults of the OMI sale

pub const DEFAULT_RATE: MicroCcd = 10_000;

/// 2018-06-30T00:00:00Z
pub const SALE_START_MILLIS: u64 = 1_530_316_800_000;
/// 2018-09-30T23:59:59Z
pub const SALE_END_MILLIS: u64 = 1_538_351_999_000;

pub const FUNDING_GOAL_USD: UsdAmount = 44_625_000;
/// Sum of the stage maxima.
pub const TOKEN_GOAL: u64 = 462_500_000;

/// (discount, minimum purchase, maximum purchase, stage total) for
/// PreSale1, PreSale2 and MainSale.
pub const DEFAULT_STAGES: [(DiscountPercentage, u64, u64, u64); 3] = [
    (40, 25_000, 5_000_000, 50_000_000),
    (30, 25_000, 5_000_000, 50_000_000),
    (0, 2_500, 1_000_000, 362_500_000),
];

pub const PRE_SALE_VESTING_DAYS: [u64; 3] = [30, 60, 90];
pub const MAIN_SALE_VESTING_DAYS: [u64; 1] = [7];
