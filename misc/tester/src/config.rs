use concordium_contracts_common::{AccountAddress, Amount};

pub const ACC_ADDR_OWNER: AccountAddress = AccountAddress([0u8; 32]);
pub const ACC_ADDR_WALLET: AccountAddress = AccountAddress([1u8; 32]);
pub const ACC_ADDR_BUYER1: AccountAddress = AccountAddress([10u8; 32]);
pub const ACC_ADDR_BUYER2: AccountAddress = AccountAddress([11u8; 32]);
pub const AMOUNT_INIT: Amount = Amount::from_ccd(100_000);
pub const AMOUNT_ZERO: Amount = Amount::zero();

pub const ENERGY_LIMIT: u64 = 100_000;

pub const TARGET_DIR: &str = "../../target/concordium/wasm32-unknown-unknown/release/";

pub const CONTRACT_TOKEN: &str = "omi_token";
pub const PKG_TOKEN: &str = "omi_token";
pub const INDEX_TOKEN: u64 = 0;

pub const CONTRACT_TOKEN_LOCK: &str = "omi_token_lock";
pub const PKG_TOKEN_LOCK: &str = "omi_token_lock";
pub const INDEX_TOKEN_LOCK: u64 = 1;

pub const CONTRACT_CROWDSALE: &str = "omi_crowdsale";
pub const PKG_CROWDSALE: &str = "omi_crowdsale";
pub const INDEX_CROWDSALE: u64 = 2;

/// Accounts a scenario may refer to by name.
pub fn named_account(name: &str) -> Option<AccountAddress> {
    match name {
        "owner" => Some(ACC_ADDR_OWNER),
        "wallet" => Some(ACC_ADDR_WALLET),
        "buyer1" => Some(ACC_ADDR_BUYER1),
        "buyer2" => Some(ACC_ADDR_BUYER2),
        _ => None,
    }
}
