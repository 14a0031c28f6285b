use crate::chain::{self, InitEnvironment, InstanceInfo, UpdateEnvironment};
use crate::config::*;
use concordium_smart_contract_testing::{AccountAddress, Amount, Chain};
use serde::Deserialize;
use serde_json::Value;

/// A sale run: how the three contracts are initialized and the updates sent to them.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// RFC 3339 time of the chain before the first step
    pub genesis_time: Option<String>,
    pub token_lock_init: Value,
    pub crowdsale_init: Value,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Token,
    TokenLock,
    Crowdsale,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    #[default]
    Success,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub contract: Target,
    pub entrypoint: String,
    /// One of the named accounts in the config
    pub invoker: String,
    /// Micro CCD sent along
    #[serde(default)]
    pub amount: u64,
    pub param: Option<Value>,
    pub slot_time: Option<String>,
    #[serde(default)]
    pub expect: Expect,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub passed: usize,
    /// Indices of the steps whose outcome differed from the expectation
    pub failed: Vec<usize>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

fn account(name: &str) -> anyhow::Result<AccountAddress> {
    named_account(name).ok_or_else(|| anyhow::anyhow!("Unknown account {:?}", name))
}

pub fn load(path: std::path::PathBuf) -> anyhow::Result<Scenario> {
    let value = crate::utils::get_object_from_json(path)?;
    Ok(serde_json::from_value(value)?)
}

/// Deploys and initializes the contracts, then runs every step in order.
pub fn run(scenario: &Scenario) -> anyhow::Result<Report> {
    log::info!("Scenario: {}", scenario.name);

    let mut chain: Chain = chain::generate_chain(
        vec![
            (ACC_ADDR_OWNER, AMOUNT_INIT),
            (ACC_ADDR_WALLET, AMOUNT_INIT),
            (ACC_ADDR_BUYER1, AMOUNT_INIT),
            (ACC_ADDR_BUYER2, AMOUNT_INIT),
        ],
        scenario.genesis_time.as_deref(),
    )?;

    let token_module = chain::deploy_module(PKG_TOKEN, &ACC_ADDR_OWNER, &mut chain)?;
    let lock_module = chain::deploy_module(PKG_TOKEN_LOCK, &ACC_ADDR_OWNER, &mut chain)?;
    let crowdsale_module = chain::deploy_module(PKG_CROWDSALE, &ACC_ADDR_OWNER, &mut chain)?;

    let token = token_module.initialize(
        InitEnvironment {
            id: INDEX_TOKEN,
            contract_name: CONTRACT_TOKEN,
            owner: ACC_ADDR_OWNER,
            param: None,
        },
        &mut chain,
    )?;
    let token_lock = lock_module.initialize(
        InitEnvironment {
            id: INDEX_TOKEN_LOCK,
            contract_name: CONTRACT_TOKEN_LOCK,
            owner: ACC_ADDR_OWNER,
            param: Some(&scenario.token_lock_init),
        },
        &mut chain,
    )?;
    let crowdsale = crowdsale_module.initialize(
        InitEnvironment {
            id: INDEX_CROWDSALE,
            contract_name: CONTRACT_CROWDSALE,
            owner: ACC_ADDR_OWNER,
            param: Some(&scenario.crowdsale_init),
        },
        &mut chain,
    )?;

    let mut report = Report::default();
    for (i, step) in scenario.steps.iter().enumerate() {
        let instance: &InstanceInfo = match step.contract {
            Target::Token => &token,
            Target::TokenLock => &token_lock,
            Target::Crowdsale => &crowdsale,
        };
        let succeeded = instance.update(
            UpdateEnvironment {
                invoker: account(&step.invoker)?,
                entry_point: &step.entrypoint,
                param: step.param.as_ref(),
                amount: Amount::from_micro_ccd(step.amount),
                slot_time: step.slot_time.as_deref(),
            },
            &mut chain,
        )?;

        let outcome = if succeeded {
            Expect::Success
        } else {
            Expect::Reject
        };
        if outcome == step.expect {
            report.passed += 1;
        } else {
            log::error!(
                "Step {} ({:?}.{}) expected {:?} but got {:?}",
                i,
                step.contract,
                step.entrypoint,
                step.expect,
                outcome
            );
            report.failed.push(i);
        }
    }

    let wallet = chain
        .account_balance_available(ACC_ADDR_WALLET)
        .unwrap_or_else(Amount::zero);
    log::info!("Wallet balance after the run: {}", wallet);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_defaults() {
        let step: Step = serde_json::from_str(
            r#"{ "contract": "crowdsale", "entrypoint": "buy", "invoker": "buyer1" }"#,
        )
        .unwrap();
        assert_eq!(step.contract, Target::Crowdsale);
        assert_eq!(step.amount, 0);
        assert_eq!(step.expect, Expect::Success);
        assert!(step.param.is_none());
    }

    #[test]
    fn test_bundled_scenario_parses() {
        let scenario: Scenario =
            serde_json::from_str(include_str!("../scenarios/omi_sale.json")).unwrap();
        assert!(!scenario.steps.is_empty());
        for step in scenario.steps.iter() {
            assert!(named_account(&step.invoker).is_some(), "{}", step.invoker);
        }
        assert!(scenario
            .steps
            .iter()
            .any(|step| step.expect == Expect::Reject));
    }

    #[test]
    fn test_report() {
        let mut report = Report::default();
        assert!(report.is_success());
        report.failed.push(3);
        assert!(!report.is_success());
    }
}
