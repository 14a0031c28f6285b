use crate::config;
use crate::utils;
use anyhow::Context;
use concordium_base::smart_contracts::WasmModule;
use concordium_contracts_common::schema::VersionedModuleSchema;
use concordium_smart_contract_testing::*;

pub fn generate_chain(
    accounts: Vec<(AccountAddress, Amount)>,
    slot_time: Option<&str>,
) -> anyhow::Result<Chain> {
    let mut chain = if let Some(t) = slot_time {
        Chain::new_with_time(utils::parse_slot_time(t)?)
    } else {
        Chain::new()
    };

    for acc in accounts {
        chain.create_account(Account::new(acc.0, acc.1));
    }

    Ok(chain)
}

pub fn deploy_module(
    pkg: &str,
    deployer: &AccountAddress,
    chain: &mut Chain,
) -> anyhow::Result<ModuleInfo> {
    let module_file = format!("{}{}.wasm.v1", config::TARGET_DIR, pkg);

    let wasm_module: WasmModule = module_load_v1(&module_file)
        .map_err(|e| anyhow::anyhow!("Could not load {}: {:?}", module_file, e))?;
    let schema: VersionedModuleSchema = utils::get_schema(&wasm_module)?;
    let module: ModuleDeploySuccess = chain
        .module_deploy_v1(Signer::with_one_key(), *deployer, wasm_module)
        .map_err(|e| anyhow::anyhow!("Deploying {} failed: {:?}", pkg, e))?;
    log::info!("Deployed {} as {:?}", pkg, module.module_reference);

    Ok(ModuleInfo { module, schema })
}

// ------------------------
pub struct InitEnvironment<'a> {
    pub id: u64,
    pub contract_name: &'static str,
    pub owner: AccountAddress,
    pub param: Option<&'a serde_json::Value>,
}

pub struct UpdateEnvironment<'a> {
    pub invoker: AccountAddress,
    pub entry_point: &'a str,
    pub param: Option<&'a serde_json::Value>,
    pub amount: Amount,
    pub slot_time: Option<&'a str>,
}

pub struct ModuleInfo {
    pub module: ModuleDeploySuccess,
    pub schema: VersionedModuleSchema,
}

impl ModuleInfo {
    pub fn initialize(
        &self,
        env: InitEnvironment,
        chain: &mut Chain,
    ) -> anyhow::Result<InstanceInfo> {
        let func_name: String = format!("init_{}", env.contract_name);
        log::info!("===== Init::{:?} =====", func_name);

        let (schema_parameter, _, _, schema_event) =
            match utils::get_schemas_for_init(&self.schema, env.contract_name) {
                Ok(schemas) => schemas,
                // an init without parameter may have no function schema
                Err(e) if env.param.is_none() => {
                    log::debug!("{}", e);
                    (None, None, None, None)
                },
                Err(e) => return Err(e),
            };
        let parameter = OwnedParameter::try_from(utils::serial_parameter(
            schema_parameter,
            env.param,
        )?)
        .context("Parameter too large.")?;

        let it = chain
            .contract_init(
                Signer::with_one_key(),
                env.owner,
                Energy::from(config::ENERGY_LIMIT),
                InitContractPayload {
                    amount: Amount::zero(),
                    mod_ref: self.module.module_reference,
                    init_name: OwnedContractName::new_unchecked(func_name),
                    param: parameter,
                },
            )
            .map_err(|e| anyhow::anyhow!("Initialization failed: {:?}", e))?;

        anyhow::ensure!(
            it.contract_address.index == env.id,
            "Instance got index {} instead of {}. Later steps refer to the wrong contract.",
            it.contract_address.index,
            env.id
        );
        utils::print_logs(&it.events, schema_event);

        Ok(InstanceInfo {
            address: it.contract_address,
            contract_name: env.contract_name,
            schema: &self.schema,
        })
    }
}

pub struct InstanceInfo<'a> {
    pub address: ContractAddress,
    pub contract_name: &'static str,
    pub schema: &'a VersionedModuleSchema,
}

impl<'a> InstanceInfo<'a> {
    /// Sends one update. A rejection is returned as `Ok(false)`.
    pub fn update(&self, env: UpdateEnvironment, chain: &mut Chain) -> anyhow::Result<bool> {
        if let Some(t) = env.slot_time {
            chain.set_slot_time(utils::parse_slot_time(t)?);
        }

        let (schema_parameter, schema_return_value, _, schema_event) =
            match utils::get_schemas_for_receive(self.schema, self.contract_name, env.entry_point)
            {
                Ok(schemas) => schemas,
                Err(e) if env.param.is_none() => {
                    log::debug!("{}", e);
                    (None, None, None, None)
                },
                Err(e) => return Err(e),
            };

        let receive_name =
            OwnedReceiveName::new_unchecked(format!("{}.{}", self.contract_name, env.entry_point));
        log::info!(
            "=============== Receive::{:?} ===============",
            receive_name,
        );

        let parameter = OwnedParameter::try_from(utils::serial_parameter(
            schema_parameter,
            env.param,
        )?)
        .context("Parameter too large.")?;

        let update = chain.contract_update(
            Signer::with_one_key(),
            env.invoker,
            Address::Account(env.invoker),
            Energy::from(config::ENERGY_LIMIT),
            UpdateContractPayload {
                amount: env.amount,
                address: self.address,
                receive_name,
                message: parameter,
            },
        );

        let update: ContractInvokeSuccess = match update {
            Ok(update) => update,
            Err(e) => {
                log::warn!("Rejected: {:?}", e.kind);
                return Ok(false);
            },
        };

        for v in update.trace_elements {
            if let DebugTraceElement::Regular {
                trace_element: ContractTraceElement::Updated { data },
                ..
            } = v
            {
                if data.address == self.address {
                    utils::print_logs(&data.events, schema_event);
                } else {
                    log::info!("{} events from {:?}", data.events.len(), data.address);
                }
            }
        }
        utils::print_return_value(&update.return_value, schema_return_value)?;

        Ok(true)
    }
}
