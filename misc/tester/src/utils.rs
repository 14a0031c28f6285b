use anyhow::Context;
use concordium_base::smart_contracts::{ContractEvent, WasmModule};
use concordium_contracts_common::{
    schema::{Type, VersionedModuleSchema},
    Timestamp,
};
use std::path::PathBuf;

pub fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

pub fn get_schema(src: &WasmModule) -> anyhow::Result<VersionedModuleSchema> {
    Ok(concordium_smart_contract_engine::utils::get_embedded_schema_v1(src.source.as_ref())?)
}

pub fn get_object_from_json(path: PathBuf) -> anyhow::Result<serde_json::Value> {
    let file = std::fs::read(&path).context(format!("Could not read file {:?}.", path))?;
    let value = serde_json::from_slice(&file).context("Could not parse the JSON.")?;
    Ok(value)
}

/// Parses an RFC 3339 time into a slot time.
pub fn parse_slot_time(t: &str) -> anyhow::Result<Timestamp> {
    let dt = chrono::DateTime::parse_from_rfc3339(t).context(format!("Invalid time {}", t))?;
    let millis = u64::try_from(dt.timestamp_millis()).context("Time before the epoch")?;
    Ok(Timestamp::from_timestamp_millis(millis))
}

/// Serializes `value` with `schema`, or to no bytes when there is no value.
pub fn serial_parameter(
    schema: Option<&Type>,
    value: Option<&serde_json::Value>,
) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match (schema, value) {
        (Some(schema), Some(value)) => {
            log::debug!("param > {}", value);
            schema
                .serial_value_into(value, &mut bytes)
                .context("Could not generate parameter bytes using schema and JSON.")?;
        },
        (None, Some(_)) => anyhow::bail!("[Schema Error] The entrypoint takes no parameter!"),
        _ => {},
    }
    Ok(bytes)
}

pub fn print_logs(events: &[ContractEvent], schema_event: Option<&Type>) {
    for event in events {
        let bytes: &[u8] = event.as_ref();
        match schema_event.map(|schema| schema.to_json_string_pretty(bytes)) {
            Some(Ok(out)) => log::info!("Event: {}", out),
            _ => log::info!("Event (raw): {:?}", bytes),
        }
    }
}

pub fn print_return_value(rv: &[u8], schema_return_value: Option<&Type>) -> anyhow::Result<()> {
    if let Some(schema) = schema_return_value {
        let out = schema
            .to_json_string_pretty(rv)
            .map_err(|_| anyhow::anyhow!("Could not output return value in JSON"))?;
        log::info!("Return value: {}", out);
    } else if !rv.is_empty() {
        log::info!(
            "No schema for the return value. The raw return value is {:?}.",
            rv
        );
    }
    Ok(())
}

type FunctionSchemas<'a> = (
    Option<&'a Type>,
    Option<&'a Type>,
    Option<&'a Type>,
    Option<&'a Type>,
);

pub fn get_schemas_for_init<'a>(
    vschema: &'a VersionedModuleSchema,
    contract_name: &str,
) -> anyhow::Result<FunctionSchemas<'a>> {
    if let VersionedModuleSchema::V3(module_schema) = vschema {
        match module_schema.contracts.get(contract_name) {
            Some(contract_schema) => match contract_schema.init.as_ref() {
                Some(func_schema) => Ok((
                    func_schema.parameter(),
                    func_schema.return_value(),
                    func_schema.error(),
                    contract_schema.event(),
                )),
                None => anyhow::bail!("[Schema Error] No init function in the contract!"),
            },
            None => anyhow::bail!("[Schema Error] No contract name in the schema!"),
        }
    } else {
        anyhow::bail!("[Schema Error] Currently only support Schema Version3!");
    }
}

pub fn get_schemas_for_receive<'a>(
    vschema: &'a VersionedModuleSchema,
    contract_name: &str,
    func_name: &str,
) -> anyhow::Result<FunctionSchemas<'a>> {
    if let VersionedModuleSchema::V3(module_schema) = vschema {
        match module_schema.contracts.get(contract_name) {
            Some(contract_schema) => match contract_schema.receive.get(func_name) {
                Some(func_schema) => Ok((
                    func_schema.parameter(),
                    func_schema.return_value(),
                    func_schema.error(),
                    contract_schema.event(),
                )),
                None => anyhow::bail!(
                    "[Schema Error] No entrypoint {} in the contract!",
                    func_name
                ),
            },
            None => anyhow::bail!("[Schema Error] No contract name in the schema!"),
        }
    } else {
        anyhow::bail!("[Schema Error] Currently only support Schema Version3!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_time() {
        let ts = parse_slot_time("2018-06-30T00:00:00Z").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_530_316_800_000);
        assert!(parse_slot_time("1969-12-31T23:59:59Z").is_err());
        assert!(parse_slot_time("yesterday").is_err());
    }

    #[test]
    fn test_serial_parameter_without_schema() {
        assert_eq!(serial_parameter(None, None).unwrap(), Vec::<u8>::new());
        let value = serde_json::json!(1);
        assert!(serial_parameter(None, Some(&value)).is_err());
    }
}
