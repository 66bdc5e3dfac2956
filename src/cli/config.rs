//! Configuration commands: check-config, schema

use super::util::{has_flag, positional};
use shipfee::config::CONFIG_FILE;
use shipfee::*;
use std::path::PathBuf;

pub fn cmd_check_config(args: &[String]) -> Result<()> {
    let path = positional(args)
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    let result = validate_config_file(&path);

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.to_report());
    }

    if result.has_errors() {
        Err("Configuration is invalid".into())
    } else {
        Ok(())
    }
}

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: catalog, cart, quote, config, draft, reconcile");
            Ok(())
        }
        "catalog" => print_schema::<ZoneCatalog>(),
        "cart" => print_schema::<Cart>(),
        "quote" => print_schema::<ShippingQuote>(),
        "config" => print_schema::<EngineConfig>(),
        "draft" => print_schema::<ZoneDraft>(),
        "reconcile" => print_schema::<ReconciliationReport>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
