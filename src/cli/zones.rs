//! Zone catalog commands: validate, match, reconcile

use super::util::{
    has_flag, load_catalog, load_config, parse_output_arg, positional, write_output,
};
use shipfee::config_validate::blocked_migrations;
use shipfee::*;
use std::path::Path;

pub fn cmd_validate(args: &[String]) -> Result<()> {
    let paths = positional(args);
    if paths.is_empty() {
        return Err("Usage: shipfee validate <zones.yaml> [--strict] [--json]".into());
    }

    let json_output = has_flag(args, "--json");
    let strict = has_flag(args, "--strict");
    let config = load_config(args)?;

    let result = validate_catalog_file(Path::new(paths[0]), &config);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.to_report());
    }

    if result.has_errors() || (strict && result.has_warnings()) {
        Err("Catalog validation failed".into())
    } else {
        Ok(())
    }
}

pub fn cmd_match(args: &[String]) -> Result<()> {
    let params = positional(args);
    if params.len() < 3 {
        return Err("Usage: shipfee match <zones.yaml> <vendor> <destination> [--json]".into());
    }

    let catalog = load_catalog(params[0])?;
    let vendor_id = VendorId::from(params[1]);
    let destination = params[2];

    let book = catalog
        .book(&vendor_id)
        .ok_or_else(|| Error::Other(format!("Unknown vendor: {}", vendor_id)))?;
    let matched = match_zone(&book.base_region, destination, &book.zones)?;

    if has_flag(args, "--json") {
        let value = serde_json::json!({
            "vendorId": vendor_id,
            "vendorRegion": book.base_region,
            "destinationRegion": destination,
            "matchKind": matched.kind,
            "zone": matched.zone,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "{} ({} match): {} → {}, base rate {}",
            matched.zone.name,
            matched.kind,
            matched.zone.vendor_region,
            matched.zone.region,
            matched.zone.base_rate
        );
    }

    Ok(())
}

pub fn cmd_reconcile(args: &[String]) -> Result<()> {
    let paths = positional(args);
    if paths.is_empty() {
        return Err(
            "Usage: shipfee reconcile <zones.yaml> [--apply] [--output <file>] [--json]".into(),
        );
    }

    let json_output = has_flag(args, "--json");
    let config = load_config(args)?;
    let mut catalog = load_catalog(paths[0])?;
    let report = reconcile(&catalog);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_report());
    }

    if report.is_synced() || !has_flag(args, "--apply") {
        return Ok(());
    }

    let blocked = blocked_migrations(&catalog, &config);
    if !blocked.is_empty() {
        return Err(format!("Migration blocked for: {}", blocked.join(", ")).into());
    }

    let applied = apply_reconciliation(&mut catalog, &config.limits())?;
    for (vendor_id, changes) in &applied {
        for change in changes {
            eprintln!("{}: {}", vendor_id, change);
        }
    }

    let output = parse_output_arg(args);
    write_output(&output, &catalog.to_yaml()?)
}
