//! shipfee CLI - Command-line interface
//!
//! Commands:
//!   validate      - Check a zone catalog
//!   match         - Show the zone governing a vendor and destination
//!   quote         - Price a cart against a zone catalog
//!   reconcile     - Report or migrate zones left behind by a base-region change
//!   check-config  - Validate shipfee.yaml
//!   schema        - Print JSON schemas

mod cli;

use cli::*;
use shipfee::{Result, VERSION};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let rest = &args[2..];
    match util::load_config(rest) {
        Ok(config) => logging::init(&config.logging),
        Err(_) => logging::init(&Default::default()),
    }

    let result = match args[1].as_str() {
        "validate" => cmd_validate(rest),
        "match" => cmd_match(rest),
        "quote" => cmd_quote(rest),
        "reconcile" => cmd_reconcile(rest),
        "check-config" => cmd_check_config(rest),
        "schema" => cmd_schema(rest),
        "version" | "--version" | "-v" => {
            println!("shipfee {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    finish(result)
}

fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
shipfee - zone-based shipping fees for multi-vendor carts

USAGE:
    shipfee <COMMAND> [OPTIONS]

COMMANDS:
    validate <zones.yaml> [--strict]           Validate a zone catalog
    match <zones.yaml> <vendor> <destination>  Show which zone applies
    quote <zones.yaml> <cart.yaml>             Compute shipping for a cart
    reconcile <zones.yaml> [--apply]           Find zones filed under an old base region
                                               --apply migrates them and writes the catalog
    check-config [shipfee.yaml]                Validate engine configuration
    schema [name]                              Print JSON schema (catalog, cart, quote, ...)
    version                                    Print version

OPTIONS:
    --config, -c <file>    Engine configuration (default: nearest shipfee.yaml)
    --output, -o <file>    Output file (default: stdout)
    --json                 JSON output format (validate, match, quote, reconcile, check-config)
    --strict               Treat warnings as errors (validate)

ENVIRONMENT:
    RUST_LOG               Log filter, overrides logging.level

EXAMPLES:
    shipfee validate zones.yaml --strict
    shipfee match zones.yaml kofi "Greater Accra"
    shipfee quote zones.yaml cart.yaml --json
    shipfee reconcile zones.yaml --apply --output zones.yaml
"#
    );
}
