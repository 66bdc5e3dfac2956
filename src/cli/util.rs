//! CLI utility helpers

use shipfee::{Cart, EngineConfig, Error, Result, ZoneCatalog};
use std::fs;
use std::path::{Path, PathBuf};

/// Value following `flag` (or its short form), if present
pub fn parse_flag_value(args: &[String], flag: &str, short: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag || a == short)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Parse --output argument to determine output file path
pub fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    parse_flag_value(args, "--output", "-o").map(PathBuf::from)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Positional arguments, skipping flags and their values
pub fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        match arg.as_str() {
            "--output" | "-o" | "--config" | "-c" => skip = true,
            a if a.starts_with('-') => {}
            a => out.push(a),
        }
    }
    out
}

/// Load the engine config from --config, or the nearest `shipfee.yaml`
pub fn load_config(args: &[String]) -> Result<EngineConfig> {
    if let Some(path) = parse_flag_value(args, "--config", "-c") {
        return EngineConfig::load_from_file(Path::new(&path));
    }
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    match EngineConfig::find(&cwd) {
        Some(path) => EngineConfig::load_from_file(&path),
        None => Ok(EngineConfig::default()),
    }
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a zone catalog from YAML or JSON
pub fn load_catalog(path: &str) -> Result<ZoneCatalog> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    if is_json(path) {
        ZoneCatalog::from_json(&content)
    } else {
        ZoneCatalog::from_yaml(&content)
    }
}

/// Read a cart from YAML or JSON
pub fn load_cart(path: &str) -> Result<Cart> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    if is_json(path) {
        Cart::from_json(&content)
    } else {
        Cart::from_yaml(&content)
    }
}

/// Write content to file or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
