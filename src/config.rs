//! Engine configuration
//!
//! Loaded from `shipfee.yaml`. Every section is optional:
//!
//! ```yaml
//! version: 1
//! currency:
//!   scale: 2
//!   rounding: half_up
//! validation:
//!   max_tiers_per_kind: 20
//!   require_default_zone: false
//! logging:
//!   level: warn
//!   json: false
//! ```

use crate::calculate::CalculatorOptions;
use crate::error::{Error, Result};
use crate::money::Rounding;
use crate::validate::ValidationLimits;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`EngineConfig::find`]
pub const CONFIG_FILE: &str = "shipfee.yaml";

/// Largest accepted `currency.scale`
pub const MAX_SCALE: u32 = 8;

/// Root configuration (`shipfee.yaml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Shipfee Config")]
pub struct EngineConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub currency: CurrencyConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            currency: CurrencyConfig::default(),
            validation: ValidationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// How fees are rounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CurrencyConfig {
    /// Decimal places kept on each vendor fee
    #[serde(default = "default_scale")]
    pub scale: u32,

    #[serde(default)]
    pub rounding: Rounding,
}

fn default_scale() -> u32 {
    2
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            rounding: Rounding::default(),
        }
    }
}

/// Zone validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationConfig {
    /// Maximum tiers of one type per zone
    #[serde(default = "default_max_tiers")]
    pub max_tiers_per_kind: usize,

    /// Warn when a vendor region has no default zone
    #[serde(default)]
    pub require_default_zone: bool,
}

fn default_max_tiers() -> usize {
    20
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_tiers_per_kind: default_max_tiers(),
            require_default_zone: false,
        }
    }
}

/// Logging settings for the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Default filter, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Other(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        if config.version != 1 {
            return Err(Error::Other(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, config.version
            )));
        }

        if config.currency.scale > MAX_SCALE {
            return Err(Error::Other(format!(
                "currency.scale {} in {} is out of range (0-{})",
                config.currency.scale, CONFIG_FILE, MAX_SCALE
            )));
        }

        Ok(config)
    }

    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content)
    }

    /// Load `shipfee.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Ok(None);
        }
        Self::load_from_file(&file).map(Some)
    }

    /// Walk up from `start` to the first directory holding `shipfee.yaml`
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|file| file.exists())
    }

    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_tiers_per_kind: self.validation.max_tiers_per_kind,
        }
    }

    pub fn calculator_options(&self) -> CalculatorOptions {
        CalculatorOptions {
            scale: self.currency.scale,
            rounding: self.currency.rounding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.currency.scale, 2);
        assert_eq!(config.limits().max_tiers_per_kind, 20);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_yaml(
            r#"
currency:
  rounding: half_even
logging:
  json: true
"#,
        )
        .unwrap();
        assert_eq!(config.currency.scale, 2);
        assert_eq!(config.currency.rounding, Rounding::HalfEven);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_rejects_unknown_version() {
        assert!(EngineConfig::from_yaml("version: 2").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_scale() {
        let err = EngineConfig::from_yaml("currency:\n  scale: 12\n").unwrap_err();
        assert!(err.to_string().contains("currency.scale 12"));
        let config = EngineConfig::from_yaml("currency:\n  scale: 8\n").unwrap();
        assert_eq!(config.calculator_options().scale, MAX_SCALE);
    }

    #[test]
    fn test_load_rejects_out_of_range_scale() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join(CONFIG_FILE);
        std::fs::write(&file, "currency:\n  scale: 30\n").unwrap();
        assert!(EngineConfig::load_from_file(&file).is_err());
    }

    #[test]
    fn test_load_and_find() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "currency:\n  scale: 0\n").unwrap();

        let found = EngineConfig::find(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));

        let config = EngineConfig::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.calculator_options().scale, 0);
        assert!(EngineConfig::load_from_dir(&nested).unwrap().is_none());
    }
}
