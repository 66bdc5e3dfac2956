//! File validation for shipfee
//!
//! Validates `shipfee.yaml` and zone catalog files, collecting every issue
//! with a stable code instead of stopping at the first problem.

use crate::config::{EngineConfig, MAX_SCALE};
use crate::manager::ZoneManager;
use crate::matcher::region_key;
use crate::reconcile::reconcile;
use crate::validate::{check_default_invariant, validate_stored};
use crate::zone::ZoneCatalog;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue found in a file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub file: String,
    /// Vendor and zone the issue refers to, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ConfigIssue {
    pub fn error(code: &str, message: &str, file: &str) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            location: None,
        }
    }

    pub fn warning(code: &str, message: &str, file: &str) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Result of file validation
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConfigValidationResult {
    pub issues: Vec<ConfigIssue>,
    pub zones_checked: usize,
}

impl ConfigValidationResult {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        for issue in &self.issues {
            let tag = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            out.push_str(&format!("{}[{}]: {}", tag, issue.code, issue.message));
            if let Some(location) = &issue.location {
                out.push_str(&format!(" ({})", location));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{} zone(s) checked, {} error(s), {} warning(s)\n",
            self.zones_checked,
            self.error_count(),
            self.warning_count()
        ));
        out
    }
}

fn read_file(path: &Path, result: &mut ConfigValidationResult) -> Option<String> {
    let file_str = path.display().to_string();
    if !path.exists() {
        result
            .issues
            .push(ConfigIssue::error("E001", "File does not exist", &file_str));
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(c) => Some(c),
        Err(e) => {
            result.issues.push(ConfigIssue::error(
                "E002",
                &format!("Cannot read file: {}", e),
                &file_str,
            ));
            None
        }
    }
}

/// Validate a `shipfee.yaml` file
pub fn validate_config_file(path: &Path) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::default();
    let file_str = path.display().to_string();

    let Some(content) = read_file(path, &mut result) else {
        return result;
    };

    let config: EngineConfig = match serde_norway::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            result.issues.push(ConfigIssue::error(
                "E003",
                &format!("Invalid YAML: {}", e),
                &file_str,
            ));
            return result;
        }
    };

    if config.version != 1 {
        result.issues.push(ConfigIssue::error(
            "E004",
            &format!(
                "Unsupported version: {}. Only version 1 is supported.",
                config.version
            ),
            &file_str,
        ));
    }

    if config.currency.scale > MAX_SCALE {
        result.issues.push(ConfigIssue::error(
            "E005",
            &format!(
                "currency.scale {} is out of range (0-{})",
                config.currency.scale, MAX_SCALE
            ),
            &file_str,
        ));
    } else if config.currency.scale == 0 {
        result.issues.push(ConfigIssue::warning(
            "W001",
            "currency.scale is 0; fees will be rounded to whole units",
            &file_str,
        ));
    }

    if config.validation.max_tiers_per_kind == 0 {
        result.issues.push(ConfigIssue::error(
            "E006",
            "validation.max_tiers_per_kind must be at least 1",
            &file_str,
        ));
    }

    if config
        .logging
        .level
        .parse::<tracing_subscriber::EnvFilter>()
        .is_err()
    {
        result.issues.push(ConfigIssue::warning(
            "W002",
            &format!(
                "logging.level '{}' is not a valid filter; 'warn' will be used",
                config.logging.level
            ),
            &file_str,
        ));
    }

    result
}

/// Validate a zone catalog file against the engine configuration
pub fn validate_catalog_file(path: &Path, config: &EngineConfig) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::default();
    let file_str = path.display().to_string();

    let Some(content) = read_file(path, &mut result) else {
        return result;
    };

    match ZoneCatalog::from_yaml(&content) {
        Ok(catalog) => validate_catalog(&catalog, config, &file_str, &mut result),
        Err(e) => result.issues.push(ConfigIssue::error(
            "E003",
            &format!("Invalid catalog: {}", e),
            &file_str,
        )),
    }

    result
}

/// Validate an in-memory catalog, appending issues to `result`
pub fn validate_catalog(
    catalog: &ZoneCatalog,
    config: &EngineConfig,
    file: &str,
    result: &mut ConfigValidationResult,
) {
    let limits = config.limits();
    let mut vendors = HashSet::new();

    for book in &catalog.vendors {
        let vendor = book.vendor_id.to_string();
        if !vendors.insert(&book.vendor_id) {
            result.issues.push(
                ConfigIssue::error("E010", "Vendor appears more than once", file).at(&vendor),
            );
        }
        if book.base_region.trim().is_empty() {
            result.issues.push(
                ConfigIssue::error("E011", "Vendor base region is empty", file).at(&vendor),
            );
        }

        let mut ids = HashSet::new();
        let mut destinations = HashSet::new();
        for zone in &book.zones {
            result.zones_checked += 1;
            let location = format!("{} / {}", vendor, zone.name);

            if !ids.insert(&zone.id) {
                result.issues.push(
                    ConfigIssue::error(
                        "E012",
                        &format!("Zone id '{}' is used twice", zone.id),
                        file,
                    )
                    .at(&location),
                );
            }
            if let Err(e) = validate_stored(zone, &limits) {
                for issue in e.issues {
                    result.issues.push(
                        ConfigIssue::error(
                            &issue.code,
                            &format!("{}: {}", issue.field, issue.message),
                            file,
                        )
                        .at(&location),
                    );
                }
            }
            let key = (region_key(&zone.vendor_region), region_key(&zone.region));
            if !destinations.insert(key) {
                result.issues.push(
                    ConfigIssue::error(
                        "Z008",
                        &format!(
                            "A zone from {} to {} already exists",
                            zone.vendor_region, zone.region
                        ),
                        file,
                    )
                    .at(&location),
                );
            }
        }

        if let Err(e) = check_default_invariant(&book.zones) {
            result
                .issues
                .push(ConfigIssue::error("E013", &e.to_string(), file).at(&vendor));
        }

        if config.validation.require_default_zone {
            let regions: BTreeSet<String> =
                book.zones.iter().map(|z| region_key(&z.vendor_region)).collect();
            for region in regions {
                if book.default_zone(&region).is_none() {
                    result.issues.push(
                        ConfigIssue::warning(
                            "W011",
                            &format!(
                                "No default zone for '{}'; unmatched destinations are unserved",
                                region
                            ),
                            file,
                        )
                        .at(&vendor),
                    );
                }
            }
        }
    }

    for drift in reconcile(catalog).vendors {
        result.issues.push(
            ConfigIssue::warning(
                "W010",
                &format!(
                    "{} zone(s) are filed under an old base region (current: {})",
                    drift.stale_zones.len(),
                    drift.base_region
                ),
                file,
            )
            .at(drift.vendor_id.to_string()),
        );
    }
}

/// Check that every book would accept a migration to its base region
///
/// Returns vendor ids whose migration would be rejected.
pub fn blocked_migrations(catalog: &ZoneCatalog, config: &EngineConfig) -> Vec<String> {
    let limits = config.limits();
    catalog
        .vendors
        .iter()
        .filter(|b| !b.needs_reconciliation().is_empty())
        .filter_map(|b| {
            let mut copy = b.clone();
            let base_region = copy.base_region.clone();
            ZoneManager::new(&mut copy)
                .with_limits(limits)
                .migrate_base_region(&base_region)
                .err()
                .map(|_| b.vendor_id.to_string())
        })
        .collect()
}
