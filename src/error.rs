//! Error types for shipfee
//!
//! The engine distinguishes four kinds of failure:
//!
//! - [`ConfigError`]: malformed zone or tier data, rejected before persistence
//! - [`MultipleDefaultZonesError`]: a write would leave two default zones for
//!   one vendor region
//! - [`NoZoneError`]: a vendor does not serve a destination
//! - [`CalculationError`]: a per-vendor failure that aborts a whole quote
//!
//! [`Error`] wraps all of them together with I/O and parse errors.

use crate::zone::VendorId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Shipfee errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    MultipleDefaults(#[from] MultipleDefaultZonesError),

    #[error(transparent)]
    NoZone(#[from] NoZoneError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

/// A single field-level problem in a zone payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldIssue {
    /// Payload field path, e.g. `baseRate` or `additionalRates[2].threshold`
    pub field: String,
    /// Stable issue code (`Z001`...)
    pub code: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}

/// Malformed zone or tier data
///
/// Carries every issue found in the payload, not just the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[error("Invalid zone '{zone}': {}", format_issues(.issues))]
pub struct ConfigError {
    /// Zone name as submitted (may be empty)
    pub zone: String,
    pub issues: Vec<FieldIssue>,
}

impl ConfigError {
    pub fn new(zone: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self {
            zone: zone.into(),
            issues,
        }
    }

    pub fn single(zone: impl Into<String>, issue: FieldIssue) -> Self {
        Self::new(zone, vec![issue])
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Two or more default zones for the same vendor region
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[error("Vendor region '{vendor_region}' has {} default zones: {}", .zones.len(), .zones.join(", "))]
pub struct MultipleDefaultZonesError {
    pub vendor_region: String,
    /// Names of the conflicting zones
    pub zones: Vec<String>,
}

/// The vendor has neither an exact zone nor a default zone for the destination
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[error("No shipping zone from '{vendor_region}' serves '{destination_region}'")]
pub struct NoZoneError {
    pub vendor_region: String,
    pub destination_region: String,
}

/// Why a vendor's fee could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationFailure {
    /// No zone book was supplied for the vendor
    UnknownVendor,
    /// The vendor does not ship to the destination
    NoZone { vendor_region: String },
    /// A line item is malformed
    InvalidLineItem { item: String, reason: String },
    /// The fee does not fit in a decimal amount
    Overflow,
}

impl std::fmt::Display for CalculationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationFailure::UnknownVendor => write!(f, "no shipping configuration"),
            CalculationFailure::NoZone { vendor_region } => {
                write!(f, "no zone from '{}'", vendor_region)
            }
            CalculationFailure::InvalidLineItem { item, reason } => {
                write!(f, "line item '{}' {}", item, reason)
            }
            CalculationFailure::Overflow => write!(f, "fee is too large to compute"),
        }
    }
}

/// Shipping for one vendor in the cart could not be computed
///
/// Names the vendor and destination so checkout can tell the shopper which
/// part of the order cannot ship. Never includes internal zone ids.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[error("Shipping unavailable for vendor '{vendor_id}' to '{destination_region}': {reason}")]
pub struct CalculationError {
    pub vendor_id: VendorId,
    pub destination_region: String,
    pub reason: CalculationFailure,
}

impl CalculationError {
    pub fn is_unserved(&self) -> bool {
        matches!(self.reason, CalculationFailure::NoZone { .. })
    }
}
