//! Zone validation
//!
//! Checks a zone payload before it is persisted and returns a normalized
//! copy. Every problem is reported, not just the first:
//!
//! | Code | Field | Problem |
//! |------|-------|---------|
//! | Z001 | `name` | empty |
//! | Z002 | `region` | empty |
//! | Z003 | `vendorRegion` | empty |
//! | Z004 | `baseRate` | negative |
//! | Z005 | `additionalRates[i].threshold` | negative |
//! | Z006 | `additionalRates[i].threshold` | duplicates an earlier tier of the same type |
//! | Z007 | `additionalRates` | more tiers of one type than allowed |
//!
//! Book-level checks (destination clashes, id changes) live in
//! [`crate::manager`].

use crate::error::{ConfigError, FieldIssue, MultipleDefaultZonesError};
use crate::matcher::region_key;
use crate::money::Money;
use crate::zone::{RateTier, ShippingZone, TierKind, ZoneDraft, ZoneId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Limits applied on top of the structural checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_tiers_per_kind: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_tiers_per_kind: 20,
        }
    }
}

/// A zone payload that passed validation
///
/// Strings are trimmed and tiers are sorted by type, then ascending threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidZone {
    id: Option<ZoneId>,
    name: String,
    vendor_region: String,
    region: String,
    base_rate: Money,
    is_default: bool,
    additional_rates: Vec<RateTier>,
}

impl ValidZone {
    /// Id carried by the payload, if any
    pub fn id(&self) -> Option<&ZoneId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor_region(&self) -> &str {
        &self.vendor_region
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.additional_rates
    }

    /// Turn into a stored zone under `id`
    pub fn into_zone(self, id: ZoneId) -> ShippingZone {
        ShippingZone {
            id,
            name: self.name,
            vendor_region: self.vendor_region,
            region: self.region,
            base_rate: self.base_rate,
            is_default: self.is_default,
            additional_rates: self.additional_rates,
        }
    }
}

/// Validate a zone payload with default limits
pub fn validate_zone(draft: &ZoneDraft) -> Result<ValidZone, ConfigError> {
    validate_zone_with(draft, &ValidationLimits::default())
}

/// Validate a zone payload
pub fn validate_zone_with(
    draft: &ZoneDraft,
    limits: &ValidationLimits,
) -> Result<ValidZone, ConfigError> {
    let mut issues = Vec::new();

    let name = draft.name.trim();
    let region = draft.region.trim();
    let vendor_region = draft.vendor_region.trim();

    if name.is_empty() {
        issues.push(FieldIssue::new("name", "Z001", "Zone name is required"));
    }
    if region.is_empty() {
        issues.push(FieldIssue::new("region", "Z002", "Destination region is required"));
    }
    if vendor_region.is_empty() {
        issues.push(FieldIssue::new(
            "vendorRegion",
            "Z003",
            "Vendor base region is required",
        ));
    }
    if draft.base_rate < Decimal::ZERO {
        issues.push(FieldIssue::new(
            "baseRate",
            "Z004",
            format!("Base rate must not be negative (got {})", draft.base_rate),
        ));
    }

    issues.extend(check_tiers(&draft.additional_rates, limits));

    if !issues.is_empty() {
        tracing::debug!(zone = %draft.name, issues = issues.len(), "zone rejected");
        return Err(ConfigError::new(name, issues));
    }

    let mut additional_rates = draft.additional_rates.clone();
    additional_rates.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then(a.threshold().cmp(&b.threshold()))
    });

    Ok(ValidZone {
        id: draft.id.clone(),
        name: name.to_string(),
        vendor_region: vendor_region.to_string(),
        region: region.to_string(),
        base_rate: draft.base_rate,
        is_default: draft.is_default,
        additional_rates,
    })
}

/// Re-validate a stored zone, e.g. one loaded from persistence
pub fn validate_stored(zone: &ShippingZone, limits: &ValidationLimits) -> Result<(), ConfigError> {
    validate_zone_with(&ZoneDraft::from(zone), limits).map(|_| ())
}

fn check_tiers(tiers: &[RateTier], limits: &ValidationLimits) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<(TierKind, Decimal)> = HashSet::new();
    let mut per_kind: BTreeMap<TierKind, usize> = BTreeMap::new();

    for (i, tier) in tiers.iter().enumerate() {
        let field = format!("additionalRates[{}].threshold", i);
        if tier.threshold() < Decimal::ZERO {
            issues.push(FieldIssue::new(
                field.clone(),
                "Z005",
                format!("Threshold must not be negative (got {})", tier.threshold()),
            ));
        }
        // normalize() so 5 and 5.00 count as the same threshold
        if !seen.insert((tier.kind(), tier.threshold().normalize())) {
            issues.push(FieldIssue::new(
                field,
                "Z006",
                format!(
                    "Duplicate {} threshold {}; thresholds must be strictly increasing",
                    tier.kind(),
                    tier.threshold()
                ),
            ));
        }
        *per_kind.entry(tier.kind()).or_default() += 1;
    }

    for (kind, count) in per_kind {
        if count > limits.max_tiers_per_kind {
            issues.push(FieldIssue::new(
                "additionalRates",
                "Z007",
                format!(
                    "{} {} tiers exceed the limit of {}",
                    count, kind, limits.max_tiers_per_kind
                ),
            ));
        }
    }

    issues
}

/// Ensure no vendor region has more than one default zone
pub fn check_default_invariant(zones: &[ShippingZone]) -> Result<(), MultipleDefaultZonesError> {
    let mut defaults: BTreeMap<String, Vec<&ShippingZone>> = BTreeMap::new();
    for zone in zones.iter().filter(|z| z.is_default) {
        defaults
            .entry(region_key(&zone.vendor_region))
            .or_default()
            .push(zone);
    }

    match defaults.into_values().find(|group| group.len() > 1) {
        Some(group) => Err(MultipleDefaultZonesError {
            vendor_region: group[0].vendor_region.clone(),
            zones: group.iter().map(|z| z.name.clone()).collect(),
        }),
        None => Ok(()),
    }
}
