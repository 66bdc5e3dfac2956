//! Zone configuration management
//!
//! [`ZoneManager`] applies admin writes to a vendor's [`ZoneBook`]. Each write
//! is computed against a copy of the zone list and only swapped in once the
//! whole result is valid, so a rejected write leaves the book untouched.
//!
//! Marking a zone as default demotes the previous default of the same vendor
//! region. The demotion is reported as a [`ZoneChange::Demoted`] entry so the
//! persistence layer writes it in the same transaction.

use crate::error::{ConfigError, Error, FieldIssue, Result};
use crate::matcher::region_key;
use crate::validate::{
    check_default_invariant, validate_stored, validate_zone_with, ValidZone, ValidationLimits,
};
use crate::zone::{ShippingZone, VendorId, ZoneBook, ZoneDraft, ZoneId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One persisted change produced by a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ZoneChange {
    Created {
        id: ZoneId,
        name: String,
    },
    Updated {
        id: ZoneId,
        name: String,
    },
    Deleted {
        id: ZoneId,
        name: String,
    },
    /// Compensating update: the zone lost its default flag
    Demoted {
        id: ZoneId,
        name: String,
        vendor_region: String,
    },
    /// The zone's vendor region was rewritten by a base-region migration
    Migrated {
        id: ZoneId,
        name: String,
        from: String,
        to: String,
    },
}

impl ZoneChange {
    pub fn zone_id(&self) -> &ZoneId {
        match self {
            ZoneChange::Created { id, .. }
            | ZoneChange::Updated { id, .. }
            | ZoneChange::Deleted { id, .. }
            | ZoneChange::Demoted { id, .. }
            | ZoneChange::Migrated { id, .. } => id,
        }
    }
}

impl std::fmt::Display for ZoneChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneChange::Created { name, .. } => write!(f, "created '{}'", name),
            ZoneChange::Updated { name, .. } => write!(f, "updated '{}'", name),
            ZoneChange::Deleted { name, .. } => write!(f, "deleted '{}'", name),
            ZoneChange::Demoted {
                name,
                vendor_region,
                ..
            } => write!(f, "demoted '{}' (no longer default for {})", name, vendor_region),
            ZoneChange::Migrated { name, from, to, .. } => {
                write!(f, "moved '{}' from {} to {}", name, from, to)
            }
        }
    }
}

/// Result of a single-zone write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The zone as stored (or as it was before deletion)
    pub zone: ShippingZone,
    /// Every change to persist, the primary one first
    pub changes: Vec<ZoneChange>,
}

impl WriteOutcome {
    pub fn demoted(&self) -> impl Iterator<Item = &ZoneChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, ZoneChange::Demoted { .. }))
    }
}

impl ZoneBook {
    pub fn new(vendor_id: impl Into<VendorId>, base_region: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            base_region: base_region.into(),
            zones: Vec::new(),
        }
    }

    /// Get a zone by id
    pub fn zone(&self, id: &ZoneId) -> Option<&ShippingZone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    /// Zones filed under `vendor_region`
    pub fn zones_for<'a>(
        &'a self,
        vendor_region: &str,
    ) -> impl Iterator<Item = &'a ShippingZone> + 'a {
        let key = region_key(vendor_region);
        self.zones
            .iter()
            .filter(move |z| region_key(&z.vendor_region) == key)
    }

    /// The default zone for `vendor_region`, if any
    pub fn default_zone(&self, vendor_region: &str) -> Option<&ShippingZone> {
        self.zones_for(vendor_region).find(|z| z.is_default)
    }

    /// Zones whose vendor region no longer matches the vendor's base region
    pub fn needs_reconciliation(&self) -> Vec<&ShippingZone> {
        let key = region_key(&self.base_region);
        self.zones
            .iter()
            .filter(|z| region_key(&z.vendor_region) != key)
            .collect()
    }

    /// Check a book loaded from persistence
    ///
    /// Verifies ids are unique, every zone passes validation, no destination
    /// is configured twice, and each vendor region has at most one default.
    pub fn check(&self, limits: &ValidationLimits) -> Result<()> {
        let mut ids = HashSet::new();
        for zone in &self.zones {
            if !ids.insert(&zone.id) {
                return Err(Error::Catalog(format!(
                    "Zone id '{}' is used twice in the book of vendor '{}'",
                    zone.id, self.vendor_id
                )));
            }
            validate_stored(zone, limits)?;
        }
        check_destinations(&self.zones)?;
        check_default_invariant(&self.zones)?;
        Ok(())
    }
}

/// Applies admin writes to one vendor's zone book
#[derive(Debug)]
pub struct ZoneManager<'a> {
    book: &'a mut ZoneBook,
    limits: ValidationLimits,
}

impl<'a> ZoneManager<'a> {
    pub fn new(book: &'a mut ZoneBook) -> Self {
        Self {
            book,
            limits: ValidationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn book(&self) -> &ZoneBook {
        self.book
    }

    /// Add a new zone
    ///
    /// A payload id is kept if it is not already taken; otherwise a fresh id
    /// is generated.
    pub fn create(&mut self, draft: &ZoneDraft) -> Result<WriteOutcome> {
        let valid = validate_zone_with(draft, &self.limits)?;
        let id = match valid.id() {
            Some(id) if self.book.zone(id).is_some() => {
                return Err(ConfigError::single(
                    valid.name(),
                    FieldIssue::new("id", "Z009", format!("Zone id '{}' already exists", id)),
                )
                .into());
            }
            Some(id) => id.clone(),
            None => ZoneId::generate(),
        };

        let outcome = self.write(valid, id, false)?;
        tracing::info!(
            vendor = %self.book.vendor_id,
            zone = %outcome.zone.name,
            demoted = outcome.demoted().count(),
            "zone created"
        );
        Ok(outcome)
    }

    /// Replace an existing zone's fields; the id never changes
    pub fn update(&mut self, id: &ZoneId, draft: &ZoneDraft) -> Result<WriteOutcome> {
        if self.book.zone(id).is_none() {
            return Err(Error::ZoneNotFound(id.to_string()));
        }
        let valid = validate_zone_with(draft, &self.limits)?;
        if let Some(other) = valid.id() {
            if other != id {
                return Err(ConfigError::single(
                    valid.name(),
                    FieldIssue::new("id", "Z009", "Zone id cannot be changed"),
                )
                .into());
            }
        }

        let outcome = self.write(valid, id.clone(), true)?;
        tracing::info!(
            vendor = %self.book.vendor_id,
            zone = %outcome.zone.name,
            demoted = outcome.demoted().count(),
            "zone updated"
        );
        Ok(outcome)
    }

    /// Make a zone its vendor region's default, demoting the previous one
    pub fn set_default(&mut self, id: &ZoneId) -> Result<WriteOutcome> {
        let zone = self
            .book
            .zone(id)
            .ok_or_else(|| Error::ZoneNotFound(id.to_string()))?;
        let mut draft = ZoneDraft::from(zone);
        draft.is_default = true;
        self.update(id, &draft)
    }

    /// Remove a zone
    pub fn delete(&mut self, id: &ZoneId) -> Result<WriteOutcome> {
        let index = self
            .book
            .zones
            .iter()
            .position(|z| &z.id == id)
            .ok_or_else(|| Error::ZoneNotFound(id.to_string()))?;
        let zone = self.book.zones.remove(index);

        if zone.is_default {
            tracing::warn!(
                vendor = %self.book.vendor_id,
                vendor_region = %zone.vendor_region,
                "default zone deleted; unmatched destinations are now unserved"
            );
        } else {
            tracing::info!(vendor = %self.book.vendor_id, zone = %zone.name, "zone deleted");
        }

        Ok(WriteOutcome {
            changes: vec![ZoneChange::Deleted {
                id: zone.id.clone(),
                name: zone.name.clone(),
            }],
            zone,
        })
    }

    /// Change only the vendor's base-region setting
    ///
    /// Existing zones keep their vendor region. The returned zones no longer
    /// match the new base region and need [`ZoneManager::migrate_base_region`].
    pub fn set_base_region(&mut self, base_region: &str) -> Result<Vec<ZoneId>> {
        let base_region = require_region(base_region)?;
        self.book.base_region = base_region;
        let stale: Vec<ZoneId> = self
            .book
            .needs_reconciliation()
            .into_iter()
            .map(|z| z.id.clone())
            .collect();
        if !stale.is_empty() {
            tracing::warn!(
                vendor = %self.book.vendor_id,
                stale = stale.len(),
                "base region changed; zones need reconciliation"
            );
        }
        Ok(stale)
    }

    /// Move the vendor to a new base region, rewriting every zone with it
    ///
    /// Fails without changing anything if the merged zone list would repeat a
    /// destination or hold two defaults.
    pub fn migrate_base_region(&mut self, base_region: &str) -> Result<Vec<ZoneChange>> {
        let base_region = require_region(base_region)?;
        let key = region_key(&base_region);

        let mut next = self.book.zones.clone();
        let mut changes = Vec::new();
        for zone in next
            .iter_mut()
            .filter(|z| region_key(&z.vendor_region) != key)
        {
            changes.push(ZoneChange::Migrated {
                id: zone.id.clone(),
                name: zone.name.clone(),
                from: zone.vendor_region.clone(),
                to: base_region.clone(),
            });
            zone.vendor_region = base_region.clone();
        }

        check_destinations(&next)?;
        check_default_invariant(&next)?;

        tracing::info!(
            vendor = %self.book.vendor_id,
            from = %self.book.base_region,
            to = %base_region,
            migrated = changes.len(),
            "base region migrated"
        );
        self.book.zones = next;
        self.book.base_region = base_region;
        Ok(changes)
    }

    fn write(&mut self, valid: ValidZone, id: ZoneId, existing: bool) -> Result<WriteOutcome> {
        let zone = valid.into_zone(id);
        let mut next = self.book.zones.clone();
        let mut changes = vec![if existing {
            ZoneChange::Updated {
                id: zone.id.clone(),
                name: zone.name.clone(),
            }
        } else {
            ZoneChange::Created {
                id: zone.id.clone(),
                name: zone.name.clone(),
            }
        }];

        if zone.is_default {
            let key = region_key(&zone.vendor_region);
            for other in next.iter_mut().filter(|z| {
                z.id != zone.id && z.is_default && region_key(&z.vendor_region) == key
            }) {
                other.is_default = false;
                tracing::warn!(
                    vendor = %self.book.vendor_id,
                    zone = %other.name,
                    "previous default zone demoted"
                );
                changes.push(ZoneChange::Demoted {
                    id: other.id.clone(),
                    name: other.name.clone(),
                    vendor_region: other.vendor_region.clone(),
                });
            }
        }

        match next.iter_mut().find(|z| z.id == zone.id) {
            Some(slot) => *slot = zone.clone(),
            None => next.push(zone.clone()),
        }

        check_destinations(&next)?;
        check_default_invariant(&next)?;

        self.book.zones = next;
        Ok(WriteOutcome { zone, changes })
    }
}

fn require_region(region: &str) -> Result<String> {
    let trimmed = region.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::single(
            "",
            FieldIssue::new("baseRegion", "Z003", "Vendor base region is required"),
        )
        .into());
    }
    Ok(trimmed.to_string())
}

/// Each destination may appear once per vendor region
fn check_destinations(zones: &[ShippingZone]) -> std::result::Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for zone in zones {
        let key = (region_key(&zone.vendor_region), region_key(&zone.region));
        if !seen.insert(key) {
            return Err(ConfigError::single(
                zone.name.clone(),
                FieldIssue::new(
                    "region",
                    "Z008",
                    format!(
                        "A zone from {} to {} already exists",
                        zone.vendor_region, zone.region
                    ),
                ),
            ));
        }
    }
    Ok(())
}
