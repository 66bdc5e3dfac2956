//! Base-region reconciliation: detect zones left behind by a base-region change
//!
//! A vendor's base region is stored separately from the `vendor_region` on
//! each zone. When the base region changes without a migration, old zones stop
//! matching and shipments fail with "no zone". This module reports that drift
//! and can migrate every drifted book in one step.

use crate::error::Result;
use crate::manager::{ZoneChange, ZoneManager};
use crate::matcher::region_key;
use crate::validate::ValidationLimits;
use crate::zone::{VendorId, ZoneCatalog, ZoneId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall reconciliation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ReconcileStatus {
    /// Every zone matches its vendor's base region
    Synced,
    /// Some zones reference an old base region
    Drifted,
}

impl std::fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileStatus::Synced => write!(f, "SYNCED"),
            ReconcileStatus::Drifted => write!(f, "DRIFTED"),
        }
    }
}

/// A zone filed under a region that is no longer the vendor's base region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaleZone {
    pub id: ZoneId,
    pub name: String,
    pub vendor_region: String,
}

/// Drift found for one vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorDrift {
    pub vendor_id: VendorId,
    pub base_region: String,
    pub stale_zones: Vec<StaleZone>,
    /// No zone at all is filed under the current base region, so every
    /// shipment from this vendor currently fails
    pub unserved: bool,
}

/// Reconciliation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub status: ReconcileStatus,
    pub vendors: Vec<VendorDrift>,
    pub vendors_checked: usize,
    pub stale_zone_count: usize,
}

impl ReconciliationReport {
    pub fn is_synced(&self) -> bool {
        self.status == ReconcileStatus::Synced
    }

    /// Human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Reconciliation: {}\n", self.status));
        out.push_str(&format!(
            "Vendors checked: {}, stale zones: {}\n",
            self.vendors_checked, self.stale_zone_count
        ));

        for vendor in &self.vendors {
            out.push_str(&format!(
                "\n{} (base region: {}){}\n",
                vendor.vendor_id,
                vendor.base_region,
                if vendor.unserved { " [UNSERVED]" } else { "" }
            ));
            for zone in &vendor.stale_zones {
                out.push_str(&format!(
                    "  {} → filed under '{}'\n",
                    zone.name, zone.vendor_region
                ));
            }
        }

        out
    }
}

/// Find zones whose vendor region differs from their vendor's base region
pub fn reconcile(catalog: &ZoneCatalog) -> ReconciliationReport {
    let mut vendors = Vec::new();

    for book in &catalog.vendors {
        let stale_zones: Vec<StaleZone> = book
            .needs_reconciliation()
            .into_iter()
            .map(|z| StaleZone {
                id: z.id.clone(),
                name: z.name.clone(),
                vendor_region: z.vendor_region.clone(),
            })
            .collect();

        if stale_zones.is_empty() {
            continue;
        }

        let base_key = region_key(&book.base_region);
        let unserved = !book
            .zones
            .iter()
            .any(|z| region_key(&z.vendor_region) == base_key);

        tracing::warn!(
            vendor = %book.vendor_id,
            stale = stale_zones.len(),
            unserved,
            "zones need reconciliation"
        );
        vendors.push(VendorDrift {
            vendor_id: book.vendor_id.clone(),
            base_region: book.base_region.clone(),
            stale_zones,
            unserved,
        });
    }

    let stale_zone_count = vendors.iter().map(|v| v.stale_zones.len()).sum();
    ReconciliationReport {
        status: if vendors.is_empty() {
            ReconcileStatus::Synced
        } else {
            ReconcileStatus::Drifted
        },
        vendors,
        vendors_checked: catalog.vendors.len(),
        stale_zone_count,
    }
}

/// Migrate every drifted vendor to its current base region
///
/// Either every book migrates or the catalog is left unchanged.
pub fn apply_reconciliation(
    catalog: &mut ZoneCatalog,
    limits: &ValidationLimits,
) -> Result<Vec<(VendorId, Vec<ZoneChange>)>> {
    let mut next = catalog.clone();
    let mut applied = Vec::new();

    for book in next.vendors.iter_mut() {
        if book.needs_reconciliation().is_empty() {
            continue;
        }
        let base_region = book.base_region.clone();
        let vendor_id = book.vendor_id.clone();
        let changes = ZoneManager::new(book)
            .with_limits(*limits)
            .migrate_base_region(&base_region)?;
        applied.push((vendor_id, changes));
    }

    *catalog = next;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DRIFTED: &str = r#"
vendors:
  - vendorId: kofi
    baseRegion: Ashanti
    zones:
      - id: z1
        name: Local
        vendorRegion: Greater Accra
        region: Greater Accra
        baseRate: 10
        isDefault: true
      - id: z2
        name: Ashanti
        vendorRegion: Greater Accra
        region: Ashanti
        baseRate: 20
  - vendorId: ama
    baseRegion: Volta
    zones:
      - id: z3
        name: Home
        vendorRegion: volta
        region: Volta
        baseRate: 5
"#;

    #[test]
    fn test_reports_drifted_vendor_only() {
        let catalog = ZoneCatalog::from_yaml(DRIFTED).unwrap();
        let report = reconcile(&catalog);
        assert_eq!(report.status, ReconcileStatus::Drifted);
        assert_eq!(report.vendors_checked, 2);
        assert_eq!(report.vendors.len(), 1);
        assert_eq!(report.vendors[0].vendor_id.as_str(), "kofi");
        assert!(report.vendors[0].unserved);
        assert_eq!(report.stale_zone_count, 2);
        assert!(report.to_report().contains("[UNSERVED]"));
    }

    #[test]
    fn test_apply_migrates_and_syncs() {
        let mut catalog = ZoneCatalog::from_yaml(DRIFTED).unwrap();
        let applied = apply_reconciliation(&mut catalog, &ValidationLimits::default()).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].1.len(), 2);
        assert!(reconcile(&catalog).is_synced());
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut catalog = ZoneCatalog::from_yaml(DRIFTED).unwrap();
        // ama's migration would now merge two defaults
        let ama = &mut catalog.vendors[1];
        ama.base_region = "Oti".into();
        ama.zones[0].is_default = true;
        let mut extra = ama.zones[0].clone();
        extra.id = ZoneId::from("z4");
        extra.vendor_region = "Northern".into();
        extra.region = "Northern".into();
        ama.zones.push(extra);
        let before = catalog.clone();

        let err = apply_reconciliation(&mut catalog, &ValidationLimits::default()).unwrap_err();
        assert!(matches!(err, Error::MultipleDefaults(_)));
        assert_eq!(catalog, before);
    }
}
