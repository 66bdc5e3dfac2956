//! Zone matching
//!
//! Picks the single zone that governs a shipment:
//!
//! 1. Keep zones whose `vendor_region` is the vendor's base region
//! 2. An exact destination match wins
//! 3. Otherwise the vendor region's default zone
//! 4. Otherwise [`NoZoneError`]
//!
//! Region names are compared by [`region_key`] (trimmed, lower-cased).

use crate::error::NoZoneError;
use crate::zone::ShippingZone;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a zone was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Zone region equals the destination
    Exact,
    /// Fallback to the vendor region's default zone
    Default,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::Default => write!(f, "default"),
        }
    }
}

/// A matched zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMatch<'a> {
    pub zone: &'a ShippingZone,
    pub kind: MatchKind,
}

/// Normalized comparison key for a region name
pub fn region_key(region: &str) -> String {
    region.trim().to_lowercase()
}

/// Select the zone for a shipment from `vendor_region` to `destination_region`
///
/// Multiple exact matches only occur when validation was bypassed; the first
/// in input order is taken.
pub fn match_zone<'a>(
    vendor_region: &str,
    destination_region: &str,
    zones: &'a [ShippingZone],
) -> Result<ZoneMatch<'a>, NoZoneError> {
    let vendor_key = region_key(vendor_region);
    let destination_key = region_key(destination_region);

    let mut default_zone = None;
    for zone in zones
        .iter()
        .filter(|z| region_key(&z.vendor_region) == vendor_key)
    {
        if region_key(&zone.region) == destination_key {
            tracing::debug!(
                zone = %zone.name,
                vendor_region,
                destination_region,
                "exact zone match"
            );
            return Ok(ZoneMatch {
                zone,
                kind: MatchKind::Exact,
            });
        }
        if zone.is_default && default_zone.is_none() {
            default_zone = Some(zone);
        }
    }

    match default_zone {
        Some(zone) => {
            tracing::debug!(
                zone = %zone.name,
                vendor_region,
                destination_region,
                "falling back to default zone"
            );
            Ok(ZoneMatch {
                zone,
                kind: MatchKind::Default,
            })
        }
        None => Err(NoZoneError {
            vendor_region: vendor_region.to_string(),
            destination_region: destination_region.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneId;
    use rust_decimal::Decimal;

    fn zone(id: &str, vendor_region: &str, region: &str, is_default: bool) -> ShippingZone {
        ShippingZone {
            id: ZoneId::from(id),
            name: id.to_string(),
            vendor_region: vendor_region.to_string(),
            region: region.to_string(),
            base_rate: Decimal::ONE,
            is_default,
            additional_rates: vec![],
        }
    }

    fn zones() -> Vec<ShippingZone> {
        vec![
            zone("accra-default", "Greater Accra", "Greater Accra", true),
            zone("accra-ashanti", "Greater Accra", "Ashanti", false),
            zone("kumasi-volta", "Ashanti", "Volta", false),
        ]
    }

    #[test]
    fn test_exact_beats_default() {
        let zones = zones();
        let m = match_zone("Greater Accra", "Ashanti", &zones).unwrap();
        assert_eq!(m.zone.id.as_str(), "accra-ashanti");
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_default_fallback() {
        let zones = zones();
        let m = match_zone("Greater Accra", "Volta", &zones).unwrap();
        assert_eq!(m.zone.id.as_str(), "accra-default");
        assert_eq!(m.kind, MatchKind::Default);
    }

    #[test]
    fn test_exact_match_on_default_zone_is_exact() {
        let zones = zones();
        let m = match_zone("Greater Accra", "Greater Accra", &zones).unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_region_comparison_trims_and_ignores_case() {
        let zones = zones();
        let m = match_zone(" greater accra", "  ASHANTI ", &zones).unwrap();
        assert_eq!(m.zone.id.as_str(), "accra-ashanti");
    }

    #[test]
    fn test_other_vendor_regions_never_match() {
        let zones = zones();
        let err = match_zone("Ashanti", "Ashanti", &zones).unwrap_err();
        assert_eq!(err.vendor_region, "Ashanti");
        assert_eq!(err.destination_region, "Ashanti");
    }

    #[test]
    fn test_duplicate_exact_first_wins() {
        let mut zones = zones();
        zones.push(zone("accra-ashanti-2", "Greater Accra", "Ashanti", false));
        let m = match_zone("Greater Accra", "Ashanti", &zones).unwrap();
        assert_eq!(m.zone.id.as_str(), "accra-ashanti");
    }

    #[test]
    fn test_empty_zones() {
        assert!(match_zone("A", "B", &[]).is_err());
    }
}
