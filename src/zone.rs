//! Zone types: the core data model
//!
//! A `ShippingZone` maps a vendor's base region to one destination region and
//! carries the flat rate plus any tiered surcharges. Zones are grouped per
//! vendor in a `ZoneBook`; a `ZoneCatalog` is the full set handed over by the
//! persistence layer.
//!
//! ## Example Catalog
//!
//! ```yaml
//! vendors:
//!   - vendorId: kofi-crafts
//!     baseRegion: Greater Accra
//!     zones:
//!       - id: z-accra
//!         name: Local
//!         vendorRegion: Greater Accra
//!         region: Greater Accra
//!         baseRate: 10
//!         isDefault: true
//!       - id: z-ashanti
//!         name: Ashanti
//!         vendorRegion: Greater Accra
//!         region: Ashanti
//!         baseRate: 20
//!         additionalRates:
//!           - type: weight
//!             threshold: 5
//!             additionalFee: 8
//! ```

use crate::error::{Error, Result};
use crate::money::Money;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a vendor (the `adminId` owning cart items)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VendorId(pub String);

impl VendorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VendorId {
    fn from(s: &str) -> Self {
        VendorId(s.to_string())
    }
}

impl From<String> for VendorId {
    fn from(s: String) -> Self {
        VendorId(s)
    }
}

/// Opaque zone identifier, immutable once assigned
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl ZoneId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        ZoneId(nanoid::nanoid!())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        ZoneId(s.to_string())
    }
}

/// Which shipment metric a tier keys off
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Weight,
    Price,
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierKind::Weight => write!(f, "weight"),
            TierKind::Price => write!(f, "price"),
        }
    }
}

/// Threshold and fee shared by both tier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierRule {
    /// Tier applies when the metric is >= threshold
    #[schemars(with = "f64")]
    pub threshold: Decimal,

    /// Signed delta added to the base rate; negative means discount
    #[schemars(with = "f64")]
    pub additional_fee: Money,
}

/// A threshold-keyed surcharge
///
/// ```yaml
/// - type: weight
///   threshold: 5
///   additionalFee: 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RateTier {
    /// Keyed off total shipment weight
    Weight(TierRule),
    /// Keyed off total shipment price
    Price(TierRule),
}

impl RateTier {
    pub fn weight(threshold: Decimal, additional_fee: Money) -> Self {
        RateTier::Weight(TierRule {
            threshold,
            additional_fee,
        })
    }

    pub fn price(threshold: Decimal, additional_fee: Money) -> Self {
        RateTier::Price(TierRule {
            threshold,
            additional_fee,
        })
    }

    pub fn kind(&self) -> TierKind {
        match self {
            RateTier::Weight(_) => TierKind::Weight,
            RateTier::Price(_) => TierKind::Price,
        }
    }

    pub fn rule(&self) -> &TierRule {
        match self {
            RateTier::Weight(rule) | RateTier::Price(rule) => rule,
        }
    }

    pub fn threshold(&self) -> Decimal {
        self.rule().threshold
    }

    pub fn additional_fee(&self) -> Money {
        self.rule().additional_fee
    }
}

/// A (vendor region -> destination region) shipping-rate rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZone {
    pub id: ZoneId,

    /// Display label
    pub name: String,

    /// Base region of the vendor this zone belongs to
    pub vendor_region: String,

    /// Destination region the rate applies to
    pub region: String,

    /// Flat fee before surcharges
    #[schemars(with = "f64")]
    pub base_rate: Money,

    /// Applies when no destination-specific zone matches
    #[serde(default)]
    pub is_default: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_rates: Vec<RateTier>,
}

impl ShippingZone {
    /// Tiers of one kind, in stored order
    pub fn tiers_of(&self, kind: TierKind) -> impl Iterator<Item = &RateTier> {
        self.additional_rates.iter().filter(move |t| t.kind() == kind)
    }
}

/// Zone payload as submitted by the admin form
///
/// `id` is absent on create. On update it may be present but must match the
/// zone being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ZoneId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub vendor_region: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    #[schemars(with = "f64")]
    pub base_rate: Money,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub additional_rates: Vec<RateTier>,
}

impl From<&ShippingZone> for ZoneDraft {
    fn from(zone: &ShippingZone) -> Self {
        ZoneDraft {
            id: Some(zone.id.clone()),
            name: zone.name.clone(),
            vendor_region: zone.vendor_region.clone(),
            region: zone.region.clone(),
            base_rate: zone.base_rate,
            is_default: zone.is_default,
            additional_rates: zone.additional_rates.clone(),
        }
    }
}

/// What a single vendor ships in one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub vendor_region: String,
    pub destination_region: String,
    #[schemars(with = "f64")]
    pub total_weight: Decimal,
    #[schemars(with = "f64")]
    pub total_price: Money,
}

impl Shipment {
    /// Value of the metric a tier kind keys off
    pub fn metric(&self, kind: TierKind) -> Decimal {
        match kind {
            TierKind::Weight => self.total_weight,
            TierKind::Price => self.total_price,
        }
    }
}

/// One vendor's shipping configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBook {
    pub vendor_id: VendorId,

    /// The vendor's current base-region setting
    pub base_region: String,

    #[serde(default)]
    pub zones: Vec<ShippingZone>,
}

/// All zone books known to the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Shipfee Zone Catalog", description = "Per-vendor shipping zones")]
pub struct ZoneCatalog {
    #[serde(default)]
    pub vendors: Vec<ZoneBook>,
}

impl ZoneCatalog {
    /// Parse catalog from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Catalog(e.to_string()))
    }

    /// Serialize catalog to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::Catalog(e.to_string()))
    }

    /// Parse catalog from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Catalog(e.to_string()))
    }

    /// Serialize catalog to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Catalog(e.to_string()))
    }

    /// Get a vendor's zone book
    pub fn book(&self, vendor_id: &VendorId) -> Option<&ZoneBook> {
        self.vendors.iter().find(|b| &b.vendor_id == vendor_id)
    }

    /// Index books by vendor, rejecting duplicate vendor ids
    pub fn by_vendor(&self) -> Result<BTreeMap<VendorId, ZoneBook>> {
        let mut map = BTreeMap::new();
        for book in &self.vendors {
            if map.insert(book.vendor_id.clone(), book.clone()).is_some() {
                return Err(Error::Catalog(format!(
                    "Vendor '{}' appears more than once",
                    book.vendor_id
                )));
            }
        }
        Ok(map)
    }

    /// Hash of the catalog for change detection
    pub fn fingerprint(&self) -> String {
        fingerprint_books(self.vendors.iter())
    }
}

/// Hash a set of zone books; identical books always give the same hash
///
/// Every field is fed to the hasher followed by a NUL separator.
pub fn fingerprint_books<'a>(books: impl IntoIterator<Item = &'a ZoneBook>) -> String {
    use sha2::{Digest, Sha256};

    fn field(hasher: &mut Sha256, value: impl std::fmt::Display) {
        hasher.update(value.to_string().as_bytes());
        hasher.update([0u8]);
    }

    let mut hasher = Sha256::new();
    for book in books {
        field(&mut hasher, &book.vendor_id);
        field(&mut hasher, &book.base_region);
        field(&mut hasher, book.zones.len());
        for zone in &book.zones {
            field(&mut hasher, &zone.id);
            field(&mut hasher, &zone.name);
            field(&mut hasher, &zone.vendor_region);
            field(&mut hasher, &zone.region);
            field(&mut hasher, zone.base_rate);
            field(&mut hasher, zone.is_default);
            field(&mut hasher, zone.additional_rates.len());
            for tier in &zone.additional_rates {
                field(&mut hasher, tier.kind());
                field(&mut hasher, tier.threshold());
                field(&mut hasher, tier.additional_fee());
            }
        }
    }
    format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
}
