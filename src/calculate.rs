//! Shipping fee calculation
//!
//! A cart is split by vendor. Each vendor's items are priced as one shipment
//! from the vendor's base region to the order's destination:
//!
//! ```text
//! fee = max(0, base_rate + weight_delta + price_delta)
//! ```
//!
//! rounded to the currency scale. The weight and price deltas come from
//! independent tier lookups, so a shipment can pick up both. If any vendor
//! cannot ship, the whole quote fails; a partial total is never returned.

use crate::error::{CalculationError, CalculationFailure, Result};
use crate::matcher::{match_zone, MatchKind};
use crate::money::{round_money, Money, Rounding};
use crate::tier::evaluate;
use crate::zone::{
    fingerprint_books, Shipment, ShippingZone, TierKind, VendorId, ZoneBook, ZoneCatalog,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub product_id: String,

    /// Owning vendor; accepts `adminId` as well
    #[serde(alias = "adminId")]
    pub vendor_id: VendorId,

    /// Weight of one unit
    #[serde(default)]
    #[schemars(with = "f64")]
    pub weight: Decimal,

    /// Price of one unit
    #[schemars(with = "f64")]
    pub price: Money,

    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Cart or order snapshot handed over by the order pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Shipfee Cart")]
pub struct Cart {
    pub destination_region: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Cart {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Rounding applied to each vendor fee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorOptions {
    pub scale: u32,
    pub rounding: Rounding,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            rounding: Rounding::HalfUp,
        }
    }
}

/// How one shipment's fee was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentFee {
    /// Display name of the governing zone
    pub zone_name: String,
    pub match_kind: MatchKind,
    #[schemars(with = "f64")]
    pub base_rate: Money,
    #[schemars(with = "f64")]
    pub weight_delta: Money,
    #[schemars(with = "f64")]
    pub price_delta: Money,
    /// Final fee, floored at zero and rounded
    #[schemars(with = "f64")]
    pub fee: Money,
}

/// Fee for one vendor's share of the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorFee {
    pub item_count: usize,
    #[schemars(with = "f64")]
    pub total_weight: Decimal,
    #[schemars(with = "f64")]
    pub total_price: Money,
    #[serde(flatten)]
    pub breakdown: ShipmentFee,
}

impl VendorFee {
    pub fn fee(&self) -> Money {
        self.breakdown.fee
    }
}

/// Shipping quote for a whole cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Shipfee Quote")]
pub struct ShippingQuote {
    pub destination_region: String,
    pub per_vendor: BTreeMap<VendorId, VendorFee>,
    #[schemars(with = "f64")]
    pub total: Money,
    /// Hash of the zone books used for this quote
    pub catalog_fingerprint: String,
}

impl ShippingQuote {
    pub fn fee_for(&self, vendor_id: &VendorId) -> Option<Money> {
        self.per_vendor.get(vendor_id).map(VendorFee::fee)
    }

    /// Human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Shipping to {}\n", self.destination_region));
        for (vendor, fee) in &self.per_vendor {
            let b = &fee.breakdown;
            out.push_str(&format!(
                "  {}: {} via '{}' ({}) base {} + weight {} + price {}\n",
                vendor,
                b.fee,
                b.zone_name,
                b.match_kind,
                b.base_rate,
                b.weight_delta,
                b.price_delta
            ));
        }
        out.push_str(&format!("Total: {}\n", self.total));
        out
    }
}

/// Price a single shipment against a zone list
pub fn quote_shipment(
    shipment: &Shipment,
    zones: &[ShippingZone],
    options: &CalculatorOptions,
) -> std::result::Result<ShipmentFee, CalculationFailure> {
    let matched = match_zone(&shipment.vendor_region, &shipment.destination_region, zones)
        .map_err(|e| CalculationFailure::NoZone {
            vendor_region: e.vendor_region,
        })?;
    let zone = matched.zone;

    let weight_delta = evaluate(
        &zone.additional_rates,
        TierKind::Weight,
        shipment.metric(TierKind::Weight),
    );
    let price_delta = evaluate(
        &zone.additional_rates,
        TierKind::Price,
        shipment.metric(TierKind::Price),
    );

    let raw = zone
        .base_rate
        .checked_add(weight_delta)
        .and_then(|sum| sum.checked_add(price_delta))
        .ok_or(CalculationFailure::Overflow)?;
    let fee = round_money(raw.max(Decimal::ZERO), options.scale, options.rounding);

    tracing::debug!(
        zone = %zone.name,
        match_kind = %matched.kind,
        %raw,
        %fee,
        "shipment priced"
    );

    Ok(ShipmentFee {
        zone_name: zone.name.clone(),
        match_kind: matched.kind,
        base_rate: zone.base_rate,
        weight_delta,
        price_delta,
        fee,
    })
}

/// Compute per-vendor fees and the cart total
pub fn compute(
    cart: &Cart,
    zones_by_vendor: &BTreeMap<VendorId, ZoneBook>,
    options: &CalculatorOptions,
) -> std::result::Result<ShippingQuote, CalculationError> {
    FeeCalculator::new(*options).compute(cart, zones_by_vendor)
}

#[derive(Debug, Default)]
struct VendorGroup {
    items: usize,
    weight: Decimal,
    price: Money,
}

/// Shipping fee calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeCalculator {
    options: CalculatorOptions,
}

impl FeeCalculator {
    pub fn new(options: CalculatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CalculatorOptions {
        &self.options
    }

    pub fn quote_shipment(
        &self,
        shipment: &Shipment,
        zones: &[ShippingZone],
    ) -> std::result::Result<ShipmentFee, CalculationFailure> {
        quote_shipment(shipment, zones, &self.options)
    }

    /// Compute per-vendor fees and the cart total
    pub fn compute(
        &self,
        cart: &Cart,
        zones_by_vendor: &BTreeMap<VendorId, ZoneBook>,
    ) -> std::result::Result<ShippingQuote, CalculationError> {
        let groups = partition(cart)?;

        let mut per_vendor = BTreeMap::new();
        let mut books = Vec::with_capacity(groups.len());
        for (vendor_id, group) in groups {
            let fail = |reason| CalculationError {
                vendor_id: vendor_id.clone(),
                destination_region: cart.destination_region.clone(),
                reason,
            };

            let book = zones_by_vendor
                .get(&vendor_id)
                .ok_or_else(|| fail(CalculationFailure::UnknownVendor))?;

            let shipment = Shipment {
                vendor_region: book.base_region.clone(),
                destination_region: cart.destination_region.clone(),
                total_weight: group.weight,
                total_price: group.price,
            };
            let breakdown = self.quote_shipment(&shipment, &book.zones).map_err(fail)?;

            books.push(book);
            per_vendor.insert(
                vendor_id,
                VendorFee {
                    item_count: group.items,
                    total_weight: group.weight,
                    total_price: group.price,
                    breakdown,
                },
            );
        }

        let mut total = Money::ZERO;
        for (vendor_id, fee) in &per_vendor {
            total = total.checked_add(fee.fee()).ok_or_else(|| CalculationError {
                vendor_id: vendor_id.clone(),
                destination_region: cart.destination_region.clone(),
                reason: CalculationFailure::Overflow,
            })?;
        }

        tracing::info!(
            destination = %cart.destination_region,
            vendors = per_vendor.len(),
            %total,
            "shipping computed"
        );

        Ok(ShippingQuote {
            destination_region: cart.destination_region.clone(),
            per_vendor,
            total,
            catalog_fingerprint: fingerprint_books(books),
        })
    }

    /// Compute against a full catalog
    pub fn compute_with_catalog(
        &self,
        cart: &Cart,
        catalog: &ZoneCatalog,
    ) -> Result<ShippingQuote> {
        let by_vendor = catalog.by_vendor()?;
        Ok(self.compute(cart, &by_vendor)?)
    }
}

/// Group line items by vendor and total their weight and price
fn partition(
    cart: &Cart,
) -> std::result::Result<BTreeMap<VendorId, VendorGroup>, CalculationError> {
    let mut groups: BTreeMap<VendorId, VendorGroup> = BTreeMap::new();

    for (i, item) in cart.items.iter().enumerate() {
        let reason = if item.quantity == 0 {
            Some("has quantity 0")
        } else if item.weight < Decimal::ZERO {
            Some("has a negative weight")
        } else if item.price < Decimal::ZERO {
            Some("has a negative price")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(CalculationError {
                vendor_id: item.vendor_id.clone(),
                destination_region: cart.destination_region.clone(),
                reason: CalculationFailure::InvalidLineItem {
                    item: item_label(item, i),
                    reason: reason.to_string(),
                },
            });
        }

        let quantity = Decimal::from(item.quantity);
        let group = groups.entry(item.vendor_id.clone()).or_default();
        let totals = item
            .weight
            .checked_mul(quantity)
            .and_then(|w| group.weight.checked_add(w))
            .zip(
                item.price
                    .checked_mul(quantity)
                    .and_then(|p| group.price.checked_add(p)),
            );
        let Some((weight, price)) = totals else {
            return Err(CalculationError {
                vendor_id: item.vendor_id.clone(),
                destination_region: cart.destination_region.clone(),
                reason: CalculationFailure::InvalidLineItem {
                    item: item_label(item, i),
                    reason: "totals overflow".to_string(),
                },
            });
        };
        group.items += 1;
        group.weight = weight;
        group.price = price;
    }

    Ok(groups)
}

fn item_label(item: &LineItem, index: usize) -> String {
    if item.product_id.is_empty() {
        format!("#{}", index + 1)
    } else {
        item.product_id.clone()
    }
}
