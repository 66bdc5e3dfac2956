// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # shipfee - zone-based shipping fees for multi-vendor carts
//!
//! Given a vendor's base region, an order's destination and the cart
//! contents, shipfee decides which shipping zone applies and what to charge.
//!
//! ## Core Concept
//!
//! Each vendor keeps a **zone book**: a set of zones from its base region to
//! destination regions. A zone has a flat base rate and optional **tiers**
//! keyed off shipment weight or price. From those, shipfee can:
//!
//! - **Match** the governing zone (exact destination first, then the default)
//! - **Evaluate** tiered surcharges (highest qualifying tier, not cumulative)
//! - **Compute** one fee per vendor and a cart total
//! - **Validate** zone edits before they are persisted
//! - **Reconcile** zones left behind when a vendor changes base region
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shipfee::{Cart, FeeCalculator, ZoneCatalog};
//!
//! let catalog = ZoneCatalog::from_yaml(&std::fs::read_to_string("zones.yaml")?)?;
//! let cart = Cart::from_yaml(&std::fs::read_to_string("cart.yaml")?)?;
//!
//! let quote = FeeCalculator::default().compute_with_catalog(&cart, &catalog)?;
//! for (vendor, fee) in &quote.per_vendor {
//!     println!("{}: {}", vendor, fee.fee());
//! }
//! println!("total shipping: {}", quote.total);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  ADMIN WRITES                                               │
//! │       │                                                     │
//! │       ├──► validate_zone(draft) ──► ValidZone | ConfigError │
//! │       │                                                     │
//! │       └──► ZoneManager::{create, update, delete}            │
//! │                 ──► WriteOutcome (+ Demoted changes)        │
//! │                                                             │
//! │  CHECKOUT                                                   │
//! │       │                                                     │
//! │       └──► compute(cart, books)                             │
//! │                 ├──► match_zone ──► ZoneMatch | NoZoneError │
//! │                 └──► evaluate (weight, price) ──► delta     │
//! │                 ──► ShippingQuote | CalculationError        │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod calculate;
pub mod config;
pub mod config_validate;
pub mod error;
pub mod manager;
pub mod matcher;
pub mod money;
pub mod reconcile;
pub mod tier;
pub mod validate;
pub mod zone;

// Re-exports
pub use calculate::{
    compute, quote_shipment, CalculatorOptions, Cart, FeeCalculator, LineItem, ShipmentFee,
    ShippingQuote, VendorFee,
};
pub use config::{CurrencyConfig, EngineConfig, LoggingConfig, ValidationConfig};
pub use config_validate::{
    validate_catalog_file, validate_config_file, ConfigIssue, ConfigValidationResult, Severity,
};
pub use error::{
    CalculationError, CalculationFailure, ConfigError, Error, FieldIssue,
    MultipleDefaultZonesError, NoZoneError, Result,
};
pub use manager::{WriteOutcome, ZoneChange, ZoneManager};
pub use matcher::{match_zone, region_key, MatchKind, ZoneMatch};
pub use money::{round_money, Money, Rounding};
pub use reconcile::{apply_reconciliation, reconcile, ReconcileStatus, ReconciliationReport};
pub use tier::{evaluate, select_tier};
pub use validate::{
    check_default_invariant, validate_zone, validate_zone_with, ValidZone, ValidationLimits,
};
pub use zone::{
    RateTier, Shipment, ShippingZone, TierKind, TierRule, VendorId, ZoneBook, ZoneCatalog,
    ZoneDraft, ZoneId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
