//! Shipping Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// Transport id
pub type TransportId = u64;

/// Zone id
pub type ZoneId = u64;

/// Shipping region: a country, optionally narrowed by a postal-code pattern.
///
/// Patterns are matched literally; `*` positions are only wildcards in the
/// sense that the resolver generates them (`101**`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id.
    pub id: ZoneId,

    /// ISO 3166 alpha-2 country code.
    pub country: String,

    /// Postal-code pattern; empty for the country-wide zone.
    #[serde(default)]
    pub zip: String,

    /// Display title.
    #[serde(default)]
    pub title: String,
}

/// Fee components of a transport or tariff.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeFormula {
    /// Charged once per order; percentages are of the order subtotal.
    pub order_fee: Amount,

    /// Charged per unit; percentages are of the item's unit price.
    pub item_fee: Amount,

    /// Rate per kilogram.
    pub kg: Decimal,

    /// Rate per cubic metre.
    pub m3: Decimal,
}

/// Optional paid extra of a transport (insurance, express, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Lookup name, as sent by the client.
    pub name: String,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Flat price.
    pub price: Decimal,
}

/// Delivery method with its default fee formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Transport id.
    pub id: TransportId,

    /// Lookup name.
    pub name: String,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Disabled transports are never offered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Minimum order volume in cubic metres.
    #[serde(default)]
    pub volume: Decimal,

    /// Minimum order weight in kilograms.
    #[serde(default)]
    pub weight: Decimal,

    /// Fee formula used when no tariff matches.
    #[serde(flatten)]
    pub formula: FeeFormula,

    /// Subtotal above which delivery is free; `0` disables it.
    #[serde(default)]
    pub free_threshold: Decimal,

    /// Optional extras.
    #[serde(default)]
    pub services: Vec<Service>,
}

fn enabled_by_default() -> bool {
    true
}

impl Transport {
    /// Creates an enabled transport without minimums, threshold or services.
    pub fn new(id: TransportId, name: impl Into<String>, formula: FeeFormula) -> Self {
        Self {
            id,
            name: name.into(),
            title: String::new(),
            enabled: true,
            volume: Decimal::ZERO,
            weight: Decimal::ZERO,
            formula,
            free_threshold: Decimal::ZERO,
            services: Vec::new(),
        }
    }

    /// Whether the transport can carry an order of the given size.
    pub fn accepts(&self, volume: Decimal, weight: Decimal) -> bool {
        self.enabled && volume >= self.volume && weight >= self.weight
    }

    /// Whether `subtotal` earns free delivery.
    pub fn ships_free(&self, subtotal: Decimal) -> bool {
        self.free_threshold > Decimal::ZERO && subtotal > self.free_threshold
    }

    /// Looks up an extra by name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// Fee formula of one transport inside one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    /// Transport the tariff belongs to.
    pub transport_id: TransportId,

    /// Zone the tariff applies in.
    pub zone_id: ZoneId,

    /// Replaces the transport's formula.
    #[serde(flatten)]
    pub formula: FeeFormula,
}
