//! Catalog Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product id
pub type ProductId = u64;

/// Variation id
pub type VariationId = u64;

/// Property price id
pub type PropertyPriceId = u64;

/// Category id
pub type CategoryId = u64;

/// Cubic centimetres per cubic metre.
const CM3_PER_M3: u32 = 1_000_000;

/// Price and physical attributes shared by products and variations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pricing {
    /// List price.
    pub base_price: Decimal,

    /// Sale price; only used when positive and within the sale window.
    #[serde(default)]
    pub sale_price: Decimal,

    /// Start of the sale window, inclusive. Open when unset.
    #[serde(default)]
    pub sale_start: Option<Timestamp>,

    /// End of the sale window, exclusive. Open when unset.
    #[serde(default)]
    pub sale_end: Option<Timestamp>,

    /// Width in centimetres.
    #[serde(default)]
    pub width: Decimal,

    /// Height in centimetres.
    #[serde(default)]
    pub height: Decimal,

    /// Depth in centimetres.
    #[serde(default)]
    pub depth: Decimal,

    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Decimal,
}

impl Pricing {
    /// Creates pricing with a list price only.
    pub fn new(base_price: Decimal) -> Self {
        Self {
            base_price,
            ..Self::default()
        }
    }

    /// Whether the sale price replaces the list price at `now`.
    pub fn on_sale(&self, now: Timestamp) -> bool {
        self.sale_price > Decimal::ZERO
            && self.sale_start.is_none_or(|start| start <= now)
            && self.sale_end.is_none_or(|end| now < end)
    }

    /// Effective unit price at `now`, before tax adjustment.
    pub fn unit_price(&self, now: Timestamp) -> Decimal {
        if self.on_sale(now) {
            self.sale_price
        } else {
            self.base_price
        }
    }

    /// Volume in cubic metres.
    pub fn volume(&self) -> Decimal {
        self.width * self.height * self.depth / Decimal::from(CM3_PER_M3)
    }
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: ProductId,

    /// Display title.
    pub title: String,

    /// Default pricing, used when no variation is selected.
    #[serde(flatten)]
    pub pricing: Pricing,
}

/// Product variation with its own pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// Variation id.
    pub id: VariationId,

    /// Owning product.
    pub product_id: ProductId,

    /// Display title.
    pub title: String,

    /// Variation pricing.
    #[serde(flatten)]
    pub pricing: Pricing,
}

/// Surcharge for one selected option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPrice {
    /// Property price id.
    pub id: PropertyPriceId,

    /// Title of the property (`Colour`).
    pub property: String,

    /// Title of the selected value (`Red`).
    pub value: String,

    /// Surcharge before tax adjustment.
    pub price: Decimal,
}

/// One level of a category path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Category id.
    pub id: CategoryId,

    /// URL segment.
    pub name: String,

    /// Display title.
    pub title: String,
}

/// Entity a cached thumbnail is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogEntity {
    /// A product.
    Product(ProductId),

    /// A variation.
    Variation(VariationId),
}
