//! Order totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{catalog::item::ResolvedItem, money::round};

/// Aggregated figures of one order.
///
/// `total` is always `(sum - discount) + (delivery - discount2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Number of units ordered.
    pub quantity: u64,

    /// Total volume in cubic metres.
    pub volume: Decimal,

    /// Total weight in kilograms.
    pub weight: Decimal,

    /// Item subtotal before discounts.
    pub sum: Decimal,

    /// Item discounts.
    pub discount: Decimal,

    /// Delivery fee including extras.
    pub delivery: Decimal,

    /// Delivery discount.
    pub discount2: Decimal,

    /// VAT rate, in percent points.
    pub vat: Decimal,

    /// Amount due.
    pub total: Decimal,
}

impl Totals {
    /// Aggregates `items` with a delivery fee and its discount.
    pub fn new(items: &[ResolvedItem], delivery: Decimal, discount2: Decimal, vat: Decimal) -> Self {
        let sum: Decimal = items.iter().map(ResolvedItem::line_sum).sum();
        let discount: Decimal = items.iter().map(ResolvedItem::line_discount).sum();

        Self {
            quantity: items.iter().map(|item| u64::from(item.quantity)).sum(),
            volume: items.iter().map(ResolvedItem::line_volume).sum(),
            weight: items.iter().map(ResolvedItem::line_weight).sum(),
            sum,
            discount,
            delivery,
            discount2,
            vat,
            total: (sum - discount) + (delivery - discount2),
        }
    }

    /// Item subtotal net of item discounts.
    pub fn subtotal(&self) -> Decimal {
        self.sum - self.discount
    }

    /// VAT contained in the total.
    pub fn vat_amount(&self) -> Decimal {
        round(self.total * self.vat / (Decimal::ONE_HUNDRED + self.vat))
    }
}
