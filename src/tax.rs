//! VAT

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::StoreConfig;

/// Tax treatment of one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxContext {
    /// Factor applied to every catalog price and surcharge.
    pub multiplier: Decimal,

    /// VAT rate charged on the order, in percent points.
    pub vat: Decimal,
}

impl TaxContext {
    /// Domestic treatment: prices as listed, store VAT rate.
    pub fn domestic(config: &StoreConfig) -> Self {
        Self {
            multiplier: Decimal::ONE,
            vat: config.vat,
        }
    }

    /// Resolves the tax treatment for an order shipped to `destination`.
    ///
    /// Shipping abroad prices items net of VAT and charges no VAT, unless the
    /// destination is listed as retaining VAT. No destination means domestic.
    pub fn resolve(config: &StoreConfig, destination: Option<&str>) -> Self {
        let domestic = Self::domestic(config);

        let Some(country) = destination.map(str::trim).filter(|c| !c.is_empty()) else {
            return domestic;
        };

        if country.eq_ignore_ascii_case(config.country.trim()) || config.retains_vat(country) {
            return domestic;
        }

        debug!(destination = country, "cross-border order, pricing net of VAT");

        Self {
            multiplier: Decimal::ONE - config.vat / Decimal::ONE_HUNDRED,
            vat: Decimal::ZERO,
        }
    }

    /// Applies the multiplier to a catalog price.
    pub fn apply(&self, price: Decimal) -> Decimal {
        price * self.multiplier
    }
}
