//! Shipping fees
//!
//! Evaluates transport fee formulas against an order. In quote mode every
//! eligible transport is priced and ranked; in checkout mode the chosen
//! transport is priced in detail with its extras and shipment coupons.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    catalog::item::ResolvedItem,
    coupons::engine::{CouponSet, ShipmentDiscount},
    errors::CheckoutError,
    money::round,
    profiles::{Contact, ShippingProfile},
    shipping::{
        models::{FeeFormula, Service, Transport, TransportId, Zone},
        repository::ShippingRepository,
        zones::{resolve_formula, resolve_zone},
    },
};

/// Order figures the fee formulas are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ShippingBasis<'a> {
    items: &'a [ResolvedItem],

    /// Item subtotal net of item discounts.
    pub subtotal: Decimal,

    /// Total volume in cubic metres.
    pub volume: Decimal,

    /// Total weight in kilograms.
    pub weight: Decimal,
}

impl<'a> ShippingBasis<'a> {
    /// Aggregates the order figures of `items`.
    pub fn new(items: &'a [ResolvedItem]) -> Self {
        Self {
            items,
            subtotal: items.iter().map(ResolvedItem::total).sum(),
            volume: items.iter().map(ResolvedItem::line_volume).sum(),
            weight: items.iter().map(ResolvedItem::line_weight).sum(),
        }
    }
}

/// Fee of one formula for one order, before extras and coupons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Fixed components plus the volume rate.
    pub by_volume: Decimal,

    /// Fixed components plus the weight rate.
    pub by_weight: Decimal,

    /// The larger of the two, or zero when delivery is free.
    pub value: Decimal,
}

impl FeeBreakdown {
    /// Evaluates `formula` against `basis`.
    pub fn evaluate(formula: &FeeFormula, basis: &ShippingBasis<'_>) -> Self {
        let order_fee = formula.order_fee.of(basis.subtotal);
        let item_fee: Decimal = basis
            .items
            .iter()
            .map(|item| formula.item_fee.of(item.price) * item.quantity())
            .sum();

        let by_volume = round(order_fee + item_fee + basis.volume * formula.m3);
        let by_weight = round(order_fee + item_fee + basis.weight * formula.kg);

        Self {
            by_volume,
            by_weight,
            value: by_volume.max(by_weight),
        }
    }

    /// Forces the fee to zero when `transport` ships `subtotal` for free.
    #[must_use]
    pub fn with_free_threshold(mut self, transport: &Transport, subtotal: Decimal) -> Self {
        if transport.ships_free(subtotal) {
            self.value = Decimal::ZERO;
        }

        self
    }
}

/// A priced delivery option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    /// Transport id.
    pub transport: TransportId,

    /// Transport name.
    pub name: String,

    /// Transport title.
    pub title: String,

    /// Computed fee.
    #[serde(flatten)]
    pub fee: FeeBreakdown,

    /// Extras the client may select.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

/// The chosen transport, fully priced.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingSelection {
    /// Chosen transport.
    pub transport: Transport,

    /// Resolved destination zone.
    pub zone: Option<Zone>,

    /// Fee before extras.
    pub fee: FeeBreakdown,

    /// Selected extras.
    pub services: Vec<Service>,

    /// Fee plus extras.
    pub delivery: Decimal,

    /// Shipment coupon discount on `delivery`.
    pub discount: ShipmentDiscount,

    /// Snapshot of the destination.
    pub contact: Option<Contact>,
}

/// Computes delivery fees against a shipping repository.
#[derive(Clone, Copy)]
pub struct ShippingCalculator<'a> {
    shipping: &'a dyn ShippingRepository,
}

impl std::fmt::Debug for ShippingCalculator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingCalculator").finish_non_exhaustive()
    }
}

impl<'a> ShippingCalculator<'a> {
    /// Creates a calculator.
    pub fn new(shipping: &'a dyn ShippingRepository) -> Self {
        Self { shipping }
    }

    /// Prices every transport able to carry the order, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Repository`] if a lookup fails.
    pub async fn quotes(
        &self,
        destination: Option<&ShippingProfile>,
        basis: &ShippingBasis<'_>,
    ) -> Result<Vec<ShippingQuote>, CheckoutError> {
        let zone = self.zone(destination).await?;
        let mut quotes = Vec::new();

        for transport in self.shipping.transports().await? {
            if !transport.accepts(basis.volume, basis.weight) {
                continue;
            }

            let formula = resolve_formula(self.shipping, &transport, zone.as_ref()).await?;
            let fee = FeeBreakdown::evaluate(&formula, basis)
                .with_free_threshold(&transport, basis.subtotal);

            quotes.push(ShippingQuote {
                transport: transport.id,
                name: transport.name,
                title: transport.title,
                fee,
                services: transport.services,
            });
        }

        quotes.sort_by(|a, b| {
            a.fee
                .value
                .cmp(&b.fee.value)
                .then_with(|| a.transport.cmp(&b.transport))
        });

        Ok(quotes)
    }

    /// Prices the chosen transport with the selected extras, then runs the
    /// shipment coupon pass.
    ///
    /// Unknown extras are ignored; each extra is charged at most once.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotFound`] if the transport is unknown, disabled or
    ///   cannot carry the order.
    /// - [`CheckoutError::Repository`] if a lookup fails.
    pub async fn select(
        &self,
        transport: TransportId,
        services: &[String],
        destination: Option<&ShippingProfile>,
        basis: &ShippingBasis<'_>,
        coupons: &CouponSet,
    ) -> Result<ShippingSelection, CheckoutError> {
        let transport = self
            .shipping
            .transports()
            .await?
            .into_iter()
            .find(|t| t.id == transport && t.accepts(basis.volume, basis.weight))
            .ok_or_else(|| CheckoutError::not_found("transport", transport))?;

        let zone = self.zone(destination).await?;
        let formula = resolve_formula(self.shipping, &transport, zone.as_ref()).await?;
        let fee =
            FeeBreakdown::evaluate(&formula, basis).with_free_threshold(&transport, basis.subtotal);

        let services = selected_services(&transport, services);
        let delivery = fee.value + services.iter().map(|s| s.price).sum::<Decimal>();
        let discount = coupons.apply_to_delivery(delivery);

        debug!(
            transport = transport.id,
            zone = zone.as_ref().map(|z| z.id),
            %delivery,
            discount = %discount.amount,
            "priced delivery"
        );

        Ok(ShippingSelection {
            transport,
            zone,
            fee,
            services,
            delivery,
            discount,
            contact: destination.map(|profile| profile.contact.clone()),
        })
    }

    async fn zone(&self, destination: Option<&ShippingProfile>) -> Result<Option<Zone>, CheckoutError> {
        match destination {
            Some(profile) => {
                resolve_zone(self.shipping, &profile.contact.country, &profile.contact.zip).await
            }
            None => Ok(None),
        }
    }
}

fn selected_services(transport: &Transport, names: &[String]) -> Vec<Service> {
    let mut seen = FxHashSet::default();
    let mut services = Vec::new();

    for name in names.iter().map(|n| n.trim()) {
        if !seen.insert(name) {
            continue;
        }

        match transport.service(name) {
            Some(service) => services.push(service.clone()),
            None => warn!(transport = transport.id, service = name, "ignoring unknown service"),
        }
    }

    services
}
