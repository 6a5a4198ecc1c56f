//! Checkout engine
//!
//! Sequences catalog resolution, coupons, shipping, payment selection and
//! totals over one request. The engine only reads from its collaborators, so
//! one instance may serve any number of concurrent checkouts.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tracing::{info, warn};

use crate::{
    catalog::{
        item::ResolvedItem, repository::CatalogRepository, resolver::CatalogResolver,
        token::CartItemToken,
    },
    checkout::{
        order::{Order, OrderUuid},
        request::{CartLine, CheckoutRequest},
        totals::Totals,
        views::{BillingView, ItemView, OrderShortView, PaymentMethodView, ShippingView},
    },
    config::StoreConfig,
    coupons::{engine::CouponSet, repository::CouponRepository},
    errors::CheckoutError,
    payments::{self, PaymentSelection},
    profiles::{BillingProfile, ProfileId, ProfileRepository, ShippingProfile},
    shipping::{
        fees::{ShippingBasis, ShippingCalculator},
        repository::ShippingRepository,
    },
    tax::TaxContext,
};

/// A computed order together with the view returned to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    /// The order, ready to be placed.
    pub order: Order,

    /// Its client-facing projection.
    pub view: OrderShortView,
}

/// Prices checkout requests against read-only store data.
#[derive(Clone)]
pub struct CheckoutEngine {
    catalog: Arc<dyn CatalogRepository>,
    profiles: Arc<dyn ProfileRepository>,
    coupons: Arc<dyn CouponRepository>,
    shipping: Arc<dyn ShippingRepository>,
    config: Arc<StoreConfig>,
}

impl std::fmt::Debug for CheckoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CheckoutEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        profiles: Arc<dyn ProfileRepository>,
        coupons: Arc<dyn CouponRepository>,
        shipping: Arc<dyn ShippingRepository>,
        config: StoreConfig,
    ) -> Self {
        Self {
            catalog,
            profiles,
            coupons,
            shipping,
            config: Arc::new(config),
        }
    }

    /// Store configuration the engine prices with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Prices a request and builds the resulting order.
    ///
    /// Cart lines with a malformed token or a zero quantity are skipped.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotFound`] if a referenced product, variation,
    ///   profile, coupon or transport is absent.
    /// - [`CheckoutError::Mismatch`] if a variation belongs to another product.
    /// - [`CheckoutError::LookupFailure`] if a surcharge cannot be loaded.
    /// - [`CheckoutError::Currency`] if the store currency is unknown.
    /// - [`CheckoutError::Repository`] if a collaborator fails.
    #[tracing::instrument(
        name = "checkout.engine.checkout",
        skip(self, request),
        fields(
            items = request.items.len(),
            coupons = request.coupons.len(),
            transport = ?request.transport,
        ),
        err
    )]
    pub async fn checkout(
        &self,
        request: &CheckoutRequest,
        now: Timestamp,
    ) -> Result<Checkout, CheckoutError> {
        let currency = self.config.iso_currency()?;

        let billing = self.billing_profile(request.billing_profile).await?;
        let destination = self.shipping_profile(request.shipping_profile).await?;

        let tax = TaxContext::resolve(
            &self.config,
            destination.as_ref().map(|p| p.contact.country.as_str()),
        );

        let mut items = self.resolve_items(&request.items, tax, now).await?;

        let coupons = CouponSet::load(self.coupons.as_ref(), &request.coupons, now).await?;

        coupons.apply_to_items(&mut items);

        let basis = ShippingBasis::new(&items);
        let calculator = ShippingCalculator::new(self.shipping.as_ref());

        let (deliveries, selection) = match request.transport {
            Some(transport) => {
                let selection = calculator
                    .select(
                        transport,
                        &request.services,
                        destination.as_ref(),
                        &basis,
                        &coupons,
                    )
                    .await?;

                (Vec::new(), Some(selection))
            }
            None => (calculator.quotes(destination.as_ref(), &basis).await?, None),
        };

        let (delivery, discount2) = selection
            .as_ref()
            .map_or((Decimal::ZERO, Decimal::ZERO), |s| (s.delivery, s.discount.amount));

        let totals = Totals::new(&items, delivery, discount2, tax.vat);
        let uuid = OrderUuid::new();

        let (billing, payments) =
            self.payment(request, billing, totals.total, currency, &uuid.to_string());

        let view = OrderShortView {
            uuid,
            currency: currency.iso_alpha_code.to_string(),
            billing,
            items: items.iter().map(ItemView::from).collect(),
            totals,
            deliveries,
            shipping: selection.as_ref().map(ShippingView::from),
            payments,
            comment: request
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };

        let order = Order::from_view(&view, now).map_err(CheckoutError::Description)?;

        info!(
            order = %uuid,
            items = items.len(),
            total = %totals.total,
            "computed order"
        );

        Ok(Checkout { order, view })
    }

    /// Prices a request without keeping the order.
    ///
    /// # Errors
    ///
    /// Fails like [`CheckoutEngine::checkout`].
    pub async fn quote(
        &self,
        request: &CheckoutRequest,
        now: Timestamp,
    ) -> Result<OrderShortView, CheckoutError> {
        Ok(self.checkout(request, now).await?.view)
    }

    fn payment(
        &self,
        request: &CheckoutRequest,
        billing: Option<BillingProfile>,
        total: Decimal,
        currency: &'static Currency,
        order: &str,
    ) -> (Option<BillingView>, Vec<PaymentMethodView>) {
        let payment = PaymentSelection::choose(
            &self.config,
            request.payment_id,
            request.payment_method.as_deref(),
        );

        let Some(selection) = payment else {
            if request.payment_id.is_some() || request.payment_method.is_some() {
                warn!(
                    payment_id = ?request.payment_id,
                    payment_method = ?request.payment_method,
                    "requested payment method is not available"
                );
            }

            let available = payments::available(&self.config)
                .into_iter()
                .map(PaymentMethodView::from)
                .collect();

            return (None, available);
        };

        let (profile, vat_id) = billing.map_or((None, None), |profile| {
            (Some(profile.contact), profile.vat_id)
        });

        let view = BillingView {
            method: PaymentMethodView::from(&selection.method),
            text: selection.instructions(total, currency, order),
            suffix: selection.suffix,
            profile,
            vat_id,
        };

        (Some(view), Vec::new())
    }

    async fn billing_profile(
        &self,
        id: Option<ProfileId>,
    ) -> Result<Option<BillingProfile>, CheckoutError> {
        match id {
            Some(id) => Ok(Some(self.profiles.billing_profile(id).await?)),
            None => Ok(None),
        }
    }

    async fn shipping_profile(
        &self,
        id: Option<ProfileId>,
    ) -> Result<Option<ShippingProfile>, CheckoutError> {
        match id {
            Some(id) => Ok(Some(self.profiles.shipping_profile(id).await?)),
            None => Ok(None),
        }
    }

    async fn resolve_items(
        &self,
        lines: &[CartLine],
        tax: TaxContext,
        now: Timestamp,
    ) -> Result<Vec<ResolvedItem>, CheckoutError> {
        let resolver = CatalogResolver::new(self.catalog.as_ref(), tax, now);
        let mut items = Vec::with_capacity(lines.len());

        for (line_no, line) in lines.iter().enumerate() {
            let uuid = line.token.trim();

            let token = match CartItemToken::decode(uuid) {
                Ok(token) => token,
                Err(error) => {
                    warn!(line = line_no, token = uuid, %error, "skipping malformed cart token");

                    continue;
                }
            };

            if line.quantity == 0 {
                warn!(line = line_no, token = uuid, "skipping cart line without quantity");

                continue;
            }

            items.push(
                resolver
                    .resolve(uuid, &token, line.category, line.quantity)
                    .await?,
            );
        }

        Ok(items)
    }
}
