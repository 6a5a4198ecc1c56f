//! Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{CartItemToken, CatalogRepository, ResolvedItem, TokenError},
    checkout::{
        CartLine, Checkout, CheckoutEngine, CheckoutRequest, Order, OrderShortView, OrderUuid,
        Totals,
    },
    config::{ConfigError, StoreConfig},
    coupons::{Coupon, CouponKind, CouponRepository, CouponSet},
    errors::CheckoutError,
    fixtures::{Fixture, FixtureError},
    money::Amount,
    orders::{OrderPlacement, OrderStore, PgOrderStore, PlaceOrderError},
    payments::{PaymentMethodConfig, PaymentSelection},
    profiles::{BillingProfile, Contact, ProfileRepository, ShippingProfile},
    receipt::{Receipt, ReceiptError},
    repository::RepositoryError,
    shipping::{ShippingCalculator, ShippingRepository, Transport, Zone},
    tax::TaxContext,
};
