//! Checkout

pub mod engine;
pub mod order;
pub mod request;
pub mod totals;
pub mod views;

pub use engine::{Checkout, CheckoutEngine};
pub use order::{Order, OrderUuid, UserId};
pub use request::{CartLine, CartLineError, CheckoutRequest};
pub use totals::Totals;
pub use views::{
    BillingView, CouponView, ItemView, OrderShortView, PaymentMethodView, PropertyView,
    ShippingView, ZoneView,
};
