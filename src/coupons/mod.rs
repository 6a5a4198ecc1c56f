//! Coupons

pub mod engine;
pub mod models;
pub mod repository;

pub use engine::{CouponSet, ShipmentDiscount};
pub use models::{AppliedCoupon, ApplyTo, Coupon, CouponKind};
pub use repository::{CouponRepository, MockCouponRepository};
