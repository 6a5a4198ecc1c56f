//! Checkout
//!
//! Checkout pricing engine: resolves cart item tokens against a catalog,
//! applies sale prices, option surcharges and coupons, prices delivery through
//! postal-code zones and tariffs, selects a payment method and aggregates
//! VAT-aware totals into an order.

pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod coupons;
pub mod database;
pub mod errors;
pub mod fixtures;
pub mod money;
pub mod observability;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod profiles;
pub mod receipt;
pub mod repository;
pub mod shipping;
pub mod tax;
pub mod uuids;
