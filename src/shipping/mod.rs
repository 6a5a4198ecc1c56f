//! Shipping

pub mod fees;
pub mod models;
pub mod repository;
pub mod zones;

pub use fees::{FeeBreakdown, ShippingBasis, ShippingCalculator, ShippingQuote, ShippingSelection};
pub use models::{FeeFormula, Service, Tariff, Transport, TransportId, Zone, ZoneId};
pub use repository::{MockShippingRepository, ShippingRepository};
