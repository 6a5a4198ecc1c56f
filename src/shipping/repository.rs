//! Shipping Repository

use async_trait::async_trait;
use mockall::automock;

use crate::{
    repository::RepositoryError,
    shipping::models::{Tariff, Transport, TransportId, Zone, ZoneId},
};

/// Read-only access to transports, zones and tariffs.
///
/// Single-record lookups report a missing record as
/// [`RepositoryError::NotFound`].
#[automock]
#[async_trait]
pub trait ShippingRepository: Send + Sync {
    /// All configured transports, enabled or not.
    async fn transports(&self) -> Result<Vec<Transport>, RepositoryError>;

    /// The country-wide zone of `country`.
    async fn zone_by_country(&self, country: &str) -> Result<Zone, RepositoryError>;

    /// The zone of `country` whose postal-code pattern equals `zip`.
    async fn zone_by_country_and_zip(&self, country: &str, zip: &str)
    -> Result<Zone, RepositoryError>;

    /// The tariff of `transport` inside `zone`.
    async fn tariff(&self, transport: TransportId, zone: ZoneId) -> Result<Tariff, RepositoryError>;
}
