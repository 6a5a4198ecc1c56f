//! Shipping Fixtures

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    fixtures::Fixture,
    repository::RepositoryError,
    shipping::{
        models::{Tariff, Transport, TransportId, Zone, ZoneId},
        repository::ShippingRepository,
    },
};

/// Wrapper for shipping in YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Transports
    #[serde(default)]
    pub transports: Vec<Transport>,

    /// Zones
    #[serde(default)]
    pub zones: Vec<Zone>,

    /// Tariffs
    #[serde(default)]
    pub tariffs: Vec<Tariff>,
}

#[async_trait]
impl ShippingRepository for Fixture {
    async fn transports(&self) -> Result<Vec<Transport>, RepositoryError> {
        Ok(self.transports.clone())
    }

    async fn zone_by_country(&self, country: &str) -> Result<Zone, RepositoryError> {
        self.zones
            .iter()
            .find(|zone| zone.country.eq_ignore_ascii_case(country) && zone.zip.is_empty())
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("zone", country))
    }

    async fn zone_by_country_and_zip(
        &self,
        country: &str,
        zip: &str,
    ) -> Result<Zone, RepositoryError> {
        self.zones
            .iter()
            .find(|zone| {
                zone.country.eq_ignore_ascii_case(country)
                    && !zone.zip.is_empty()
                    && zone.zip.eq_ignore_ascii_case(zip)
            })
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("zone", format!("{country} {zip}")))
    }

    async fn tariff(&self, transport: TransportId, zone: ZoneId) -> Result<Tariff, RepositoryError> {
        self.tariffs
            .get(&(transport, zone))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("tariff", format!("{transport}/{zone}")))
    }
}
