//! Profile Fixtures

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    fixtures::Fixture,
    profiles::{BillingProfile, ProfileId, ProfileRepository, ShippingProfile},
    repository::RepositoryError,
};

/// Wrapper for profiles in YAML
#[derive(Debug, Deserialize)]
pub struct ProfilesFixture {
    /// Billing profiles
    #[serde(default)]
    pub billing: Vec<BillingProfile>,

    /// Shipping profiles
    #[serde(default)]
    pub shipping: Vec<ShippingProfile>,
}

#[async_trait]
impl ProfileRepository for Fixture {
    async fn billing_profile(&self, id: ProfileId) -> Result<BillingProfile, RepositoryError> {
        self.billing_profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("billing profile", id))
    }

    async fn shipping_profile(&self, id: ProfileId) -> Result<ShippingProfile, RepositoryError> {
        self.shipping_profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("shipping profile", id))
    }
}
