//! Coupon Fixtures

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    coupons::{models::Coupon, repository::CouponRepository},
    fixtures::Fixture,
    repository::RepositoryError,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons
    pub coupons: Vec<Coupon>,
}

#[async_trait]
impl CouponRepository for Fixture {
    async fn coupon_by_code(&self, code: &str) -> Result<Coupon, RepositoryError> {
        self.coupons
            .get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("coupon", code))
    }
}
