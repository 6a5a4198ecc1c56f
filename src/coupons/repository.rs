//! Coupon Repository

use async_trait::async_trait;
use mockall::automock;

use crate::{coupons::models::Coupon, repository::RepositoryError};

/// Read-only access to discount codes.
#[automock]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Retrieve a coupon by its code.
    async fn coupon_by_code(&self, code: &str) -> Result<Coupon, RepositoryError>;
}
