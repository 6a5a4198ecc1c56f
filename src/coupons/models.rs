//! Coupon Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::models::{CategoryId, ProductId},
    money::Amount,
};

/// What a coupon discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Every item of the order.
    Order,

    /// Items matching the coupon's scope.
    Item,

    /// The delivery fee.
    Shipment,
}

/// Scope of an item coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyTo {
    /// Any item.
    #[default]
    All,

    /// Items ordered from the listed categories.
    Categories,

    /// The listed products.
    Products,
}

/// Discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Lookup code.
    pub code: String,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Display description.
    #[serde(default)]
    pub description: String,

    /// Coupon type.
    #[serde(rename = "type")]
    pub kind: CouponKind,

    /// Item scope, only meaningful for [`CouponKind::Item`].
    #[serde(default)]
    pub apply_to: ApplyTo,

    /// Eligible categories; empty means any.
    #[serde(default)]
    pub categories: Vec<CategoryId>,

    /// Eligible products; empty means any.
    #[serde(default)]
    pub products: Vec<ProductId>,

    /// Discount amount.
    pub amount: Amount,

    /// Start of validity, inclusive.
    #[serde(default)]
    pub start: Option<Timestamp>,

    /// End of validity, exclusive.
    #[serde(default)]
    pub end: Option<Timestamp>,

    /// Disabled coupons never apply. Records are enabled unless they say
    /// otherwise, like transports.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Coupon {
    /// Creates an enabled, open-ended coupon.
    pub fn new(code: impl Into<String>, kind: CouponKind, amount: Amount) -> Self {
        Self {
            code: code.into(),
            title: String::new(),
            description: String::new(),
            kind,
            apply_to: ApplyTo::All,
            categories: Vec::new(),
            products: Vec::new(),
            amount,
            start: None,
            end: None,
            enabled: true,
        }
    }

    /// Whether the coupon can be redeemed at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.enabled
            && self.start.is_none_or(|start| start <= now)
            && self.end.is_none_or(|end| now < end)
    }

    /// Whether an item coupon covers an item of `product` ordered from
    /// `category`.
    pub fn covers(&self, category: CategoryId, product: ProductId) -> bool {
        match self.apply_to {
            ApplyTo::All => true,
            ApplyTo::Categories => {
                self.categories.is_empty() || self.categories.contains(&category)
            }
            ApplyTo::Products => self.products.is_empty() || self.products.contains(&product),
        }
    }

    /// Records an application of this coupon.
    pub fn applied(&self, discount: Decimal) -> AppliedCoupon {
        AppliedCoupon {
            code: self.code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            amount: self.amount,
            discount,
        }
    }
}

/// A coupon as applied to one item or to the delivery fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    /// Coupon code.
    pub code: String,

    /// Coupon title.
    pub title: String,

    /// Coupon description.
    pub description: String,

    /// Nominal amount (`10%`, `5`).
    pub amount: Amount,

    /// Discount granted, per unit for items.
    pub discount: Decimal,
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use super::*;

    fn coupon() -> Coupon {
        Coupon::new("SAVE", CouponKind::Item, Amount::Fixed(Decimal::from(5)))
    }

    #[test]
    fn validity_window_is_half_open() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;
        let mut coupon = coupon();

        coupon.start = Some(now);
        coupon.end = Some(now + SignedDuration::from_hours(24));

        assert!(coupon.is_active(now));
        assert!(!coupon.is_active(now + SignedDuration::from_hours(24)));
        assert!(!coupon.is_active(now - SignedDuration::from_secs(1)));

        Ok(())
    }

    #[test]
    fn disabled_coupon_is_inactive() {
        let mut coupon = coupon();

        coupon.enabled = false;

        assert!(!coupon.is_active(Timestamp::now()));
    }

    #[test]
    fn category_scope_without_list_is_open() {
        let mut coupon = coupon();

        coupon.apply_to = ApplyTo::Categories;

        assert!(coupon.covers(7, 1));

        coupon.categories = vec![3];

        assert!(coupon.covers(3, 1));
        assert!(!coupon.covers(7, 1));
    }

    #[test]
    fn product_scope_checks_products() {
        let mut coupon = coupon();

        coupon.apply_to = ApplyTo::Products;
        coupon.products = vec![10, 11];

        assert!(coupon.covers(0, 11));
        assert!(!coupon.covers(0, 12));
    }

    #[test]
    fn deserializes_from_yaml() -> TestResult {
        let coupon: Coupon = serde_norway::from_str(
            "code: TEN\ntype: order\namount: \"10%\"\nenabled: true\nstart: 2024-01-01T00:00:00Z\n",
        )?;

        assert_eq!(coupon.kind, CouponKind::Order);
        assert_eq!(coupon.amount.to_string(), "10%");
        assert!(coupon.start.is_some());
        assert!(coupon.end.is_none());

        Ok(())
    }

    #[test]
    fn records_without_enabled_flag_are_enabled() -> TestResult {
        let enabled: Coupon = serde_norway::from_str("code: FIVE\ntype: item\namount: \"5\"\n")?;
        let disabled: Coupon =
            serde_norway::from_str("code: OFF\ntype: order\namount: \"5\"\nenabled: false\n")?;

        assert!(enabled.enabled, "expected coupons to be enabled by default");
        assert!(!disabled.enabled, "expected an explicit flag to be kept");

        Ok(())
    }
}
