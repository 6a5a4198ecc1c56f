//! Resolved cart items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    catalog::models::{CategoryId, ProductId, PropertyPriceId, VariationId},
    coupons::models::{AppliedCoupon, Coupon},
};

/// A selected option value and its tax-adjusted surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    /// Property price id.
    pub id: PropertyPriceId,

    /// Property title.
    pub property: String,

    /// Selected value title.
    pub value: String,

    /// Surcharge per unit.
    pub price: Decimal,
}

/// A cart line resolved against the catalog and priced.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    /// The cart token the line was ordered with.
    pub uuid: String,

    /// Product id.
    pub product_id: ProductId,

    /// Variation id, `0` for default pricing.
    pub variation_id: VariationId,

    /// Category the item was ordered from.
    pub category_id: CategoryId,

    /// Product title.
    pub title: String,

    /// Variation title, when a variation was selected.
    pub variation_title: Option<String>,

    /// Category path (`/shoes/running`).
    pub path: String,

    /// Cached thumbnail URL.
    pub thumbnail: Option<String>,

    /// Tax-adjusted list price.
    pub base_price: Decimal,

    /// Tax-adjusted sale price, when the sale was active.
    pub sale_price: Option<Decimal>,

    /// Selected option surcharges.
    pub properties: SmallVec<[Surcharge; 4]>,

    /// Unit price: (sale or list price) plus surcharges, tax-adjusted.
    pub price: Decimal,

    /// Coupons applied to this item.
    pub coupons: SmallVec<[AppliedCoupon; 2]>,

    /// Discount per unit, never more than `price`.
    pub discount: Decimal,

    /// Ordered quantity.
    pub quantity: u32,

    /// VAT rate, in percent points.
    pub vat: Decimal,

    /// Volume per unit in cubic metres.
    pub volume: Decimal,

    /// Weight per unit in kilograms.
    pub weight: Decimal,
}

impl ResolvedItem {
    /// Unit price left after the discounts applied so far.
    pub fn remaining_price(&self) -> Decimal {
        self.price - self.discount
    }

    /// Applies `coupon` to the unit price and records it.
    ///
    /// Percentages are taken of the undiscounted price; the grant is limited
    /// to the price left after earlier coupons. Returns the per-unit discount
    /// granted.
    pub fn apply_coupon(&mut self, coupon: &Coupon) -> Decimal {
        let discount = coupon.amount.discount_on(self.price, self.remaining_price());

        self.discount += discount;
        self.coupons.push(coupon.applied(discount));

        discount
    }

    /// Ordered quantity as a decimal.
    pub fn quantity(&self) -> Decimal {
        Decimal::from(self.quantity)
    }

    /// Line amount before discounts.
    pub fn line_sum(&self) -> Decimal {
        self.price * self.quantity()
    }

    /// Line discount.
    pub fn line_discount(&self) -> Decimal {
        self.discount * self.quantity()
    }

    /// Line total: `(price - discount) * quantity`.
    pub fn total(&self) -> Decimal {
        self.remaining_price() * self.quantity()
    }

    /// Line volume.
    pub fn line_volume(&self) -> Decimal {
        self.volume * self.quantity()
    }

    /// Line weight.
    pub fn line_weight(&self) -> Decimal {
        self.weight * self.quantity()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use smallvec::SmallVec;

    use super::ResolvedItem;

    /// An item with the given unit price and quantity and no discounts.
    pub(crate) fn item(price: Decimal, quantity: u32) -> ResolvedItem {
        ResolvedItem {
            uuid: "token".to_string(),
            product_id: 1,
            variation_id: 0,
            category_id: 1,
            title: "Item".to_string(),
            variation_title: None,
            path: String::new(),
            thumbnail: None,
            base_price: price,
            sale_price: None,
            properties: SmallVec::new(),
            price,
            coupons: SmallVec::new(),
            discount: Decimal::ZERO,
            quantity,
            vat: Decimal::ZERO,
            volume: Decimal::ZERO,
            weight: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;

    use crate::{coupons::models::CouponKind, money::Amount};

    use super::{test_support::item, *};

    #[test]
    fn line_total_subtracts_discount_per_unit() {
        let mut item = item(Decimal::from(30), 3);

        item.apply_coupon(&Coupon::new(
            "FIVE",
            CouponKind::Item,
            Amount::Fixed(Decimal::from(5)),
        ));

        assert_eq!(item.line_sum(), Decimal::from(90));
        assert_eq!(item.line_discount(), Decimal::from(15));
        assert_eq!(item.total(), Decimal::from(75));
    }

    #[test]
    fn stacked_percentages_are_taken_of_the_undiscounted_price() {
        let mut item = item(Decimal::from(100), 1);
        let ten = Amount::Percent(Percentage::from(Decimal::new(1, 1)));

        assert_eq!(item.apply_coupon(&Coupon::new("A", CouponKind::Item, ten)), Decimal::from(10));
        assert_eq!(item.apply_coupon(&Coupon::new("B", CouponKind::Order, ten)), Decimal::from(10));
        assert_eq!(item.total(), Decimal::from(80), "expected 80, got {}", item.total());
    }

    #[test]
    fn stacked_coupons_never_exceed_price() {
        let mut item = item(Decimal::from(30), 1);
        let coupon = Coupon::new("BIG", CouponKind::Item, Amount::Fixed(Decimal::from(20)));

        assert_eq!(item.apply_coupon(&coupon), Decimal::from(20));
        assert_eq!(item.apply_coupon(&coupon), Decimal::from(10));
        assert_eq!(item.discount, item.price);
        assert_eq!(item.total(), Decimal::ZERO);
        assert_eq!(item.coupons.len(), 2);
    }
}
