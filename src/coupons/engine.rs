//! Coupon engine
//!
//! Loads the requested codes once, keeps the ones that can be redeemed now and
//! evaluates them in three passes: item coupons, order coupons and, once the
//! delivery fee is known, shipment coupons.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    catalog::item::ResolvedItem,
    coupons::{
        models::{AppliedCoupon, Coupon, CouponKind},
        repository::CouponRepository,
    },
    errors::CheckoutError,
};

/// Delivery fee discount produced by the shipment pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentDiscount {
    /// Total discount on the delivery fee.
    pub amount: Decimal,

    /// Coupons that contributed.
    pub coupons: SmallVec<[AppliedCoupon; 2]>,
}

/// The redeemable coupons of one checkout, in request order.
#[derive(Debug, Clone, Default)]
pub struct CouponSet {
    coupons: SmallVec<[Coupon; 4]>,
}

impl CouponSet {
    /// Builds a set from already loaded coupons, keeping those active at `now`.
    pub fn new(coupons: impl IntoIterator<Item = Coupon>, now: Timestamp) -> Self {
        Self {
            coupons: coupons.into_iter().filter(|c| c.is_active(now)).collect(),
        }
    }

    /// Loads each unique code once; the first occurrence wins.
    ///
    /// Blank codes are ignored. Disabled or expired coupons are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotFound`] if a code does not exist, or
    /// [`CheckoutError::Repository`] if the lookup fails.
    pub async fn load(
        repository: &dyn CouponRepository,
        codes: &[String],
        now: Timestamp,
    ) -> Result<Self, CheckoutError> {
        let mut seen = FxHashSet::default();
        let mut coupons = SmallVec::new();

        for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !seen.insert(code) {
                continue;
            }

            let coupon = repository.coupon_by_code(code).await?;

            if coupon.is_active(now) {
                coupons.push(coupon);
            } else {
                debug!(code, "coupon is disabled or outside its validity window");
            }
        }

        Ok(Self { coupons })
    }

    /// Number of redeemable coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether no coupon is redeemable.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    fn of_kind(&self, kind: CouponKind) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter().filter(move |c| c.kind == kind)
    }

    /// Runs the item pass, then the order pass, over `items`.
    pub fn apply_to_items(&self, items: &mut [ResolvedItem]) {
        for coupon in self.of_kind(CouponKind::Item) {
            for item in items
                .iter_mut()
                .filter(|item| coupon.covers(item.category_id, item.product_id))
            {
                item.apply_coupon(coupon);
            }
        }

        for coupon in self.of_kind(CouponKind::Order) {
            for item in items.iter_mut() {
                item.apply_coupon(coupon);
            }
        }
    }

    /// Runs the shipment pass against a delivery fee.
    ///
    /// Percentages are taken of the full fee; the total discount never
    /// exceeds it.
    pub fn apply_to_delivery(&self, fee: Decimal) -> ShipmentDiscount {
        let mut discount = ShipmentDiscount::default();

        for coupon in self.of_kind(CouponKind::Shipment) {
            let amount = coupon.amount.discount_on(fee, fee - discount.amount);

            discount.amount += amount;
            discount.coupons.push(coupon.applied(amount));
        }

        discount
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{
        catalog::item::test_support::item,
        coupons::{models::ApplyTo, repository::MockCouponRepository},
        money::Amount,
        repository::RepositoryError,
    };

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap_or_default()
    }

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    #[tokio::test]
    async fn loads_each_code_once() -> TestResult {
        let mut repository = MockCouponRepository::new();

        repository
            .expect_coupon_by_code()
            .withf(|code| code == "TEN")
            .once()
            .returning(|code| Ok(Coupon::new(code, CouponKind::Order, amount("10%"))));

        let codes = vec!["TEN".to_string(), " TEN ".to_string(), String::new()];
        let coupons = CouponSet::load(&repository, &codes, now()).await?;

        assert_eq!(coupons.len(), 1, "expected a single coupon");

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_aborts() {
        let mut repository = MockCouponRepository::new();

        repository
            .expect_coupon_by_code()
            .returning(|code| Err(RepositoryError::not_found("coupon", code)));

        let result = CouponSet::load(&repository, &["NOPE".to_string()], now()).await;

        assert!(
            matches!(result, Err(CheckoutError::NotFound { entity: "coupon", .. })),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn inactive_coupons_are_dropped() -> TestResult {
        let mut repository = MockCouponRepository::new();

        repository.expect_coupon_by_code().returning(|code| {
            let mut coupon = Coupon::new(code, CouponKind::Order, amount("10%"));

            coupon.end = Some(now() - SignedDuration::from_hours(1));

            Ok(coupon)
        });

        let coupons = CouponSet::load(&repository, &["OLD".to_string()], now()).await?;

        assert!(coupons.is_empty(), "expected the expired coupon to be dropped");

        Ok(())
    }

    #[test]
    fn order_coupon_discounts_every_item() {
        let coupons = CouponSet::new([Coupon::new("TEN", CouponKind::Order, amount("10%"))], now());
        let mut items = [item(dec("100"), 1), item(dec("40"), 2)];

        coupons.apply_to_items(&mut items);

        let [first, second] = &items;

        assert_eq!(first.discount, dec("10"), "expected 10% of 100");
        assert_eq!(first.total(), dec("90"), "expected 90, got {}", first.total());
        assert_eq!(second.discount, dec("4"), "expected 10% of 40");
        assert_eq!(second.total(), dec("72"), "expected 72, got {}", second.total());
    }

    #[test]
    fn fixed_coupon_is_capped_to_price() {
        let coupons = CouponSet::new([Coupon::new("FIFTY", CouponKind::Order, amount("50"))], now());
        let mut items = [item(dec("30"), 1)];

        coupons.apply_to_items(&mut items);

        let [only] = &items;

        assert_eq!(only.discount, dec("30"), "expected the discount capped to 30");
        assert_eq!(only.total(), Decimal::ZERO, "expected a free item");
    }

    #[test]
    fn item_coupon_respects_scope() {
        let mut coupon = Coupon::new("SHOES", CouponKind::Item, amount("5"));

        coupon.apply_to = ApplyTo::Categories;
        coupon.categories = vec![2];

        let coupons = CouponSet::new([coupon], now());
        let mut in_scope = item(dec("20"), 1);
        let mut out_of_scope = item(dec("20"), 1);

        in_scope.category_id = 2;
        out_of_scope.category_id = 3;

        let mut items = [in_scope, out_of_scope];

        coupons.apply_to_items(&mut items);

        let [matched, skipped] = &items;

        assert_eq!(matched.discount, dec("5"), "expected 5 off the matched item");
        assert_eq!(matched.coupons.len(), 1, "expected one applied coupon");
        assert_eq!(skipped.discount, Decimal::ZERO, "expected no discount");
        assert!(skipped.coupons.is_empty(), "expected no applied coupon");
    }

    #[test]
    fn shipment_coupons_leave_items_alone() {
        let coupons = CouponSet::new([Coupon::new("SHIP", CouponKind::Shipment, amount("100%"))], now());
        let mut items = [item(dec("20"), 1)];

        coupons.apply_to_items(&mut items);

        let [only] = &items;

        assert_eq!(only.discount, Decimal::ZERO, "expected items untouched");
        assert_eq!(
            coupons.apply_to_delivery(dec("4.95")).amount,
            dec("4.95"),
            "expected the whole fee discounted"
        );
    }

    #[test]
    fn shipment_discounts_are_capped_to_fee() {
        let coupons = CouponSet::new(
            [
                Coupon::new("THREE", CouponKind::Shipment, amount("3")),
                Coupon::new("FOUR", CouponKind::Shipment, amount("4")),
            ],
            now(),
        );

        let discount = coupons.apply_to_delivery(dec("5"));

        assert_eq!(discount.amount, dec("5"), "expected the fee capped to 5");
        assert_eq!(
            discount.coupons.get(1).map(|c| c.discount),
            Some(dec("2")),
            "expected the second coupon to get the remaining 2, got {discount:?}"
        );
    }

    #[test]
    fn stacked_percentages_share_the_undiscounted_price() {
        let coupons = CouponSet::new(
            [
                Coupon::new("ITEM10", CouponKind::Item, amount("10%")),
                Coupon::new("ORDER10", CouponKind::Order, amount("10%")),
            ],
            now(),
        );
        let mut items = [item(dec("100"), 1)];

        coupons.apply_to_items(&mut items);

        let [only] = &items;
        let granted: Vec<Decimal> = only.coupons.iter().map(|c| c.discount).collect();

        assert_eq!(granted, [dec("10"), dec("10")], "expected 10% of 100 each, got {granted:?}");
        assert_eq!(only.discount, dec("20"), "expected 20, got {}", only.discount);
        assert_eq!(only.total(), dec("80"), "expected 80, got {}", only.total());
    }

    #[test]
    fn percentage_after_fixed_is_taken_of_the_price() {
        let coupons = CouponSet::new(
            [
                Coupon::new("FIVE", CouponKind::Item, amount("5")),
                Coupon::new("QUARTER", CouponKind::Order, amount("25%")),
            ],
            now(),
        );
        let mut items = [item(dec("40"), 2)];

        coupons.apply_to_items(&mut items);

        let [only] = &items;
        let granted: Vec<Decimal> = only.coupons.iter().map(|c| c.discount).collect();

        assert_eq!(granted, [dec("5"), dec("10")], "expected 5 and 25% of 40, got {granted:?}");
        assert_eq!(only.line_discount(), dec("30"), "expected 30, got {}", only.line_discount());
    }

    #[test]
    fn stacked_percentages_are_capped_to_the_remaining_price() {
        let coupons = CouponSet::new(
            [
                Coupon::new("SIXTY", CouponKind::Item, amount("60%")),
                Coupon::new("FIFTY", CouponKind::Order, amount("50%")),
            ],
            now(),
        );
        let mut items = [item(dec("10"), 1)];

        coupons.apply_to_items(&mut items);

        let [only] = &items;
        let granted: Vec<Decimal> = only.coupons.iter().map(|c| c.discount).collect();

        assert_eq!(granted, [dec("6"), dec("4")], "expected the second grant capped, got {granted:?}");
        assert_eq!(only.total(), Decimal::ZERO, "expected a free item, got {}", only.total());
    }

    #[test]
    fn stacked_shipment_percentages_share_the_full_fee() {
        let coupons = CouponSet::new(
            [
                Coupon::new("SHIP10", CouponKind::Shipment, amount("10%")),
                Coupon::new("SHIP20", CouponKind::Shipment, amount("20%")),
            ],
            now(),
        );

        let discount = coupons.apply_to_delivery(dec("50"));
        let granted: Vec<Decimal> = discount.coupons.iter().map(|c| c.discount).collect();

        assert_eq!(granted, [dec("5"), dec("10")], "expected shares of 50, got {granted:?}");
        assert_eq!(discount.amount, dec("15"), "expected 15, got {}", discount.amount);
    }

    #[test]
    fn shipment_percentage_after_fixed_uses_the_full_fee() {
        let coupons = CouponSet::new(
            [
                Coupon::new("SHIP8", CouponKind::Shipment, amount("8")),
                Coupon::new("SHIPHALF", CouponKind::Shipment, amount("50%")),
            ],
            now(),
        );

        let discount = coupons.apply_to_delivery(dec("10"));
        let granted: Vec<Decimal> = discount.coupons.iter().map(|c| c.discount).collect();

        assert_eq!(granted, [dec("8"), dec("2")], "expected the half capped to 2, got {granted:?}");
        assert_eq!(discount.amount, dec("10"), "expected the whole fee, got {}", discount.amount);
    }

    #[test]
    fn shipment_pass_without_coupons_is_zero() {
        let discount = CouponSet::default().apply_to_delivery(dec("9.90"));

        assert_eq!(discount, ShipmentDiscount::default(), "expected no discount");
    }
}
