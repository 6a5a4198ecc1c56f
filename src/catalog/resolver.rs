//! Catalog resolution
//!
//! Turns a decoded cart token into a priced [`ResolvedItem`]: product or
//! variation pricing, time-boxed sale price, tax adjustment and option
//! surcharges.

use jiff::Timestamp;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    catalog::{
        item::{ResolvedItem, Surcharge},
        models::{CatalogEntity, CategoryId, Pricing, ProductId},
        repository::CatalogRepository,
        token::CartItemToken,
    },
    errors::CheckoutError,
    money::round,
    repository::optional,
    tax::TaxContext,
};

/// Resolves cart tokens against the catalog at a fixed point in time.
#[derive(Clone, Copy)]
pub struct CatalogResolver<'a> {
    catalog: &'a dyn CatalogRepository,
    tax: TaxContext,
    now: Timestamp,
}

impl std::fmt::Debug for CatalogResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogResolver")
            .field("tax", &self.tax)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl<'a> CatalogResolver<'a> {
    /// Creates a resolver pricing with `tax` at `now`.
    pub fn new(catalog: &'a dyn CatalogRepository, tax: TaxContext, now: Timestamp) -> Self {
        Self { catalog, tax, now }
    }

    /// Resolves and prices one cart line.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotFound`] if the product or variation is absent.
    /// - [`CheckoutError::Mismatch`] if the variation belongs to another product.
    /// - [`CheckoutError::LookupFailure`] if any surcharge cannot be loaded.
    /// - [`CheckoutError::Repository`] if a display lookup fails.
    pub async fn resolve(
        &self,
        uuid: &str,
        token: &CartItemToken,
        category: CategoryId,
        quantity: u32,
    ) -> Result<ResolvedItem, CheckoutError> {
        let product = self.catalog.product(token.product).await?;

        let (pricing, variation_title, thumbnail_entity) = if token.is_default_variation() {
            (product.pricing.clone(), None, CatalogEntity::Product(product.id))
        } else {
            let variation = self.catalog.variation(token.variation).await?;

            if variation.product_id != product.id {
                return Err(CheckoutError::Mismatch {
                    product: product.id,
                    variation: variation.id,
                });
            }

            (
                variation.pricing,
                Some(variation.title),
                CatalogEntity::Variation(variation.id),
            )
        };

        let properties = self.surcharges(token).await?;
        let surcharge_total: Decimal = properties.iter().map(|s| s.price).sum();

        let price = round(self.tax.apply(pricing.unit_price(self.now)) + surcharge_total);

        debug!(
            product = product.id,
            variation = token.variation,
            %price,
            on_sale = pricing.on_sale(self.now),
            "resolved cart item"
        );

        Ok(ResolvedItem {
            uuid: uuid.to_string(),
            product_id: product.id,
            variation_id: token.variation,
            category_id: category,
            title: product.title,
            variation_title,
            path: self.path(category).await?,
            thumbnail: self.thumbnail(thumbnail_entity, product.id).await?,
            base_price: round(self.tax.apply(pricing.base_price)),
            sale_price: self.sale_price(&pricing),
            properties,
            price,
            coupons: SmallVec::new(),
            discount: Decimal::ZERO,
            quantity,
            vat: self.tax.vat,
            volume: pricing.volume(),
            weight: pricing.weight,
        })
    }

    fn sale_price(&self, pricing: &Pricing) -> Option<Decimal> {
        pricing
            .on_sale(self.now)
            .then(|| round(self.tax.apply(pricing.sale_price)))
    }

    async fn surcharges(
        &self,
        token: &CartItemToken,
    ) -> Result<SmallVec<[Surcharge; 4]>, CheckoutError> {
        let mut surcharges = SmallVec::with_capacity(token.properties.len());

        for &id in &token.properties {
            let property = self
                .catalog
                .property_price(id)
                .await
                .map_err(|source| CheckoutError::LookupFailure { id, source })?;

            surcharges.push(Surcharge {
                id,
                property: property.property,
                value: property.value,
                price: round(self.tax.apply(property.price)),
            });
        }

        Ok(surcharges)
    }

    async fn path(&self, category: CategoryId) -> Result<String, CheckoutError> {
        if category == 0 {
            return Ok(String::new());
        }

        let crumbs = optional(self.catalog.breadcrumbs(category).await)?.unwrap_or_default();

        Ok(crumbs.iter().fold(String::new(), |mut path, crumb| {
            path.push('/');
            path.push_str(&crumb.name);
            path
        }))
    }

    async fn thumbnail(
        &self,
        entity: CatalogEntity,
        product: ProductId,
    ) -> Result<Option<String>, CheckoutError> {
        if let Some(url) = optional(self.catalog.thumbnail(entity).await)?.flatten() {
            return Ok(Some(url));
        }

        if matches!(entity, CatalogEntity::Variation(_)) {
            let fallback = CatalogEntity::Product(product);

            return Ok(optional(self.catalog.thumbnail(fallback).await)?.flatten());
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::SignedDuration;
    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::{
        catalog::{
            models::{Breadcrumb, Product, PropertyPrice, Variation},
            repository::MockCatalogRepository,
        },
        config::StoreConfig,
        repository::RepositoryError,
    };

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn product(id: u64, price: &str) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            pricing: Pricing {
                weight: dec("2"),
                width: dec("10"),
                height: dec("10"),
                depth: dec("10"),
                ..Pricing::new(dec(price))
            },
        }
    }

    fn catalog_without_display_data() -> MockCatalogRepository {
        let mut catalog = MockCatalogRepository::new();

        catalog
            .expect_breadcrumbs()
            .returning(|category| Err(RepositoryError::not_found("category", category)));
        catalog.expect_thumbnail().returning(|_| Ok(None));

        catalog
    }

    fn domestic() -> TaxContext {
        TaxContext::domestic(&StoreConfig::new(dec("20"), "DE", "EUR"))
    }

    #[tokio::test]
    async fn resolves_default_variation_from_product() -> TestResult {
        let mut catalog = catalog_without_display_data();

        catalog
            .expect_product()
            .with(eq(1))
            .return_once(|id| Ok(product(id, "100")));
        catalog.expect_variation().never();

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let item = resolver.resolve("t", &CartItemToken::new(1), 5, 2).await?;

        assert_eq!(item.price, dec("100"));
        assert_eq!(item.vat, dec("20"));
        assert_eq!(item.volume, dec("0.001"));
        assert_eq!(item.weight, dec("2"));
        assert_eq!(item.total(), dec("200"));
        assert_eq!(item.category_id, 5);
        assert!(item.variation_title.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn uses_variation_pricing_and_sale() -> TestResult {
        let mut catalog = catalog_without_display_data();

        catalog
            .expect_product()
            .return_once(|id| Ok(product(id, "100")));
        catalog.expect_variation().with(eq(4)).return_once(|id| {
            Ok(Variation {
                id,
                product_id: 1,
                title: "Large".to_string(),
                pricing: Pricing {
                    sale_price: dec("60"),
                    sale_start: Some(now() - SignedDuration::from_hours(1)),
                    sale_end: Some(now() + SignedDuration::from_hours(1)),
                    ..Pricing::new(dec("120"))
                },
            })
        });

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let token = CartItemToken::new(1).with_variation(4);
        let item = resolver.resolve("t", &token, 0, 1).await?;

        assert_eq!(item.variation_title.as_deref(), Some("Large"));
        assert_eq!(item.base_price, dec("120"));
        assert_eq!(item.sale_price, Some(dec("60")));
        assert_eq!(item.price, dec("60"));

        Ok(())
    }

    #[tokio::test]
    async fn rejects_variation_of_other_product() {
        let mut catalog = catalog_without_display_data();

        catalog
            .expect_product()
            .return_once(|id| Ok(product(id, "100")));
        catalog.expect_variation().return_once(|id| {
            Ok(Variation {
                id,
                product_id: 99,
                title: "Other".to_string(),
                pricing: Pricing::new(dec("1")),
            })
        });

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let token = CartItemToken::new(1).with_variation(4);
        let result = resolver.resolve("t", &token, 0, 1).await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::Mismatch {
                    product: 1,
                    variation: 4
                })
            ),
            "expected Mismatch, got {result:?}"
        );
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let mut catalog = MockCatalogRepository::new();

        catalog
            .expect_product()
            .return_once(|id| Err(RepositoryError::not_found("product", id)));

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let result = resolver.resolve("t", &CartItemToken::new(8), 0, 1).await;

        assert!(
            matches!(result, Err(CheckoutError::NotFound { entity: "product", .. })),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn surcharges_are_tax_adjusted_and_added() -> TestResult {
        let mut catalog = catalog_without_display_data();

        catalog
            .expect_product()
            .return_once(|id| Ok(product(id, "100")));
        catalog.expect_property_price().returning(|id| {
            Ok(PropertyPrice {
                id,
                property: "Colour".to_string(),
                value: "Red".to_string(),
                price: dec("10"),
            })
        });

        let config = StoreConfig::new(dec("20"), "DE", "EUR");
        let tax = TaxContext::resolve(&config, Some("FR"));
        let resolver = CatalogResolver::new(&catalog, tax, now());
        let token = CartItemToken::new(1).with_property(3).with_property(5);
        let item = resolver.resolve("t", &token, 0, 1).await?;

        assert_eq!(item.properties.len(), 2);
        assert_eq!(item.properties.first().map(|s| s.price), Some(dec("8")));
        assert_eq!(item.price, dec("96"));
        assert_eq!(item.vat, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn surcharge_lookup_failure_aborts() {
        let mut catalog = catalog_without_display_data();

        catalog
            .expect_product()
            .return_once(|id| Ok(product(id, "100")));
        catalog
            .expect_property_price()
            .return_once(|id| Err(RepositoryError::not_found("property price", id)));

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let token = CartItemToken::new(1).with_property(3);
        let result = resolver.resolve("t", &token, 0, 1).await;

        assert!(
            matches!(result, Err(CheckoutError::LookupFailure { id: 3, .. })),
            "expected LookupFailure, got {result:?}"
        );
    }

    #[tokio::test]
    async fn builds_path_and_falls_back_to_product_thumbnail() -> TestResult {
        let mut catalog = MockCatalogRepository::new();

        catalog
            .expect_product()
            .return_once(|id| Ok(product(id, "100")));
        catalog.expect_variation().return_once(|id| {
            Ok(Variation {
                id,
                product_id: 1,
                title: "Blue".to_string(),
                pricing: Pricing::new(dec("100")),
            })
        });
        catalog.expect_breadcrumbs().with(eq(7)).return_once(|_| {
            Ok(vec![
                Breadcrumb {
                    id: 2,
                    name: "shoes".to_string(),
                    title: "Shoes".to_string(),
                },
                Breadcrumb {
                    id: 7,
                    name: "running".to_string(),
                    title: "Running".to_string(),
                },
            ])
        });
        catalog.expect_thumbnail().returning(|entity| match entity {
            CatalogEntity::Product(_) => Ok(Some("/thumbs/product.jpg".to_string())),
            CatalogEntity::Variation(_) => Ok(None),
        });

        let resolver = CatalogResolver::new(&catalog, domestic(), now());
        let token = CartItemToken::new(1).with_variation(2);
        let item = resolver.resolve("t", &token, 7, 1).await?;

        assert_eq!(item.path, "/shoes/running");
        assert_eq!(item.thumbnail.as_deref(), Some("/thumbs/product.jpg"));

        Ok(())
    }
}
