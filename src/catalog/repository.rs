//! Catalog Repository

use async_trait::async_trait;
use mockall::automock;

use crate::{
    catalog::models::{
        Breadcrumb, CatalogEntity, CategoryId, Product, ProductId, PropertyPrice, PropertyPriceId,
        Variation, VariationId,
    },
    repository::RepositoryError,
};

/// Read-only access to products, variations and option surcharges.
#[automock]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Retrieve a single product.
    async fn product(&self, id: ProductId) -> Result<Product, RepositoryError>;

    /// Retrieve a single variation.
    async fn variation(&self, id: VariationId) -> Result<Variation, RepositoryError>;

    /// Retrieve the surcharge of one option value.
    async fn property_price(&self, id: PropertyPriceId) -> Result<PropertyPrice, RepositoryError>;

    /// Category path from the root down to `category`.
    async fn breadcrumbs(&self, category: CategoryId) -> Result<Vec<Breadcrumb>, RepositoryError>;

    /// Cached thumbnail URL for a product or variation, if any.
    async fn thumbnail(&self, entity: CatalogEntity) -> Result<Option<String>, RepositoryError>;
}
