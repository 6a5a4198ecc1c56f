//! Catalog Fixtures

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    catalog::{
        models::{
            Breadcrumb, CatalogEntity, CategoryId, Product, ProductId, PropertyPrice,
            PropertyPriceId, Variation, VariationId,
        },
        repository::CatalogRepository,
    },
    fixtures::Fixture,
    repository::RepositoryError,
};

/// Wrapper for catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products
    #[serde(default)]
    pub products: Vec<Product>,

    /// Variations
    #[serde(default)]
    pub variations: Vec<Variation>,

    /// Option surcharges
    #[serde(default)]
    pub property_prices: Vec<PropertyPrice>,

    /// Category tree
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,

    /// Cached thumbnails
    #[serde(default)]
    pub thumbnails: ThumbnailsFixture,
}

/// Category from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFixture {
    /// Category id
    pub id: CategoryId,

    /// URL segment
    pub name: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Parent category, `None` for a root
    #[serde(default)]
    pub parent: Option<CategoryId>,
}

/// Thumbnail URLs from YAML
#[derive(Debug, Default, Deserialize)]
pub struct ThumbnailsFixture {
    /// Product thumbnails by product id
    #[serde(default)]
    pub products: FxHashMap<ProductId, String>,

    /// Variation thumbnails by variation id
    #[serde(default)]
    pub variations: FxHashMap<VariationId, String>,
}

impl Fixture {
    /// Category path from the root down to `category`.
    fn category_path(&self, category: CategoryId) -> Result<Vec<Breadcrumb>, RepositoryError> {
        let mut path = Vec::new();
        let mut next = Some(category);

        while let Some(id) = next {
            // A parent cycle cannot be longer than the tree.
            if path.len() > self.categories.len() {
                return Err(RepositoryError::Backend(format!(
                    "category {category} has a cyclic parent chain"
                )));
            }

            let node = self
                .categories
                .get(&id)
                .ok_or_else(|| RepositoryError::not_found("category", id))?;

            path.push(Breadcrumb {
                id: node.id,
                name: node.name.clone(),
                title: node.title.clone(),
            });

            next = node.parent;
        }

        path.reverse();

        Ok(path)
    }
}

#[async_trait]
impl CatalogRepository for Fixture {
    async fn product(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("product", id))
    }

    async fn variation(&self, id: VariationId) -> Result<Variation, RepositoryError> {
        self.variations
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("variation", id))
    }

    async fn property_price(&self, id: PropertyPriceId) -> Result<PropertyPrice, RepositoryError> {
        self.property_prices
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("property price", id))
    }

    async fn breadcrumbs(&self, category: CategoryId) -> Result<Vec<Breadcrumb>, RepositoryError> {
        self.category_path(category)
    }

    async fn thumbnail(&self, entity: CatalogEntity) -> Result<Option<String>, RepositoryError> {
        Ok(self.thumbnails.get(&entity).cloned())
    }
}
