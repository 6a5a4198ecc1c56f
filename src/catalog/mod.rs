//! Catalog

pub mod item;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod token;

pub use item::{ResolvedItem, Surcharge};
pub use repository::{CatalogRepository, MockCatalogRepository};
pub use resolver::CatalogResolver;
pub use token::{CartItemToken, TokenError};
