//! Checkout errors.

use rusty_money::MoneyError;
use thiserror::Error;

use crate::{
    catalog::models::{ProductId, PropertyPriceId, VariationId},
    repository::RepositoryError,
};

/// Failure of a checkout computation. Every variant aborts the whole
/// computation; no partial order is produced.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A referenced product, variation, profile, coupon or transport is absent.
    #[error("{entity} {key} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,

        /// Lookup key.
        key: String,
    },

    /// The variation belongs to another product.
    #[error("variation {variation} does not belong to product {product}")]
    Mismatch {
        /// Product referenced by the cart token.
        product: ProductId,

        /// Variation referenced by the cart token.
        variation: VariationId,
    },

    /// A selected option surcharge could not be loaded.
    #[error("failed to look up property price {id}")]
    LookupFailure {
        /// Property price id.
        id: PropertyPriceId,

        /// Underlying lookup error.
        #[source]
        source: RepositoryError,
    },

    /// A collaborator failed.
    #[error("repository error")]
    Repository(#[source] RepositoryError),

    /// The configured store currency is unusable.
    #[error(transparent)]
    Currency(#[from] MoneyError),

    /// The order view could not be serialized.
    #[error("failed to serialize order description")]
    Description(#[source] serde_json::Error),
}

impl CheckoutError {
    /// Shorthand for [`CheckoutError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<RepositoryError> for CheckoutError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { entity, key } => Self::NotFound { entity, key },
            RepositoryError::Backend(_) => Self::Repository(error),
        }
    }
}
