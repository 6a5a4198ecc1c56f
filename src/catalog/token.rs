//! Cart item tokens
//!
//! A cart line refers to the catalog through an opaque token: URL-safe base64
//! (unpadded) of a JSON array `[product, variation, property_price, ...]`.
//! Variation `0` selects the product's own pricing.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::models::{ProductId, PropertyPriceId, VariationId};

/// Reasons a token cannot be decoded.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not valid URL-safe base64.
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Not a JSON array of unsigned integers.
    #[error("token does not contain an id list: {0}")]
    Json(#[from] serde_json::Error),

    /// Fewer than the two mandatory ids.
    #[error("token holds {0} ids, at least 2 are required")]
    TooShort(usize),
}

/// Decoded cart item token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemToken {
    /// Product id.
    pub product: ProductId,

    /// Variation id, `0` for the product's default pricing.
    pub variation: VariationId,

    /// Selected property price ids, in order.
    pub properties: SmallVec<[PropertyPriceId; 4]>,
}

impl CartItemToken {
    /// Creates a token for a product's default variation.
    pub fn new(product: ProductId) -> Self {
        Self {
            product,
            variation: 0,
            properties: SmallVec::new(),
        }
    }

    /// Sets the variation.
    #[must_use]
    pub fn with_variation(mut self, variation: VariationId) -> Self {
        self.variation = variation;
        self
    }

    /// Adds a selected property price.
    #[must_use]
    pub fn with_property(mut self, property_price: PropertyPriceId) -> Self {
        self.properties.push(property_price);
        self
    }

    /// Whether the token selects the product's default pricing.
    pub fn is_default_variation(&self) -> bool {
        self.variation == 0
    }

    /// Decodes an encoded token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the token is not base64, not an id list,
    /// or holds fewer than two ids.
    pub fn decode(encoded: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim().trim_end_matches('='))?;
        let ids: Vec<u64> = serde_json::from_slice(&bytes)?;

        let [product, variation, properties @ ..] = ids.as_slice() else {
            return Err(TokenError::TooShort(ids.len()));
        };

        Ok(Self {
            product: *product,
            variation: *variation,
            properties: properties.iter().copied().collect(),
        })
    }

    /// Encodes the token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Json`] if the id list cannot be serialized.
    pub fn encode(&self) -> Result<String, TokenError> {
        let ids: SmallVec<[u64; 6]> = [self.product, self.variation]
            .into_iter()
            .chain(self.properties.iter().copied())
            .collect();

        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(ids.as_slice())?))
    }
}

impl FromStr for CartItemToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for CartItemToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode().map_err(|_err| fmt::Error)?)
    }
}
