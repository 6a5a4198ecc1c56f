//! Checkout requests

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::models::CategoryId, payments::PaymentMethodId, profiles::ProfileId,
    shipping::models::TransportId,
};

/// Errors raised while parsing a [`CartLine`] from its short form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartLineError {
    /// The line has no token.
    #[error("cart line has no token")]
    MissingToken,

    /// The category is not a number.
    #[error("invalid category in cart line: {0}")]
    InvalidCategory(String),

    /// The quantity is not a number.
    #[error("invalid quantity in cart line: {0}")]
    InvalidQuantity(String),
}

/// One cart line: what was ordered, from where and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Encoded cart item token.
    pub token: String,

    /// Category the item was added from; `0` when unknown.
    #[serde(default)]
    pub category: CategoryId,

    /// Ordered quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartLine {
    /// Creates a line of one item without a category.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            category: 0,
            quantity: default_quantity(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = category;
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub fn times(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Parses `TOKEN[@CATEGORY][:QUANTITY]`.
impl FromStr for CartLine {
    type Err = CartLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, quantity) = match s.trim().rsplit_once(':') {
            Some((rest, quantity)) => (
                rest,
                quantity
                    .trim()
                    .parse()
                    .map_err(|_err| CartLineError::InvalidQuantity(quantity.to_string()))?,
            ),
            None => (s.trim(), default_quantity()),
        };

        let (token, category) = match rest.split_once('@') {
            Some((token, category)) => (
                token,
                category
                    .trim()
                    .parse()
                    .map_err(|_err| CartLineError::InvalidCategory(category.to_string()))?,
            ),
            None => (rest, 0),
        };

        let token = token.trim();

        if token.is_empty() {
            return Err(CartLineError::MissingToken);
        }

        Ok(CartLine::new(token).in_category(category).times(quantity))
    }
}

/// Everything a client sends to price or place an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutRequest {
    /// Cart lines.
    pub items: Vec<CartLine>,

    /// Free-text customer comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Billing profile to invoice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_profile: Option<ProfileId>,

    /// Shipping profile to deliver to; decides zone and VAT treatment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_profile: Option<ProfileId>,

    /// Chosen transport; without one, delivery options are quoted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportId>,

    /// Names of the selected transport extras.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,

    /// Chosen payment method id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentMethodId>,

    /// Chosen payment method string, `<name>[-|:<suffix>]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Coupon codes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coupons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_short_cart_lines() -> TestResult {
        assert_eq!("WzEsMF0".parse::<CartLine>()?, CartLine::new("WzEsMF0"));
        assert_eq!(
            "WzEsMF0@7:3".parse::<CartLine>()?,
            CartLine::new("WzEsMF0").in_category(7).times(3)
        );
        assert_eq!(
            "WzEsMF0:2".parse::<CartLine>()?,
            CartLine::new("WzEsMF0").times(2)
        );

        Ok(())
    }

    #[test]
    fn rejects_malformed_cart_lines() {
        assert_eq!(
            "WzEsMF0@shoes".parse::<CartLine>(),
            Err(CartLineError::InvalidCategory("shoes".to_string()))
        );
        assert_eq!(
            "WzEsMF0:many".parse::<CartLine>(),
            Err(CartLineError::InvalidQuantity("many".to_string()))
        );
        assert_eq!("@3".parse::<CartLine>(), Err(CartLineError::MissingToken));
    }

    #[test]
    fn request_deserializes_with_defaults() -> TestResult {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"items":[{"token":"WzEsMF0"}],"coupons":["TEN"],"payment_method":"mollie"}"#,
        )?;

        assert_eq!(request.items, [CartLine::new("WzEsMF0")]);
        assert_eq!(request.coupons, ["TEN"]);
        assert_eq!(request.payment_method.as_deref(), Some("mollie"));
        assert_eq!(request.transport, None);

        Ok(())
    }
}
