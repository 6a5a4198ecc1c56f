//! Orders

use jiff::Timestamp;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    checkout::{totals::Totals, views::OrderShortView},
    payments::PaymentMethodId,
    profiles::Contact,
    shipping::models::TransportId,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Id of the authenticated customer placing an order.
pub type UserId = Uuid;

/// A priced order, immutable once created.
///
/// Profile fields are copied in so the order keeps what the customer saw at
/// checkout time.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    uuid: OrderUuid,
    user: Option<UserId>,
    created_at: Timestamp,
    currency: String,
    totals: Totals,
    comment: Option<String>,
    billing: Option<Contact>,
    vat_id: Option<String>,
    shipping: Option<Contact>,
    transport: Option<TransportId>,
    payment: Option<PaymentMethodId>,
    payment_suffix: Option<String>,
    coupons: Vec<String>,
    description: String,
}

impl Order {
    /// Creates an order from its view, which becomes the stored description.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be serialized.
    pub fn from_view(view: &OrderShortView, created_at: Timestamp) -> Result<Self, serde_json::Error> {
        let description = serde_json::to_string(view)?;

        let mut coupons: Vec<String> = Vec::new();
        let applied = view
            .items
            .iter()
            .flat_map(|item| item.coupons.iter())
            .chain(view.shipping.iter().flat_map(|shipping| shipping.coupons.iter()));

        for coupon in applied {
            if !coupons.contains(&coupon.code) {
                coupons.push(coupon.code.clone());
            }
        }

        Ok(Self {
            uuid: view.uuid,
            user: None,
            created_at,
            currency: view.currency.clone(),
            totals: view.totals,
            comment: view.comment.clone(),
            billing: view.billing.as_ref().and_then(|b| b.profile.clone()),
            vat_id: view.billing.as_ref().and_then(|b| b.vat_id.clone()),
            shipping: view.shipping.as_ref().and_then(|s| s.profile.clone()),
            transport: view.shipping.as_ref().map(|s| s.transport),
            payment: view.billing.as_ref().map(|b| b.method.id),
            payment_suffix: view.billing.as_ref().and_then(|b| b.suffix.clone()),
            coupons,
            description,
        })
    }

    /// Attaches the customer placing the order.
    #[must_use]
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Order id.
    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    /// Customer, once placed.
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// ISO currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Aggregated figures.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Amount due.
    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    /// Customer comment.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Billing snapshot.
    pub fn billing(&self) -> Option<&Contact> {
        self.billing.as_ref()
    }

    /// VAT identification number of the billing profile.
    pub fn vat_id(&self) -> Option<&str> {
        self.vat_id.as_deref()
    }

    /// Shipping snapshot.
    pub fn shipping(&self) -> Option<&Contact> {
        self.shipping.as_ref()
    }

    /// Chosen transport.
    pub fn transport(&self) -> Option<TransportId> {
        self.transport
    }

    /// Chosen payment method.
    pub fn payment(&self) -> Option<PaymentMethodId> {
        self.payment
    }

    /// Free-text suffix of the chosen payment method.
    pub fn payment_suffix(&self) -> Option<&str> {
        self.payment_suffix.as_deref()
    }

    /// Codes of the coupons that were applied, in order of first use.
    pub fn coupons(&self) -> &[String] {
        &self.coupons
    }

    /// Serialized view, as stored.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parses the stored description back into a view.
    ///
    /// # Errors
    ///
    /// Returns an error if the description is not a valid view.
    pub fn view(&self) -> Result<OrderShortView, serde_json::Error> {
        serde_json::from_str(&self.description)
    }
}
