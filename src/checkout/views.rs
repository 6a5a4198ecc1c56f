//! Order views
//!
//! Read-only projections returned to clients and stored as the order
//! description.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{
        item::{ResolvedItem, Surcharge},
        models::{ProductId, VariationId},
    },
    checkout::{order::OrderUuid, totals::Totals},
    coupons::models::AppliedCoupon,
    payments::{PaymentMethodConfig, PaymentMethodId},
    profiles::Contact,
    shipping::{
        fees::{FeeBreakdown, ShippingQuote, ShippingSelection},
        models::{Service, TransportId, Zone, ZoneId},
    },
};

/// Priced order as shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderShortView {
    /// Order id.
    pub uuid: OrderUuid,

    /// ISO code of the store currency.
    pub currency: String,

    /// Chosen payment method, when one was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingView>,

    /// Priced items.
    pub items: Vec<ItemView>,

    /// Order totals.
    #[serde(flatten)]
    pub totals: Totals,

    /// Delivery options, when no transport was chosen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<ShippingQuote>,

    /// Chosen delivery, when a transport was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingView>,

    /// Payment methods on offer, when none was selected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<PaymentMethodView>,

    /// Customer comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One priced order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    /// Cart token of the line.
    pub uuid: String,

    /// Product id.
    pub product: ProductId,

    /// Variation id, `0` for default pricing.
    pub variation: VariationId,

    /// Product title.
    pub title: String,

    /// Variation title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_title: Option<String>,

    /// Category path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Selected options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyView>,

    /// Applied coupons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coupons: Vec<CouponView>,

    /// Unit price.
    pub price: Decimal,

    /// Discount per unit.
    pub discount: Decimal,

    /// Quantity.
    pub quantity: u32,

    /// VAT rate.
    pub vat: Decimal,

    /// Line total.
    pub total: Decimal,

    /// Volume per unit.
    pub volume: Decimal,

    /// Weight per unit.
    pub weight: Decimal,
}

impl From<&ResolvedItem> for ItemView {
    fn from(item: &ResolvedItem) -> Self {
        Self {
            uuid: item.uuid.clone(),
            product: item.product_id,
            variation: item.variation_id,
            title: item.title.clone(),
            variation_title: item.variation_title.clone(),
            path: item.path.clone(),
            thumbnail: item.thumbnail.clone(),
            properties: item.properties.iter().map(PropertyView::from).collect(),
            coupons: item.coupons.iter().map(CouponView::from).collect(),
            price: item.price,
            discount: item.discount,
            quantity: item.quantity,
            vat: item.vat,
            total: item.total(),
            volume: item.volume,
            weight: item.weight,
        }
    }
}

/// A selected option of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyView {
    /// Property title.
    pub property: String,

    /// Selected value.
    pub value: String,

    /// Surcharge per unit.
    pub price: Decimal,
}

impl From<&Surcharge> for PropertyView {
    fn from(surcharge: &Surcharge) -> Self {
        Self {
            property: surcharge.property.clone(),
            value: surcharge.value.clone(),
            price: surcharge.price,
        }
    }
}

/// An applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponView {
    /// Coupon code.
    pub code: String,

    /// Coupon title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Coupon description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Configured amount, as stored (`10%`, `5`).
    pub amount: String,

    /// Discount granted.
    pub discount: Decimal,
}

impl From<&AppliedCoupon> for CouponView {
    fn from(coupon: &AppliedCoupon) -> Self {
        Self {
            code: coupon.code.clone(),
            title: coupon.title.clone(),
            description: coupon.description.clone(),
            amount: coupon.amount.to_string(),
            discount: coupon.discount,
        }
    }
}

/// The chosen delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingView {
    /// Transport id.
    pub transport: TransportId,

    /// Transport name.
    pub name: String,

    /// Transport title.
    pub title: String,

    /// Destination zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneView>,

    /// Fee before extras.
    #[serde(flatten)]
    pub fee: FeeBreakdown,

    /// Selected extras.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,

    /// Fee plus extras.
    pub delivery: Decimal,

    /// Shipment coupon discount.
    pub discount: Decimal,

    /// Applied shipment coupons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coupons: Vec<CouponView>,

    /// Destination snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Contact>,
}

impl From<&ShippingSelection> for ShippingView {
    fn from(selection: &ShippingSelection) -> Self {
        Self {
            transport: selection.transport.id,
            name: selection.transport.name.clone(),
            title: selection.transport.title.clone(),
            zone: selection.zone.as_ref().map(ZoneView::from),
            fee: selection.fee,
            services: selection.services.clone(),
            delivery: selection.delivery,
            discount: selection.discount.amount,
            coupons: selection.discount.coupons.iter().map(CouponView::from).collect(),
            profile: selection.contact.clone(),
        }
    }
}

/// Destination zone of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneView {
    /// Zone id.
    pub id: ZoneId,

    /// Zone title.
    pub title: String,
}

impl From<&Zone> for ZoneView {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            title: zone.title.clone(),
        }
    }
}

/// The chosen payment method with its invoice details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingView {
    /// Payment method.
    #[serde(flatten)]
    pub method: PaymentMethodView,

    /// Free-text suffix of the requested method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Rendered payment instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Billing snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Contact>,

    /// VAT identification number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_id: Option<String>,
}

/// A payment method as offered to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodView {
    /// Method id.
    pub id: PaymentMethodId,

    /// Method name.
    pub name: String,

    /// Method title.
    pub title: String,
}

impl From<&PaymentMethodConfig> for PaymentMethodView {
    fn from(method: &PaymentMethodConfig) -> Self {
        Self {
            id: method.id,
            name: method.name.clone(),
            title: method.title.clone(),
        }
    }
}
