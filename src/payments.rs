//! Payment methods
//!
//! Methods are configured in the store config. Ids `1..=4` are the built-in
//! providers; stores may add their own with higher ids.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{config::StoreConfig, money};

/// Payment method id
pub type PaymentMethodId = u32;

/// Placeholder replaced by the formatted order total.
pub const TOTAL_PLACEHOLDER: &str = "{total}";

/// Placeholder replaced by the store currency code.
pub const CURRENCY_PLACEHOLDER: &str = "{currency}";

/// Placeholder replaced by the order id.
pub const ORDER_PLACEHOLDER: &str = "{order}";

/// Configuration of one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    /// Method id.
    pub id: PaymentMethodId,

    /// Lookup name, matched against the requested method string.
    pub name: String,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Only enabled methods are offered.
    #[serde(default)]
    pub enabled: bool,

    /// Instructions shown with the order, e.g. bank details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl PaymentMethodConfig {
    /// Creates a disabled method without a template.
    pub fn new(id: PaymentMethodId, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: title.into(),
            enabled: false,
            template: None,
        }
    }

    /// The built-in providers, all disabled.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(1, "stripe", "Stripe"),
            Self::new(2, "mollie", "Mollie"),
            Self::new(3, "advance-payment", "Advance payment"),
            Self::new(4, "on-delivery", "Cash on delivery"),
        ]
    }

    /// Matches a requested method string: `<name>`, `<name>-<suffix>` or
    /// `<name>:<suffix>`.
    ///
    /// Returns the suffix (empty for an exact match) if it matches.
    pub fn matches<'a>(&self, method: &'a str) -> Option<&'a str> {
        let rest = method.strip_prefix(self.name.as_str())?;

        if rest.is_empty() {
            return Some(rest);
        }

        rest.strip_prefix('-').or_else(|| rest.strip_prefix(':'))
    }
}

/// The enabled payment methods of `config`, sorted by id.
pub fn available(config: &StoreConfig) -> Vec<&PaymentMethodConfig> {
    let mut methods: Vec<_> = config.payment_methods.iter().filter(|m| m.enabled).collect();

    methods.sort_by_key(|m| m.id);

    methods
}

/// A chosen payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSelection {
    /// The chosen method.
    pub method: PaymentMethodConfig,

    /// Free-text suffix of the requested method string, e.g. a bank code.
    pub suffix: Option<String>,
}

impl PaymentSelection {
    /// Picks an enabled method by id, or else by method string.
    ///
    /// When both are given the id wins, and the method string only supplies
    /// the suffix if it names the same method. When several names match a
    /// method string, the longest name wins. Returns `None` if nothing
    /// enabled matches.
    pub fn choose(
        config: &StoreConfig,
        id: Option<PaymentMethodId>,
        method: Option<&str>,
    ) -> Option<Self> {
        let method = method.map(str::trim).filter(|m| !m.is_empty());
        let enabled = available(config);

        let chosen = match id {
            Some(id) => enabled.iter().copied().find(|m| m.id == id),
            None => method.and_then(|requested| {
                enabled
                    .iter()
                    .copied()
                    .filter(|m| m.matches(requested).is_some())
                    .max_by_key(|m| m.name.len())
            }),
        }?;

        let suffix = method
            .and_then(|requested| chosen.matches(requested))
            .filter(|suffix| !suffix.is_empty())
            .map(str::to_string);

        Some(Self {
            method: chosen.clone(),
            suffix,
        })
    }

    /// Renders the method's template for an order, if it has one.
    pub fn instructions(&self, total: Decimal, currency: &'static Currency, order: &str) -> Option<String> {
        self.method
            .template
            .as_deref()
            .map(|template| render(template, total, currency, order))
    }
}

/// Fills the `{total}`, `{currency}` and `{order}` placeholders.
pub fn render(template: &str, total: Decimal, currency: &'static Currency, order: &str) -> String {
    template
        .replace(TOTAL_PLACEHOLDER, &money::format(total, currency))
        .replace(CURRENCY_PLACEHOLDER, currency.iso_alpha_code)
        .replace(ORDER_PLACEHOLDER, order)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;

    use super::*;

    fn config() -> StoreConfig {
        StoreConfig::new(Decimal::from(20), "DE", "EUR")
            .with_payment_method_enabled(3, true)
            .with_payment_method_enabled(1, true)
    }

    #[test]
    fn lists_enabled_methods_by_id() {
        let ids: Vec<_> = available(&config()).iter().map(|m| m.id).collect();

        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn matches_name_with_optional_suffix() {
        let method = PaymentMethodConfig::new(3, "advance-payment", "");

        assert_eq!(method.matches("advance-payment"), Some(""));
        assert_eq!(method.matches("advance-payment-ING"), Some("ING"));
        assert_eq!(method.matches("advance-payment:ref 7"), Some("ref 7"));
        assert_eq!(method.matches("advance-paymentX"), None);
        assert_eq!(method.matches("stripe"), None);
    }

    #[test]
    fn chooses_by_method_string() {
        let selection = PaymentSelection::choose(&config(), None, Some("advance-payment:ING"));

        assert_eq!(
            selection.as_ref().map(|s| (s.method.id, s.suffix.as_deref())),
            Some((3, Some("ING"))),
            "expected advance payment with suffix, got {selection:?}"
        );
    }

    #[test]
    fn id_wins_over_method_string() {
        let selection = PaymentSelection::choose(&config(), Some(1), Some("advance-payment"));

        assert_eq!(
            selection.as_ref().map(|s| (s.method.id, s.suffix.as_deref())),
            Some((1, None)),
            "expected stripe, got {selection:?}"
        );
    }

    #[test]
    fn disabled_or_unknown_methods_are_not_chosen() {
        assert_eq!(PaymentSelection::choose(&config(), Some(2), None), None);
        assert_eq!(PaymentSelection::choose(&config(), None, Some("paypal")), None);
        assert_eq!(PaymentSelection::choose(&config(), None, Some("  ")), None);
        assert_eq!(PaymentSelection::choose(&config(), None, None), None);
    }

    #[test]
    fn renders_template_placeholders() {
        let rendered = render(
            "Transfer {total} ({currency}) quoting {order}",
            Decimal::new(905, 1),
            GBP,
            "0192",
        );

        assert_eq!(rendered, "Transfer £90.50 (GBP) quoting 0192");
    }
}
