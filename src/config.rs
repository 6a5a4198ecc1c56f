//! Store configuration
//!
//! The read-only settings the checkout engine prices against: VAT rate,
//! merchant country, currency and the payment methods on offer.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::{MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{money, payments::PaymentMethodConfig};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The configured currency is not an ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// VAT outside of `0..100`.
    #[error("VAT rate must be within 0 and 100, got {0}")]
    InvalidVat(Decimal),
}

/// Store-wide checkout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// VAT rate in percent points (`20` for 20%).
    pub vat: Decimal,

    /// Merchant country as an ISO 3166 alpha-2 code.
    pub country: String,

    /// ISO 4217 code of the single store currency.
    pub currency: String,

    /// Payment methods on offer, enabled or not.
    #[serde(default = "PaymentMethodConfig::builtin")]
    pub payment_methods: Vec<PaymentMethodConfig>,

    /// Destination countries that keep VAT even when shipping abroad.
    #[serde(default)]
    pub vat_retained_countries: Vec<String>,
}

impl StoreConfig {
    /// Creates a config with the built-in payment methods, all disabled.
    pub fn new(vat: Decimal, country: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            vat,
            country: country.into(),
            currency: currency.into(),
            payment_methods: PaymentMethodConfig::builtin(),
            vat_retained_countries: Vec::new(),
        }
    }

    /// Loads and validates a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parses and validates a YAML config document.
    ///
    /// Built-in payment methods missing from the document are added disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, the currency is unknown or the
    /// VAT rate is out of range.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: StoreConfig = serde_norway::from_str(contents)?;

        for builtin in PaymentMethodConfig::builtin() {
            if !config.payment_methods.iter().any(|m| m.id == builtin.id) {
                config.payment_methods.push(builtin);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Checks the currency code and VAT range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] or [`ConfigError::InvalidVat`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.iso_currency()
            .map_err(|_err| ConfigError::UnknownCurrency(self.currency.clone()))?;

        if self.vat < Decimal::ZERO || self.vat >= Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidVat(self.vat));
        }

        Ok(())
    }

    /// The store currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidCurrency`] for an unknown code.
    pub fn iso_currency(&self) -> Result<&'static Currency, MoneyError> {
        money::currency(&self.currency)
    }

    /// Enables or disables a payment method by id.
    #[must_use]
    pub fn with_payment_method_enabled(mut self, id: u32, enabled: bool) -> Self {
        for method in &mut self.payment_methods {
            if method.id == id {
                method.enabled = enabled;
            }
        }

        self
    }

    /// Whether `country` keeps VAT when shipped to from abroad.
    pub fn retains_vat(&self, country: &str) -> bool {
        self.vat_retained_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country.trim()))
    }
}
