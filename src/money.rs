//! Money
//!
//! Monetary helpers shared by every pricing step: the rounding rule, the
//! fixed-or-percentage [`Amount`] and currency formatting.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Findable, Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing an [`Amount`].
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// The percentage part before `%` is not a number.
    #[error("invalid percentage amount: {0}")]
    InvalidPercentage(String),

    /// The fixed amount is not a number.
    #[error("invalid fixed amount: {0}")]
    InvalidFixed(String),
}

/// Rounds a monetary value to 2 decimal places, half away from zero.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A fee or discount that is either a fixed value or a share of some base.
///
/// Parsed once from its stored string form (`"5"`, `"12.50"`, `"10%"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Amount {
    /// An absolute value in the store currency.
    Fixed(Decimal),

    /// A fraction of the base the amount is applied to (`0.1` for `"10%"`).
    Percent(Percentage),
}

impl Amount {
    /// A zero fixed amount.
    pub const ZERO: Amount = Amount::Fixed(Decimal::ZERO);

    /// Evaluates the amount against `base`, unrounded.
    pub fn of(&self, base: Decimal) -> Decimal {
        match self {
            Amount::Fixed(value) => *value,
            Amount::Percent(percent) => percent_of(*percent, base),
        }
    }

    /// Evaluates the amount as a discount on `base`, rounded to cents and
    /// limited to `0..=cap`.
    ///
    /// Percentages are always taken of `base`; `cap` is what is left of it
    /// after earlier discounts.
    pub fn discount_on(&self, base: Decimal, cap: Decimal) -> Decimal {
        let cap = cap.min(base);

        if cap <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        round(self.of(base)).clamp(Decimal::ZERO, cap)
    }

    /// Whether the amount contributes nothing whatever the base.
    pub fn is_zero(&self) -> bool {
        match self {
            Amount::Fixed(value) => value.is_zero(),
            Amount::Percent(percent) => percent_of(*percent, Decimal::ONE).is_zero(),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        if let Some(points) = trimmed.strip_suffix('%') {
            let points = Decimal::from_str(points.trim())
                .map_err(|_err| AmountError::InvalidPercentage(s.to_string()))?;

            return Ok(Amount::Percent(Percentage::from(points / Decimal::ONE_HUNDRED)));
        }

        Decimal::from_str(trimmed)
            .map(Amount::Fixed)
            .map_err(|_err| AmountError::InvalidFixed(s.to_string()))
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Fixed(value) => write!(f, "{}", value.normalize()),
            Amount::Percent(percent) => {
                let points = percent_of(*percent, Decimal::ONE_HUNDRED);

                write!(f, "{}%", points.normalize())
            }
        }
    }
}

/// `percent` of `base`.
pub fn percent_of(percent: Percentage, base: Decimal) -> Decimal {
    // `Percentage` only exposes its fraction through multiplication.
    (percent * Decimal::ONE) * base
}

/// Looks up an ISO currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidCurrency`] for unknown codes.
pub fn currency(code: &str) -> Result<&'static Currency, MoneyError> {
    Currency::find(code.trim()).ok_or(MoneyError::InvalidCurrency)
}

/// Formats a decimal amount in the given currency (`€12.50`).
///
/// Amounts too large for the currency's minor units are rendered as the plain
/// rounded decimal followed by the ISO code (`12.50 EUR`).
pub fn format(amount: Decimal, currency: &'static Currency) -> String {
    let minor = Decimal::from(10_i64.pow(currency.exponent))
        .checked_mul(amount)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64());

    match minor {
        Some(minor) => Money::from_minor(minor, currency).to_string(),
        None => format!(
            "{} {}",
            amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero),
            currency.iso_alpha_code
        ),
    }
}
