//! Zone and tariff resolution

use std::iter;

use tracing::debug;

use crate::{
    errors::CheckoutError,
    repository::optional,
    shipping::{
        models::{FeeFormula, Transport, Zone},
        repository::ShippingRepository,
    },
};

/// Wildcard marker used in zone postal-code patterns.
pub const WILDCARD: char = '*';

/// Postal-code patterns from most to least specific.
///
/// Trailing characters are replaced by [`WILDCARD`] one at a time until the
/// whole code is wildcarded: `"101"` yields `101`, `10*`, `1**`, `***`.
pub fn zip_patterns(zip: &str) -> impl Iterator<Item = String> + '_ {
    let len = zip.chars().count();

    (0..=len).rev().map(move |keep| {
        zip.chars()
            .take(keep)
            .chain(iter::repeat_n(WILDCARD, len - keep))
            .collect()
    })
}

/// Finds the most specific zone for a destination.
///
/// The country-wide zone is the baseline; the first postal-code pattern that
/// matches replaces it. An empty postal code only looks at the country.
///
/// # Errors
///
/// Returns [`CheckoutError::Repository`] if a lookup fails for a reason other
/// than a missing zone.
pub async fn resolve_zone(
    shipping: &dyn ShippingRepository,
    country: &str,
    zip: &str,
) -> Result<Option<Zone>, CheckoutError> {
    let country = country.trim().to_uppercase();
    let zip = zip.trim().to_uppercase();

    let baseline = optional(shipping.zone_by_country(&country).await)?;

    if zip.is_empty() {
        return Ok(baseline);
    }

    for pattern in zip_patterns(&zip) {
        if let Some(zone) = optional(shipping.zone_by_country_and_zip(&country, &pattern).await)? {
            debug!(country, pattern, zone = zone.id, "matched postal-code zone");

            return Ok(Some(zone));
        }
    }

    Ok(baseline)
}

/// The fee formula of `transport` inside `zone`: the zone's tariff if there is
/// one, the transport's own formula otherwise.
///
/// # Errors
///
/// Returns [`CheckoutError::Repository`] if the tariff lookup fails for a
/// reason other than a missing tariff.
pub async fn resolve_formula(
    shipping: &dyn ShippingRepository,
    transport: &Transport,
    zone: Option<&Zone>,
) -> Result<FeeFormula, CheckoutError> {
    let Some(zone) = zone else {
        return Ok(transport.formula);
    };

    match optional(shipping.tariff(transport.id, zone.id).await)? {
        Some(tariff) => {
            debug!(transport = transport.id, zone = zone.id, "using zone tariff");

            Ok(tariff.formula)
        }
        None => Ok(transport.formula),
    }
}
