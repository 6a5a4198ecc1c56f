//! Customer profiles

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

/// Profile id
pub type ProfileId = u64;

/// Contact and address fields shared by billing and shipping profiles.
///
/// Orders keep a copy of these fields so later profile edits never change a
/// placed order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    /// First name.
    pub name: String,

    /// Last name.
    pub lastname: String,

    /// Company name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub company: String,

    /// Email address.
    pub email: String,

    /// Phone number.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Street address.
    pub address: String,

    /// Postal code.
    pub zip: String,

    /// City.
    pub city: String,

    /// Region or state.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,

    /// ISO 3166 alpha-2 country code.
    pub country: String,
}

/// Where invoices go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingProfile {
    /// Profile id.
    pub id: ProfileId,

    /// Contact fields.
    #[serde(flatten)]
    pub contact: Contact,

    /// VAT identification number, for business customers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_id: Option<String>,
}

/// Where parcels go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingProfile {
    /// Profile id.
    pub id: ProfileId,

    /// Contact fields.
    #[serde(flatten)]
    pub contact: Contact,
}

/// Read-only access to a customer's saved profiles.
#[automock]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Retrieve a billing profile.
    async fn billing_profile(&self, id: ProfileId) -> Result<BillingProfile, RepositoryError>;

    /// Retrieve a shipping profile.
    async fn shipping_profile(&self, id: ProfileId) -> Result<ShippingProfile, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn profiles_flatten_contact_fields() -> TestResult {
        let profile: ShippingProfile = serde_norway::from_str(
            "id: 4\nname: Ada\nlastname: Lovelace\nzip: '10115'\ncity: Berlin\ncountry: DE\n",
        )?;

        assert_eq!(profile.id, 4);
        assert_eq!(profile.contact.zip, "10115");
        assert_eq!(profile.contact.country, "DE");
        assert!(profile.contact.company.is_empty(), "company defaults to empty");

        Ok(())
    }

    #[test]
    fn empty_optional_fields_are_not_serialized() -> TestResult {
        let profile = BillingProfile {
            id: 1,
            contact: Contact {
                name: "Ada".to_string(),
                country: "DE".to_string(),
                ..Contact::default()
            },
            vat_id: None,
        };

        let json = serde_json::to_value(&profile)?;

        assert!(json.get("company").is_none(), "expected no company, got {json}");
        assert!(json.get("vat_id").is_none(), "expected no vat_id, got {json}");
        assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("Ada"));

        Ok(())
    }
}
