//! Fixtures
//!
//! YAML-backed store data. A loaded [`Fixture`] implements every read-only
//! repository the checkout engine needs, so a complete store can be run from
//! a directory of files.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    catalog::models::{
        CatalogEntity, CategoryId, Product, ProductId, PropertyPrice, PropertyPriceId, Variation,
        VariationId,
    },
    checkout::engine::CheckoutEngine,
    config::{ConfigError, StoreConfig},
    coupons::models::Coupon,
    fixtures::{
        catalog::{CatalogFixture, CategoryFixture},
        coupons::CouponsFixture,
        profiles::ProfilesFixture,
        shipping::ShippingFixture,
    },
    profiles::{BillingProfile, ProfileId, ShippingProfile},
    shipping::models::{Tariff, Transport, TransportId, Zone, ZoneId},
};

pub mod catalog;
pub mod coupons;
pub mod profiles;
pub mod shipping;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,

        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        /// File that failed to parse
        path: PathBuf,

        /// Underlying error
        #[source]
        source: serde_norway::Error,
    },

    /// Store configuration is invalid
    #[error("Invalid store configuration: {0}")]
    Config(#[from] ConfigError),

    /// No store configuration loaded
    #[error("No store configuration loaded")]
    NoConfig,

    /// The same id or code appears twice
    #[error("Duplicate {entity}: {key}")]
    Duplicate {
        /// Kind of record
        entity: &'static str,

        /// Repeated key
        key: String,
    },

    /// A record references something that was never loaded
    #[error("{entity} {key} references unknown {target}")]
    DanglingReference {
        /// Kind of record holding the reference
        entity: &'static str,

        /// Key of that record
        key: String,

        /// Kind of record referenced
        target: &'static str,
    },
}

/// In-memory store loaded from YAML files.
#[derive(Debug, Default)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    products: FxHashMap<ProductId, Product>,
    variations: FxHashMap<VariationId, Variation>,
    property_prices: FxHashMap<PropertyPriceId, PropertyPrice>,
    categories: FxHashMap<CategoryId, CategoryFixture>,
    thumbnails: FxHashMap<CatalogEntity, String>,

    coupons: FxHashMap<String, Coupon>,

    transports: Vec<Transport>,
    zones: Vec<Zone>,
    tariffs: FxHashMap<(TransportId, ZoneId), Tariff>,

    billing_profiles: FxHashMap<ProfileId, BillingProfile>,
    shipping_profiles: FxHashMap<ProfileId, ShippingProfile>,

    config: Option<StoreConfig>,
}

/// Inserts `value` under `key`, rejecting repeats.
fn insert_unique<K, V>(
    map: &mut FxHashMap<K, V>,
    entity: &'static str,
    key: K,
    value: V,
) -> Result<(), FixtureError>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
{
    if map.contains_key(&key) {
        return Err(FixtureError::Duplicate {
            entity,
            key: format!("{key:?}"),
        });
    }

    map.insert(key, value);

    Ok(())
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Directory fixture files are read from.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path(&self, kind: &str, name: &str) -> PathBuf {
        self.base_path.join(kind).join(format!("{name}.yml"))
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let path = self.path(kind, name);

        let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Io {
            path: path.clone(),
            source,
        })?;

        serde_norway::from_str(&contents).map_err(|source| FixtureError::Yaml { path, source })
    }

    /// Load products, variations, surcharges, categories and thumbnails.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if an id repeats
    /// or if a variation or category references an unknown parent.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = self.read("catalog", name)?;

        for product in fixture.products {
            insert_unique(&mut self.products, "product", product.id, product)?;
        }

        for variation in fixture.variations {
            if !self.products.contains_key(&variation.product_id) {
                return Err(FixtureError::DanglingReference {
                    entity: "variation",
                    key: variation.id.to_string(),
                    target: "product",
                });
            }

            insert_unique(&mut self.variations, "variation", variation.id, variation)?;
        }

        for price in fixture.property_prices {
            insert_unique(&mut self.property_prices, "property price", price.id, price)?;
        }

        for category in fixture.categories {
            insert_unique(&mut self.categories, "category", category.id, category)?;
        }

        if let Some(orphan) = self.categories.values().find(|category| {
            category
                .parent
                .is_some_and(|parent| !self.categories.contains_key(&parent))
        }) {
            return Err(FixtureError::DanglingReference {
                entity: "category",
                key: orphan.id.to_string(),
                target: "category",
            });
        }

        let thumbnails = fixture
            .thumbnails
            .products
            .into_iter()
            .map(|(id, url)| (CatalogEntity::Product(id), url))
            .chain(
                fixture
                    .thumbnails
                    .variations
                    .into_iter()
                    .map(|(id, url)| (CatalogEntity::Variation(id), url)),
            );

        self.thumbnails.extend(thumbnails);

        Ok(self)
    }

    /// Load coupons, keyed by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed or if a code
    /// repeats.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = self.read("coupons", name)?;

        for coupon in fixture.coupons {
            insert_unique(&mut self.coupons, "coupon", coupon.code.clone(), coupon)?;
        }

        Ok(self)
    }

    /// Load transports, zones and tariffs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a tariff
    /// repeats or if it references an unknown transport or zone.
    pub fn load_shipping(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ShippingFixture = self.read("shipping", name)?;

        self.transports.extend(fixture.transports);
        self.zones.extend(fixture.zones);

        for tariff in fixture.tariffs {
            let key = format!("{}/{}", tariff.transport_id, tariff.zone_id);

            if !self.transports.iter().any(|t| t.id == tariff.transport_id) {
                return Err(FixtureError::DanglingReference {
                    entity: "tariff",
                    key,
                    target: "transport",
                });
            }

            if !self.zones.iter().any(|z| z.id == tariff.zone_id) {
                return Err(FixtureError::DanglingReference {
                    entity: "tariff",
                    key,
                    target: "zone",
                });
            }

            insert_unique(
                &mut self.tariffs,
                "tariff",
                (tariff.transport_id, tariff.zone_id),
                tariff,
            )?;
        }

        Ok(self)
    }

    /// Load billing and shipping profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed or if an id
    /// repeats.
    pub fn load_profiles(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProfilesFixture = self.read("profiles", name)?;

        for profile in fixture.billing {
            insert_unique(&mut self.billing_profiles, "billing profile", profile.id, profile)?;
        }

        for profile in fixture.shipping {
            insert_unique(
                &mut self.shipping_profiles,
                "shipping profile",
                profile.id,
                profile,
            )?;
        }

        Ok(self)
    }

    /// Load and validate the store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let path = self.path("config", name);

        let config = StoreConfig::load(&path).map_err(|error| match error {
            ConfigError::Io(source) => FixtureError::Io { path, source },
            other => FixtureError::Config(other),
        })?;

        self.config = Some(config);

        Ok(self)
    }

    /// Load a complete fixture set (every kind with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_config(name)?
            .load_catalog(name)?
            .load_coupons(name)?
            .load_shipping(name)?
            .load_profiles(name)?;

        Ok(fixture)
    }

    /// Get the store configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration has been loaded yet.
    pub fn config(&self) -> Result<&StoreConfig, FixtureError> {
        self.config.as_ref().ok_or(FixtureError::NoConfig)
    }

    /// Builds a checkout engine serving every lookup from this fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration has been loaded.
    pub fn into_engine(self) -> Result<CheckoutEngine, FixtureError> {
        let config = self.config.clone().ok_or(FixtureError::NoConfig)?;
        let store = Arc::new(self);

        Ok(CheckoutEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            config,
        ))
    }
}
