//! Logic for loading configuration in to an object model

use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigurationError;
use crate::schema::ConfigStore;

/// Entity attributes used to build the sort fields of product listings.
pub const SORT_ATTRIBUTES: &str = "sort";
/// Entity attributes used to build the layered navigation filters.
pub const FILTER_ATTRIBUTES: &str = "filter";

/// The configuration of the storefront GraphQL layer.
///
/// Can be created through `serde::Deserialize` from various formats,
/// or inline in Rust code with `serde_json::json!` and `serde_json::from_value`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Store view used when a request does not name one.
    pub store: StoreConfig,

    /// Stock status computation.
    pub stock: StockConfig,

    /// Entity attribute aggregations, keyed by what they are used for
    /// (`sort`, `filter`, ...).
    pub entity_attributes: IndexMap<String, EntityAttributesConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct StoreConfig {
    /// Store view code.
    pub code: String,
    /// Base currency code.
    pub currency: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            code: "default".to_owned(),
            currency: "USD".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct StockConfig {
    /// Quantity at or below which a product is reported out of stock.
    pub threshold: f64,
}

/// The object type whose interface fields are aggregated, and the attributes
/// added on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EntityAttributesConfig {
    /// Name of an object type of the schema.
    pub element: String,

    /// Attributes merged after the interface fields.
    #[serde(default)]
    pub additional_attributes: Vec<String>,

    /// Attribute listings are sorted by when the request does not choose.
    #[serde(default)]
    pub default_sort: Option<String>,
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(raw_yaml: &str) -> Result<Self, Self::Err> {
        if raw_yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let configuration: Configuration =
            serde_yaml::from_str(raw_yaml).map_err(ConfigurationError::Deserialize)?;
        configuration.validate()?;
        Ok(configuration)
    }
}

impl Configuration {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        std::fs::read_to_string(path)
            .map_err(ConfigurationError::Io)?
            .parse()
    }

    /// Checks the configuration on its own, without a schema.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.store.code.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "store code must not be empty",
                error: format!("{:?}", self.store.code),
            });
        }
        if !self.stock.threshold.is_finite() || self.stock.threshold < 0.0 {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "stock threshold must not be negative",
                error: self.stock.threshold.to_string(),
            });
        }
        for (usage, entity) in &self.entity_attributes {
            if entity.element.trim().is_empty() {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "entity attributes need an element",
                    error: format!("`{usage}` has an empty element name"),
                });
            }
            if entity
                .default_sort
                .as_deref()
                .is_some_and(|default_sort| default_sort.trim().is_empty())
            {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "default sort must not be empty",
                    error: format!("`{usage}` has an empty default sort"),
                });
            }
        }
        Ok(())
    }

    /// Checks every entity attribute aggregation names an object type of
    /// `store`.
    pub fn validate_against(&self, store: &ConfigStore) -> Result<(), ConfigurationError> {
        for (usage, entity) in &self.entity_attributes {
            store.get_type(&entity.element).inspect_err(|error| {
                tracing::error!(usage = usage.as_str(), %error, "invalid entity attributes");
            })?;
        }
        Ok(())
    }

    pub fn entity(&self, usage: &str) -> Result<&EntityAttributesConfig, ConfigurationError> {
        self.entity_attributes
            .get(usage)
            .ok_or_else(|| ConfigurationError::InvalidConfiguration {
                message: "missing entity attributes configuration",
                error: format!("no entry for `{usage}`"),
            })
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    schemars::schema_for!(Configuration)
}
