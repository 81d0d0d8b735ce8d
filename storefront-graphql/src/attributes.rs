//! Entity attribute aggregation.
//!
//! Filter and sort arguments of a product or category listing are built from
//! the attributes of an entity type: every field of every interface the type
//! implements, plus the attributes configured on top of them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::configuration::EntityAttributesConfig;
use crate::error::ConfigurationError;
use crate::schema::ConfigStore;

/// The placeholder type attached to an aggregated attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeLabel {
    /// Collected from an interface field.
    #[serde(rename = "String")]
    String,
    /// Added through configuration, the type is not known.
    #[serde(rename = "")]
    Empty,
}

impl AttributeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeLabel::String => "String",
            AttributeLabel::Empty => "",
        }
    }
}

impl fmt::Display for AttributeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered attribute names with their labels.
///
/// Names keep the position they were first inserted at. Inserting a name again
/// replaces its label in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: IndexMap<String, AttributeLabel>,
}

impl AttributeSet {
    pub fn insert(&mut self, name: impl Into<String>, label: AttributeLabel) {
        // `IndexMap::insert` keeps the slot of an existing key.
        self.attributes.insert(name.into(), label);
    }

    pub fn names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AttributeLabel)> {
        self.attributes
            .iter()
            .map(|(name, label)| (name.as_str(), *label))
    }

    pub fn label(&self, name: &str) -> Option<AttributeLabel> {
        self.attributes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Collects the attribute names of an entity type from the interfaces it
/// implements.
#[derive(Debug, Clone)]
pub struct EntityAttributeAggregator {
    store: Arc<ConfigStore>,
}

impl EntityAttributeAggregator {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Aggregates the attributes of `config_element_name`, which must be an
    /// object type.
    ///
    /// Interface fields come first, in interface then field declaration order,
    /// followed by `additional_attributes`. A name met twice stays at its first
    /// position.
    pub fn get_entity_attributes(
        &self,
        config_element_name: &str,
        additional_attributes: &[String],
    ) -> Result<AttributeSet, ConfigurationError> {
        let element = self.store.get_type(config_element_name).inspect_err(|error| {
            tracing::error!(%error, "cannot aggregate entity attributes");
        })?;

        let mut attributes = AttributeSet::default();
        for interface_name in element.interfaces() {
            let interface = self.store.get_interface(interface_name)?;
            for field in interface.fields() {
                attributes.insert(field.name(), AttributeLabel::String);
            }
        }
        for attribute in additional_attributes {
            attributes.insert(attribute.as_str(), AttributeLabel::Empty);
        }

        tracing::debug!(
            element = config_element_name,
            attributes = attributes.len(),
            "aggregated entity attributes"
        );
        Ok(attributes)
    }

    /// Same as [`Self::get_entity_attributes`] with the element and extras
    /// taken from configuration.
    pub fn for_entity(
        &self,
        config: &EntityAttributesConfig,
    ) -> Result<AttributeSet, ConfigurationError> {
        self.get_entity_attributes(&config.element, &config.additional_attributes)
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }
}
