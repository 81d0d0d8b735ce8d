//! Serde representation of a schema configuration, an alternative to SDL for
//! declaring the elements of a [`ConfigStore`](super::ConfigStore).
//!
//! ```yaml
//! CategoryInterface:
//!   kind: interface
//!   fields:
//!     name: String
//!     url_key: String
//! CategoryTree:
//!   kind: type
//!   implements: [CategoryInterface]
//!   fields:
//!     children:
//!       type: "[CategoryTree]"
//!       description: Child categories
//! ```

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use super::element::ConfigElement;
use super::element::EnumElement;
use super::element::FieldElement;
use super::element::InputElement;
use super::element::InterfaceElement;
use super::element::TypeElement;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ConfigDocument {
    pub elements: IndexMap<String, ElementDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementDefinition {
    Type {
        #[serde(default)]
        implements: Vec<String>,
        #[serde(default)]
        fields: IndexMap<String, FieldDefinition>,
        #[serde(default)]
        description: Option<String>,
    },
    Interface {
        #[serde(default)]
        fields: IndexMap<String, FieldDefinition>,
        #[serde(default)]
        description: Option<String>,
    },
    Input {
        #[serde(default)]
        fields: IndexMap<String, FieldDefinition>,
        #[serde(default)]
        description: Option<String>,
    },
    Enum {
        #[serde(default)]
        values: Vec<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

/// A field, either as its bare type (`name: String`) or in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldDefinition {
    Type(String),
    Full {
        #[serde(rename = "type")]
        type_ref: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        arguments: IndexMap<String, String>,
    },
}

impl FieldDefinition {
    fn into_element(self, name: String) -> FieldElement {
        match self {
            FieldDefinition::Type(type_ref) => FieldElement::new(name, type_ref),
            FieldDefinition::Full {
                type_ref,
                description,
                arguments,
            } => FieldElement {
                name,
                type_ref,
                description,
                arguments: arguments
                    .into_iter()
                    .map(|(name, type_ref)| FieldElement::new(name, type_ref))
                    .collect(),
            },
        }
    }
}

fn into_fields(fields: IndexMap<String, FieldDefinition>) -> IndexMap<String, FieldElement> {
    fields
        .into_iter()
        .map(|(name, definition)| (name.clone(), definition.into_element(name)))
        .collect()
}

impl ElementDefinition {
    pub(crate) fn into_element(self, name: String) -> ConfigElement {
        match self {
            ElementDefinition::Type {
                implements,
                fields,
                description,
            } => ConfigElement::Type(TypeElement {
                name,
                fields: into_fields(fields),
                interfaces: implements,
                description,
            }),
            ElementDefinition::Interface {
                fields,
                description,
            } => ConfigElement::Interface(InterfaceElement {
                name,
                fields: into_fields(fields),
                description,
            }),
            ElementDefinition::Input {
                fields,
                description,
            } => ConfigElement::Input(InputElement {
                name,
                fields: into_fields(fields),
                description,
            }),
            ElementDefinition::Enum {
                values,
                description,
            } => ConfigElement::Enum(EnumElement {
                name,
                values,
                description,
            }),
        }
    }
}
