//! The schema configuration store.
//!
//! [`ConfigStore`] holds the parsed schema elements keyed by name. It is built
//! once, when the schema is compiled, from any number of SDL sources and
//! configuration documents, and is never mutated afterwards.

mod document;
mod element;

use std::path::Path;

use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;
use indexmap::IndexMap;
use indexmap::map::Entry;
use itertools::Itertools;

pub use self::document::ConfigDocument;
pub use self::document::ElementDefinition;
pub use self::document::FieldDefinition;
pub use self::element::ConfigElement;
pub use self::element::EnumElement;
pub use self::element::FieldElement;
pub use self::element::InputElement;
pub use self::element::InterfaceElement;
pub use self::element::TypeElement;
use crate::error::ConfigurationError;
use crate::error::ElementKind;
use crate::error::SchemaError;

/// Immutable mapping from element name to schema element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    elements: IndexMap<String, ConfigElement>,
}

impl ConfigStore {
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::default()
    }

    /// Builds a store from a single SDL source.
    pub fn parse(sdl: &str, path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::builder().sdl(sdl, path).build()
    }

    /// Reads and parses an SDL file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let sdl = std::fs::read_to_string(path)?;
        Self::parse(&sdl, path)
    }

    pub fn from_document(document: ConfigDocument) -> Result<Self, SchemaError> {
        Self::builder().document(document).build()
    }

    /// Builds a store from a YAML (or JSON) configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let document: ConfigDocument =
            serde_yaml::from_str(yaml).map_err(|e| SchemaError::Document(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn get_config_element(&self, name: &str) -> Option<&ConfigElement> {
        self.elements.get(name)
    }

    /// Looks up an object type. A missing element, or one of another kind, means
    /// the schema is broken.
    pub fn get_type(&self, name: &str) -> Result<&TypeElement, ConfigurationError> {
        match self.lookup(name)? {
            ConfigElement::Type(element) => Ok(element),
            other => Err(unexpected_kind(name, ElementKind::Type, other)),
        }
    }

    pub fn get_interface(&self, name: &str) -> Result<&InterfaceElement, ConfigurationError> {
        match self.lookup(name)? {
            ConfigElement::Interface(element) => Ok(element),
            other => Err(unexpected_kind(name, ElementKind::Interface, other)),
        }
    }

    /// Finds the field `field` on the object type or interface `type_name`.
    pub fn get_field(
        &self,
        type_name: &str,
        field: &str,
    ) -> Result<&FieldElement, ConfigurationError> {
        let found = match self.lookup(type_name)? {
            ConfigElement::Type(element) => element.field(field),
            ConfigElement::Interface(element) => element.field(field),
            other => return Err(unexpected_kind(type_name, ElementKind::Type, other)),
        };
        found.ok_or_else(|| ConfigurationError::UnknownField {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
        })
    }

    /// Object types implementing `interface`, in declaration order.
    pub fn implementations(&self, interface: &str) -> Vec<&TypeElement> {
        self.types()
            .filter(|element| element.implements(interface))
            .collect()
    }

    pub fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.get_type(maybe_subtype)
            .map(|element| element.implements(abstract_type))
            .unwrap_or(false)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeElement> {
        self.elements.values().filter_map(ConfigElement::as_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&ConfigElement, ConfigurationError> {
        self.elements
            .get(name)
            .ok_or_else(|| ConfigurationError::ElementNotFound {
                name: name.to_owned(),
            })
    }
}

fn unexpected_kind(name: &str, expected: ElementKind, actual: &ConfigElement) -> ConfigurationError {
    ConfigurationError::UnexpectedElementKind {
        name: name.to_owned(),
        expected,
        actual: actual.kind(),
    }
}

/// Collects schema sources, one per module contributing to the schema.
///
/// SDL sources are compiled together so `extend type` in one source applies to
/// a type defined in another. Document elements are added afterwards; an
/// element name defined by two sources is an error.
#[derive(Debug, Default)]
pub struct ConfigStoreBuilder {
    sdl: Vec<(String, std::path::PathBuf)>,
    documents: Vec<ConfigDocument>,
}

impl ConfigStoreBuilder {
    pub fn sdl(mut self, sdl: &str, path: impl AsRef<Path>) -> Self {
        self.sdl.push((sdl.to_owned(), path.as_ref().to_path_buf()));
        self
    }

    pub fn document(mut self, document: ConfigDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn build(self) -> Result<ConfigStore, SchemaError> {
        let mut elements = IndexMap::new();

        if !self.sdl.is_empty() {
            let schema = self
                .sdl
                .into_iter()
                .fold(
                    Schema::builder().adopt_orphan_extensions(),
                    |builder, (sdl, path)| builder.parse(sdl, path),
                )
                .build()
                .map_err(|e| SchemaError::Parse(e.errors.iter().join("\n")))?;
            for element in elements_from_schema(&schema) {
                insert(&mut elements, element)?;
            }
        }

        for document in self.documents {
            for (name, definition) in document.elements {
                insert(&mut elements, definition.into_element(name))?;
            }
        }

        tracing::debug!(elements = elements.len(), "built schema configuration store");
        Ok(ConfigStore { elements })
    }
}

fn insert(
    elements: &mut IndexMap<String, ConfigElement>,
    element: ConfigElement,
) -> Result<(), SchemaError> {
    let name = element.name().to_owned();
    if !is_valid_name(&name) {
        return Err(SchemaError::InvalidName { name });
    }
    for field in element.fields() {
        if !is_valid_name(field.name()) {
            return Err(SchemaError::InvalidName {
                name: format!("{name}.{}", field.name()),
            });
        }
    }
    match elements.entry(name) {
        Entry::Occupied(entry) => Err(SchemaError::DuplicateElement {
            name: entry.key().clone(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(element);
            Ok(())
        }
    }
}

// Spec: https://spec.graphql.org/October2021/#Name
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Object types, interfaces, input objects and enums of a compiled schema.
/// Introspection types, scalars and unions are left out.
fn elements_from_schema(schema: &Schema) -> Vec<ConfigElement> {
    schema
        .types
        .iter()
        .filter(|(name, _)| !name.as_str().starts_with("__"))
        .filter_map(|(name, ty)| {
            let name = name.as_str().to_owned();
            match ty {
                ExtendedType::Object(object) => Some(ConfigElement::Type(TypeElement {
                    name,
                    fields: object
                        .fields
                        .values()
                        .map(|field| (field.name.as_str().to_owned(), field_element(field)))
                        .collect(),
                    interfaces: object
                        .implements_interfaces
                        .iter()
                        .map(|interface| interface.name.as_str().to_owned())
                        .collect(),
                    description: object.description.as_deref().map(str::to_owned),
                })),
                ExtendedType::Interface(interface) => {
                    Some(ConfigElement::Interface(InterfaceElement {
                        name,
                        fields: interface
                            .fields
                            .values()
                            .map(|field| (field.name.as_str().to_owned(), field_element(field)))
                            .collect(),
                        description: interface.description.as_deref().map(str::to_owned),
                    }))
                }
                ExtendedType::InputObject(input) => Some(ConfigElement::Input(InputElement {
                    name,
                    fields: input
                        .fields
                        .values()
                        .map(|field| (field.name.as_str().to_owned(), input_value_element(field)))
                        .collect(),
                    description: input.description.as_deref().map(str::to_owned),
                })),
                ExtendedType::Enum(enum_type) => Some(ConfigElement::Enum(EnumElement {
                    name,
                    values: enum_type
                        .values
                        .keys()
                        .map(|value| value.as_str().to_owned())
                        .collect(),
                    description: enum_type.description.as_deref().map(str::to_owned),
                })),
                _ => None,
            }
        })
        .collect()
}

fn field_element(field: &apollo_compiler::schema::FieldDefinition) -> FieldElement {
    FieldElement {
        name: field.name.as_str().to_owned(),
        type_ref: field.ty.to_string(),
        description: field.description.as_deref().map(str::to_owned),
        arguments: field
            .arguments
            .iter()
            .map(|argument| input_value_element(argument))
            .collect(),
    }
}

fn input_value_element(value: &apollo_compiler::ast::InputValueDefinition) -> FieldElement {
    FieldElement {
        name: value.name.as_str().to_owned(),
        type_ref: value.ty.to_string(),
        description: value.description.as_deref().map(str::to_owned),
        arguments: Vec::new(),
    }
}
