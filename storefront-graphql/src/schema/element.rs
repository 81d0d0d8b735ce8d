//! Read-only views over the elements held by a [`ConfigStore`](super::ConfigStore).

use indexmap::IndexMap;

use crate::error::ElementKind;

/// A named, typed member of a type, interface or input type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    pub(crate) name: String,
    pub(crate) type_ref: String,
    pub(crate) description: Option<String>,
    pub(crate) arguments: Vec<FieldElement>,
}

impl FieldElement {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            description: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, argument: FieldElement) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared GraphQL type, e.g. `[ProductInterface]!`.
    pub fn type_ref(&self) -> &str {
        &self.type_ref
    }

    /// return the name of the type on which selections happen
    ///
    /// Example if we get the field `list: [User!]!`, it will return "User"
    pub fn named_type(&self) -> &str {
        self.type_ref
            .trim_matches(|c: char| matches!(c, '[' | ']' | '!') || c.is_whitespace())
    }

    pub fn is_list(&self) -> bool {
        self.type_ref.trim_start().starts_with('[')
    }

    pub fn is_non_null(&self) -> bool {
        self.type_ref.trim_end().ends_with('!')
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &[FieldElement] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&FieldElement> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

/// A named object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeElement {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldElement>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) description: Option<String>,
}

impl TypeElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            interfaces: Vec::new(),
            description: None,
        }
    }

    pub fn with_field(mut self, field: FieldElement) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldElement> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldElement> {
        self.fields.get(name)
    }

    /// Names of the interfaces this type implements, in declaration order.
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|name| name == interface)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named interface, contributing its fields to the types implementing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceElement {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldElement>,
    pub(crate) description: Option<String>,
}

impl InterfaceElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            description: None,
        }
    }

    pub fn with_field(mut self, field: FieldElement) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldElement> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldElement> {
        self.fields.get(name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named input object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldElement>,
    pub(crate) description: Option<String>,
}

impl InputElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldElement> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldElement> {
        self.fields.get(name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumElement {
    pub(crate) name: String,
    pub(crate) values: Vec<String>,
    pub(crate) description: Option<String>,
}

impl EnumElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// The closed set of elements a [`ConfigStore`](super::ConfigStore) holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigElement {
    Type(TypeElement),
    Interface(InterfaceElement),
    Input(InputElement),
    Enum(EnumElement),
}

impl ConfigElement {
    pub fn name(&self) -> &str {
        match self {
            ConfigElement::Type(element) => element.name(),
            ConfigElement::Interface(element) => element.name(),
            ConfigElement::Input(element) => element.name(),
            ConfigElement::Enum(element) => element.name(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ConfigElement::Type(_) => ElementKind::Type,
            ConfigElement::Interface(_) => ElementKind::Interface,
            ConfigElement::Input(_) => ElementKind::Input,
            ConfigElement::Enum(_) => ElementKind::Enum,
        }
    }

    /// Fields of the element. Enums have none.
    pub fn fields(&self) -> Box<dyn Iterator<Item = &FieldElement> + '_> {
        match self {
            ConfigElement::Type(element) => Box::new(element.fields()),
            ConfigElement::Interface(element) => Box::new(element.fields()),
            ConfigElement::Input(element) => Box::new(element.fields()),
            ConfigElement::Enum(_) => Box::new(std::iter::empty()),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ConfigElement::Type(element) => element.description(),
            ConfigElement::Interface(element) => element.description(),
            ConfigElement::Input(element) => element.description(),
            ConfigElement::Enum(element) => element.description(),
        }
    }

    pub fn as_type(&self) -> Option<&TypeElement> {
        match self {
            ConfigElement::Type(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceElement> {
        match self {
            ConfigElement::Interface(element) => Some(element),
            _ => None,
        }
    }
}

impl From<TypeElement> for ConfigElement {
    fn from(element: TypeElement) -> Self {
        ConfigElement::Type(element)
    }
}

impl From<InterfaceElement> for ConfigElement {
    fn from(element: InterfaceElement) -> Self {
        ConfigElement::Interface(element)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("String", "String", false, false)]
    #[case("String!", "String", false, true)]
    #[case("[CategoryTree]", "CategoryTree", true, false)]
    #[case("[ProductInterface!]!", "ProductInterface", true, true)]
    fn field_type_reference(
        #[case] type_ref: &str,
        #[case] named: &str,
        #[case] list: bool,
        #[case] non_null: bool,
    ) {
        let field = FieldElement::new("f", type_ref);
        assert_eq!(field.named_type(), named);
        assert_eq!(field.is_list(), list);
        assert_eq!(field.is_non_null(), non_null);
    }

    #[test]
    fn type_accessors_keep_declaration_order() {
        let ty = TypeElement::new("CategoryTree")
            .implementing("CategoryInterface")
            .implementing("RoutableInterface")
            .with_field(FieldElement::new("name", "String"))
            .with_field(FieldElement::new("children", "[CategoryTree]"))
            .with_description("Category tree node");

        assert_eq!(ty.name(), "CategoryTree");
        assert_eq!(
            ty.fields().map(FieldElement::name).collect::<Vec<_>>(),
            vec!["name", "children"]
        );
        assert_eq!(ty.interfaces(), ["CategoryInterface", "RoutableInterface"]);
        assert!(ty.implements("RoutableInterface"));
        assert_eq!(ty.description(), Some("Category tree node"));
        assert_eq!(ty.field("children").map(FieldElement::is_list), Some(true));
    }

    #[test]
    fn element_kind_and_fields() {
        let element = ConfigElement::from(
            InterfaceElement::new("CategoryInterface")
                .with_field(FieldElement::new("name", "String"))
                .with_field(FieldElement::new("url_key", "String")),
        );
        assert_eq!(element.kind(), ElementKind::Interface);
        assert!(element.as_type().is_none());
        assert_eq!(element.fields().count(), 2);
    }
}
