//! Storefront GraphQL errors.
//!
//! Errors fall in two families. [`ConfigurationError`] and [`SchemaError`] mean
//! the deployed schema or configuration is broken: they abort the request that
//! ran into them. [`InputError`] and [`ProviderError`] belong to a single field
//! and end up in the `errors` list of the response, the rest of the query still
//! resolves.
use std::fmt;

use displaydoc::Display;
use thiserror::Error;

use crate::graphql;
use crate::graphql::Path;

pub(crate) const CATEGORY_INPUT: &str = "graphql-input";
pub(crate) const CATEGORY_NO_SUCH_ENTITY: &str = "graphql-no-such-entity";
pub(crate) const CATEGORY_PROVIDER: &str = "graphql-provider";

/// The kind of a named element in the schema configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Type,
    Interface,
    Input,
    Enum,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Type => f.write_str("an object type"),
            ElementKind::Interface => f.write_str("an interface"),
            ElementKind::Input => f.write_str("an input type"),
            ElementKind::Enum => f.write_str("an enum"),
        }
    }
}

/// Failure to build a [`ConfigStore`](crate::schema::ConfigStore).
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum SchemaError {
    /// could not read schema: {0}
    Io(#[from] std::io::Error),
    /// schema could not be parsed: {0}
    Parse(String),
    /// invalid schema configuration document: {0}
    Document(String),
    /// element `{name}` is defined more than once
    DuplicateElement { name: String },
    /// `{name}` is not a valid GraphQL name
    InvalidName { name: String },
}

/// Broken schema or configuration. Fatal to the request.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// schema element `{name}` is not defined
    ElementNotFound { name: String },
    /// schema element `{name}` is {actual}, expected {expected}
    UnexpectedElementKind {
        name: String,
        expected: ElementKind,
        actual: ElementKind,
    },
    /// field `{field}` is not defined on `{type_name}`
    UnknownField { type_name: String, field: String },
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
    /// could not deserialize configuration: {0}
    Deserialize(serde_yaml::Error),
    /// could not read configuration: {0}
    Io(std::io::Error),
    /// invalid schema: {0}
    Schema(#[from] SchemaError),
}

/// A field received arguments, or a parent value, it cannot work with.
#[derive(Debug, Clone, Error, Display, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputError {
    /// required argument `{name}` was not provided
    MissingArgument { name: String },
    /// `{key}` value should be specified
    MissingParentKey { key: String },
    /// argument `{name}` is invalid: {reason}
    InvalidArgument { name: String, reason: String },
    /// could not find a {entity} for `{key}`
    NotFound { entity: &'static str, key: String },
    /// query could not be parsed: {reason}
    InvalidQuery { reason: String },
    /// query is not valid: {reason}
    InvalidOperation { reason: String },
    /// cannot query field `{field}` on type `{type_name}`
    UnknownField { type_name: String, field: String },
    /// variable `${name}` is not defined
    UndefinedVariable { name: String },
    /// fragment `{name}` is not defined
    UndefinedFragment { name: String },
    /// `{name}` is not an object type or interface of the schema
    UnknownType { name: String },
}

impl InputError {
    pub fn code(&self) -> &'static str {
        match self {
            InputError::MissingArgument { .. } => "MISSING_ARGUMENT",
            InputError::MissingParentKey { .. } => "MISSING_PARENT_VALUE",
            InputError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            InputError::NotFound { .. } => "NOT_FOUND",
            InputError::InvalidQuery { .. } => "GRAPHQL_PARSE_FAILED",
            InputError::InvalidOperation { .. }
            | InputError::UnknownField { .. }
            | InputError::UndefinedVariable { .. }
            | InputError::UndefinedFragment { .. }
            | InputError::UnknownType { .. } => "GRAPHQL_VALIDATION_FAILED",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            InputError::NotFound { .. } => CATEGORY_NO_SUCH_ENTITY,
            _ => CATEGORY_INPUT,
        }
    }

    /// Convert the input error to a GraphQL error located at `path`.
    pub fn to_graphql_error(&self, path: Path) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .path(path)
            .extension_code(self.code())
            .extension("category", self.category())
            .build()
    }

    /// Convert the input error to a GraphQL error about the request as a
    /// whole, without a path.
    pub fn to_request_error(&self) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .extension_code(self.code())
            .extension("category", self.category())
            .build()
    }
}

/// data provider `{provider}` failed: {reason}
#[derive(Debug, Clone, Error, Display, PartialEq, Eq)]
pub struct ProviderError {
    pub provider: String,
    pub reason: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn to_graphql_error(&self, path: Path) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .path(path)
            .extension_code("PROVIDER_ERROR")
            .extension("category", CATEGORY_PROVIDER)
            .build()
    }
}

/// Everything a [`FieldResolver`](crate::resolver::FieldResolver) may fail with.
#[derive(Debug, Error, Display)]
pub enum ResolveError {
    /// {0}
    Input(#[from] InputError),
    /// {0}
    Provider(#[from] ProviderError),
    /// {0}
    Configuration(#[from] ConfigurationError),
}

impl ResolveError {
    /// Errors reported in the response next to the data. Configuration errors
    /// are not, they abort the request.
    pub(crate) fn to_graphql_error(&self, path: &Path) -> Option<graphql::Error> {
        match self {
            ResolveError::Input(error) => Some(error.to_graphql_error(path.clone())),
            ResolveError::Provider(error) => Some(error.to_graphql_error(path.clone())),
            ResolveError::Configuration(_) => None,
        }
    }
}
