//! Types related to GraphQL responses and errors.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map as JsonMap;
use serde_json_bytes::Value;

/// A JSON object.
pub type Object = JsonMap<ByteString, Value>;

/// A response path element, a field response key or a list index.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index in a list.
    Index(usize),

    /// A field response key.
    Key(String),
}

/// A path into the `data` of a [`Response`], e.g. `/products/2/stock_status`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn join_key(&self, key: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Key(key.into()));
        Path(elements)
    }

    pub fn join_index(&self, index: usize) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Index(index));
        Path(elements)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|element| match element {
            PathElement::Key(key) => Some(key.as_str()),
            PathElement::Index(_) => None,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            f.write_str("/")?;
            match element {
                PathElement::Index(index) => write!(f, "{index}")?,
                PathElement::Key(key) => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as may be found in the `errors` field of a GraphQL [`Response`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct Error {
    /// The error message.
    pub message: String,

    /// If this is a field error, the JSON path to that field in [`Response::data`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

impl Default for Error {
    fn default() -> Self {
        Self {
            message: String::new(),
            path: None,
            extensions: Object::new(),
        }
    }
}

#[buildstructor::buildstructor]
impl Error {
    /// Returns a builder that builds a GraphQL [`Error`] from its components.
    ///
    /// Builder methods:
    ///
    /// * `.message(impl Into<`[`String`]`>)`
    ///   Required.
    ///
    /// * `.path(impl Into<`[`Path`]`>)`
    ///   Optional.
    ///
    /// * `.extension(impl Into<`[`ByteString`]`>, impl Into<`[`Value`]`>)`
    ///   Optional, may be called multiple times.
    ///
    /// * `.extension_code(impl Into<`[`String`]`>)`
    ///   Optional.
    ///   Sets the "code" in the extension map. Will be ignored if extension already has this key
    ///   set.
    #[builder(visibility = "pub")]
    fn new(
        message: String,
        path: Option<Path>,
        extension_code: Option<String>,
        // Skip the `Object` type alias in order to use buildstructor's map special-casing
        mut extensions: JsonMap<ByteString, Value>,
    ) -> Self {
        if let Some(code) = extension_code {
            extensions
                .entry("code")
                .or_insert(Value::String(ByteString::from(code)));
        }
        Self {
            message,
            path,
            extensions,
        }
    }
}

/// A GraphQL response: the resolved `data` and the field errors met on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// The response data.
    pub data: Option<Value>,

    /// The field errors, in resolution order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<Error>,
}

impl Response {
    /// Errors whose path starts with the given response key.
    pub fn errors_for(&self, key: &str) -> Vec<&Error> {
        self.errors
            .iter()
            .filter(|error| {
                error
                    .path
                    .as_ref()
                    .and_then(|path| path.0.first())
                    .is_some_and(|first| matches!(first, PathElement::Key(k) if k == key))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn path_display() {
        let path = Path::default()
            .join_key("category")
            .join_key("children")
            .join_index(1)
            .join_key("name");
        assert_eq!(path.to_string(), "/category/children/1/name");
        assert_eq!(path.last_key(), Some("name"));
    }

    #[test]
    fn extension_code_does_not_override_explicit_code() {
        let error = Error::builder()
            .message("boom")
            .extension("code", "EXPLICIT")
            .extension_code("IGNORED")
            .build();
        assert_eq!(error.extensions.get("code"), Some(&json!("EXPLICIT")));
    }

    #[test]
    fn response_serialization_skips_empty_errors() {
        let response = Response {
            data: Some(json!({ "category": null })),
            errors: Vec::new(),
        };
        assert_eq!(
            serde_json_bytes::to_value(&response).unwrap(),
            json!({ "data": { "category": null } })
        );
    }
}
