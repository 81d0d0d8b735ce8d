//! The field resolver seam.
//!
//! A [`FieldResolver`] turns the arguments of a field and the value of its
//! parent into the value of the field. Resolvers do not share state between
//! invocations: everything request scoped arrives through [`ResolveContext`]
//! and [`ResolveInfo`], and data is fetched through narrow provider traits.

mod deferred;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json_bytes::Value;

pub use self::deferred::BatchLoad;
pub use self::deferred::BatchLoader;
pub use self::deferred::Deferred;
use crate::configuration::Configuration;
use crate::error::ConfigurationError;
use crate::error::InputError;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::graphql::Path;
use crate::schema::ConfigStore;
use crate::schema::FieldElement;

/// The store view a request runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    pub code: String,
    pub currency: String,
}

/// The logged in customer, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContext {
    pub id: u64,
    pub group_id: u32,
}

/// Request scoped context shared by every resolver of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    store: StoreContext,
    customer: Option<CustomerContext>,
}

#[buildstructor::buildstructor]
impl ResolveContext {
    #[builder(visibility = "pub")]
    fn new(store: StoreContext, customer: Option<CustomerContext>) -> Self {
        Self { store, customer }
    }

    /// A guest request on the configured default store view.
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            store: StoreContext {
                code: configuration.store.code.clone(),
                currency: configuration.store.currency.clone(),
            },
            customer: None,
        }
    }

    pub fn store(&self) -> &StoreContext {
        &self.store
    }

    pub fn customer(&self) -> Option<&CustomerContext> {
        self.customer.as_ref()
    }

    pub fn is_guest(&self) -> bool {
        self.customer.is_none()
    }
}

/// Where in the response a field is being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInfo<'a> {
    pub parent_type: &'a str,
    pub path: &'a Path,
    pub schema: &'a ConfigStore,
    pub(crate) loaders: &'a HashMap<String, Arc<BatchLoader>>,
}

impl<'a> ResolveInfo<'a> {
    pub fn new(
        parent_type: &'a str,
        path: &'a Path,
        schema: &'a ConfigStore,
        loaders: &'a HashMap<String, Arc<BatchLoader>>,
    ) -> Self {
        Self {
            parent_type,
            path,
            schema,
            loaders,
        }
    }

    /// The request scoped batch loader registered under `name`.
    pub fn loader(&self, name: &str) -> Result<&'a Arc<BatchLoader>, ConfigurationError> {
        self.loaders
            .get(name)
            .ok_or_else(|| ConfigurationError::InvalidConfiguration {
                message: "batch loader is not registered",
                error: name.to_owned(),
            })
    }
}

/// The value of a resolved field.
#[derive(Debug, Clone)]
pub enum Resolved {
    Value(Value),
    /// Known once the loader of the deferred value is dispatched.
    Deferred(Deferred),
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Resolved::Value(value)
    }
}

impl From<Deferred> for Resolved {
    fn from(deferred: Deferred) -> Self {
        Resolved::Deferred(deferred)
    }
}

pub trait FieldResolver: Send + Sync {
    fn resolve(
        &self,
        field: &FieldElement,
        context: &ResolveContext,
        info: &ResolveInfo<'_>,
        value: Option<&Value>,
        args: &Object,
    ) -> Result<Resolved, ResolveError>;
}

/// The argument `name`, which must be present and not `null`.
pub fn require_argument<'a>(args: &'a Object, name: &str) -> Result<&'a Value, InputError> {
    match args.get(name) {
        Some(Value::Null) | None => Err(InputError::MissingArgument {
            name: name.to_owned(),
        }),
        Some(value) => Ok(value),
    }
}

/// The key `key` of the parent object, which must be present and not `null`.
pub fn require_parent_key<'a>(value: Option<&'a Value>, key: &str) -> Result<&'a Value, InputError> {
    match value.and_then(Value::as_object).and_then(|object| object.get(key)) {
        Some(Value::Null) | None => Err(InputError::MissingParentKey {
            key: key.to_owned(),
        }),
        Some(value) => Ok(value),
    }
}

/// A string or integer key, as ids and skus are given in arguments.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.as_str().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(object) => object,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn missing_and_null_arguments_are_input_errors() {
        let args = object(json!({ "id": null, "pageSize": 20 }));

        assert_eq!(require_argument(&args, "pageSize").unwrap(), &json!(20));
        assert_eq!(
            require_argument(&args, "id").unwrap_err(),
            InputError::MissingArgument {
                name: "id".to_owned()
            }
        );
        assert!(require_argument(&args, "filter").is_err());
    }

    #[test]
    fn parent_key_must_be_present() {
        let parent = json!({ "sku": "24-MB01", "model": null });

        assert_eq!(
            require_parent_key(Some(&parent), "sku").unwrap(),
            &json!("24-MB01")
        );
        assert_eq!(
            require_parent_key(Some(&parent), "model").unwrap_err(),
            InputError::MissingParentKey {
                key: "model".to_owned()
            }
        );
        assert!(require_parent_key(None, "sku").is_err());
        assert!(require_parent_key(Some(&json!("not an object")), "sku").is_err());
    }

    #[test]
    fn keys_from_strings_and_numbers() {
        assert_eq!(key_string(&json!("24-MB01")).as_deref(), Some("24-MB01"));
        assert_eq!(key_string(&json!(12)).as_deref(), Some("12"));
        assert_eq!(key_string(&json!(true)), None);
    }

    #[test]
    fn context_builder() {
        let context = ResolveContext::builder()
            .store(StoreContext {
                code: "us_en".to_owned(),
                currency: "USD".to_owned(),
            })
            .customer(CustomerContext { id: 7, group_id: 1 })
            .build();
        assert!(!context.is_guest());
        assert_eq!(context.store().code, "us_en");

        let guest = ResolveContext::from_configuration(&Configuration::default());
        assert!(guest.is_guest());
        assert_eq!(guest.store().currency, "USD");
    }

    #[test]
    fn unregistered_loader_is_a_configuration_error() {
        let loaders = HashMap::new();
        let schema = ConfigStore::default();
        let path = Path::default();
        let info = ResolveInfo::new("Query", &path, &schema, &loaders);
        assert!(matches!(
            info.loader("products"),
            Err(ConfigurationError::InvalidConfiguration { .. })
        ));
    }
}
