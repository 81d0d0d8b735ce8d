use std::sync::Arc;

use itertools::Itertools;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;
use serde_json_bytes::json;

use crate::attributes::EntityAttributeAggregator;
use crate::configuration::Configuration;
use crate::configuration::SORT_ATTRIBUTES;
use crate::error::ConfigurationError;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::schema::FieldElement;

/// The sort options of product listings: `{ default, options: [{ value, label }] }`.
///
/// Options are the aggregated attributes of the `sort` entity attributes
/// configuration. The default, when configured, must be one of them.
pub struct SortFieldsResolver {
    aggregator: EntityAttributeAggregator,
    configuration: Arc<Configuration>,
}

impl SortFieldsResolver {
    pub fn new(aggregator: EntityAttributeAggregator, configuration: Arc<Configuration>) -> Self {
        Self {
            aggregator,
            configuration,
        }
    }
}

impl FieldResolver for SortFieldsResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        _context: &ResolveContext,
        _info: &ResolveInfo<'_>,
        _value: Option<&Value>,
        _args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let entity = self.configuration.entity(SORT_ATTRIBUTES)?;
        let attributes = self.aggregator.for_entity(entity)?;

        let default = match entity.default_sort.as_deref() {
            Some(default) if !attributes.contains(default) => {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "default sort is not a sort option",
                    error: format!("`{default}` is not an attribute of `{}`", entity.element),
                }
                .into());
            }
            Some(default) => Value::String(ByteString::from(default)),
            None => Value::Null,
        };
        let options = attributes
            .iter()
            .map(|(name, _)| json!({ "value": name, "label": label(name) }))
            .collect();

        let mut sort_fields = Object::new();
        sort_fields.insert(ByteString::from("default"), default);
        sort_fields.insert(ByteString::from("options"), Value::Array(options));
        Ok(Value::Object(sort_fields).into())
    }
}

/// `url_key` is shown as `Url Key`.
fn label(attribute: &str) -> String {
    attribute
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}
