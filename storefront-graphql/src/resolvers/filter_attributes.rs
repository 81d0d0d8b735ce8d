use std::sync::Arc;

use serde_json_bytes::Value;
use serde_json_bytes::json;

use crate::attributes::EntityAttributeAggregator;
use crate::configuration::Configuration;
use crate::configuration::FILTER_ATTRIBUTES;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::schema::FieldElement;

/// The attributes layered navigation can filter on, as
/// `[{ attribute_code, type }]`.
pub struct FilterAttributesResolver {
    aggregator: EntityAttributeAggregator,
    configuration: Arc<Configuration>,
}

impl FilterAttributesResolver {
    pub fn new(aggregator: EntityAttributeAggregator, configuration: Arc<Configuration>) -> Self {
        Self {
            aggregator,
            configuration,
        }
    }
}

impl FieldResolver for FilterAttributesResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        _context: &ResolveContext,
        _info: &ResolveInfo<'_>,
        _value: Option<&Value>,
        _args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let entity = self.configuration.entity(FILTER_ATTRIBUTES)?;
        let attributes = self.aggregator.for_entity(entity)?;
        Ok(Value::Array(
            attributes
                .iter()
                .map(|(name, label)| json!({ "attribute_code": name, "type": label.as_str() }))
                .collect(),
        )
        .into())
    }
}
