use std::sync::Arc;

use serde_json_bytes::Value;
use serde_json_bytes::json;

use crate::catalog::Category;
use crate::catalog::CategoryProvider;
use crate::error::InputError;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::resolver::require_argument;
use crate::resolver::require_parent_key;
use crate::schema::FieldElement;

/// `Query.category(id:)`.
pub struct CategoryResolver {
    provider: Arc<dyn CategoryProvider>,
}

impl CategoryResolver {
    pub fn new(provider: Arc<dyn CategoryProvider>) -> Self {
        Self { provider }
    }
}

impl FieldResolver for CategoryResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        context: &ResolveContext,
        _info: &ResolveInfo<'_>,
        _value: Option<&Value>,
        args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let id = category_id(require_argument(args, "id")?, "id")?;
        let category = self
            .provider
            .category(id, &context.store().code)?
            .ok_or_else(|| InputError::NotFound {
                entity: "category",
                key: id.to_string(),
            })?;
        Ok(category_value(&category).into())
    }
}

/// `CategoryTree.children`, read from the `id` of the parent category.
pub struct CategoryChildrenResolver {
    provider: Arc<dyn CategoryProvider>,
}

impl CategoryChildrenResolver {
    pub fn new(provider: Arc<dyn CategoryProvider>) -> Self {
        Self { provider }
    }
}

impl FieldResolver for CategoryChildrenResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        context: &ResolveContext,
        _info: &ResolveInfo<'_>,
        value: Option<&Value>,
        _args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let id = category_id(require_parent_key(value, "id")?, "id")?;
        let children = self.provider.children(id, &context.store().code)?;
        Ok(Value::Array(children.iter().map(category_value).collect()).into())
    }
}

fn category_id(value: &Value, name: &str) -> Result<u32, InputError> {
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| InputError::InvalidArgument {
            name: name.to_owned(),
            reason: format!("expected a category id, got {value}"),
        })
}

fn category_value(category: &Category) -> Value {
    json!({
        "id": category.id,
        "name": category.name.as_str(),
        "url_key": category.url_key.as_str(),
        "level": category.level,
        "product_count": category.product_count
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::MockCategoryProvider;
    use crate::configuration::Configuration;
    use crate::error::ProviderError;
    use crate::graphql::Path;
    use crate::schema::ConfigStore;

    fn gear(id: u32, parent_id: Option<u32>) -> Category {
        Category {
            id,
            name: format!("Gear {id}"),
            url_key: format!("gear-{id}"),
            parent_id,
            level: 2,
            product_count: 46,
            is_active: true,
        }
    }

    fn args(value: Value) -> Object {
        match value {
            Value::Object(object) => object,
            _ => panic!("expected an object"),
        }
    }

    fn resolve(
        resolver: &dyn FieldResolver,
        value: Option<&Value>,
        args: &Object,
    ) -> Result<Value, ResolveError> {
        let schema = ConfigStore::default();
        let loaders = HashMap::new();
        let path = Path::default().join_key("category");
        let info = ResolveInfo::new("Query", &path, &schema, &loaders);
        let context = ResolveContext::from_configuration(&Configuration::default());
        let field = FieldElement::new("category", "CategoryTree");
        match resolver.resolve(&field, &context, &info, value, args)? {
            Resolved::Value(value) => Ok(value),
            Resolved::Deferred(_) => panic!("category fields are not deferred"),
        }
    }

    #[test]
    fn category_by_id() {
        let mut provider = MockCategoryProvider::new();
        provider
            .expect_category()
            .withf(|id, _| *id == 3)
            .times(1)
            .returning(|id, _| Ok(Some(gear(id, Some(2)))));
        let resolver = CategoryResolver::new(Arc::new(provider));

        let value = resolve(&resolver, None, &args(json!({ "id": 3 }))).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Gear 3",
                "url_key": "gear-3",
                "level": 2,
                "product_count": 46
            })
        );
    }

    #[test]
    fn missing_id_is_an_input_error() {
        let mut provider = MockCategoryProvider::new();
        provider.expect_category().never();
        let resolver = CategoryResolver::new(Arc::new(provider));

        let error = resolve(&resolver, None, &Object::new()).unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Input(InputError::MissingArgument { name }) if name == "id"
        ));

        let error = resolve(&resolver, None, &args(json!({ "id": "three" }))).unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Input(InputError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn unknown_category_is_not_found() {
        let mut provider = MockCategoryProvider::new();
        provider.expect_category().returning(|_, _| Ok(None));
        let resolver = CategoryResolver::new(Arc::new(provider));

        let error = resolve(&resolver, None, &args(json!({ "id": 404 }))).unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Input(InputError::NotFound { entity: "category", key }) if key == "404"
        ));
    }

    #[test]
    fn provider_failures_are_provider_errors() {
        let mut provider = MockCategoryProvider::new();
        provider
            .expect_category()
            .returning(|_, _| Err(ProviderError::new("categories", "timeout")));
        let resolver = CategoryResolver::new(Arc::new(provider));

        let error = resolve(&resolver, None, &args(json!({ "id": 3 }))).unwrap_err();
        assert!(matches!(error, ResolveError::Provider(_)));
    }

    #[test]
    fn children_of_the_parent_category() {
        let mut provider = MockCategoryProvider::new();
        provider
            .expect_children()
            .withf(|id, _| *id == 2)
            .returning(|id, _| Ok(vec![gear(3, Some(id)), gear(4, Some(id))]));
        let resolver = CategoryChildrenResolver::new(Arc::new(provider));

        let value = resolve(&resolver, Some(&json!({ "id": 2 })), &Object::new()).unwrap();
        assert_eq!(
            value
                .as_array()
                .unwrap()
                .iter()
                .map(|child| child.as_object().unwrap().get("url_key").cloned().unwrap())
                .collect::<Vec<_>>(),
            vec![json!("gear-3"), json!("gear-4")]
        );

        let error = resolve(&resolver, Some(&json!({ "name": "Gear" })), &Object::new()).unwrap_err();
        assert_eq!(error.to_string(), "`id` value should be specified");
    }
}
