use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use serde_json_bytes::Value;
use serde_json_bytes::json;

use crate::catalog::Product;
use crate::catalog::ProductProvider;
use crate::error::InputError;
use crate::error::ProviderError;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::resolver::BatchLoad;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::resolver::key_string;
use crate::resolver::require_argument;
use crate::resolver::require_parent_key;
use crate::schema::FieldElement;

/// Loads products by sku.
pub const PRODUCTS_LOADER: &str = "products";
/// Loads the related products of a product, by the sku of the product.
pub const RELATED_PRODUCTS_LOADER: &str = "related_products";

const PRODUCT_TYPE: &str = "SimpleProduct";

pub(crate) fn product_value(product: &Product) -> Value {
    json!({
        "__typename": PRODUCT_TYPE,
        "sku": product.sku.as_str(),
        "name": product.name.as_str(),
        "url_key": product.url_key.as_str(),
        "price": product.price
    })
}

fn sku(value: &Value, name: &str) -> Result<String, InputError> {
    key_string(value).ok_or_else(|| InputError::InvalidArgument {
        name: name.to_owned(),
        reason: format!("expected a sku, got {value}"),
    })
}

/// `Query.product(sku:)`, loaded in one batch with every other product of
/// the request.
pub struct ProductResolver;

impl FieldResolver for ProductResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        _context: &ResolveContext,
        info: &ResolveInfo<'_>,
        _value: Option<&Value>,
        args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let sku = sku(require_argument(args, "sku")?, "sku")?;
        Ok(info.loader(PRODUCTS_LOADER)?.defer(sku).into())
    }
}

/// `ProductInterface.related_products`.
pub struct RelatedProductsResolver;

impl FieldResolver for RelatedProductsResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        _context: &ResolveContext,
        info: &ResolveInfo<'_>,
        value: Option<&Value>,
        _args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let sku = sku(require_parent_key(value, "sku")?, "sku")?;
        Ok(info.loader(RELATED_PRODUCTS_LOADER)?.defer(sku).into())
    }
}

pub struct ProductBatchLoad {
    provider: Arc<dyn ProductProvider>,
}

impl ProductBatchLoad {
    pub fn new(provider: Arc<dyn ProductProvider>) -> Self {
        Self { provider }
    }
}

impl BatchLoad for ProductBatchLoad {
    fn load(&self, keys: &[String]) -> Result<HashMap<String, Value>, ProviderError> {
        Ok(self
            .provider
            .products_by_sku(keys)?
            .iter()
            .map(|product| (product.sku.clone(), product_value(product)))
            .collect())
    }
}

/// Resolves each key to the list of its related products, in the order they
/// are linked. Links to unknown products are dropped.
pub struct RelatedProductsBatchLoad {
    provider: Arc<dyn ProductProvider>,
}

impl RelatedProductsBatchLoad {
    pub fn new(provider: Arc<dyn ProductProvider>) -> Self {
        Self { provider }
    }
}

impl BatchLoad for RelatedProductsBatchLoad {
    fn load(&self, keys: &[String]) -> Result<HashMap<String, Value>, ProviderError> {
        let parents = self.provider.products_by_sku(keys)?;
        let linked: IndexSet<String> = parents
            .iter()
            .flat_map(|parent| parent.related.iter().cloned())
            .collect();
        let related: HashMap<String, Value> = if linked.is_empty() {
            HashMap::new()
        } else {
            let linked: Vec<String> = linked.into_iter().collect();
            self.provider
                .products_by_sku(&linked)?
                .iter()
                .map(|product| (product.sku.clone(), product_value(product)))
                .collect()
        };

        Ok(parents
            .iter()
            .map(|parent| {
                let products = parent
                    .related
                    .iter()
                    .filter_map(|sku| related.get(sku).cloned())
                    .collect();
                (parent.sku.clone(), Value::Array(products))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::MockProductProvider;
    use crate::configuration::Configuration;
    use crate::graphql::Path;
    use crate::resolver::BatchLoader;
    use crate::schema::ConfigStore;

    fn product(sku: &str, related: &[&str]) -> Product {
        Product {
            sku: sku.to_owned(),
            name: format!("Product {sku}"),
            url_key: sku.to_lowercase(),
            price: 45.0,
            related: related.iter().map(|sku| (*sku).to_owned()).collect(),
        }
    }

    fn catalog(skus: &[String]) -> Vec<Product> {
        skus.iter()
            .filter_map(|sku| match sku.as_str() {
                "24-MB01" => Some(product("24-MB01", &["24-MB04", "missing", "24-MB02"])),
                "24-MB02" => Some(product("24-MB02", &[])),
                "24-MB04" => Some(product("24-MB04", &["24-MB01"])),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn products_are_deferred_to_one_batch() {
        let mut provider = MockProductProvider::new();
        provider
            .expect_products_by_sku()
            .withf(|skus| skus == ["24-MB01".to_owned(), "24-MB04".to_owned()])
            .times(1)
            .returning(|skus| Ok(catalog(skus)));
        let loader = BatchLoader::new(PRODUCTS_LOADER, Arc::new(ProductBatchLoad::new(Arc::new(provider))));
        let loaders = HashMap::from([(PRODUCTS_LOADER.to_owned(), loader)]);

        let schema = ConfigStore::default();
        let path = Path::default().join_key("product");
        let info = ResolveInfo::new("Query", &path, &schema, &loaders);
        let context = ResolveContext::from_configuration(&Configuration::default());
        let field = FieldElement::new("product", "ProductInterface");

        let deferred: Vec<_> = ["24-MB01", "24-MB04"]
            .into_iter()
            .map(|sku| {
                let args = match json!({ "sku": sku }) {
                    Value::Object(args) => args,
                    _ => unreachable!(),
                };
                match ProductResolver.resolve(&field, &context, &info, None, &args).unwrap() {
                    Resolved::Deferred(deferred) => deferred,
                    Resolved::Value(_) => panic!("products are deferred"),
                }
            })
            .collect();

        assert_eq!(
            deferred[1].resolve().unwrap(),
            json!({
                "__typename": "SimpleProduct",
                "sku": "24-MB04",
                "name": "Product 24-MB04",
                "url_key": "24-mb04",
                "price": 45.0
            })
        );
        assert!(deferred[0].resolve().is_ok());
    }

    #[test]
    fn missing_loader_is_a_configuration_error() {
        let schema = ConfigStore::default();
        let loaders = HashMap::new();
        let path = Path::default().join_key("product");
        let info = ResolveInfo::new("Query", &path, &schema, &loaders);
        let context = ResolveContext::from_configuration(&Configuration::default());
        let field = FieldElement::new("product", "ProductInterface");
        let args = match json!({ "sku": "24-MB01" }) {
            Value::Object(args) => args,
            _ => unreachable!(),
        };

        let error = ProductResolver
            .resolve(&field, &context, &info, None, &args)
            .unwrap_err();
        assert!(matches!(error, ResolveError::Configuration(_)));

        let error = RelatedProductsResolver
            .resolve(&field, &context, &info, Some(&json!({})), &Object::new())
            .unwrap_err();
        assert!(matches!(error, ResolveError::Input(InputError::MissingParentKey { .. })));
    }

    #[test]
    fn related_products_in_link_order() {
        let mut provider = MockProductProvider::new();
        provider
            .expect_products_by_sku()
            .times(2)
            .returning(|skus| Ok(catalog(skus)));
        let load = RelatedProductsBatchLoad::new(Arc::new(provider));

        let related = load
            .load(&["24-MB01".to_owned(), "24-MB02".to_owned(), "unknown".to_owned()])
            .unwrap();

        let skus = |sku: &str| {
            related[sku]
                .as_array()
                .unwrap()
                .iter()
                .map(|product| product.as_object().unwrap().get("sku").cloned().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(skus("24-MB01"), vec![json!("24-MB04"), json!("24-MB02")]);
        assert_eq!(skus("24-MB02"), Vec::<Value>::new());
        assert!(!related.contains_key("unknown"));
    }

    #[test]
    fn no_links_means_one_provider_call() {
        let mut provider = MockProductProvider::new();
        provider
            .expect_products_by_sku()
            .times(1)
            .returning(|skus| Ok(catalog(skus)));
        let load = RelatedProductsBatchLoad::new(Arc::new(provider));
        let related = load.load(&["24-MB02".to_owned()]).unwrap();
        assert_eq!(related["24-MB02"], json!([]));
    }
}
