use std::sync::Arc;

use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

use crate::catalog::StockItem;
use crate::catalog::StockProvider;
use crate::error::InputError;
use crate::error::ResolveError;
use crate::graphql::Object;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::resolver::key_string;
use crate::resolver::require_parent_key;
use crate::schema::FieldElement;

pub const IN_STOCK: &str = "IN_STOCK";
pub const OUT_OF_STOCK: &str = "OUT_OF_STOCK";

/// `ProductInterface.stock_status`.
///
/// A product is in stock when its stock item says so and its quantity is
/// above the configured threshold. Products without a stock item are out of
/// stock.
pub struct StockStatusResolver {
    provider: Arc<dyn StockProvider>,
    threshold: f64,
}

impl StockStatusResolver {
    pub fn new(provider: Arc<dyn StockProvider>, threshold: f64) -> Self {
        Self {
            provider,
            threshold,
        }
    }

    fn status(&self, item: Option<&StockItem>) -> &'static str {
        match item {
            Some(item) if item.is_in_stock && item.qty > self.threshold => IN_STOCK,
            _ => OUT_OF_STOCK,
        }
    }
}

impl FieldResolver for StockStatusResolver {
    fn resolve(
        &self,
        _field: &FieldElement,
        _context: &ResolveContext,
        _info: &ResolveInfo<'_>,
        value: Option<&Value>,
        _args: &Object,
    ) -> Result<Resolved, ResolveError> {
        let sku = require_parent_key(value, "sku")?;
        let sku = key_string(sku).ok_or_else(|| InputError::InvalidArgument {
            name: "sku".to_owned(),
            reason: format!("expected a string, got {sku}"),
        })?;
        let item = self.provider.stock_item(&sku)?;
        let status = self.status(item.as_ref());
        tracing::trace!(sku = sku.as_str(), status, "computed stock status");
        Ok(Value::String(ByteString::from(status)).into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json_bytes::json;

    use super::*;
    use crate::catalog::MockStockProvider;
    use crate::configuration::Configuration;
    use crate::graphql::Path;
    use crate::schema::ConfigStore;

    fn resolve(resolver: &StockStatusResolver, parent: &Value) -> Result<Resolved, ResolveError> {
        let schema = ConfigStore::default();
        let loaders = HashMap::new();
        let path = Path::default().join_key("product").join_key("stock_status");
        let info = ResolveInfo::new("SimpleProduct", &path, &schema, &loaders);
        let context = ResolveContext::from_configuration(&Configuration::default());
        let field = FieldElement::new("stock_status", "ProductStockStatus");
        resolver.resolve(&field, &context, &info, Some(parent), &Object::new())
    }

    #[rstest]
    #[case::plenty(Some((100.0, true)), 0.0, IN_STOCK)]
    #[case::flagged_out(Some((100.0, false)), 0.0, OUT_OF_STOCK)]
    #[case::at_threshold(Some((2.0, true)), 2.0, OUT_OF_STOCK)]
    #[case::above_threshold(Some((3.0, true)), 2.0, IN_STOCK)]
    #[case::no_stock_item(None, 0.0, OUT_OF_STOCK)]
    fn stock_status(
        #[case] stock: Option<(f64, bool)>,
        #[case] threshold: f64,
        #[case] expected: &str,
    ) {
        let mut provider = MockStockProvider::new();
        provider
            .expect_stock_item()
            .withf(|sku| sku == "24-MB01")
            .times(1)
            .returning(move |sku| {
                Ok(stock.map(|(qty, is_in_stock)| StockItem {
                    sku: sku.to_owned(),
                    qty,
                    is_in_stock,
                }))
            });
        let resolver = StockStatusResolver::new(Arc::new(provider), threshold);

        match resolve(&resolver, &json!({ "sku": "24-MB01" })).unwrap() {
            Resolved::Value(value) => assert_eq!(value, json!(expected)),
            Resolved::Deferred(_) => panic!("stock status is not deferred"),
        }
    }

    #[test]
    fn sku_is_required() {
        let mut provider = MockStockProvider::new();
        provider.expect_stock_item().never();
        let resolver = StockStatusResolver::new(Arc::new(provider), 0.0);

        let error = resolve(&resolver, &json!({ "name": "Joust Duffle Bag" })).unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Input(InputError::MissingParentKey { key }) if key == "sku"
        ));
    }
}
