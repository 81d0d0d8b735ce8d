//! Catalog data providers.
//!
//! Resolvers fetch data only through these traits. [`InMemoryCatalog`]
//! implements all of them over fixed data.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub url_key: String,
    #[serde(default)]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub product_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub url_key: String,
    pub price: f64,
    #[serde(default)]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub sku: String,
    pub qty: f64,
    pub is_in_stock: bool,
}

#[cfg_attr(test, mockall::automock)]
pub trait CategoryProvider: Send + Sync {
    fn category(&self, id: u32, store: &str) -> Result<Option<Category>, ProviderError>;

    /// Active children of `id`, in position order.
    fn children(&self, id: u32, store: &str) -> Result<Vec<Category>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait StockProvider: Send + Sync {
    fn stock_item(&self, sku: &str) -> Result<Option<StockItem>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ProductProvider: Send + Sync {
    /// The products found among `skus`. Unknown skus are left out.
    fn products_by_sku(&self, skus: &[String]) -> Result<Vec<Product>, ProviderError>;
}

/// Catalog data held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryCatalog {
    categories: IndexMap<u32, Category>,
    products: IndexMap<String, Product>,
    stock: IndexMap<String, StockItem>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category.id, category);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.sku.clone(), product);
        self
    }

    pub fn with_stock(mut self, item: StockItem) -> Self {
        self.stock.insert(item.sku.clone(), item);
        self
    }
}

impl CategoryProvider for InMemoryCatalog {
    fn category(&self, id: u32, _store: &str) -> Result<Option<Category>, ProviderError> {
        Ok(self
            .categories
            .get(&id)
            .filter(|category| category.is_active)
            .cloned())
    }

    fn children(&self, id: u32, _store: &str) -> Result<Vec<Category>, ProviderError> {
        Ok(self
            .categories
            .values()
            .filter(|category| category.parent_id == Some(id) && category.is_active)
            .cloned()
            .collect())
    }
}

impl StockProvider for InMemoryCatalog {
    fn stock_item(&self, sku: &str) -> Result<Option<StockItem>, ProviderError> {
        Ok(self.stock.get(sku).cloned())
    }
}

impl ProductProvider for InMemoryCatalog {
    fn products_by_sku(&self, skus: &[String]) -> Result<Vec<Product>, ProviderError> {
        Ok(skus
            .iter()
            .filter_map(|sku| self.products.get(sku))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn category(id: u32, parent_id: Option<u32>, is_active: bool) -> Category {
        Category {
            id,
            name: format!("Category {id}"),
            url_key: format!("category-{id}"),
            parent_id,
            level: if parent_id.is_some() { 3 } else { 2 },
            product_count: 0,
            is_active,
        }
    }

    #[test]
    fn inactive_categories_are_hidden() {
        let catalog = InMemoryCatalog::new()
            .with_category(category(20, None, true))
            .with_category(category(21, Some(20), true))
            .with_category(category(22, Some(20), false))
            .with_category(category(23, Some(20), true));

        assert!(catalog.category(22, "default").unwrap().is_none());
        assert_eq!(
            catalog
                .children(20, "default")
                .unwrap()
                .into_iter()
                .map(|child| child.id)
                .collect::<Vec<_>>(),
            vec![21, 23]
        );
    }

    #[test]
    fn catalog_from_yaml() {
        let catalog: InMemoryCatalog = serde_yaml::from_str(
            r#"
products:
  24-MB01:
    sku: 24-MB01
    name: Joust Duffle Bag
    url_key: joust-duffle-bag
    price: 34.0
    related: [24-MB04]
stock:
  24-MB01:
    sku: 24-MB01
    qty: 100
    is_in_stock: true
"#,
        )
        .unwrap();

        let products = catalog
            .products_by_sku(&["24-MB01".to_owned(), "unknown".to_owned()])
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].related, vec!["24-MB04"]);
        assert_eq!(
            catalog.stock_item("24-MB01").unwrap().map(|item| item.qty),
            Some(100.0)
        );
    }
}
