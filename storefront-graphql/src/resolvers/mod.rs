//! The storefront resolvers and the registry wiring them to the storefront
//! schema.

mod category;
mod filter_attributes;
mod product;
mod sort_fields;
mod stock_status;

use std::sync::Arc;

pub use self::category::CategoryChildrenResolver;
pub use self::category::CategoryResolver;
pub use self::filter_attributes::FilterAttributesResolver;
pub use self::product::PRODUCTS_LOADER;
pub use self::product::ProductBatchLoad;
pub use self::product::ProductResolver;
pub use self::product::RELATED_PRODUCTS_LOADER;
pub use self::product::RelatedProductsBatchLoad;
pub use self::product::RelatedProductsResolver;
pub use self::sort_fields::SortFieldsResolver;
pub use self::stock_status::IN_STOCK;
pub use self::stock_status::OUT_OF_STOCK;
pub use self::stock_status::StockStatusResolver;
use crate::attributes::EntityAttributeAggregator;
use crate::catalog::CategoryProvider;
use crate::catalog::InMemoryCatalog;
use crate::catalog::ProductProvider;
use crate::catalog::StockProvider;
use crate::configuration::Configuration;
use crate::error::ConfigurationError;
use crate::execution::Executor;
use crate::execution::ResolverRegistry;
use crate::schema::ConfigStore;

/// The schema the storefront resolvers are registered against.
pub const STOREFRONT_SCHEMA: &str = include_str!("storefront.graphqls");

/// The data providers behind the storefront resolvers.
#[derive(Clone)]
pub struct Providers {
    pub categories: Arc<dyn CategoryProvider>,
    pub stock: Arc<dyn StockProvider>,
    pub products: Arc<dyn ProductProvider>,
}

impl Providers {
    /// Every provider served by the same catalog.
    pub fn from_catalog(catalog: Arc<InMemoryCatalog>) -> Self {
        Self {
            categories: catalog.clone(),
            stock: catalog.clone(),
            products: catalog,
        }
    }
}

/// Registers the storefront resolvers and their batch loaders.
///
/// Fails when the entity attributes configuration does not match `schema`.
pub fn storefront_registry(
    configuration: Arc<Configuration>,
    schema: &Arc<ConfigStore>,
    providers: Providers,
) -> Result<ResolverRegistry, ConfigurationError> {
    configuration.validate_against(schema)?;
    let aggregator = EntityAttributeAggregator::new(schema.clone());

    Ok(ResolverRegistry::new()
        .with_resolver(
            "Query",
            "category",
            Arc::new(CategoryResolver::new(providers.categories.clone())),
        )
        .with_resolver(
            "CategoryTree",
            "children",
            Arc::new(CategoryChildrenResolver::new(providers.categories)),
        )
        .with_resolver("Query", "product", Arc::new(ProductResolver))
        .with_resolver(
            "Query",
            "sortFields",
            Arc::new(SortFieldsResolver::new(
                aggregator.clone(),
                configuration.clone(),
            )),
        )
        .with_resolver(
            "Query",
            "filterAttributes",
            Arc::new(FilterAttributesResolver::new(aggregator, configuration.clone())),
        )
        .with_resolver(
            "ProductInterface",
            "stock_status",
            Arc::new(StockStatusResolver::new(
                providers.stock,
                configuration.stock.threshold,
            )),
        )
        .with_resolver(
            "ProductInterface",
            "related_products",
            Arc::new(RelatedProductsResolver),
        )
        .with_batch_loader(
            PRODUCTS_LOADER,
            Arc::new(ProductBatchLoad::new(providers.products.clone())),
        )
        .with_batch_loader(
            RELATED_PRODUCTS_LOADER,
            Arc::new(RelatedProductsBatchLoad::new(providers.products)),
        ))
}

/// An executor over [`STOREFRONT_SCHEMA`] with the storefront resolvers.
pub fn storefront_executor(
    configuration: Configuration,
    providers: Providers,
) -> Result<Executor, ConfigurationError> {
    let schema = Arc::new(ConfigStore::parse(STOREFRONT_SCHEMA, "storefront.graphqls")?);
    let registry = storefront_registry(Arc::new(configuration), &schema, providers)?;
    Executor::new(schema, Arc::new(registry))
}
