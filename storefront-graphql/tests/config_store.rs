use std::io::Write;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use storefront_graphql::ConfigElement;
use storefront_graphql::ConfigStore;
use storefront_graphql::ConfigurationError;
use storefront_graphql::EntityAttributeAggregator;
use storefront_graphql::SchemaError;
use storefront_graphql::attributes::AttributeLabel;
use storefront_graphql::error::ElementKind;
use storefront_graphql::resolvers::STOREFRONT_SCHEMA;
use storefront_graphql::schema::ConfigDocument;
use test_log::test;

fn storefront() -> Arc<ConfigStore> {
    Arc::new(ConfigStore::parse(STOREFRONT_SCHEMA, "storefront.graphqls").unwrap())
}

#[test]
fn storefront_schema_elements() {
    let store = storefront();

    let category_tree = store.get_type("CategoryTree").unwrap();
    assert_eq!(category_tree.interfaces(), ["CategoryInterface".to_owned()]);
    assert_eq!(
        category_tree.field("children").map(|field| field.type_ref()),
        Some("[CategoryTree]")
    );

    let query = store.get_type("Query").unwrap();
    let category = query.field("category").unwrap();
    assert_eq!(category.description(), Some("A category and its subtree."));
    assert_eq!(category.arguments()[0].name(), "id");
    assert_eq!(category.named_type(), "CategoryTree");

    assert!(matches!(
        store.get_config_element("ProductStockStatus"),
        Some(ConfigElement::Enum(element)) if element.values() == ["IN_STOCK".to_owned(), "OUT_OF_STOCK".to_owned()]
    ));
    assert_eq!(
        store
            .implementations("ProductInterface")
            .into_iter()
            .map(|element| element.name())
            .collect::<Vec<_>>(),
        vec!["SimpleProduct"]
    );
    assert!(store.get_config_element("String").is_none());
    assert!(store.get_config_element("__Schema").is_none());
}

#[test]
fn aggregation_over_the_storefront_schema() {
    let aggregator = EntityAttributeAggregator::new(storefront());

    let attributes = aggregator
        .get_entity_attributes("CategoryTree", &["custom_attr".to_owned()])
        .unwrap();
    assert_eq!(
        attributes.names(),
        vec!["id", "name", "url_key", "level", "product_count", "custom_attr"]
    );
    assert_eq!(attributes.label("name"), Some(AttributeLabel::String));
    assert_eq!(attributes.label("custom_attr"), Some(AttributeLabel::Empty));

    let attributes = aggregator
        .get_entity_attributes("CategoryTree", &["name".to_owned()])
        .unwrap();
    assert_eq!(attributes.len(), 5);

    let error = aggregator
        .get_entity_attributes("ProductInterface", &[])
        .unwrap_err();
    assert!(matches!(
        error,
        ConfigurationError::UnexpectedElementKind {
            actual: ElementKind::Interface,
            ..
        }
    ));
}

#[test]
fn sdl_and_documents_together() {
    let document: ConfigDocument = serde_yaml::from_str(
        r#"
CmsPage:
  kind: type
  implements: [RoutableInterface]
  fields:
    title: String
    url_key: String
RoutableInterface:
  kind: interface
  fields:
    url_key:
      type: String
      description: The part of the URL identifying the page
    relative_url: String
"#,
    )
    .unwrap();
    let store = ConfigStore::builder()
        .sdl(STOREFRONT_SCHEMA, "storefront.graphqls")
        .document(document)
        .build()
        .unwrap();

    let aggregator = EntityAttributeAggregator::new(Arc::new(store));
    let attributes = aggregator
        .get_entity_attributes("CmsPage", &["title".to_owned()])
        .unwrap();
    assert_eq!(attributes.names(), vec!["url_key", "relative_url", "title"]);
    assert_eq!(
        aggregator
            .store()
            .get_interface("RoutableInterface")
            .unwrap()
            .field("url_key")
            .and_then(|field| field.description()),
        Some("The part of the URL identifying the page")
    );
}

#[test]
fn elements_are_defined_once() {
    let document: ConfigDocument =
        serde_yaml::from_str("CategoryTree:\n  kind: type\n  fields:\n    id: Int\n").unwrap();
    let error = ConfigStore::builder()
        .sdl(STOREFRONT_SCHEMA, "storefront.graphqls")
        .document(document)
        .build()
        .unwrap_err();
    assert!(matches!(error, SchemaError::DuplicateElement { name } if name == "CategoryTree"));
}

#[test]
fn read_schema_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(STOREFRONT_SCHEMA.as_bytes()).unwrap();
    let store = ConfigStore::read(file.path()).unwrap();
    assert_eq!(store, *storefront());

    let error = ConfigStore::read(file.path().with_extension("missing")).unwrap_err();
    assert!(matches!(error, SchemaError::Io(_)));
}
