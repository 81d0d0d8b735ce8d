//! ## Usage
//!
//! GraphQL field resolution for a storefront API: an immutable schema
//! [`ConfigStore`], the [`EntityAttributeAggregator`] used to build filter and
//! sort capability lists, the [`FieldResolver`] seam with the storefront
//! resolvers, and an [`Executor`] that drives them for a selection of fields.
//!
//! The store is built once, at schema compilation time, and shared between
//! requests:
//!
//! ```ignore
//! let store = Arc::new(ConfigStore::parse(sdl, "schema.graphqls")?);
//! let attributes = EntityAttributeAggregator::new(store.clone())
//!     .get_entity_attributes("CategoryTree", &["custom_attr".to_owned()])?;
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod attributes;
pub mod catalog;
pub mod configuration;
pub mod error;
pub mod execution;
pub mod graphql;
pub mod resolver;
pub mod resolvers;
pub mod schema;

pub use crate::attributes::AttributeLabel;
pub use crate::attributes::AttributeSet;
pub use crate::attributes::EntityAttributeAggregator;
pub use crate::configuration::Configuration;
pub use crate::error::ConfigurationError;
pub use crate::error::InputError;
pub use crate::error::ResolveError;
pub use crate::error::SchemaError;
pub use crate::execution::Executor;
pub use crate::execution::ResolverRegistry;
pub use crate::graphql::Response;
pub use crate::resolver::FieldResolver;
pub use crate::resolver::ResolveContext;
pub use crate::resolver::ResolveInfo;
pub use crate::resolver::Resolved;
pub use crate::schema::ConfigElement;
pub use crate::schema::ConfigStore;

const _: () = {
    const fn assert_thread_safe<T: Sync + Send>() {}

    assert_thread_safe::<ConfigStore>();
    assert_thread_safe::<ResolverRegistry>();
    assert_thread_safe::<Executor>();
};
