//! Execution of a field selection against registered resolvers.
//!
//! Fields are resolved in selection order. A resolver may return a deferred
//! value: the field is left `null` until every field of the current pass has
//! been visited, then the deferred values are loaded batch by batch and their
//! sub-selections resolved, which may defer again.

mod selection;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

pub use self::selection::FieldRequest;
pub use self::selection::Operation;
use crate::error::ConfigurationError;
use crate::error::InputError;
use crate::error::ResolveError;
use crate::graphql;
use crate::graphql::Object;
use crate::graphql::Path;
use crate::graphql::PathElement;
use crate::graphql::Response;
use crate::resolver::BatchLoad;
use crate::resolver::BatchLoader;
use crate::resolver::Deferred;
use crate::resolver::FieldResolver;
use crate::resolver::ResolveContext;
use crate::resolver::ResolveInfo;
use crate::resolver::Resolved;
use crate::schema::ConfigElement;
use crate::schema::ConfigStore;
use crate::schema::FieldElement;

const TYPENAME: &str = "__typename";

/// Resolvers keyed by parent type and field name, and the batch loaders they
/// use.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: IndexMap<String, IndexMap<String, Arc<dyn FieldResolver>>>,
    loaders: IndexMap<String, Arc<dyn BatchLoad>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field(
                "resolvers",
                &self
                    .resolvers
                    .iter()
                    .flat_map(|(type_name, fields)| {
                        fields.keys().map(move |field| format!("{type_name}.{field}"))
                    })
                    .collect::<Vec<_>>(),
            )
            .field("loaders", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resolver` for `field` of `type_name`. An interface
    /// registration applies to every type implementing it, unless the type
    /// has its own.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        resolver: Arc<dyn FieldResolver>,
    ) {
        self.resolvers
            .entry(type_name.into())
            .or_default()
            .insert(field.into(), resolver);
    }

    pub fn with_resolver(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        resolver: Arc<dyn FieldResolver>,
    ) -> Self {
        self.register(type_name, field, resolver);
        self
    }

    /// Registers a batch loader, instantiated once per request.
    pub fn register_batch_loader(&mut self, name: impl Into<String>, load: Arc<dyn BatchLoad>) {
        self.loaders.insert(name.into(), load);
    }

    pub fn with_batch_loader(mut self, name: impl Into<String>, load: Arc<dyn BatchLoad>) -> Self {
        self.register_batch_loader(name, load);
        self
    }

    /// The resolver of `field` on `type_name`, falling back to the interfaces
    /// the type implements, in declaration order.
    pub fn get(
        &self,
        schema: &ConfigStore,
        type_name: &str,
        field: &str,
    ) -> Option<&Arc<dyn FieldResolver>> {
        self.get_exact(type_name, field).or_else(|| {
            let element = schema.get_type(type_name).ok()?;
            element
                .interfaces()
                .iter()
                .find_map(|interface| self.get_exact(interface, field))
        })
    }

    pub fn contains(&self, type_name: &str, field: &str) -> bool {
        self.get_exact(type_name, field).is_some()
    }

    /// Checks every registration names a field of the schema.
    pub fn validate(&self, schema: &ConfigStore) -> Result<(), ConfigurationError> {
        for (type_name, fields) in &self.resolvers {
            for field in fields.keys() {
                schema.get_field(type_name, field).inspect_err(|error| {
                    tracing::error!(%error, "resolver registered for an unknown field");
                })?;
            }
        }
        Ok(())
    }

    fn get_exact(&self, type_name: &str, field: &str) -> Option<&Arc<dyn FieldResolver>> {
        self.resolvers
            .get(type_name)
            .and_then(|fields| fields.get(field))
    }

    fn request_loaders(&self) -> HashMap<String, Arc<BatchLoader>> {
        self.loaders
            .iter()
            .map(|(name, load)| (name.clone(), BatchLoader::new(name.clone(), load.clone())))
            .collect()
    }
}

/// Runs selections against a schema and a resolver registry.
#[derive(Debug, Clone)]
pub struct Executor {
    schema: Arc<ConfigStore>,
    registry: Arc<ResolverRegistry>,
}

impl Executor {
    /// Fails when the registry names fields the schema does not have.
    pub fn new(
        schema: Arc<ConfigStore>,
        registry: Arc<ResolverRegistry>,
    ) -> Result<Self, ConfigurationError> {
        registry.validate(&schema)?;
        Ok(Self { schema, registry })
    }

    pub fn schema(&self) -> &Arc<ConfigStore> {
        &self.schema
    }

    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    /// Resolves `selection` on `root_type`.
    ///
    /// Field input and provider errors are reported in the response. A
    /// selection the schema does not allow, or any configuration error met
    /// while resolving, fails the whole execution.
    #[tracing::instrument(skip_all, fields(root_type = root_type), level = "debug")]
    pub fn execute(
        &self,
        context: &ResolveContext,
        root_type: &str,
        selection: &[FieldRequest],
    ) -> Result<Response, ConfigurationError> {
        self.validate(root_type, selection)?;
        self.run(context, root_type, selection)
    }

    /// Parses and resolves a GraphQL query.
    ///
    /// A query that does not parse, or selects fields the schema does not
    /// have, gives a response without data.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn execute_query(
        &self,
        context: &ResolveContext,
        query: &str,
        operation_name: Option<&str>,
        variables: &Object,
    ) -> Result<Response, ConfigurationError> {
        let operation = match Operation::parse(query, operation_name, variables) {
            Ok(operation) => operation,
            Err(error) => {
                tracing::warn!(%error, "invalid query");
                return Ok(request_error(error));
            }
        };
        match self.validate(operation.root_type(), operation.selection()) {
            Ok(()) => {}
            Err(ConfigurationError::UnknownField { type_name, field }) => {
                return Ok(request_error(InputError::UnknownField { type_name, field }));
            }
            Err(
                ConfigurationError::ElementNotFound { name }
                | ConfigurationError::UnexpectedElementKind { name, .. },
            ) => {
                return Ok(request_error(InputError::UnknownType { name }));
            }
            Err(error) => return Err(error),
        }
        self.run(context, operation.root_type(), operation.selection())
    }

    fn validate(&self, parent_type: &str, selection: &[FieldRequest]) -> Result<(), ConfigurationError> {
        for field in selection {
            if field.name() == TYPENAME {
                continue;
            }
            let owner = field.type_condition().unwrap_or(parent_type);
            let element = self.schema.get_field(owner, field.name())?;
            if !field.selection().is_empty() {
                self.validate(element.named_type(), field.selection())?;
            }
        }
        Ok(())
    }

    fn run(
        &self,
        context: &ResolveContext,
        root_type: &str,
        selection: &[FieldRequest],
    ) -> Result<Response, ConfigurationError> {
        let loaders = self.registry.request_loaders();
        let mut execution = Execution {
            schema: &self.schema,
            registry: &self.registry,
            context,
            loaders: &loaders,
            errors: Vec::new(),
            deferred: Vec::new(),
        };

        let root = execution.selection_set(root_type, selection, None, &Path::default())?;
        let mut data = Value::Object(root);

        let mut pass = 0;
        while !execution.deferred.is_empty() {
            pass += 1;
            let fields = std::mem::take(&mut execution.deferred);
            tracing::debug!(pass, fields = fields.len(), "resolving deferred fields");
            for field in fields {
                let value = match field.deferred.resolve() {
                    Ok(value) => {
                        execution.complete_value(&field.element, &field.request, value, &field.path)?
                    }
                    Err(error) => {
                        tracing::warn!(path = %field.path, %error, "deferred field failed");
                        execution.errors.push(error.to_graphql_error(field.path.clone()));
                        Value::Null
                    }
                };
                if let Some(slot) = value_at_mut(&mut data, &field.path) {
                    *slot = value;
                }
            }
        }

        Ok(Response {
            data: Some(data),
            errors: execution.errors,
        })
    }
}

fn request_error(error: InputError) -> Response {
    Response {
        data: None,
        errors: vec![error.to_request_error()],
    }
}

fn value_at_mut<'a>(data: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    path.0.iter().try_fold(data, |value, element| match element {
        PathElement::Key(key) => value.as_object_mut()?.get_mut(key.as_str()),
        PathElement::Index(index) => value.as_array_mut()?.get_mut(*index),
    })
}

/// A field whose value waits on a batch loader.
struct DeferredField {
    deferred: Deferred,
    element: FieldElement,
    request: FieldRequest,
    path: Path,
}

struct Execution<'a> {
    schema: &'a ConfigStore,
    registry: &'a ResolverRegistry,
    context: &'a ResolveContext,
    loaders: &'a HashMap<String, Arc<BatchLoader>>,
    errors: Vec<graphql::Error>,
    deferred: Vec<DeferredField>,
}

impl Execution<'_> {
    fn selection_set(
        &mut self,
        parent_type: &str,
        selection: &[FieldRequest],
        parent: Option<&Value>,
        path: &Path,
    ) -> Result<Object, ConfigurationError> {
        let mut object = Object::new();
        for (key, request) in self.collect_fields(parent_type, selection) {
            if request.name() == TYPENAME {
                object.insert(ByteString::from(key), Value::String(ByteString::from(parent_type)));
                continue;
            }
            let field_path = path.join_key(key);
            let value = self.field(parent_type, &request, parent, &field_path)?;
            object.insert(ByteString::from(key), value);
        }
        Ok(object)
    }

    /// Groups the fields that apply to `parent_type` by response key. Fields
    /// sharing a key resolve once, with their sub-selections concatenated.
    fn collect_fields<'s>(
        &self,
        parent_type: &str,
        selection: &'s [FieldRequest],
    ) -> IndexMap<&'s str, FieldRequest> {
        let mut fields: IndexMap<&str, FieldRequest> = IndexMap::new();
        for request in selection {
            if request.type_condition().is_some_and(|condition| {
                condition != parent_type && !self.schema.is_subtype(condition, parent_type)
            }) {
                continue;
            }
            match fields.entry(request.response_key()) {
                Entry::Occupied(mut entry) => entry
                    .get_mut()
                    .selection
                    .extend(request.selection().iter().cloned()),
                Entry::Vacant(entry) => {
                    entry.insert(request.clone());
                }
            }
        }
        fields
    }

    fn field(
        &mut self,
        parent_type: &str,
        request: &FieldRequest,
        parent: Option<&Value>,
        path: &Path,
    ) -> Result<Value, ConfigurationError> {
        let element = self.schema.get_field(parent_type, request.name())?;
        let resolved = match self.registry.get(self.schema, parent_type, request.name()) {
            Some(resolver) => {
                tracing::trace!(%path, parent_type, "resolving field");
                let info = ResolveInfo::new(parent_type, path, self.schema, self.loaders);
                resolver.resolve(element, self.context, &info, parent, request.arguments())
            }
            None => Ok(Resolved::Value(
                parent
                    .and_then(Value::as_object)
                    .and_then(|object| object.get(request.name()))
                    .cloned()
                    .unwrap_or(Value::Null),
            )),
        };

        match resolved {
            Ok(Resolved::Value(value)) => self.complete_value(element, request, value, path),
            Ok(Resolved::Deferred(deferred)) => {
                self.deferred.push(DeferredField {
                    deferred,
                    element: element.clone(),
                    request: request.clone(),
                    path: path.clone(),
                });
                Ok(Value::Null)
            }
            Err(ResolveError::Configuration(error)) => {
                tracing::error!(%path, %error, "field resolution aborted the request");
                Err(error)
            }
            Err(error) => {
                tracing::warn!(%path, %error, "field resolution failed");
                self.errors.extend(error.to_graphql_error(path));
                Ok(Value::Null)
            }
        }
    }

    fn complete_value(
        &mut self,
        element: &FieldElement,
        request: &FieldRequest,
        value: Value,
        path: &Path,
    ) -> Result<Value, ConfigurationError> {
        if request.selection().is_empty() {
            return Ok(value);
        }
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    self.complete_value(element, request, item, &path.join_index(index))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(_) => {
                let concrete_type = self.concrete_type(element, &value, path)?;
                self.selection_set(&concrete_type, request.selection(), Some(&value), path)
                    .map(Value::Object)
            }
            other => Ok(other),
        }
    }

    /// The object type of a value: its `__typename`, the declared type of the
    /// field, or the only implementation of the declared interface.
    fn concrete_type(
        &self,
        element: &FieldElement,
        value: &Value,
        path: &Path,
    ) -> Result<String, ConfigurationError> {
        if let Some(type_name) = value
            .as_object()
            .and_then(|object| object.get(TYPENAME))
            .and_then(Value::as_str)
        {
            return Ok(type_name.to_owned());
        }
        let named_type = element.named_type();
        if !matches!(
            self.schema.get_config_element(named_type),
            Some(ConfigElement::Interface(_))
        ) {
            return Ok(named_type.to_owned());
        }
        match self.schema.implementations(named_type).as_slice() {
            [implementation] => Ok(implementation.name().to_owned()),
            _ => Err(ConfigurationError::InvalidConfiguration {
                message: "value of an interface type does not name its object type",
                error: format!("`{named_type}` at `{path}`"),
            }),
        }
    }
}
