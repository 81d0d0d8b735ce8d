//! Field selections, built in code or parsed from an executable document.

use std::collections::HashMap;

use apollo_compiler::Node;
use apollo_compiler::ast;
use itertools::Itertools;
use serde_json::Number;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

use crate::error::InputError;
use crate::graphql::Object;

/// A field to resolve, with its arguments and sub-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) arguments: Object,
    pub(crate) selection: Vec<FieldRequest>,
    pub(crate) type_condition: Option<String>,
}

impl FieldRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: Object::new(),
            selection: Vec::new(),
            type_condition: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(ByteString::from(name), value.into());
        self
    }

    pub fn select(mut self, field: FieldRequest) -> Self {
        self.selection.push(field);
        self
    }

    /// Only resolve this field when the parent value is of `type_name`, or
    /// implements it.
    pub fn on(mut self, type_name: impl Into<String>) -> Self {
        self.type_condition = Some(type_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key of the field in the response: its alias, or its name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &Object {
        &self.arguments
    }

    pub fn selection(&self) -> &[FieldRequest] {
        &self.selection
    }

    pub fn type_condition(&self) -> Option<&str> {
        self.type_condition.as_deref()
    }
}

/// The selected operation of an executable document, with fragments inlined
/// and variables substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub(crate) root_type: String,
    pub(crate) selection: Vec<FieldRequest>,
}

impl Operation {
    /// Parses `query` and selects the operation to run.
    ///
    /// `operation_name` is required when the document holds more than one
    /// operation.
    pub fn parse(
        query: &str,
        operation_name: Option<&str>,
        variables: &Object,
    ) -> Result<Self, InputError> {
        let document = ast::Document::parse(query, "query.graphql").map_err(|e| {
            InputError::InvalidQuery {
                reason: e.errors.iter().join("\n"),
            }
        })?;

        let mut operations = Vec::new();
        let mut fragments = HashMap::new();
        for definition in &document.definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => operations.push(operation),
                ast::Definition::FragmentDefinition(fragment) => {
                    fragments.insert(fragment.name.as_str(), fragment);
                }
                _ => {}
            }
        }

        let operation = match operation_name {
            Some(name) => operations
                .iter()
                .find(|operation| operation.name.as_ref().is_some_and(|n| n.as_str() == name))
                .ok_or_else(|| InputError::InvalidOperation {
                    reason: format!("unknown operation named `{name}`"),
                })?,
            None => match operations.as_slice() {
                [operation] => operation,
                [] => {
                    return Err(InputError::InvalidOperation {
                        reason: "document does not contain any operation".to_owned(),
                    });
                }
                _ => {
                    return Err(InputError::InvalidOperation {
                        reason: "must provide operation name if query contains multiple operations"
                            .to_owned(),
                    });
                }
            },
        };

        let root_type = match operation.operation_type {
            ast::OperationType::Query => "Query",
            ast::OperationType::Mutation => "Mutation",
            ast::OperationType::Subscription => {
                return Err(InputError::InvalidOperation {
                    reason: "subscriptions are not supported".to_owned(),
                });
            }
        };

        // Declared variables only. Missing ones take their default, or null.
        let mut values = Object::new();
        for definition in &operation.variables {
            let name = definition.name.as_str();
            let value = match variables.get(name) {
                Some(value) => value.clone(),
                None => match &definition.default_value {
                    Some(default) => to_json(default, &Object::new())?,
                    None => Value::Null,
                },
            };
            values.insert(ByteString::from(name), value);
        }

        let mut flattener = Flattener {
            fragments,
            variables: values,
            spreading: Vec::new(),
        };
        let selection = flattener.selection_set(&operation.selection_set, None)?;
        Ok(Self {
            root_type: root_type.to_owned(),
            selection,
        })
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn selection(&self) -> &[FieldRequest] {
        &self.selection
    }
}

struct Flattener<'a> {
    fragments: HashMap<&'a str, &'a Node<ast::FragmentDefinition>>,
    variables: Object,
    // Names of the fragments being spread, to reject cycles.
    spreading: Vec<&'a str>,
}

impl<'a> Flattener<'a> {
    fn selection_set(
        &mut self,
        selections: &'a [ast::Selection],
        type_condition: Option<&str>,
    ) -> Result<Vec<FieldRequest>, InputError> {
        let mut fields = Vec::new();
        for selection in selections {
            match selection {
                ast::Selection::Field(field) => {
                    if !self.included(&field.directives)? {
                        continue;
                    }
                    fields.push(self.field(field, type_condition)?);
                }
                ast::Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives)? {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    let fragment = *self.fragments.get(name).ok_or_else(|| {
                        InputError::UndefinedFragment {
                            name: name.to_owned(),
                        }
                    })?;
                    if self.spreading.contains(&name) {
                        return Err(InputError::InvalidOperation {
                            reason: format!("fragment `{name}` spreads itself"),
                        });
                    }
                    self.spreading.push(name);
                    let spread_fields = self.selection_set(
                        &fragment.selection_set,
                        Some(fragment.type_condition.as_str()),
                    );
                    self.spreading.pop();
                    fields.extend(spread_fields?);
                }
                ast::Selection::InlineFragment(inline) => {
                    if !self.included(&inline.directives)? {
                        continue;
                    }
                    let condition = inline
                        .type_condition
                        .as_ref()
                        .map(|name| name.as_str())
                        .or(type_condition);
                    fields.extend(self.selection_set(&inline.selection_set, condition)?);
                }
            }
        }
        Ok(fields)
    }

    fn field(
        &mut self,
        field: &'a ast::Field,
        type_condition: Option<&str>,
    ) -> Result<FieldRequest, InputError> {
        let mut arguments = Object::new();
        for argument in &field.arguments {
            arguments.insert(
                ByteString::from(argument.name.as_str()),
                to_json(&argument.value, &self.variables)?,
            );
        }
        Ok(FieldRequest {
            name: field.name.as_str().to_owned(),
            alias: field.alias.as_ref().map(|alias| alias.as_str().to_owned()),
            arguments,
            selection: self.selection_set(&field.selection_set, None)?,
            type_condition: type_condition.map(str::to_owned),
        })
    }

    /// Applies `@skip(if:)` and `@include(if:)`.
    fn included(&self, directives: &ast::DirectiveList) -> Result<bool, InputError> {
        for (name, expected) in [("skip", false), ("include", true)] {
            let Some(directive) = directives.get(name) else {
                continue;
            };
            let condition = match directive.specified_argument_by_name("if") {
                Some(value) => to_json(value, &self.variables)?,
                None => Value::Null,
            };
            match condition {
                Value::Bool(condition) if condition != expected => return Ok(false),
                Value::Bool(_) => {}
                other => {
                    return Err(InputError::InvalidArgument {
                        name: "if".to_owned(),
                        reason: format!("@{name} expects a boolean, got {other}"),
                    });
                }
            }
        }
        Ok(true)
    }
}

fn to_json(value: &ast::Value, variables: &Object) -> Result<Value, InputError> {
    Ok(match value {
        ast::Value::Null => Value::Null,
        ast::Value::Enum(name) => Value::String(ByteString::from(name.as_str())),
        ast::Value::Variable(name) => variables.get(name.as_str()).cloned().ok_or_else(|| {
            InputError::UndefinedVariable {
                name: name.as_str().to_owned(),
            }
        })?,
        ast::Value::String(s) => Value::String(ByteString::from(s.as_str())),
        ast::Value::Float(f) => f
            .try_to_f64()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| InputError::InvalidQuery {
                reason: format!("`{f}` is not a valid float"),
            })?,
        ast::Value::Int(i) => match i.as_str().parse::<i64>() {
            Ok(int) => Value::Number(int.into()),
            Err(_) => i
                .as_str()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| InputError::InvalidQuery {
                    reason: format!("`{i}` is not a valid integer"),
                })?,
        },
        ast::Value::Boolean(b) => Value::Bool(*b),
        ast::Value::List(items) => Value::Array(
            items
                .iter()
                .map(|item| to_json(item, variables))
                .collect::<Result<_, _>>()?,
        ),
        ast::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| Ok((ByteString::from(name.as_str()), to_json(value, variables)?)))
                .collect::<Result<_, InputError>>()?,
        ),
    })
}
