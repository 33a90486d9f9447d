//! Top-level executor: operation selection, variable
//! coercion, and driving the root selection set to a finished [`Response`].
//!
//! Grounded on juniper's `execute_validated_query`/`execute` entry
//! points, which perform the same
//! find-operation → coerce-variables → execute-root-selection-set sequence
//! against a `RootNode` instead of a dynamic [`Schema`].

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use futures::future::join_all;

use crate::{
    ast::{Definition, Document, FieldNode, FragmentDefinition, Name, OperationDefinition, OperationType, Selection},
    complete::complete_value,
    context::{Context, Parent, Variables},
    deferred::Deferred,
    error::{ExecutionError, RequestError},
    middleware::MiddlewareChain,
    path::Path,
    resolve::{resolve_field, RequestState},
    response::Response,
    schema::Schema,
    value::Value,
    variables::coerce_variable_values,
};

/// Executes `document` against `schema`, selecting the operation named
/// `operation_name` (required only when the document has more than one
/// operation step 1).
///
/// A subscription operation is only valid here when `allow_subscriptions` is
/// false: it is then executed like a query against the subscription root, a
/// single settled [`Response`] rather than a stream. When
/// `allow_subscriptions` is true, use [`crate::execute_subscription`]
/// instead, which returns a stream of responses; this function rejects that
/// combination with [`RequestError::SubscriptionNotAllowed`].
///
/// Request errors (operation selection failures, variable coercion
/// failures) are returned as `Err` directly — they never reach a
/// [`Response`]'s `errors` list, since execution never began.
pub async fn execute(
    schema: &Arc<Schema>,
    document: &Document,
    operation_name: Option<&str>,
    root_value: Value,
    variable_input: &Variables,
    context: Context,
    middleware: MiddlewareChain,
    allow_subscriptions: bool,
) -> Result<Response, RequestError> {
    run(schema, document, operation_name, root_value, variable_input, context, middleware, false, allow_subscriptions).await
}

/// Like [`execute`], but surfaces caught resolver panics by re-raising them
/// out of this function instead of folding them into a field error
///.
pub async fn execute_reraising(
    schema: &Arc<Schema>,
    document: &Document,
    operation_name: Option<&str>,
    root_value: Value,
    variable_input: &Variables,
    context: Context,
    middleware: MiddlewareChain,
    allow_subscriptions: bool,
) -> Result<Response, RequestError> {
    run(schema, document, operation_name, root_value, variable_input, context, middleware, true, allow_subscriptions).await
}

#[allow(clippy::too_many_arguments)]
async fn run(
    schema: &Arc<Schema>,
    document: &Document,
    operation_name: Option<&str>,
    root_value: Value,
    variable_input: &Variables,
    context: Context,
    middleware: MiddlewareChain,
    exceptions_are_reraised: bool,
    allow_subscriptions: bool,
) -> Result<Response, RequestError> {
    let (operation, fragments) = select_operation(document, operation_name)?;
    if operation.operation_type == OperationType::Subscription && allow_subscriptions {
        return Err(RequestError::SubscriptionNotAllowed);
    }
    let root_type = root_type_name(schema, operation.operation_type)?;
    let variable_values = coerce_variable_values(schema, &operation, variable_input)?;

    let state = RequestState {
        schema: Arc::clone(schema),
        fragments: Arc::new(fragments),
        root_value: Arc::new(root_value),
        operation: Arc::new(operation),
        variable_values: Arc::new(variable_values),
        context,
        middleware,
        exceptions_are_reraised,
        errors: Arc::new(Mutex::new(Vec::new())),
    };

    let serial = state.operation.operation_type == OperationType::Mutation;
    let data = execute_root_selection_set(&state, &root_type, serial).await;
    let errors = std::mem::take(&mut *state.errors.lock().unwrap());
    Ok(Response::new(data, errors))
}

/// Finds the operation to execute and the document's fragment definitions,
/// rejecting a document with a stray type-system definition in it
///.
pub(crate) fn select_operation(
    document: &Document,
    operation_name: Option<&str>,
) -> Result<(OperationDefinition, HashMap<Name, FragmentDefinition>), RequestError> {
    let mut operations = Vec::new();
    let mut fragments = HashMap::new();

    for definition in &document.definitions {
        match definition {
            Definition::Operation(op) => operations.push(op.clone()),
            Definition::Fragment(frag) => {
                fragments.insert(frag.name.clone(), frag.clone());
            }
            Definition::TypeSystem { kind } => {
                return Err(RequestError::TypeSystemDefinitionPresent { kind });
            }
        }
    }

    let operation = match operation_name {
        Some(name) => operations
            .into_iter()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| RequestError::UnknownOperationName { name: name.to_owned() })?,
        None => match operations.len() {
            0 => return Err(RequestError::NoOperationProvided),
            1 => operations.into_iter().next().unwrap(),
            _ => return Err(RequestError::MultipleOperationsProvided),
        },
    };

    Ok((operation, fragments))
}

pub(crate) fn root_type_name(schema: &Schema, operation_type: OperationType) -> Result<Name, RequestError> {
    match operation_type {
        OperationType::Query => Ok(schema.query_type_name().clone()),
        OperationType::Mutation => {
            schema.mutation_type_name().cloned().ok_or(RequestError::NoMutationType)
        }
        OperationType::Subscription => {
            schema.subscription_type_name().cloned().ok_or(RequestError::NoSubscriptionType)
        }
    }
}

/// Executes the operation's top-level selection set against the root value,
/// serially for mutations and concurrently otherwise.
async fn execute_root_selection_set(state: &RequestState, root_type: &Name, serial: bool) -> Value {
    let selection_set = state.operation.selection_set.clone();
    match execute_selection_set(state, root_type, &selection_set, Parent::from_value((*state.root_value).clone()), &Path::root(), serial)
        .await
    {
        Ok(value) => value,
        Err(_) => Value::Null,
    }
}

/// Executes an already-known selection set against `object_type`, merging
/// fields across the set and resolving/completing each one either serially
/// or concurrently.
pub(crate) async fn execute_selection_set(
    state: &RequestState,
    object_type: &Name,
    selection_set: &[Selection],
    parent: Parent,
    path: &Path,
    serial: bool,
) -> Result<Value, ExecutionError> {
    let collected = crate::collect::collect_fields(&state.schema, object_type, selection_set, &state.fragments, &state.variable_values)
        .map_err(|message| state.record_error(ExecutionError::at_origin(crate::error::FieldError::new(message)), path, &[]))?;

    if serial {
        let mut out = crate::value::Object::with_capacity(collected.len());
        for (response_key, nodes) in collected {
            if let Some(value) = resolve_and_complete(state, object_type, &response_key, &nodes, parent.clone(), path).await? {
                out.insert(response_key, value);
            }
        }
        Ok(Value::Object(out))
    } else {
        let futs = collected.into_iter().map(|(response_key, nodes)| {
            let state = state.clone();
            let object_type = object_type.clone();
            let parent = parent.clone();
            let path = path.clone();
            async move {
                let value = resolve_and_complete(&state, &object_type, &response_key, &nodes, parent, &path).await;
                (response_key, value)
            }
        });
        let results = join_all(futs).await;
        let mut out = crate::value::Object::with_capacity(results.len());
        for (key, value) in results {
            match value? {
                Some(v) => {
                    out.insert(key, v);
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    }
}

/// Resolves and completes a single response key.
///
/// `Ok(None)` means the field has no declaration in the schema and is
/// omitted from the response entirely. `Err` means its declared type is
/// non-null and its value could not be produced — `complete_value` has
/// already recorded the originating error, so this is purely a signal for
/// the enclosing selection set to null itself out in turn.
async fn resolve_and_complete(
    state: &RequestState,
    object_type: &Name,
    response_key: &Name,
    nodes: &[FieldNode],
    parent: Parent,
    path: &Path,
) -> Result<Option<Value>, ExecutionError> {
    let field_path = path.push_key(response_key.clone());
    match resolve_field(state, object_type, nodes, parent, field_path.clone()) {
        None => Ok(None),
        Some((return_type, raw)) => {
            let value = complete_value(state, &return_type, nodes, &field_path, raw, object_type).resolve().await?;
            Ok(Some(value))
        }
    }
}

/// Executes `field_nodes`' selection set against a resolved object/interface/
/// union value, used by [`crate::complete`] when a field's raw value needs
/// its own sub-selection resolved ( "Object (resolved)").
pub(crate) async fn execute_fields_for_object(
    state: &RequestState,
    object_type: &Name,
    field_nodes: &[FieldNode],
    parent: Parent,
    path: &Path,
) -> Result<Value, ExecutionError> {
    let mut combined = Vec::new();
    for node in field_nodes {
        combined.extend(node.selection_set.iter().cloned());
    }
    execute_selection_set(state, object_type, &combined, parent, path, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::SourceLocation,
        schema::{FieldDef, NamedType, ObjectType, SchemaBuilder, TypeRef},
    };

    fn field(name: &str) -> Selection {
        Selection::Field(FieldNode {
            alias: None,
            name: Name::from(name),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            location: SourceLocation::default(),
        })
    }

    fn schema_with_greeting() -> Arc<Schema> {
        Arc::new(
            SchemaBuilder::new("Query")
                .type_(NamedType::Object(ObjectType::new("Query").field(
                    FieldDef::new("greeting", TypeRef::named("String")).resolve(|_| Deferred::ready(Value::from("hi"))),
                )))
                .build(),
        )
    }

    fn document_with(selection_set: Vec<Selection>) -> Document {
        Document {
            definitions: vec![Definition::Operation(OperationDefinition {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set,
                location: SourceLocation::default(),
            })],
        }
    }

    #[tokio::test]
    async fn executes_a_simple_query() {
        let schema = schema_with_greeting();
        let document = document_with(vec![field("greeting")]);
        let response = execute(
            &schema,
            &document,
            None,
            Value::Null,
            &Variables::new(),
            Context::empty(),
            MiddlewareChain::new(),
            false,
        )
        .await
        .unwrap();
        assert!(response.errors().is_empty());
        assert_eq!(response.data().as_object().unwrap().get("greeting"), Some(&Value::from("hi")));
    }

    #[tokio::test]
    async fn empty_document_is_a_request_error() {
        let schema = schema_with_greeting();
        let document = Document::default();
        let err = execute(&schema, &document, None, Value::Null, &Variables::new(), Context::empty(), MiddlewareChain::new(), false)
            .await
            .unwrap_err();
        assert_eq!(err, RequestError::NoOperationProvided);
    }

    #[tokio::test]
    async fn unknown_field_is_silently_dropped_from_the_response() {
        let schema = schema_with_greeting();
        let document = document_with(vec![field("greeting"), field("mystery")]);
        let response = execute(&schema, &document, None, Value::Null, &Variables::new(), Context::empty(), MiddlewareChain::new(), false)
            .await
            .unwrap();
        let obj = response.data().as_object().unwrap();
        assert!(!obj.contains_key("mystery"));
        assert_eq!(obj.get("greeting"), Some(&Value::from("hi")));
    }

    fn subscription_schema_and_document() -> (Arc<Schema>, Document) {
        let schema = Arc::new(
            SchemaBuilder::new("Query")
                .subscription_type("Subscription")
                .type_(string_scalar_for_tests())
                .type_(NamedType::Object(ObjectType::new("Query")))
                .type_(NamedType::Object(ObjectType::new("Subscription").field(
                    FieldDef::new("ping", TypeRef::named("String")).resolve(|_| Deferred::ready(Value::from("pong"))),
                )))
                .build(),
        );
        let document = document_with_operation(OperationType::Subscription, vec![field("ping")]);
        (schema, document)
    }

    fn string_scalar_for_tests() -> NamedType {
        NamedType::Scalar(crate::schema::ScalarType::new(
            "String",
            |v| Ok(v.clone()),
            |v| Ok(v.clone()),
        ))
    }

    fn document_with_operation(operation_type: OperationType, selection_set: Vec<Selection>) -> Document {
        Document {
            definitions: vec![Definition::Operation(OperationDefinition {
                operation_type,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set,
                location: SourceLocation::default(),
            })],
        }
    }

    #[tokio::test]
    async fn subscription_with_allow_subscriptions_true_is_rejected_by_the_single_result_entrypoint() {
        let (schema, document) = subscription_schema_and_document();
        let err = execute(&schema, &document, None, Value::Null, &Variables::new(), Context::empty(), MiddlewareChain::new(), true)
            .await
            .unwrap_err();
        assert_eq!(err, RequestError::SubscriptionNotAllowed);
    }

    #[tokio::test]
    async fn subscription_with_allow_subscriptions_false_executes_like_a_query_against_the_subscription_root() {
        let (schema, document) = subscription_schema_and_document();
        let response = execute(&schema, &document, None, Value::Null, &Variables::new(), Context::empty(), MiddlewareChain::new(), false)
            .await
            .unwrap();
        assert!(response.errors().is_empty());
        assert_eq!(response.data().as_object().unwrap().get("ping"), Some(&Value::from("pong")));
    }
}
