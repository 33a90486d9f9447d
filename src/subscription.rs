//! Subscription Adapter: drives a subscription
//! operation's single root field to a source-event stream, then re-enters
//! the ordinary selection-set pipeline once per event to produce a stream
//! of [`Response`]s.
//!
//! Grounded on `juniper_subscriptions::Connection`/`whole_responses_stream`,
//! which map a resolved `Value<ValuesResultStream>` into a stream of
//! `GraphQLResponse`s the same way this adapter maps a [`SourceStream`] into
//! a stream of [`Response`]s — reshaped around this crate's dynamic schema
//! and `Deferred` executor instead of a monomorphized `GraphQLSubscriptionType`.

use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt as _};

use crate::{
    ast::{Document, OperationType},
    context::{Context, FieldContext, Parent, Variables},
    error::RequestError,
    executor::{root_type_name, select_operation},
    middleware::MiddlewareChain,
    path::Path,
    resolve::RequestState,
    response::Response,
    schema::{NamedType, Schema},
    value::Value,
    variables::{coerce_arguments, coerce_variable_values},
};

/// Executes `document` as a subscription operation, returning a stream that
/// yields one [`Response`] per source event.
///
/// Rejects anything that isn't a subscription operation with
/// [`RequestError::NotASubscription`] — the mirror image of [`crate::execute`]
/// rejecting a subscription operation called with `allow_subscriptions: true`
/// via [`RequestError::SubscriptionNotAllowed`], since that combination needs
/// this streaming entrypoint instead.
///
/// When the selected root field declares no `subscribe` source (an object
/// type used as a subscription root with only plain fields), this falls
/// back to a single resolved value forwarded as a one-element stream
///.
#[allow(clippy::too_many_arguments)]
pub async fn execute_subscription(
    schema: &Arc<Schema>,
    document: &Document,
    operation_name: Option<&str>,
    root_value: Value,
    variable_input: &Variables,
    context: Context,
    middleware: MiddlewareChain,
) -> Result<BoxStream<'static, Response>, RequestError> {
    let (operation, fragments) = select_operation(document, operation_name)?;
    if operation.operation_type != OperationType::Subscription {
        return Err(RequestError::NotASubscription);
    }
    let root_type = root_type_name(schema, operation.operation_type)?;
    let variable_values = coerce_variable_values(schema, &operation, variable_input)?;

    let state = RequestState {
        schema: Arc::clone(schema),
        fragments: Arc::new(fragments),
        root_value: Arc::new(root_value.clone()),
        operation: Arc::new(operation),
        variable_values: Arc::new(variable_values),
        context,
        middleware,
        exceptions_are_reraised: false,
        errors: Arc::new(Mutex::new(Vec::new())),
    };

    let selection_set = state.operation.selection_set.clone();
    let collected = match crate::collect::collect_fields(
        &state.schema,
        &root_type,
        &selection_set,
        &state.fragments,
        &state.variable_values,
    ) {
        Ok(collected) => collected,
        Err(message) => {
            return Ok(Box::pin(stream::once(async move {
                Response::new(Value::Null, vec![crate::error::ExecutionError::at_origin(crate::error::FieldError::new(message))])
            })));
        }
    };

    // A subscription operation has exactly one root field (validation this
    // crate does not implement); take the first collected one
    // and ignore the rest rather than erroring on a request a validator
    // upstream would already have rejected.
    let Some((_, field_nodes)) = collected.into_iter().next() else {
        return Ok(Box::pin(stream::once(async move {
            Response::new(Value::Object(crate::value::Object::new()), vec![])
        })));
    };

    let source_stream = match build_source_stream(&state, &root_type, &field_nodes, &root_value) {
        Ok(stream) => stream,
        Err(message) => {
            return Ok(Box::pin(stream::once(async move {
                Response::new(Value::Null, vec![crate::error::ExecutionError::at_origin(crate::error::FieldError::new(message))])
            })));
        }
    };

    let response_key = field_nodes.first().expect("collect_fields never yields an empty group").response_key().clone();
    let return_type = state
        .schema
        .type_by_name(&root_type)
        .and_then(NamedType::fields)
        .and_then(|fields| fields.get(&field_nodes.first().unwrap().name))
        .map(|f| f.output_type.clone())
        .expect("build_source_stream already validated this field exists");

    let events = source_stream.then(move |event| {
        let state = state.clone();
        let field_nodes = field_nodes.clone();
        let return_type = return_type.clone();
        let response_key = response_key.clone();
        let root_type = root_type.clone();
        async move {
            // Each event is already this field's settled raw value — completing
            // it against the field's own output type re-enters exactly
            // where the ordinary field pipeline would, one level in.
            let per_event_state = RequestState { errors: Arc::new(Mutex::new(Vec::new())), ..state };
            let path = Path::root().push_key(response_key.clone());
            let completed = crate::complete::complete_value(
                &per_event_state,
                &return_type,
                &field_nodes,
                &path,
                crate::deferred::Deferred::ready(event),
                &root_type,
            )
            .resolve()
            .await;
            let mut data = crate::value::Object::new();
            if let Ok(value) = &completed {
                data.insert(Arc::from(&*response_key), value.clone());
            }
            let errors = std::mem::take(&mut *per_event_state.errors.lock().unwrap());
            Response::new(Value::Object(data), errors)
        }
    });

    Ok(Box::pin(events))
}

/// Produces the source-event stream for the (merged) root subscription
/// field, or a single-element fallback stream when the field declares no
/// `subscribe` source.
fn build_source_stream(
    state: &RequestState,
    root_type: &crate::ast::Name,
    field_nodes: &[crate::ast::FieldNode],
    root_value: &Value,
) -> Result<BoxStream<'static, Value>, String> {
    let first = field_nodes.first().expect("collect_fields never yields an empty group");

    let field_def = state
        .schema
        .type_by_name(root_type)
        .and_then(NamedType::fields)
        .and_then(|fields| fields.get(&first.name))
        .cloned()
        .ok_or_else(|| format!("Subscription field \"{}\" is not defined.", first.name))?;

    let args = coerce_arguments(&state.schema, &field_def.arguments, &first.arguments, &state.variable_values)?;

    let info = crate::context::ResolveInfo {
        field_name: first.name.clone(),
        field_nodes: Arc::new(field_nodes.to_vec()),
        return_type: field_def.output_type.clone(),
        parent_type: root_type.clone(),
        path: Path::root().push_key(first.response_key().clone()),
        schema: Arc::clone(&state.schema),
        fragments: Arc::clone(&state.fragments),
        root_value: Arc::clone(&state.root_value),
        operation: Arc::clone(&state.operation),
        variable_values: Arc::clone(&state.variable_values),
        context: state.context.clone(),
    };
    let ctx = FieldContext { parent: Parent::from_value(root_value.clone()), args: Arc::new(args), info };

    match &field_def.subscribe {
        Some(subscribe) => Ok(subscribe(ctx)),
        None => Ok(Box::pin(stream::once(async move { root_value.clone() }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Definition, FieldNode, OperationDefinition, Selection, SourceLocation},
        schema::{FieldDef, ObjectType, ScalarType, SchemaBuilder, TypeRef},
    };

    fn int_scalar() -> NamedType {
        NamedType::Scalar(ScalarType::new(
            "Int",
            |v| match v {
                Value::Int(_) => Ok(v.clone()),
                other => Err(format!("not an int: {}", other.describe())),
            },
            |v| match v {
                Value::Int(_) => Ok(v.clone()),
                other => Err(format!("not an int: {}", other.describe())),
            },
        ))
    }

    fn field(name: &str) -> Selection {
        Selection::Field(FieldNode {
            alias: None,
            name: crate::ast::Name::from(name),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            location: SourceLocation::default(),
        })
    }

    fn document_with(op_type: OperationType, selection_set: Vec<Selection>) -> Document {
        Document {
            definitions: vec![Definition::Operation(OperationDefinition {
                operation_type: op_type,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set,
                location: SourceLocation::default(),
            })],
        }
    }

    #[tokio::test]
    async fn streams_one_response_per_source_event() {
        let schema = Arc::new(
            SchemaBuilder::new("Query")
                .subscription_type("Subscription")
                .type_(int_scalar())
                .type_(NamedType::Object(ObjectType::new("Query")))
                .type_(NamedType::Object(ObjectType::new("Subscription").field(
                    FieldDef::new("counter", TypeRef::named("Int")).subscribe(|_| {
                        Box::pin(stream::iter(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
                    }),
                )))
                .build(),
        );
        let document = document_with(OperationType::Subscription, vec![field("counter")]);
        let mut responses = execute_subscription(
            &schema,
            &document,
            None,
            Value::Null,
            &Variables::new(),
            Context::empty(),
            MiddlewareChain::new(),
        )
        .await
        .unwrap();

        let mut seen = Vec::new();
        while let Some(response) = responses.next().await {
            seen.push(response.data().as_object().unwrap().get("counter").cloned().unwrap());
        }
        assert_eq!(seen, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[tokio::test]
    async fn non_subscription_operation_is_rejected() {
        let schema = Arc::new(
            SchemaBuilder::new("Query")
                .subscription_type("Subscription")
                .type_(NamedType::Object(ObjectType::new("Query")))
                .type_(NamedType::Object(ObjectType::new("Subscription")))
                .build(),
        );
        let document = document_with(OperationType::Query, vec![]);
        let err = execute_subscription(
            &schema,
            &document,
            None,
            Value::Null,
            &Variables::new(),
            Context::empty(),
            MiddlewareChain::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, RequestError::NotASubscription);
    }
}
