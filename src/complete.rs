//! Output Coercer: turns a field's raw resolved value
//! into response-shaped JSON against its declared type, applying non-null
//! propagation and recursing into sub-selections for object-shaped types.
//!
//! Grounded on juniper's `Executor::resolve_into_value`'s
//! `complete_value`-equivalent switch over `TypeKind`, reshaped around
//! [`TypeRef`]/[`NamedType`] instead of a `meta::MetaType` match.

use std::sync::Arc;

use futures::{future::BoxFuture, future::join_all, FutureExt};

use crate::{
    ast::{FieldNode, Name, SourceLocation},
    context::{Parent, ResolveInfo},
    deferred::Deferred,
    error::{ExecutionError, FieldError},
    path::Path,
    resolve::RequestState,
    schema::{NamedType, ResolveTypeFn, TypeRef},
    value::Value,
};

fn locations_of(field_nodes: &[FieldNode]) -> Vec<SourceLocation> {
    field_nodes.iter().map(|f| f.location).collect()
}

fn build_resolve_info(state: &RequestState, type_name: &Name, field_nodes: &[FieldNode], path: &Path) -> ResolveInfo {
    ResolveInfo {
        field_name: field_nodes.first().map(|f| f.name.clone()).unwrap_or_else(|| type_name.clone()),
        field_nodes: Arc::new(field_nodes.to_vec()),
        return_type: TypeRef::named(type_name.clone()),
        parent_type: type_name.clone(),
        path: path.clone(),
        schema: Arc::clone(&state.schema),
        fragments: Arc::clone(&state.fragments),
        root_value: Arc::clone(&state.root_value),
        operation: Arc::clone(&state.operation),
        variable_values: Arc::clone(&state.variable_values),
        context: state.context.clone(),
    }
}

/// Completes a field's raw (possibly still-pending, possibly already
/// rejected) value against `return_type`, returning the final `Deferred<Value>`
/// that belongs at `path` in the response tree.
///
/// Every error that reaches a nullable boundary is recorded into
/// [`RequestState::errors`] exactly once, at the path it actually occurred —
/// never re-recorded as it continues bubbling past further nullable
/// ancestors that chose to propagate rather than swallow it.
///
/// `parent_type` is the name of the object type `field_nodes` belongs to,
/// carried along purely so a non-null violation or type-mismatch error can
/// report it (`"Cannot return null for non-nullable field Parent.field."`).
pub fn complete_value(
    state: &RequestState,
    return_type: &TypeRef,
    field_nodes: &[FieldNode],
    path: &Path,
    raw: Deferred<Value>,
    parent_type: &Name,
) -> Deferred<Value> {
    let state = state.clone();
    let return_type = return_type.clone();
    let field_nodes = field_nodes.to_vec();
    let path = path.clone();
    let parent_type = parent_type.clone();
    Deferred::pending(async move {
        let result = raw.resolve().await;
        complete_settled(state, return_type, field_nodes, path, result, parent_type).await
    })
}

fn complete_settled(
    state: RequestState,
    return_type: TypeRef,
    field_nodes: Vec<FieldNode>,
    path: Path,
    result: Result<Value, ExecutionError>,
    parent_type: Name,
) -> BoxFuture<'static, Result<Value, ExecutionError>> {
    async move {
        let completion = match result {
            Err(e) => Err(e),
            Ok(value) if value.is_null() => {
                if return_type.is_non_null() {
                    let field_name = field_nodes.first().map(|f| f.name.clone()).unwrap_or_else(|| parent_type.clone());
                    Err(ExecutionError::at_origin(FieldError::new(format!(
                        "Cannot return null for non-nullable field {parent_type}.{field_name}."
                    ))))
                } else {
                    Ok(Value::Null)
                }
            }
            Ok(value) => {
                let inner_type = match &return_type {
                    TypeRef::NonNull(inner) => (**inner).clone(),
                    other => other.clone(),
                };
                complete_value_inner(state.clone(), inner_type, field_nodes.clone(), path.clone(), value, parent_type.clone()).await
            }
        };
        match completion {
            Ok(v) => Ok(v),
            Err(e) => {
                let stamped = state.record_error(e, &path, &locations_of(&field_nodes));
                if return_type.is_non_null() {
                    Err(stamped)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }
    .boxed()
}

fn complete_value_inner(
    state: RequestState,
    return_type: TypeRef,
    field_nodes: Vec<FieldNode>,
    path: Path,
    value: Value,
    parent_type: Name,
) -> BoxFuture<'static, Result<Value, ExecutionError>> {
    async move {
        match return_type {
            TypeRef::List(inner) => {
                let items = match value {
                    Value::List(items) => items,
                    other => {
                        return Err(ExecutionError::at_origin(FieldError::new(format!(
                            "Expected a list, found: {}",
                            other.describe()
                        ))));
                    }
                };
                let futs: Vec<_> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        complete_settled(
                            state.clone(),
                            (*inner).clone(),
                            field_nodes.clone(),
                            path.push_index(i),
                            Ok(item),
                            parent_type.clone(),
                        )
                    })
                    .collect();
                let results = join_all(futs).await;
                let mut out = Vec::with_capacity(results.len());
                for r in results {
                    out.push(r?);
                }
                Ok(Value::List(out))
            }
            TypeRef::Named(name) => complete_named(state, name, field_nodes, path, value).await,
            TypeRef::NonNull(_) => unreachable!("complete_settled always strips a leading NonNull"),
        }
    }
    .boxed()
}

async fn complete_named(
    state: RequestState,
    name: Name,
    field_nodes: Vec<FieldNode>,
    path: Path,
    value: Value,
) -> Result<Value, ExecutionError> {
    match state.schema.type_by_name(&name) {
        Some(NamedType::Scalar(scalar)) => (scalar.serialize)(&value).map_err(|e| {
            ExecutionError::at_origin(FieldError::new(format!("Expected type \"{name}\" but encountered: {e}")))
        }),
        Some(NamedType::Enum(en)) => match value.as_str() {
            Some(v) if en.contains(v) => Ok(Value::String(v.to_owned())),
            _ => Err(ExecutionError::at_origin(FieldError::new(format!(
                "Enum \"{name}\" cannot represent value: {}",
                value.describe()
            )))),
        },
        Some(NamedType::Object(obj)) => {
            if let Some(is_type_of) = obj.is_type_of.clone() {
                let info = build_resolve_info(&state, &name, &field_nodes, &path);
                if !is_type_of(&value, &info) {
                    return Err(ExecutionError::at_origin(FieldError::new(format!(
                        "Expected value of type \"{name}\" but got: {}.",
                        value.describe()
                    ))));
                }
            }
            crate::executor::execute_fields_for_object(&state, &name, &field_nodes, Parent::from_value(value), &path).await
        }
        Some(NamedType::Interface(iface)) => {
            let concrete =
                resolve_abstract_type(&state, iface.resolve_type.clone(), &iface.possible_types, &value, &field_nodes, &path, &name)?;
            crate::executor::execute_fields_for_object(&state, &concrete, &field_nodes, Parent::from_value(value), &path).await
        }
        Some(NamedType::Union(uni)) => {
            let concrete =
                resolve_abstract_type(&state, uni.resolve_type.clone(), &uni.members, &value, &field_nodes, &path, &name)?;
            crate::executor::execute_fields_for_object(&state, &concrete, &field_nodes, Parent::from_value(value), &path).await
        }
        Some(NamedType::InputObject(_)) | None => {
            Err(ExecutionError::at_origin(FieldError::new(format!("\"{name}\" is not an output type."))))
        }
    }
}

fn resolve_abstract_type(
    state: &RequestState,
    resolve_type: Option<ResolveTypeFn>,
    possible_types: &[Name],
    value: &Value,
    field_nodes: &[FieldNode],
    path: &Path,
    abstract_name: &Name,
) -> Result<Name, ExecutionError> {
    let info = build_resolve_info(state, abstract_name, field_nodes, path);
    if let Some(resolve_type) = resolve_type {
        if let Some(name) = resolve_type(value, &info) {
            if possible_types.iter().any(|t| t == &name) {
                return Ok(name);
            }
            return Err(ExecutionError::at_origin(FieldError::new(format!(
                "\"{name}\" is not a possible type for abstract type \"{abstract_name}\"."
            ))));
        }
    } else {
        for candidate in possible_types {
            if let Some(NamedType::Object(obj)) = state.schema.type_by_name(candidate) {
                if let Some(is_type_of) = &obj.is_type_of {
                    if is_type_of(value, &info) {
                        return Ok(candidate.clone());
                    }
                }
            }
        }
    }
    Err(ExecutionError::at_origin(FieldError::new(format!(
        "Expected value of type \"{abstract_name}\" but got: {}.",
        value.describe()
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::OperationDefinition,
        context::Context,
        middleware::MiddlewareChain,
        schema::{FieldDef, ObjectType, SchemaBuilder},
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn field_node(name: &str) -> FieldNode {
        FieldNode {
            alias: None,
            name: Name::from(name),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            location: SourceLocation::default(),
        }
    }

    fn state() -> RequestState {
        RequestState {
            schema: Arc::new(
                SchemaBuilder::new("Query")
                    .type_(NamedType::Object(ObjectType::new("Query").field(FieldDef::new("x", TypeRef::named("String")))))
                    .build(),
            ),
            fragments: Arc::new(HashMap::new()),
            root_value: Arc::new(Value::Null),
            operation: Arc::new(OperationDefinition {
                operation_type: crate::ast::OperationType::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: vec![],
                location: SourceLocation::default(),
            }),
            variable_values: Arc::new(Variables::new()),
            context: Context::empty(),
            middleware: MiddlewareChain::new(),
            exceptions_are_reraised: false,
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[tokio::test]
    async fn null_for_nullable_type_passes_through() {
        let st = state();
        let nodes = vec![field_node("x")];
        let completed =
            complete_value(&st, &TypeRef::named("String"), &nodes, &Path::root(), Deferred::ready(Value::Null), &Name::from("Query"));
        assert_eq!(completed.resolve().await, Ok(Value::Null));
    }

    #[tokio::test]
    async fn null_for_non_null_type_is_an_error_and_is_recorded() {
        let st = state();
        let nodes = vec![field_node("x")];
        let non_null = TypeRef::named("String").non_null();
        let completed = complete_value(&st, &non_null, &nodes, &Path::root(), Deferred::ready(Value::Null), &Name::from("Query"));
        let result = completed.resolve().await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().message(), "Cannot return null for non-nullable field Query.x.");
        assert_eq!(st.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_element_error_nulls_the_whole_list_when_list_itself_is_nullable() {
        let st = state();
        let nodes = vec![field_node("x")];
        let item_type = TypeRef::named("String").non_null();
        let raw = Deferred::ready(Value::List(vec![Value::from("a"), Value::Null]));
        let completed = complete_value(&st, &item_type.clone().list(), &nodes, &Path::root(), raw, &Name::from("Query"));
        assert_eq!(completed.resolve().await, Ok(Value::Null));
        assert_eq!(st.errors.lock().unwrap().len(), 1);
    }
}
