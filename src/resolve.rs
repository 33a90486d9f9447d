//! Field Resolver Driver: looks up a field's
//! definition, coerces its arguments, builds its [`ResolveInfo`], and drives
//! its resolver (default or user-supplied, through the middleware chain)
//! down to a raw [`Deferred<Value>`] ready for [`crate::complete`].
//!
//! Grounded on juniper's `Executor::resolve_into_value`/
//! `resolve_into_value_async`, which perform the same
//! lookup-coerce-invoke sequence against a `GraphQLValue` impl instead of a
//! dynamic resolver registry.

use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc, sync::Mutex};

use futures::FutureExt;

use crate::{
    ast::{FieldNode, FragmentDefinition, Name, OperationDefinition},
    context::{Context, FieldContext, Parent, ResolveInfo, Variables},
    deferred::Deferred,
    error::{ExecutionError, FieldError},
    middleware::MiddlewareChain,
    path::Path,
    schema::{NamedType, ResolverFn, Schema, TypeRef},
    value::Value,
    variables::coerce_arguments,
};

/// Everything shared, read-only or append-only, across one request's field
/// resolutions.
///
/// `errors` is the shared accumulator every field error gets pushed onto,
/// guarded by a plain [`Mutex`] rather than anything fancier, since
/// contention is a handful of pushes per erroring field, not a hot loop.
#[derive(Clone)]
pub struct RequestState {
    pub schema: Arc<Schema>,
    pub fragments: Arc<HashMap<Name, FragmentDefinition>>,
    pub root_value: Arc<Value>,
    pub operation: Arc<OperationDefinition>,
    pub variable_values: Arc<Variables>,
    pub context: Context,
    pub middleware: MiddlewareChain,
    /// Whether a resolver panic propagates out of [`crate::execute`] after
    /// being logged, rather than surfacing only as a field error
    ///.
    pub exceptions_are_reraised: bool,
    pub errors: Arc<Mutex<Vec<ExecutionError>>>,
}

impl RequestState {
    /// Records a settled field error, stamping in `path`/`locations` when the
    /// error was built with [`ExecutionError::at_origin`] (an empty path
    /// means "whoever settles this should say where").
    pub fn record_error(&self, error: ExecutionError, path: &Path, locations: &[crate::ast::SourceLocation]) -> ExecutionError {
        let stamped = if error.path().is_empty() {
            ExecutionError::new(path.to_vec(), locations.to_vec(), error.field_error().clone())
        } else {
            error
        };
        self.errors.lock().unwrap().push(stamped.clone());
        stamped
    }
}

/// Resolves one response key's merged field nodes against `parent_type`,
/// returning `None` if the schema declares no such field, or `Some` of its declared
/// output type alongside the raw `Deferred<Value>` for [`crate::complete`]
/// to finish against that type.
pub fn resolve_field(
    state: &RequestState,
    parent_type: &Name,
    field_nodes: &[FieldNode],
    parent: Parent,
    path: Path,
) -> Option<(TypeRef, Deferred<Value>)> {
    let first = field_nodes.first()?;

    if &*first.name == "__typename" {
        let return_type = TypeRef::named("String").non_null();
        return Some((return_type, Deferred::ready(Value::String(parent_type.to_string()))));
    }

    let field_def = state.schema.type_by_name(parent_type).and_then(NamedType::fields)?.get(&first.name)?.clone();
    let return_type = field_def.output_type.clone();

    let args = match coerce_arguments(&state.schema, &field_def.arguments, &first.arguments, &state.variable_values) {
        Ok(args) => Arc::new(args),
        Err(message) => {
            return Some((return_type, Deferred::err(ExecutionError::at_origin(FieldError::new(message)))));
        }
    };

    let info = ResolveInfo {
        field_name: first.name.clone(),
        field_nodes: Arc::new(field_nodes.to_vec()),
        return_type: return_type.clone(),
        parent_type: parent_type.clone(),
        path,
        schema: Arc::clone(&state.schema),
        fragments: Arc::clone(&state.fragments),
        root_value: Arc::clone(&state.root_value),
        operation: Arc::clone(&state.operation),
        variable_values: Arc::clone(&state.variable_values),
        context: state.context.clone(),
    };

    let base = field_def.resolver.clone().unwrap_or_else(|| default_resolver(first.name.clone()));
    let resolver = if state.middleware.is_empty() { base } else { state.middleware.apply(base) };

    let ctx = FieldContext { parent, args, info };
    Some((return_type, invoke(&resolver, ctx, state.exceptions_are_reraised)))
}

/// The resolver used when a field has none of its own: reads the response
/// key straight off the parent, the way a plain attribute lookup would
///.
fn default_resolver(field_name: Name) -> ResolverFn {
    Arc::new(move |ctx: FieldContext| {
        let value = match &ctx.parent {
            Parent::Value(v) => v.as_object().and_then(|o| o.get(&*field_name)).cloned().unwrap_or(Value::Null),
            Parent::Dynamic(d) => d.field(&field_name).unwrap_or(Value::Null),
        };
        Deferred::ready(value)
    })
}

/// Invokes `resolver`, catching both a synchronous panic and one raised
/// while polling a pending resolver's future.
fn invoke(resolver: &ResolverFn, ctx: FieldContext, exceptions_are_reraised: bool) -> Deferred<Value> {
    let parent_type = ctx.info.parent_type.clone();
    let field_name = ctx.info.field_name.clone();
    let path = ctx.info.path.clone();
    match std::panic::catch_unwind(AssertUnwindSafe(|| resolver(ctx))) {
        Ok(Deferred::Ready(r)) => Deferred::Ready(r),
        Ok(Deferred::Pending(fut)) => Deferred::pending(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(r) => r,
                Err(payload) => Err(handle_panic(payload, exceptions_are_reraised, &parent_type, &field_name, &path)),
            }
        }),
        Err(payload) => Deferred::Ready(Err(handle_panic(payload, exceptions_are_reraised, &parent_type, &field_name, &path))),
    }
}

fn handle_panic(
    payload: Box<dyn std::any::Any + Send>,
    exceptions_are_reraised: bool,
    parent_type: &Name,
    field_name: &Name,
    path: &Path,
) -> ExecutionError {
    let message = panic_message(&payload);
    tracing::error!(
        parent_type = %parent_type,
        field_name = %field_name,
        path = ?path.to_vec(),
        "An error occurred while resolving field {parent_type}.{field_name}"
    );
    if exceptions_are_reraised {
        std::panic::resume_unwind(payload);
    }
    ExecutionError::at_origin(FieldError::new(message))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "field resolver panicked with a non-string payload".to_string()
    }
}
