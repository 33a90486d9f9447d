//! Middleware Chain: wraps a field's base resolver in
//! zero or more ordered middleware, each of which decides whether, when, and
//! how to call the next step.
//!
//! Juniper has no equivalent composable wrapper — it resolves a
//! field's value directly from its `GraphQLValue` impl — so this is grounded
//! instead on the generic "wrap a service in an ordered stack of layers"
//! shape `tower::Layer` popularized, adapted to this crate's
//! closure-resolver model instead of a trait-object service.

use std::sync::Arc;

use crate::{context::FieldContext, deferred::Deferred, schema::ResolverFn, value::Value};

/// One link in the chain. Receives the field invocation and the resolver
/// representing "everything after this middleware" — it may call `next`
/// zero, one, or more times, inspect/alter its result, or skip it entirely.
pub trait Middleware: Send + Sync {
    fn call(&self, ctx: FieldContext, next: ResolverFn) -> Deferred<Value>;
}

impl<F> Middleware for F
where
    F: Fn(FieldContext, ResolverFn) -> Deferred<Value> + Send + Sync,
{
    fn call(&self, ctx: FieldContext, next: ResolverFn) -> Deferred<Value> {
        self(ctx, next)
    }
}

/// An ordered stack of middleware applied around a field's base resolver.
///
/// Composition is a right fold: the last-registered middleware sits closest
/// to the base resolver, the first-registered middleware sees the
/// invocation first — the same inside-out order `actix_web`'s
/// `App::wrap` chain produces.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
    /// When set, every resolution is driven through an async boundary
    /// (`Deferred::pending`) even if every middleware and the base resolver
    /// settle synchronously — for callers that need a uniform polling
    /// behavior regardless of what an individual field happens to do.
    wrap_in_promise: bool,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn wrap_in_promise(mut self, yes: bool) -> Self {
        self.wrap_in_promise = yes;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty() && !self.wrap_in_promise
    }

    /// Wraps `base` in this chain, producing a single resolver a field
    /// definition can be given in place of its own.
    pub fn apply(&self, base: ResolverFn) -> ResolverFn {
        let mut resolver = base;
        for middleware in self.middlewares.iter().rev() {
            let middleware = Arc::clone(middleware);
            let inner = Arc::clone(&resolver);
            resolver = Arc::new(move |ctx: FieldContext| middleware.call(ctx, Arc::clone(&inner)));
        }
        if self.wrap_in_promise {
            let inner = Arc::clone(&resolver);
            resolver = Arc::new(move |ctx: FieldContext| {
                let inner = Arc::clone(&inner);
                Deferred::pending(async move { inner(ctx).resolve().await })
            });
        }
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{Parent, ResolveInfo, Variables},
        path::Path,
        schema::SchemaBuilder,
        value::Object,
    };
    use std::sync::{Arc, Mutex};

    fn info() -> ResolveInfo {
        let schema = Arc::new(
            SchemaBuilder::new("Query")
                .type_(crate::schema::NamedType::Object(crate::schema::ObjectType::new("Query")))
                .build(),
        );
        ResolveInfo {
            field_name: "x".into(),
            field_nodes: Arc::new(vec![]),
            return_type: crate::schema::TypeRef::named("Int"),
            parent_type: "Query".into(),
            path: Path::root(),
            schema,
            fragments: Arc::new(std::collections::HashMap::new()),
            root_value: Arc::new(Value::Null),
            operation: Arc::new(crate::ast::OperationDefinition {
                operation_type: crate::ast::OperationType::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: vec![],
                location: Default::default(),
            }),
            variable_values: Arc::new(Variables::new()),
            context: crate::context::Context::empty(),
        }
    }

    fn ctx() -> FieldContext {
        FieldContext { parent: Parent::from_value(Value::Null), args: Arc::new(Object::new()), info: info() }
    }

    #[tokio::test]
    async fn middleware_runs_in_registration_order_around_the_base() {
        let log = Arc::new(Mutex::new(Vec::<&'static str>::new()));
        let base: ResolverFn = Arc::new(|_| Deferred::ready(Value::Int(0)));

        let log1 = Arc::clone(&log);
        let log2 = Arc::clone(&log);
        let chain = MiddlewareChain::new()
            .push(move |ctx, next: ResolverFn| {
                log1.lock().unwrap().push("outer-before");
                let d = next(ctx);
                log1.lock().unwrap().push("outer-after");
                d
            })
            .push(move |ctx, next: ResolverFn| {
                log2.lock().unwrap().push("inner-before");
                let d = next(ctx);
                log2.lock().unwrap().push("inner-after");
                d
            });

        let wrapped = chain.apply(base);
        let result = wrapped(ctx()).resolve().await;
        assert_eq!(result, Ok(Value::Int(0)));
        assert_eq!(*log.lock().unwrap(), vec!["outer-before", "inner-before", "inner-after", "outer-after"]);
    }

    #[tokio::test]
    async fn wrap_in_promise_still_settles_to_the_same_value() {
        let base: ResolverFn = Arc::new(|_| Deferred::ready(Value::Int(7)));
        let chain = MiddlewareChain::new().wrap_in_promise(true);
        let wrapped = chain.apply(base);
        assert_eq!(wrapped(ctx()).resolve().await, Ok(Value::Int(7)));
    }
}
