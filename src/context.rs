//! Per-invocation context: the opaque request context, the parent value a
//! field resolves against, and [`ResolveInfo`] — the bundle of metadata
//! every resolver invocation receives.

use std::{any::Any, collections::HashMap, sync::Arc};

use crate::{
    ast::{FieldNode, FragmentDefinition, Name, OperationDefinition},
    path::Path,
    schema::Schema,
    value::Value,
};

/// The coerced values of all variables declared on the current operation.
pub type Variables = HashMap<String, Value>;

/// An opaque, request-scoped value threaded unchanged to every resolver.
///
/// Juniper leaves this generic (`CtxT`) and monomorphizes an `Executor`
/// per context type; a dynamic schema has no such static type to
/// monomorphize over, so this crate type-erases instead — the same
/// trade-off `actix_web::web::Data` and similar "app state" containers make.
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// A context carrying no data, for schemas whose resolvers need none.
    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// Capability a Rust-native parent value implements to answer the default
/// resolver's "read the attribute named like the field" lookup
/// without routing through
/// [`Value::Object`].
///
/// This is the statically-typed answer to a parent object whose fields are
/// computed rather than stored plainly.
pub trait DynamicObject: Any + Send + Sync {
    /// Returns the value of `name`, or `None` if this object has no such
    /// field (the default resolver yields `null` in that case).
    fn field(&self, name: &str) -> Option<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// The value a field resolves *against*: either a plain [`Value::Object`]
/// (the common case — most resolvers never need Rust-native parent types at
/// all) or a [`DynamicObject`] for parents with computed fields.
#[derive(Clone)]
pub enum Parent {
    Value(Arc<Value>),
    Dynamic(Arc<dyn DynamicObject>),
}

impl Parent {
    pub fn from_value(value: Value) -> Self {
        Self::Value(Arc::new(value))
    }

    pub fn dynamic<T: DynamicObject>(value: T) -> Self {
        Self::Dynamic(Arc::new(value))
    }

    /// Attempts to view this parent as a plain [`Value`]. `Dynamic` parents
    /// have no such view — resolvers that need to inspect one downcast via
    /// [`Parent::downcast_ref`] instead.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Dynamic(_) => None,
        }
    }

    pub fn downcast_ref<T: DynamicObject>(&self) -> Option<&T> {
        match self {
            Self::Dynamic(d) => d.as_any().downcast_ref(),
            Self::Value(_) => None,
        }
    }
}

/// Metadata passed to every resolver: field identity, declared types, the
/// current path, and the whole (immutable) request context.
///
/// Unlike juniper's `Executor`, which borrows request-scoped data behind
/// a web of lifetimes, every field here is `Arc`-backed so that a
/// [`crate::deferred::Deferred`]'s boxed future can hold one with no
/// lifetime parameter at all — the price of a dynamic schema whose
/// resolvers are trait objects rather than monomorphized generic code.
#[derive(Clone)]
pub struct ResolveInfo {
    pub field_name: Name,
    pub field_nodes: Arc<Vec<FieldNode>>,
    pub return_type: crate::schema::TypeRef,
    pub parent_type: Name,
    pub path: Path,
    pub schema: Arc<Schema>,
    pub fragments: Arc<HashMap<Name, FragmentDefinition>>,
    pub root_value: Arc<Value>,
    pub operation: Arc<OperationDefinition>,
    pub variable_values: Arc<Variables>,
    pub context: Context,
}

/// Everything a resolver closure needs: the parent it resolves against, its
/// already-coerced arguments, and [`ResolveInfo`] for this invocation.
pub struct FieldContext {
    pub parent: Parent,
    pub args: Arc<crate::value::Object>,
    pub info: ResolveInfo,
}

impl FieldContext {
    /// Looks up an argument by name, returning `Value::Null` if it was
    /// never supplied — the same "absent reads as null" ergonomics
    /// `IndexMap::get` would give a resolver directly.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }
}
