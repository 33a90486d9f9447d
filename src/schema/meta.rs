//! Type-system metadata: the read-only data the executor walks.
//!
//! The type-system runtime is consumed as read-only data; this module is the
//! in-tree shape of that data, playing the same role as juniper's
//! `schema::meta` but built around `Arc<dyn Fn>` resolvers instead of a
//! `GraphQLType` trait impl per Rust type — an explicit resolver-registry
//! pattern rather than a static one.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    ast::{InputValue, Name},
    context::FieldContext,
    deferred::Deferred,
    schema::ResolveInfo,
    value::Value,
};

/// A field resolver: given the parent value, coerced arguments, and
/// [`ResolveInfo`] for this invocation, produces a raw [`Value`]
///.
pub type ResolverFn = Arc<dyn Fn(FieldContext) -> Deferred<Value> + Send + Sync>;

/// A subscription root field's source-event producer: given the initial
/// parent value, coerced arguments, and [`ResolveInfo`], yields the stream
/// of raw values the adapter feeds back through field completion once per
/// event.
pub type SubscribeFn = Arc<dyn Fn(FieldContext) -> futures::stream::BoxStream<'static, Value> + Send + Sync>;

/// Determines the concrete object type backing an interface/union value
///.
pub type ResolveTypeFn = Arc<dyn Fn(&Value, &ResolveInfo) -> Option<Name> + Send + Sync>;

/// Confirms (or refutes) that a value really is an instance of the object
/// type claiming it ( "Object (resolved)").
pub type IsTypeOfFn = Arc<dyn Fn(&Value, &ResolveInfo) -> bool + Send + Sync>;

/// Serializes a raw scalar/enum value into response form, or fails with a
/// human-readable reason.
pub type SerializeFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Coerces an already-literal-or-variable-resolved [`Value`] into this
/// scalar's canonical runtime representation, or fails.
pub type ParseValueFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// A leaf type with custom wire representation (`Int`, `String`, `DateTime`,
/// …).
#[derive(Clone)]
pub struct ScalarType {
    pub name: Name,
    pub serialize: SerializeFn,
    pub parse_value: ParseValueFn,
}

impl ScalarType {
    pub fn new(
        name: impl Into<Name>,
        serialize: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
        parse_value: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self { name: name.into(), serialize: Arc::new(serialize), parse_value: Arc::new(parse_value) }
    }
}

/// An enum type: a closed set of named values, serialized as their name.
#[derive(Clone)]
pub struct EnumType {
    pub name: Name,
    pub values: Vec<Name>,
}

impl EnumType {
    pub fn new(name: impl Into<Name>, values: impl IntoIterator<Item = impl Into<Name>>) -> Self {
        Self { name: name.into(), values: values.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| &**v == value)
    }
}

/// A single declared argument on a field or directive.
#[derive(Clone)]
pub struct ArgumentDef {
    pub name: Name,
    pub type_ref: super::TypeRef,
    pub default_value: Option<InputValue>,
}

impl ArgumentDef {
    pub fn new(name: impl Into<Name>, type_ref: super::TypeRef) -> Self {
        Self { name: name.into(), type_ref, default_value: None }
    }

    #[must_use]
    pub fn default_value(mut self, value: InputValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A single declared field on an object or interface type.
#[derive(Clone)]
pub struct FieldDef {
    pub name: Name,
    pub output_type: super::TypeRef,
    pub arguments: IndexMap<Name, ArgumentDef>,
    pub resolver: Option<ResolverFn>,
    /// Present only on a subscription root type's fields: produces the
    /// source-event stream in place of a single resolved value.
    pub subscribe: Option<SubscribeFn>,
}

impl FieldDef {
    pub fn new(name: impl Into<Name>, output_type: super::TypeRef) -> Self {
        Self { name: name.into(), output_type, arguments: IndexMap::new(), resolver: None, subscribe: None }
    }

    #[must_use]
    pub fn argument(mut self, arg: ArgumentDef) -> Self {
        self.arguments.insert(arg.name.clone(), arg);
        self
    }

    #[must_use]
    pub fn resolve(
        mut self,
        resolver: impl Fn(FieldContext) -> Deferred<Value> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn subscribe(
        mut self,
        subscribe: impl Fn(FieldContext) -> futures::stream::BoxStream<'static, Value> + Send + Sync + 'static,
    ) -> Self {
        self.subscribe = Some(Arc::new(subscribe));
        self
    }
}

/// An input-object field: like [`ArgumentDef`], but scoped to
/// [`InputObjectType`].
#[derive(Clone)]
pub struct InputFieldDef {
    pub name: Name,
    pub type_ref: super::TypeRef,
    pub default_value: Option<InputValue>,
}

/// A concrete, resolvable object type.
#[derive(Clone)]
pub struct ObjectType {
    pub name: Name,
    pub fields: IndexMap<Name, FieldDef>,
    pub interfaces: Vec<Name>,
    pub is_type_of: Option<IsTypeOfFn>,
}

impl ObjectType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self { name: name.into(), fields: IndexMap::new(), interfaces: Vec::new(), is_type_of: None }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<Name>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn is_type_of(
        mut self,
        check: impl Fn(&Value, &ResolveInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_type_of = Some(Arc::new(check));
        self
    }
}

/// An abstract type implemented by one or more object types.
#[derive(Clone)]
pub struct InterfaceType {
    pub name: Name,
    pub fields: IndexMap<Name, FieldDef>,
    pub possible_types: Vec<Name>,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self { name: name.into(), fields: IndexMap::new(), possible_types: Vec::new(), resolve_type: None }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn possible_type(mut self, name: impl Into<Name>) -> Self {
        self.possible_types.push(name.into());
        self
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value, &ResolveInfo) -> Option<Name> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

/// A type that is one of a fixed set of member object types.
#[derive(Clone)]
pub struct UnionType {
    pub name: Name,
    pub members: Vec<Name>,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl UnionType {
    pub fn new(name: impl Into<Name>, members: impl IntoIterator<Item = impl Into<Name>>) -> Self {
        Self { name: name.into(), members: members.into_iter().map(Into::into).collect(), resolve_type: None }
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value, &ResolveInfo) -> Option<Name> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

/// An input-only object type, used for complex argument shapes.
#[derive(Clone)]
pub struct InputObjectType {
    pub name: Name,
    pub fields: IndexMap<Name, InputFieldDef>,
}

impl InputObjectType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self { name: name.into(), fields: IndexMap::new() }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<Name>, type_ref: super::TypeRef) -> Self {
        let name = name.into();
        self.fields.insert(name.clone(), InputFieldDef { name, type_ref, default_value: None });
        self
    }
}

/// A single named type in the schema's type arena.
#[derive(Clone)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    InputObject(InputObjectType),
}

impl NamedType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
            Self::InputObject(t) => &t.name,
        }
    }

    /// The declared fields of this type, for types that have any (object and
    /// interface). `None` for scalars, enums, unions, and input objects.
    pub fn fields(&self) -> Option<&IndexMap<Name, FieldDef>> {
        match self {
            Self::Object(t) => Some(&t.fields),
            Self::Interface(t) => Some(&t.fields),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            Self::Interface(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Self::Union(t) => Some(t),
            _ => None,
        }
    }
}
