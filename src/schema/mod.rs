//! The schema: a name-keyed arena of types plus the three root type names.
//!
//! Modelled to support cyclic schemas: an `FnvHashMap<Name, NamedType>` arena
//! (the same container juniper's `Registry` uses), with every reference to
//! another type going
//! through a [`TypeRef::Named`] lookup rather than an embedded pointer — so
//! a field can legally return its own enclosing object type with no `Rc`
//! cycle or unsafe trick required.

pub mod meta;

pub use crate::context::ResolveInfo;

use fnv::FnvHashMap;

use crate::ast::Name;
pub use meta::{
    ArgumentDef, EnumType, FieldDef, InputFieldDef, InputObjectType, InterfaceType, IsTypeOfFn,
    NamedType, ObjectType, ParseValueFn, ResolveTypeFn, ResolverFn, ScalarType, SerializeFn,
    SubscribeFn, UnionType,
};

/// A reference to a schema type: either a name to look up in the arena, or a
/// `List`/`NonNull` wrapper around another reference.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Named(Name),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<Name>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    #[must_use]
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The `Named`/`List` type one non-null unwrap away, i.e. the type this
    /// reference completes as once any enclosing `NonNull` has been
    /// stripped by the caller.
    pub fn inner(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }

    /// The name of the named type at the bottom of any `List`/`NonNull`
    /// wrapping, e.g. `[[String!]!]` → `String`.
    pub fn innermost_name(&self) -> &Name {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.innermost_name(),
        }
    }
}

/// The schema: three root type names plus the arena of all named types they
/// (transitively) reference.
pub struct Schema {
    query_type: Name,
    mutation_type: Option<Name>,
    subscription_type: Option<Name>,
    types: FnvHashMap<Name, NamedType>,
}

impl Schema {
    pub fn query_type_name(&self) -> &Name {
        &self.query_type
    }

    pub fn mutation_type_name(&self) -> Option<&Name> {
        self.mutation_type.as_ref()
    }

    pub fn subscription_type_name(&self) -> Option<&Name> {
        self.subscription_type.as_ref()
    }

    pub fn type_by_name(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// Whether `possible_type` is a valid runtime type for the abstract
    /// (interface or union) type named `abstract_name` — used both for
    /// fragment type-condition matching and for validating a
    /// `resolve_type`/`is_type_of` result.
    pub fn is_possible_type(&self, abstract_name: &str, possible_type: &str) -> bool {
        match self.types.get(abstract_name) {
            Some(NamedType::Interface(i)) => i.possible_types.iter().any(|t| &**t == possible_type),
            Some(NamedType::Union(u)) => u.members.iter().any(|t| &**t == possible_type),
            Some(NamedType::Object(o)) => o.name == *possible_type,
            _ => false,
        }
    }

    /// Resolves a [`TypeRef`] to the field definition map of the underlying
    /// named type, if it has one (object or interface).
    pub fn fields_of(&self, type_ref: &TypeRef) -> Option<&indexmap::IndexMap<Name, FieldDef>> {
        self.type_by_name(type_ref.innermost_name()).and_then(NamedType::fields)
    }
}

/// Builder for a [`Schema`], mirroring juniper's
/// `RootNode::new(query, mutation, subscription)` constructor plus
/// method-chaining (the "configuration" ambient concern for a library with
/// no CLI/env-var surface of its own).
#[derive(Default)]
pub struct SchemaBuilder {
    query_type: Option<Name>,
    mutation_type: Option<Name>,
    subscription_type: Option<Name>,
    types: FnvHashMap<Name, NamedType>,
}

impl SchemaBuilder {
    pub fn new(query_type: impl Into<Name>) -> Self {
        Self { query_type: Some(query_type.into()), ..Self::default() }
    }

    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<Name>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<Name>) -> Self {
        self.subscription_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn type_(mut self, t: NamedType) -> Self {
        self.types.insert(t.name().clone(), t);
        self
    }

    /// Builds the schema, panicking if the declared query/mutation/
    /// subscription root type names were never registered via
    /// [`SchemaBuilder::type_`] — a schema-construction-time programmer
    /// error, not a request-time one.
    pub fn build(self) -> Schema {
        let query_type = self.query_type.expect("a schema must declare a query root type");
        assert!(
            self.types.contains_key(&query_type),
            "query root type {query_type:?} was never registered"
        );
        if let Some(m) = &self.mutation_type {
            assert!(self.types.contains_key(m), "mutation root type {m:?} was never registered");
        }
        if let Some(s) = &self.subscription_type {
            assert!(self.types.contains_key(s), "subscription root type {s:?} was never registered");
        }
        Schema {
            query_type,
            mutation_type: self.mutation_type,
            subscription_type: self.subscription_type,
            types: self.types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_name_unwraps_list_and_non_null() {
        let t = TypeRef::named("String").non_null().list().non_null();
        assert_eq!(&**t.innermost_name(), "String");
    }

    #[test]
    fn builder_registers_root_types() {
        let schema = SchemaBuilder::new("Query")
            .type_(NamedType::Object(ObjectType::new("Query")))
            .build();
        assert_eq!(&**schema.query_type_name(), "Query");
    }

    #[test]
    #[should_panic(expected = "was never registered")]
    fn builder_panics_on_unregistered_query_type() {
        SchemaBuilder::new("Query").build();
    }
}
