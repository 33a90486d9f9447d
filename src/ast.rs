//! Query document AST.
//!
//! This is the shape a parser would hand the executor — `graphql-exec` does
//! not include a lexer or parser, so callers construct [`Document`] values
//! directly, the same way juniper's own `ast` module is just a data
//! definition consumed by a separate `parser::document` function.

use std::sync::Arc;

use crate::value::Value;

/// A GraphQL identifier: a field name, argument name, type name, etc.
///
/// `Arc<str>` rather than `String` so that cloning a name while threading it
/// through nested executors is a refcount bump, not an allocation.
pub type Name = Arc<str>;

/// A `line`/`column` position in the original query source, carried through
/// purely for error reporting — the engine never re-derives source text from
/// it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// A parsed query document: an ordered list of operation and fragment
/// definitions (and, for request-error detection, any type-system
/// definitions that have no business being in a request document).
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[derive(Clone, Debug)]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
    /// A `schema`/`type`/`directive` definition. Well-formed request
    /// documents never carry one of these; its presence is a request error.
    /// `kind` is only used for that error message.
    TypeSystem { kind: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

#[derive(Clone, Debug)]
pub struct OperationDefinition {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variable_definitions: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct VariableDefinition {
    pub name: Name,
    pub var_type: TypeRef,
    pub default_value: Option<InputValue>,
}

/// A type reference as written in the query (variable declarations,
/// eventually compared against the schema's own [`crate::schema::TypeRef`]).
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Named(Name),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

#[derive(Clone, Debug)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug)]
pub enum Selection {
    Field(FieldNode),
    FragmentSpread(FragmentSpreadNode),
    InlineFragment(InlineFragmentNode),
}

#[derive(Clone, Debug)]
pub struct FieldNode {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<(Name, InputValue)>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: SourceLocation,
}

impl FieldNode {
    /// The response key this field contributes under: its alias if present,
    /// otherwise its name.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug)]
pub struct FragmentSpreadNode {
    pub name: Name,
    pub directives: Vec<Directive>,
    pub location: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct InlineFragmentNode {
    pub type_condition: Option<Name>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<(Name, InputValue)>,
}

/// A literal or variable reference as it appears in the query text —
/// distinct from [`Value`], which never contains a `Variable` or an `Enum`
/// name needing further lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(Name),
    Variable(Name),
    List(Vec<InputValue>),
    Object(Vec<(Name, InputValue)>),
}

impl InputValue {
    /// Converts a literal (non-[`Variable`](InputValue::Variable)) input
    /// value directly into a runtime [`Value`], for the common case of
    /// scalar-shaped literals that need no schema-aware coercion (enums are
    /// passed through as strings; schema-aware scalar coercion happens in
    /// [`crate::variables`]).
    pub fn to_value_lossy(&self) -> Value {
        match self {
            Self::Null | Self::Variable(_) => Value::Null,
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::String(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Boolean(*b),
            Self::Enum(name) => Value::String(name.to_string()),
            Self::List(items) => Value::List(items.iter().map(Self::to_value_lossy).collect()),
            Self::Object(fields) => {
                let mut obj = indexmap::IndexMap::with_capacity(fields.len());
                for (k, v) in fields {
                    obj.insert(k.clone(), v.to_value_lossy());
                }
                Value::Object(obj)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_key_prefers_alias() {
        let field = FieldNode {
            alias: Some(Name::from("x")),
            name: Name::from("c"),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            location: SourceLocation::default(),
        };
        assert_eq!(&**field.response_key(), "x");
    }
}
