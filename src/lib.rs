//! A GraphQL query execution engine: operation selection, fragment
//! collection, argument coercion, field resolution and output coercion over
//! an externally parsed [`Document`](ast::Document) and a dynamic
//! [`Schema`](schema::Schema).
//!
//! Parsing and validation are out of scope — a caller
//! supplies an already-parsed document and a schema built with
//! [`schema::SchemaBuilder`], and this crate drives it to a
//! [`response::Response`] or, for subscriptions, a stream of them.
//!
//! The pipeline, roughly in the order a request passes through it:
//! 1. [`executor::execute`] / [`executor::execute_reraising`] select the
//!    operation and coerce its variables ([`variables`]).
//! 2. [`collect`] flattens each selection set, honoring `@skip`/`@include`
//!    and fragment type conditions.
//! 3. [`resolve`] looks up each collected field's definition, coerces its
//!    arguments, and drives its resolver through the [`middleware`] chain.
//! 4. [`complete`] coerces the raw resolved value against the field's
//!    declared type, applying non-null propagation and recursing into
//!    child selections.
//! 5. [`subscription::execute_subscription`] re-enters step 4 once per
//!    source event for subscription operations.

mod ast;
mod collect;
mod complete;
mod context;
mod deferred;
mod error;
mod executor;
mod middleware;
mod path;
mod resolve;
mod response;
mod schema;
mod subscription;
mod value;
mod variables;

pub use ast::{
    Definition, Directive, Document, FieldNode, FragmentDefinition, FragmentSpreadNode,
    InlineFragmentNode, InputValue, Name, OperationDefinition, OperationType, Selection,
    SourceLocation, TypeRef as AstTypeRef, VariableDefinition,
};
pub use collect::collect_fields;
pub use context::{Context, DynamicObject, FieldContext, Parent, ResolveInfo, Variables};
pub use deferred::Deferred;
pub use error::{ExecutionError, FieldError, RequestError};
pub use executor::{execute, execute_reraising};
pub use middleware::{Middleware, MiddlewareChain};
pub use path::{Path, PathSegment};
pub use response::{LocatedError, Response};
pub use schema::{
    ArgumentDef, EnumType, FieldDef, InputFieldDef, InputObjectType, InterfaceType, IsTypeOfFn,
    NamedType, ObjectType, ParseValueFn, ResolveTypeFn, ResolverFn, Schema, SchemaBuilder,
    ScalarType, SerializeFn, SubscribeFn, TypeRef, UnionType,
};
pub use subscription::execute_subscription;
pub use value::{Object, Value};
pub use variables::{coerce_arguments, coerce_directive_arguments, coerce_literal, coerce_variable_values};
