//! Error types, split the same way juniper splits
//! `GraphQLError`/`FieldError`/`ExecutionError`: one enum for pre-execution
//! request failures, and a value/located pair for per-field failures.

use derive_more::{Display, Error};

use crate::{
    ast::SourceLocation,
    path::PathSegment,
    value::Value,
};

/// A failure that prevents execution from starting at all
///.
///
/// Surfaced synchronously to the caller of [`crate::execute`], never
/// collected into a [`crate::Response`]'s `errors` list.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum RequestError {
    #[display("GraphQL cannot execute a request containing a {kind}.")]
    TypeSystemDefinitionPresent { kind: &'static str },

    #[display("Must provide an operation.")]
    NoOperationProvided,

    #[display("Unknown operation named \"{name}\".")]
    UnknownOperationName { name: String },

    #[display("Must provide operation name if query contains multiple operations.")]
    MultipleOperationsProvided,

    #[display("No mutation type found in the schema.")]
    NoMutationType,

    #[display("No subscription type found in the schema.")]
    NoSubscriptionType,

    #[display("Operation is a subscription; use `execute_subscription` for a streamed response.")]
    SubscriptionNotAllowed,

    #[display("Operation is not a subscription.")]
    NotASubscription,

    #[display("{_0}")]
    VariableCoercion(String),
}

/// Error produced by resolving a single field.
///
/// Field errors are a human-readable message plus an optional `extensions`
/// payload, mirroring `juniper::FieldError`. Any [`std::fmt::Display`] type
/// converts into one via `?`, the same ergonomics juniper documents for
/// its own `FieldError`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), extensions: Value::Null }
    }

    pub fn with_extensions(message: impl Into<String>, extensions: Value) -> Self {
        Self { message: message.into(), extensions }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

impl<T: std::fmt::Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self::new(e.to_string())
    }
}

/// A [`FieldError`] located at a path and (optionally) a query source
/// location, exactly as it will be reported in the response.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    path: Vec<PathSegment>,
    locations: Vec<SourceLocation>,
    error: FieldError,
}

impl ExecutionError {
    pub fn new(path: Vec<PathSegment>, locations: Vec<SourceLocation>, error: FieldError) -> Self {
        Self { path, locations, error }
    }

    pub fn at_origin(error: FieldError) -> Self {
        Self { path: Vec::new(), locations: Vec::new(), error }
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn locations(&self) -> &[SourceLocation] {
        &self.locations
    }

    pub fn field_error(&self) -> &FieldError {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_messages_match_expected_wording() {
        assert_eq!(RequestError::NoOperationProvided.to_string(), "Must provide an operation.");
        assert_eq!(
            RequestError::UnknownOperationName { name: "Foo".into() }.to_string(),
            "Unknown operation named \"Foo\"."
        );
        assert_eq!(
            RequestError::MultipleOperationsProvided.to_string(),
            "Must provide operation name if query contains multiple operations."
        );
        assert_eq!(
            RequestError::TypeSystemDefinitionPresent { kind: "ObjectTypeDefinition" }.to_string(),
            "GraphQL cannot execute a request containing a ObjectTypeDefinition."
        );
    }

    #[test]
    fn field_error_from_display_has_null_extensions() {
        let err: FieldError = "boom".into();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.extensions(), &Value::Null);
    }
}
