//! The response envelope: `data` plus a `errors` list, serialized the way
//! the GraphQL-over-HTTP spec expects.
//!
//! Mirrors juniper's `http::GraphQLResponse`, minus the transport framing,
//! which is out of scope here — this is the bare `{ data, errors }` shape,
//! left for a caller to serialize however their transport wants.

use serde::Serialize;

use crate::{ast::SourceLocation, error::ExecutionError, path::PathSegment, value::Value};

/// One entry in a [`Response`]'s `errors` list.
#[derive(Clone, Debug, Serialize)]
pub struct LocatedError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceLocation>,
}

impl From<ExecutionError> for LocatedError {
    fn from(e: ExecutionError) -> Self {
        Self { message: e.message().to_owned(), path: e.path().to_vec(), locations: e.locations().to_vec() }
    }
}

/// The result of executing a request: the (possibly partial, possibly null)
/// data tree plus every field error collected along the way, sorted for
/// deterministic output: errors are reported in `(path, message)` order,
/// independent of settlement order.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<LocatedError>,
}

impl Response {
    pub fn new(data: Value, mut errors: Vec<ExecutionError>) -> Self {
        errors.sort_by(|a, b| (a.path(), a.message()).cmp(&(b.path(), b.message())));
        Self { data, errors: errors.into_iter().map(LocatedError::from).collect() }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn errors(&self) -> &[LocatedError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::FieldError;

    #[test]
    fn errors_are_sorted_by_path_then_message_regardless_of_insertion_order() {
        let errors = vec![
            ExecutionError::new(vec![PathSegment::Key("b".into())], vec![], FieldError::new("z")),
            ExecutionError::new(vec![PathSegment::Key("a".into())], vec![], FieldError::new("m")),
            ExecutionError::new(vec![PathSegment::Key("a".into())], vec![], FieldError::new("a")),
        ];
        let response = Response::new(Value::Null, errors);
        let messages: Vec<&str> = response.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "m", "z"]);
    }

    #[test]
    fn empty_errors_list_is_omitted_from_serialization() {
        let response = Response::new(Value::from("ok"), vec![]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("errors"));
    }
}
