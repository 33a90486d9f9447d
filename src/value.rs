//! Runtime response values.
//!
//! `Value` plays the same role as juniper's `value::Value<S>`: the
//! serializable tree the execution engine builds up as it resolves fields.
//! Unlike juniper this crate is not generic over a custom scalar type —
//! the dynamic schema model has no derive
//! macros generating per-scalar `ScalarValue` impls, so a closed JSON-shaped
//! enum is the simpler, equally idiomatic choice here.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

/// An ordered field map, as found inside [`Value::Object`].
///
/// Order is insertion order, matching collected-field order: the result
/// object is assembled in the order its fields were collected.
pub type Object = IndexMap<Arc<str>, Value>;

/// Serializable value returned from query and field execution.
///
/// Used by the execution engine and resolvers to build up the response
/// structure, and by resolvers themselves as the "raw" value a field
/// resolves to before [`crate::complete`] coerces it against the declared
/// output type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Constructs a null value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Whether this value represents null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Views the underlying object, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Views the underlying list, if this is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Views the underlying string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// A short, human-readable rendering used in coercion error messages,
    /// e.g. `Expected value of type "SpecialType" but got: NotSpecial.`.
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Boolean(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::List(l) => format!("[{} items]", l.len()),
            Self::Object(o) => o
                .get("__typename")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| "Object".into()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_reports_typename_for_objects() {
        let mut obj = Object::new();
        obj.insert(Arc::from("__typename"), Value::from("NotSpecial"));
        assert_eq!(Value::Object(obj).describe(), "NotSpecial");
    }

    #[test]
    fn conversions_round_trip_shape() {
        let v: Value = vec![1, 2, 3].into();
        assert_eq!(v.as_list().map(<[_]>::len), Some(3));
    }
}
