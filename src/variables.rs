//! Variable and argument coercion: turning AST literals/variable references
//! into runtime [`Value`]s against a declared schema type.
//!
//! Input-value literal and variable coercion for leaf scalars/enums and
//! input objects is treated as an external, pure-function collaborator that
//! the executor nonetheless has to call — this module is that collaborator.

use indexmap::IndexMap;

use crate::{
    ast::{self, InputValue, Name, OperationDefinition},
    context::Variables,
    error::RequestError,
    schema::{NamedType, Schema, TypeRef},
    value::{Object, Value},
};

fn ast_type_to_schema_type_ref(t: &ast::TypeRef) -> TypeRef {
    match t {
        ast::TypeRef::Named(n) => TypeRef::Named(n.clone()),
        ast::TypeRef::List(inner) => TypeRef::List(Box::new(ast_type_to_schema_type_ref(inner))),
        ast::TypeRef::NonNull(inner) => TypeRef::NonNull(Box::new(ast_type_to_schema_type_ref(inner))),
    }
}

/// Coerces an AST literal (or variable reference, resolved against
/// `variables`) into a runtime [`Value`] for the given declared type
///.
pub fn coerce_literal(
    schema: &Schema,
    type_ref: &TypeRef,
    literal: &InputValue,
    variables: &Variables,
) -> Result<Value, String> {
    if let InputValue::Variable(name) = literal {
        return match variables.get(&**name) {
            Some(v) => Ok(v.clone()),
            None => {
                if type_ref.is_non_null() {
                    Err(format!("Variable \"${name}\" of required type was not provided."))
                } else {
                    Ok(Value::Null)
                }
            }
        };
    }

    match type_ref {
        TypeRef::NonNull(inner) => {
            if matches!(literal, InputValue::Null) {
                return Err("Expected non-null value, found null.".into());
            }
            coerce_literal(schema, inner, literal, variables)
        }
        TypeRef::List(inner) => match literal {
            InputValue::Null => Ok(Value::Null),
            InputValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(coerce_literal(schema, inner, item, variables)?);
                }
                Ok(Value::List(out))
            }
            // A bare value coerces into a single-element list, per the
            // usual GraphQL input coercion rules.
            single => Ok(Value::List(vec![coerce_literal(schema, inner, single, variables)?])),
        },
        TypeRef::Named(name) => {
            if matches!(literal, InputValue::Null) {
                return Ok(Value::Null);
            }
            coerce_named_literal(schema, name, literal, variables)
        }
    }
}

fn coerce_named_literal(
    schema: &Schema,
    name: &Name,
    literal: &InputValue,
    variables: &Variables,
) -> Result<Value, String> {
    match schema.type_by_name(name) {
        Some(NamedType::Scalar(scalar)) => (scalar.parse_value)(&literal.to_value_lossy())
            .map_err(|e| format!("Expected type \"{name}\", found error: {e}")),
        Some(NamedType::Enum(en)) => match literal {
            InputValue::Enum(v) => {
                if en.contains(v) {
                    Ok(Value::String(v.to_string()))
                } else {
                    Err(format!("Value \"{v}\" does not exist in \"{name}\" enum."))
                }
            }
            _ => Err(format!("Enum \"{name}\" cannot represent non-enum value: {literal:?}")),
        },
        Some(NamedType::InputObject(obj)) => match literal {
            InputValue::Object(fields) => {
                let mut out = Object::with_capacity(obj.fields.len());
                for (field_name, field_def) in &obj.fields {
                    let provided = fields.iter().find(|(n, _)| n == field_name);
                    let value = match provided {
                        Some((_, v)) => coerce_literal(schema, &field_def.type_ref, v, variables)?,
                        None => match &field_def.default_value {
                            Some(default) => coerce_literal(schema, &field_def.type_ref, default, variables)?,
                            None if field_def.type_ref.is_non_null() => {
                                return Err(format!(
                                    "Field \"{field_name}\" of required type was not provided."
                                ));
                            }
                            None => continue,
                        },
                    };
                    out.insert(field_name.clone(), value);
                }
                Ok(Value::Object(out))
            }
            _ => Err(format!("Expected \"{name}\" to be an object.")),
        },
        Some(NamedType::Object(_) | NamedType::Interface(_) | NamedType::Union(_)) | None => {
            Err(format!("\"{name}\" is not an input type."))
        }
    }
}

/// The result of the Argument Coercer: present only the arguments
/// that were supplied in the AST or had a declared default — never a bare
/// `Value::Null` standing in for "not given".
pub fn coerce_arguments(
    schema: &Schema,
    declared: &IndexMap<Name, crate::schema::ArgumentDef>,
    supplied: &[(Name, InputValue)],
    variables: &Variables,
) -> Result<Object, String> {
    let mut out = Object::with_capacity(declared.len());
    for (name, def) in declared {
        let found = supplied.iter().find(|(n, _)| n == name);
        match found {
            Some((_, literal)) => {
                out.insert(name.clone(), coerce_literal(schema, &def.type_ref, literal, variables)?);
            }
            None => {
                if let Some(default) = &def.default_value {
                    out.insert(name.clone(), coerce_literal(schema, &def.type_ref, default, variables)?);
                }
                // Else: omit entirely.
            }
        }
    }
    Ok(out)
}

/// Coerces a directive's arguments the same way: used only
/// for `@skip`/`@include`, so the declared shape is fixed rather than
/// schema-driven.
pub fn coerce_directive_arguments(
    supplied: &[(Name, InputValue)],
    variables: &Variables,
) -> Result<Object, String> {
    let mut out = Object::new();
    if let Some((_, literal)) = supplied.iter().find(|(n, _)| &**n == "if") {
        let value = match literal {
            InputValue::Variable(name) => variables
                .get(&**name)
                .cloned()
                .ok_or_else(|| format!("Variable \"${name}\" was not provided."))?,
            InputValue::Boolean(b) => Value::Boolean(*b),
            other => return Err(format!("Expected Boolean, found {other:?}")),
        };
        out.insert(Name::from("if"), value);
    }
    Ok(out)
}

/// Coerces the raw (caller-supplied, JSON-shaped) variable values against
/// the operation's variable definitions, filling in declared defaults for
/// anything omitted.
///
/// A missing, non-nullable variable with no default is a single
/// [`RequestError`], surfacing before any field resolution begins — never a
/// per-field [`crate::error::ExecutionError`].
pub fn coerce_variable_values(
    schema: &Schema,
    operation: &OperationDefinition,
    raw: &Variables,
) -> Result<Variables, RequestError> {
    let mut out = Variables::new();
    for def in &operation.variable_definitions {
        let schema_type = ast_type_to_schema_type_ref(&def.var_type);
        let provided = raw.get(&*def.name);
        let value = match provided {
            Some(v) => coerce_raw_value(schema, &schema_type, v)
                .map_err(RequestError::VariableCoercion)?,
            None => match &def.default_value {
                Some(lit) => coerce_literal(schema, &schema_type, lit, &out)
                    .map_err(RequestError::VariableCoercion)?,
                None => {
                    if schema_type.is_non_null() {
                        return Err(RequestError::VariableCoercion(format!(
                            "Variable \"${}\" of required type was not provided.",
                            def.name
                        )));
                    }
                    Value::Null
                }
            },
        };
        out.insert(def.name.to_string(), value);
    }
    Ok(out)
}

fn coerce_raw_value(schema: &Schema, type_ref: &TypeRef, raw: &Value) -> Result<Value, String> {
    match type_ref {
        TypeRef::NonNull(inner) => {
            if raw.is_null() {
                return Err("Expected non-null value, found null.".into());
            }
            coerce_raw_value(schema, inner, raw)
        }
        TypeRef::List(inner) => match raw {
            Value::Null => Ok(Value::Null),
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(coerce_raw_value(schema, inner, item)?);
                }
                Ok(Value::List(out))
            }
            single => Ok(Value::List(vec![coerce_raw_value(schema, inner, single)?])),
        },
        TypeRef::Named(name) => {
            if raw.is_null() {
                return Ok(Value::Null);
            }
            match schema.type_by_name(name) {
                Some(NamedType::Scalar(scalar)) => {
                    (scalar.parse_value)(raw).map_err(|e| format!("Expected type \"{name}\": {e}"))
                }
                Some(NamedType::Enum(en)) => match raw.as_str() {
                    Some(v) if en.contains(v) => Ok(Value::String(v.to_owned())),
                    _ => Err(format!("Value does not exist in \"{name}\" enum.")),
                },
                Some(NamedType::InputObject(obj)) => match raw {
                    Value::Object(fields) => {
                        let mut out = Object::with_capacity(obj.fields.len());
                        for (field_name, field_def) in &obj.fields {
                            match fields.get(&**field_name) {
                                Some(v) => {
                                    out.insert(field_name.clone(), coerce_raw_value(schema, &field_def.type_ref, v)?);
                                }
                                None => {
                                    if field_def.type_ref.is_non_null() && field_def.default_value.is_none() {
                                        return Err(format!(
                                            "Field \"{field_name}\" of required type was not provided."
                                        ));
                                    }
                                }
                            }
                        }
                        Ok(Value::Object(out))
                    }
                    _ => Err(format!("Expected \"{name}\" to be an object.")),
                },
                _ => Err(format!("\"{name}\" is not an input type.")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, ObjectType, SchemaBuilder};

    fn int_scalar() -> crate::schema::ScalarType {
        crate::schema::ScalarType::new(
            "Int",
            |v| Ok(v.clone()),
            |v| match v {
                Value::Int(_) => Ok(v.clone()),
                _ => Err("not an int".into()),
            },
        )
    }

    fn test_schema() -> Schema {
        SchemaBuilder::new("Query")
            .type_(NamedType::Scalar(int_scalar()))
            .type_(NamedType::Object(
                ObjectType::new("Query").field(FieldDef::new("x", TypeRef::named("Int"))),
            ))
            .build()
    }

    #[test]
    fn omitted_optional_argument_is_absent_from_the_map() {
        let schema = test_schema();
        let mut declared = IndexMap::new();
        declared.insert(Name::from("size"), crate::schema::ArgumentDef::new("size", TypeRef::named("Int")));
        let out = coerce_arguments(&schema, &declared, &[], &Variables::new()).unwrap();
        assert!(!out.contains_key("size"));
    }

    #[test]
    fn default_value_is_used_when_argument_omitted() {
        let schema = test_schema();
        let mut declared = IndexMap::new();
        declared.insert(
            Name::from("size"),
            crate::schema::ArgumentDef::new("size", TypeRef::named("Int")).default_value(InputValue::Int(50)),
        );
        let out = coerce_arguments(&schema, &declared, &[], &Variables::new()).unwrap();
        assert_eq!(out.get("size"), Some(&Value::Int(50)));
    }

    #[test]
    fn supplied_variable_reference_resolves_against_variables() {
        let schema = test_schema();
        let mut declared = IndexMap::new();
        declared.insert(Name::from("size"), crate::schema::ArgumentDef::new("size", TypeRef::named("Int")));
        let supplied = vec![(Name::from("size"), InputValue::Variable(Name::from("size")))];
        let mut vars = Variables::new();
        vars.insert("size".into(), Value::Int(100));
        let out = coerce_arguments(&schema, &declared, &supplied, &vars).unwrap();
        assert_eq!(out.get("size"), Some(&Value::Int(100)));
    }

    #[test]
    fn missing_required_variable_is_a_request_error() {
        let schema = test_schema();
        let op = OperationDefinition {
            operation_type: ast::OperationType::Query,
            name: None,
            variable_definitions: vec![ast::VariableDefinition {
                name: Name::from("size"),
                var_type: ast::TypeRef::NonNull(Box::new(ast::TypeRef::Named(Name::from("Int")))),
                default_value: None,
            }],
            directives: vec![],
            selection_set: vec![],
            location: ast::SourceLocation::default(),
        };
        let err = coerce_variable_values(&schema, &op, &Variables::new()).unwrap_err();
        assert!(matches!(err, RequestError::VariableCoercion(_)));
    }
}
