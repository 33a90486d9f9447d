//! Fragment Collector: flattens a selection set into an ordered map from
//! response key to the (possibly multiple, across fragment spreads) field
//! nodes contributing to it.
//!
//! Grounded on juniper's `executor::sync_resolve_selection_set_into`, which
//! performs the same directive/type-condition/merge walk — reshaped here as
//! a pure function returning a map rather than resolving as it goes, since
//! this crate's executor drives resolution separately.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    ast::{FieldNode, FragmentDefinition, InlineFragmentNode, Name, Selection},
    context::Variables,
    schema::Schema,
    variables::coerce_directive_arguments,
};

/// Evaluates `@skip`/`@include` on a selection's directives, returning
/// whether the selection should be included in the collected set.
fn should_include(directives: &[crate::ast::Directive], variables: &Variables) -> Result<bool, String> {
    let mut included = true;
    for directive in directives {
        let args = coerce_directive_arguments(&directive.arguments, variables)?;
        let if_value = args.get("if").and_then(|v| match v {
            crate::value::Value::Boolean(b) => Some(*b),
            _ => None,
        });
        match (&*directive.name, if_value) {
            ("skip", Some(true)) => included = false,
            ("include", Some(false)) => included = false,
            _ => {}
        }
    }
    Ok(included)
}

/// Collects the fields contributed by `selection_set`, merging same-response-key
/// fields across fragment spreads and inline fragments in document order.
///
/// `fragment_path` guards against a fragment spreading itself, directly or
/// transitively: it is local to one collection call tree, not shared across
/// sibling selection sets.
pub fn collect_fields(
    schema: &Schema,
    runtime_type: &str,
    selection_set: &[Selection],
    fragments: &HashMap<Name, FragmentDefinition>,
    variables: &Variables,
) -> Result<IndexMap<Name, Vec<FieldNode>>, String> {
    let mut visited = Vec::new();
    let mut out = IndexMap::new();
    collect_into(schema, runtime_type, selection_set, fragments, variables, &mut visited, &mut out)?;
    Ok(out)
}

fn collect_into(
    schema: &Schema,
    runtime_type: &str,
    selection_set: &[Selection],
    fragments: &HashMap<Name, FragmentDefinition>,
    variables: &Variables,
    visited_fragments: &mut Vec<Name>,
    out: &mut IndexMap<Name, Vec<FieldNode>>,
) -> Result<(), String> {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, variables)? {
                    continue;
                }
                out.entry(field.response_key().clone()).or_default().push(field.clone());
            }
            Selection::InlineFragment(InlineFragmentNode { type_condition, directives, selection_set, .. }) => {
                if !should_include(directives, variables)? {
                    continue;
                }
                if let Some(condition) = type_condition {
                    if !type_applies(schema, condition, runtime_type) {
                        continue;
                    }
                }
                collect_into(schema, runtime_type, selection_set, fragments, variables, visited_fragments, out)?;
            }
            Selection::FragmentSpread(spread) => {
                if !should_include(&spread.directives, variables)? {
                    continue;
                }
                if visited_fragments.contains(&spread.name) {
                    continue;
                }
                let Some(def) = fragments.get(&spread.name) else {
                    continue;
                };
                if !type_applies(schema, &def.type_condition, runtime_type) {
                    continue;
                }
                visited_fragments.push(spread.name.clone());
                collect_into(schema, runtime_type, &def.selection_set, fragments, variables, visited_fragments, out)?;
                visited_fragments.pop();
            }
        }
    }
    Ok(())
}

fn type_applies(schema: &Schema, condition: &str, runtime_type: &str) -> bool {
    condition == runtime_type || schema.is_possible_type(condition, runtime_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;

    fn field(name: &str) -> FieldNode {
        FieldNode {
            alias: None,
            name: Name::from(name),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            location: SourceLocation::default(),
        }
    }

    fn schema() -> Schema {
        crate::schema::SchemaBuilder::new("Query")
            .type_(crate::schema::NamedType::Object(crate::schema::ObjectType::new("Query")))
            .build()
    }

    #[test]
    fn merges_duplicate_response_keys_in_order() {
        let schema = schema();
        let set = vec![Selection::Field(field("a")), Selection::Field(field("b")), Selection::Field(field("a"))];
        let collected = collect_fields(&schema, "Query", &set, &HashMap::new(), &Variables::new()).unwrap();
        let keys: Vec<&str> = collected.keys().map(|k| &**k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(collected.get("a").unwrap().len(), 2);
    }

    #[test]
    fn fragment_spreading_itself_is_not_infinitely_recursed() {
        let schema = schema();
        let mut fragments = HashMap::new();
        fragments.insert(
            Name::from("Cyclic"),
            FragmentDefinition {
                name: Name::from("Cyclic"),
                type_condition: Name::from("Query"),
                directives: vec![],
                selection_set: vec![Selection::FragmentSpread(crate::ast::FragmentSpreadNode {
                    name: Name::from("Cyclic"),
                    directives: vec![],
                    location: SourceLocation::default(),
                })],
            },
        );
        let set = vec![Selection::FragmentSpread(crate::ast::FragmentSpreadNode {
            name: Name::from("Cyclic"),
            directives: vec![],
            location: SourceLocation::default(),
        })];
        let collected = collect_fields(&schema, "Query", &set, &fragments, &Variables::new()).unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn skip_directive_with_true_literal_excludes_the_field() {
        let schema = schema();
        let mut f = field("a");
        f.directives.push(crate::ast::Directive {
            name: Name::from("skip"),
            arguments: vec![(Name::from("if"), crate::ast::InputValue::Boolean(true))],
        });
        let set = vec![Selection::Field(f)];
        let collected = collect_fields(&schema, "Query", &set, &HashMap::new(), &Variables::new()).unwrap();
        assert!(collected.is_empty());
    }
}
