//! Compact attribute names.
//!
//! With aliasing enabled every declared field carries a short wire name. Two trees
//! are built once from the declaration: one keyed by logical names holding wire
//! names, and its inverse keyed by wire names holding logical names. Items are
//! rewritten by walking them together with the matching tree.

use crate::schema::field;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Alias tree level, keyed by the name being translated.
pub type AliasMap = IndexMap<String, AliasNode>;

/// Translation of one field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AliasNode {
    /// Scalar field: the translated name.
    Leaf(String),
    /// Nested map: the translated name and the tree of its attributes.
    Object(String, AliasMap),
    /// List of maps: the translated name and the tree applied to every element.
    ArrayOfObjects(String, AliasMap),
}

impl AliasNode {
    /// Translated name.
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(name) | Self::Object(name, _) | Self::ArrayOfObjects(name, _) => name,
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    LogicalToAlias,
    AliasToLogical,
}

/// Tree keyed by logical names, holding wire names.
pub fn logical_to_alias(fields: &field::Fields) -> Result<AliasMap, Vec<String>> {
    build(fields, Direction::LogicalToAlias)
}

/// Tree keyed by wire names, holding logical names.
pub fn alias_to_logical(fields: &field::Fields) -> Result<AliasMap, Vec<String>> {
    build(fields, Direction::AliasToLogical)
}

fn build(fields: &field::Fields, direction: Direction) -> Result<AliasMap, Vec<String>> {
    let mut violations = Vec::new();
    let map = build_recursive(fields, direction, "", &mut violations);
    if violations.is_empty() {
        Ok(map)
    } else {
        Err(violations)
    }
}

fn build_recursive(
    fields: &field::Fields,
    direction: Direction,
    path: &str,
    violations: &mut Vec<String>,
) -> AliasMap {
    let mut map = AliasMap::with_capacity(fields.len());
    for (name, schema) in fields {
        let field_path = join_path(path, name);
        let Some(alias) = schema.alias() else {
            violations.push(format!("field `{field_path}` has no alias name"));
            continue;
        };
        let (key, value) = match direction {
            Direction::LogicalToAlias => (name.clone(), alias.to_string()),
            Direction::AliasToLogical => (alias.to_string(), name.clone()),
        };
        let node = match schema {
            field::FieldSchema::Scalar(_) => AliasNode::Leaf(value),
            field::FieldSchema::Object(nested) => AliasNode::Object(
                value,
                build_recursive(&nested.fields, direction, &field_path, violations),
            ),
            field::FieldSchema::List(nested) => AliasNode::ArrayOfObjects(
                value,
                build_recursive(&nested.fields, direction, &field_path, violations),
            ),
        };
        if map.insert(key.clone(), node).is_some() {
            let location = if path.is_empty() { "<root>" } else { path };
            violations.push(format!("alias `{key}` is used by more than one field of `{location}`"));
        }
    }
    map
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Rewrite a declaration so that it is keyed by wire names at every level.
///
/// Fields without an entry in `map` are dropped.
pub fn convert_schema_to_wire_names(fields: &field::Fields, map: &AliasMap) -> field::Fields {
    let mut converted = field::Fields::with_capacity(fields.len());
    for (name, schema) in fields {
        let Some(node) = map.get(name) else {
            continue;
        };
        let schema = match (schema, node) {
            (field::FieldSchema::Object(nested), AliasNode::Object(_, children)) => {
                field::FieldSchema::Object(field::NestedField {
                    fields: convert_schema_to_wire_names(&nested.fields, children),
                    ..nested.clone()
                })
            }
            (field::FieldSchema::List(nested), AliasNode::ArrayOfObjects(_, children)) => {
                field::FieldSchema::List(field::NestedField {
                    fields: convert_schema_to_wire_names(&nested.fields, children),
                    ..nested.clone()
                })
            }
            (schema, _) => schema.clone(),
        };
        converted.insert(node.name().to_string(), schema.with_alias(None));
    }
    converted
}

/// Rename the attributes of `item` using `map`, at every nesting level.
///
/// Walking a logical item with the logical-to-alias tree produces its wire shape;
/// walking a wire item with the alias-to-logical tree restores the logical shape.
/// Attributes without an entry in the tree are dropped.
pub fn serialize_item(item: &Map<String, Value>, map: &AliasMap) -> Map<String, Value> {
    let mut renamed = Map::with_capacity(item.len());
    for (key, value) in item {
        let Some(node) = map.get(key) else {
            continue;
        };
        let value = match (node, value) {
            (AliasNode::Object(_, children), Value::Object(object)) => {
                Value::Object(serialize_item(object, children))
            }
            (AliasNode::ArrayOfObjects(_, children), Value::Array(elements)) => Value::Array(
                elements
                    .iter()
                    .map(|element| match element {
                        Value::Object(object) => Value::Object(serialize_item(object, children)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            (_, value) => value.clone(),
        };
        renamed.insert(node.name().to_string(), value);
    }
    renamed
}

/// Restore the logical shape of a wire item using the alias-to-logical tree.
pub fn deserialize_item(item: &Map<String, Value>, map: &AliasMap) -> Map<String, Value> {
    serialize_item(item, map)
}
