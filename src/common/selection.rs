use crate::{common, schema::alias};

use indexmap::IndexMap;
use std::{collections, hash};

/// Map for selecting attributes in projection expressions.
///
/// Written in logical names; [`SelectionMap::to_wire_names`] rewrites it for
/// tables that store compact aliases.
///
/// ```rust
/// use dynamodb_mapper::common::selection;
///
/// let selection = selection::SelectionMap::Leaves(vec![
///     "id".to_string(),
///     "name".to_string(),
/// ]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionMap {
    /// Leaf selection - a flat list of attribute names to select.
    Leaves(Vec<String>),
    /// Node selection - nested selection for hierarchical attribute paths.
    Node(IndexMap<String, SelectionMap>),
}

impl hash::Hash for SelectionMap {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Leaves(leaves) => leaves.hash(state),
            Self::Node(map) => map.iter().for_each(|(key, value)| {
                key.hash(state);
                value.hash(state);
            }),
        }
    }
}

impl From<SelectionMap> for common::ExpressionInput {
    fn from(selection_map: SelectionMap) -> Self {
        selection_map.get_selection_operation_recursive(&[])
    }
}

impl SelectionMap {
    /// Rename every selected attribute using the logical-to-alias tree.
    ///
    /// Names without an entry are kept unchanged.
    pub fn to_wire_names(self, map: &alias::AliasMap) -> Self {
        match self {
            Self::Leaves(leaves) => Self::Leaves(
                leaves
                    .into_iter()
                    .map(|leaf| match map.get(&leaf) {
                        Some(node) => node.name().to_string(),
                        None => leaf,
                    })
                    .collect(),
            ),
            Self::Node(nodes) => Self::Node(
                nodes
                    .into_iter()
                    .map(|(key, value)| match map.get(&key) {
                        Some(
                            alias::AliasNode::Object(wire, children)
                            | alias::AliasNode::ArrayOfObjects(wire, children),
                        ) => (wire.clone(), value.to_wire_names(children)),
                        Some(alias::AliasNode::Leaf(wire)) => (wire.clone(), value),
                        None => (key, value),
                    })
                    .collect(),
            ),
        }
    }

    pub(crate) fn get_selection_operation_recursive(
        self,
        keys: &[String],
    ) -> common::ExpressionInput {
        let operations: Vec<_> = match self {
            Self::Leaves(leaves) => leaves
                .into_iter()
                .map(|leaf| {
                    let (placeholder, new_keys) = common::add_placeholder(keys, &leaf);
                    let expression_attribute_names =
                        collections::HashMap::from([(placeholder, leaf)]);
                    common::ExpressionInput {
                        expression: new_keys.join("."),
                        expression_attribute_names,
                    }
                })
                .collect(),
            Self::Node(map) => map
                .into_iter()
                .map(|(key, value)| {
                    let (placeholder, new_keys) = common::add_placeholder(keys, &key);
                    let mut operation = value.get_selection_operation_recursive(&new_keys);
                    operation
                        .expression_attribute_names
                        .insert(placeholder, key);
                    operation
                })
                .collect(),
        };
        common::ExpressionInput::merge(", ", operations)
    }
}
