use crate::{common, schema};

use aws_sdk_dynamodb::types;
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SingleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) table_name: String,
}

/// Per-table arguments of a batch read.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SingleReadArgs {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    pub consistent_read: Option<bool>,
    /// Which attributes to retrieve (projection expression), in wire names.
    ///
    /// If `None`, all attributes are retrieved.
    pub selection: Option<common::selection::SelectionMap>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl From<SingleReadArgs> for SingleReadInput {
    fn from(single_read_args: SingleReadArgs) -> Self {
        let (expression_attribute_names, projection_expression) = match single_read_args.selection {
            Some(selection) => {
                let selection_operation: common::ExpressionInput = selection.into();
                (
                    Some(selection_operation.expression_attribute_names),
                    Some(selection_operation.expression),
                )
            }
            None => (None, None),
        };
        Self {
            consistent_read: single_read_args.consistent_read,
            expression_attribute_names,
            projection_expression,
            table_name: single_read_args.table_name,
        }
    }
}

/// Options of [`crate::batch::orchestrate::Batch::get_items`].
///
/// ```rust
/// use dynamodb_mapper::{common::selection::SelectionMap, read};
///
/// let options = read::common::BatchGetOptions {
///     consistent_read: Some(true),
///     selection: Some(SelectionMap::Leaves(vec!["id".to_string(), "name".to_string()])),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetOptions {
    /// Whether to use a consistent read.
    pub consistent_read: Option<bool>,
    /// Attributes to retrieve, in logical names.
    pub selection: Option<common::selection::SelectionMap>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Ceiling on consecutive retryable failures of one bucket. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl BatchGetOptions {
    /// Read arguments for `table_name`, with the selection renamed to wire names.
    pub(crate) fn read_args(&self, table_name: String, schema: &schema::Schema) -> SingleReadArgs {
        let selection = self
            .selection
            .clone()
            .map(|selection| match schema.aliases() {
                Some(aliases) => selection.to_wire_names(&aliases.logical_to_alias),
                None => selection,
            });
        SingleReadArgs {
            consistent_read: self.consistent_read,
            selection,
            table_name,
        }
    }
}
