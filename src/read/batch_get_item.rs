use crate::{common, error::Result, read};

use aws_sdk_dynamodb::{Client, error, operation, types};
use std::collections;

/// Batch get item request, ready for the store.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_mapper::read;
/// use std::collections::HashMap;
///
/// let batch_get = read::batch_get_item::BatchGetItem::new(
///     read::common::SingleReadArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
///     vec![HashMap::from([(
///         "id".to_string(),
///         AttributeValue::S("1".to_string()),
///     )])],
///     None,
/// )
/// .unwrap();
/// assert_eq!(batch_get.request_items["users"].keys.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetItem {
    /// Keys and read arguments per table name.
    pub request_items: collections::HashMap<String, types::KeysAndAttributes>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
}

impl BatchGetItem {
    /// Build a request reading wire `keys` from a single table.
    pub fn new(
        args: read::common::SingleReadArgs,
        keys: Vec<common::Item>,
        return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    ) -> Result<Self> {
        let single_operation: read::common::SingleReadInput = args.into();
        let keys_and_attributes = types::KeysAndAttributes::builder()
            .set_consistent_read(single_operation.consistent_read)
            .set_expression_attribute_names(single_operation.expression_attribute_names)
            .set_keys(Some(keys))
            .set_projection_expression(single_operation.projection_expression)
            .build()?;
        Ok(Self {
            request_items: collections::HashMap::from([(
                single_operation.table_name,
                keys_and_attributes,
            )]),
            return_consumed_capacity,
        })
    }

    /// Same request options, different keys; used to resend unprocessed keys.
    pub fn with_request_items(
        &self,
        request_items: collections::HashMap<String, types::KeysAndAttributes>,
    ) -> Self {
        Self {
            request_items,
            return_consumed_capacity: self.return_consumed_capacity.clone(),
        }
    }

    /// Send the request through `client`.
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::batch_get_item::BatchGetItemOutput,
        error::SdkError<operation::batch_get_item::BatchGetItemError>,
    > {
        let batch_get_item = match operation::batch_get_item::BatchGetItemInput::try_from(self) {
            Ok(batch_get_item) => batch_get_item,
            Err(err) => return Err(error::SdkError::construction_failure(err)),
        };
        client
            .batch_get_item()
            .set_request_items(batch_get_item.request_items)
            .set_return_consumed_capacity(batch_get_item.return_consumed_capacity)
            .send()
            .await
    }
}

impl TryFrom<BatchGetItem> for operation::batch_get_item::BatchGetItemInput {
    type Error = error::BuildError;

    fn try_from(batch_get_item: BatchGetItem) -> Result<Self, Self::Error> {
        Self::builder()
            .set_request_items(Some(batch_get_item.request_items))
            .set_return_consumed_capacity(batch_get_item.return_consumed_capacity)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    fn keys(partition: &str, sort: Option<&str>) -> common::Item {
        let keys = common::key::Keys {
            partition_key: common::key::Key {
                name: "a".to_string(),
                value: Value::from(partition),
            },
            sort_key: sort.map(|sort| common::key::Key {
                name: "b".to_string(),
                value: Value::from(sort),
            }),
        };
        keys.try_into().unwrap()
    }

    #[rstest]
    #[case::plain(
        read::common::SingleReadArgs {
            table_name: "t".to_string(),
            ..Default::default()
        },
        vec![keys("c", None)],
        None,
        operation::batch_get_item::BatchGetItemInput::builder()
            .set_request_items(Some(collections::HashMap::from([(
                "t".to_string(),
                types::KeysAndAttributes::builder()
                    .set_keys(Some(vec![collections::HashMap::from([(
                        "a".to_string(),
                        types::AttributeValue::S("c".to_string()),
                    )])]))
                    .build()
                    .unwrap(),
            )])))
            .build()
            .unwrap()
    )]
    #[case::full(
        read::common::SingleReadArgs {
            consistent_read: Some(true),
            selection: Some(common::selection::SelectionMap::Leaves(vec!["d".to_string()])),
            table_name: "t".to_string(),
        },
        vec![keys("c", Some("e"))],
        Some(types::ReturnConsumedCapacity::Total),
        operation::batch_get_item::BatchGetItemInput::builder()
            .set_request_items(Some(collections::HashMap::from([(
                "t".to_string(),
                types::KeysAndAttributes::builder()
                    .set_consistent_read(Some(true))
                    .set_expression_attribute_names(Some(collections::HashMap::from([(
                        "#d".to_string(),
                        "d".to_string(),
                    )])))
                    .set_keys(Some(vec![collections::HashMap::from([
                        ("a".to_string(), types::AttributeValue::S("c".to_string())),
                        ("b".to_string(), types::AttributeValue::S("e".to_string())),
                    ])]))
                    .set_projection_expression(Some("#d".to_string()))
                    .build()
                    .unwrap(),
            )])))
            .set_return_consumed_capacity(Some(types::ReturnConsumedCapacity::Total))
            .build()
            .unwrap()
    )]
    fn test_batch_get_item(
        #[case] args: read::common::SingleReadArgs,
        #[case] keys: Vec<common::Item>,
        #[case] return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
        #[case] expected: operation::batch_get_item::BatchGetItemInput,
    ) {
        let batch_get_item = BatchGetItem::new(args, keys, return_consumed_capacity).unwrap();
        let actual: operation::batch_get_item::BatchGetItemInput = batch_get_item.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_with_request_items_keeps_options() {
        let batch_get_item = BatchGetItem::new(
            read::common::SingleReadArgs {
                table_name: "t".to_string(),
                ..Default::default()
            },
            vec![keys("c", None)],
            Some(types::ReturnConsumedCapacity::Indexes),
        )
        .unwrap();
        let retry = batch_get_item.with_request_items(collections::HashMap::new());
        assert!(retry.request_items.is_empty());
        assert_eq!(
            retry.return_consumed_capacity,
            Some(types::ReturnConsumedCapacity::Indexes)
        );
    }
}
