use crate::{common, error::Result};

use aws_sdk_dynamodb::{Client, error, operation, types};
use std::collections;

/// A single request within a batch write operation, in wire form.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchWriteItemRequest {
    /// Put item request - creates or replaces an item.
    PutItem(common::Item),
    /// Delete item request - removes an item by its primary key.
    DeleteItem(common::Item),
}

impl TryFrom<BatchWriteItemRequest> for types::WriteRequest {
    type Error = error::BuildError;

    fn try_from(write_request: BatchWriteItemRequest) -> Result<Self, Self::Error> {
        let builder = match write_request {
            BatchWriteItemRequest::PutItem(item) => {
                let put_request = types::PutRequest::builder().set_item(Some(item)).build()?;
                Self::builder().set_put_request(Some(put_request))
            }
            BatchWriteItemRequest::DeleteItem(key) => {
                let delete_request = types::DeleteRequest::builder().set_key(Some(key)).build()?;
                Self::builder().set_delete_request(Some(delete_request))
            }
        };
        Ok(builder.build())
    }
}

/// Batch write item request, ready for the store.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_mapper::write;
/// use std::collections::HashMap;
///
/// let batch_write = write::batch_write_item::BatchWriteItem::new(
///     "users".to_string(),
///     vec![write::batch_write_item::BatchWriteItemRequest::PutItem(HashMap::from([(
///         "id".to_string(),
///         AttributeValue::S("1".to_string()),
///     )]))],
///     &Default::default(),
/// )
/// .unwrap();
/// assert_eq!(batch_write.request_items["users"].len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchWriteItem {
    /// Write requests per table name.
    pub request_items: collections::HashMap<String, Vec<types::WriteRequest>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
}

impl BatchWriteItem {
    /// Build a request writing `requests` to a single table.
    pub fn new(
        table_name: String,
        requests: Vec<BatchWriteItemRequest>,
        options: &crate::write::common::BatchWriteOptions,
    ) -> Result<Self> {
        let mut write_requests = Vec::with_capacity(requests.len());
        for request in requests {
            write_requests.push(request.try_into()?);
        }
        Ok(Self {
            request_items: collections::HashMap::from([(table_name, write_requests)]),
            return_consumed_capacity: options.return_consumed_capacity.clone(),
            return_item_collection_metrics: options.return_item_collection_metrics.clone(),
        })
    }

    /// Same request options, different requests; used to resend unprocessed items.
    pub fn with_request_items(
        &self,
        request_items: collections::HashMap<String, Vec<types::WriteRequest>>,
    ) -> Self {
        Self {
            request_items,
            return_consumed_capacity: self.return_consumed_capacity.clone(),
            return_item_collection_metrics: self.return_item_collection_metrics.clone(),
        }
    }

    /// Send the request through `client`.
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::batch_write_item::BatchWriteItemOutput,
        error::SdkError<operation::batch_write_item::BatchWriteItemError>,
    > {
        let batch_write_item = match operation::batch_write_item::BatchWriteItemInput::try_from(self) {
            Ok(batch_write_item) => batch_write_item,
            Err(err) => return Err(error::SdkError::construction_failure(err)),
        };
        client
            .batch_write_item()
            .set_request_items(batch_write_item.request_items)
            .set_return_consumed_capacity(batch_write_item.return_consumed_capacity)
            .set_return_item_collection_metrics(batch_write_item.return_item_collection_metrics)
            .send()
            .await
    }
}

impl TryFrom<BatchWriteItem> for operation::batch_write_item::BatchWriteItemInput {
    type Error = error::BuildError;

    fn try_from(batch_write_item: BatchWriteItem) -> Result<Self, Self::Error> {
        Self::builder()
            .set_request_items(Some(batch_write_item.request_items))
            .set_return_consumed_capacity(batch_write_item.return_consumed_capacity)
            .set_return_item_collection_metrics(batch_write_item.return_item_collection_metrics)
            .build()
    }
}
