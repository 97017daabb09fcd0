use crate::{
    batch::{bucket, paginate},
    client, common,
    common::key::LogicalKey,
    error::{Result, StoreError},
    read, serializer,
    table::Table,
    write,
};

use aws_sdk_dynamodb::types;
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::future::Future;

/// Items, capacity and metrics gathered from every bucket of a batch operation.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchOutput<I> {
    /// Returned items. Always empty for puts and deletes.
    pub items: Vec<I>,
    /// Capacity consumed by every store call, when requested.
    pub consumed_capacity: Vec<types::ConsumedCapacity>,
    /// Item collection metrics per table name, when requested on writes.
    pub item_collection_metrics: IndexMap<String, Vec<types::ItemCollectionMetrics>>,
}

impl<I> Default for BatchOutput<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            consumed_capacity: Vec::new(),
            item_collection_metrics: IndexMap::new(),
        }
    }
}

/// Batch gets, puts and deletes on one table.
///
/// Inputs of any size are split into buckets of [`bucket::MAX_GET_BATCH_SIZE`] keys for
/// gets and [`bucket::MAX_WRITE_BATCH_SIZE`] requests for writes, and every bucket runs
/// concurrently until the store has processed all of it. Items come back in no
/// particular order.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_mapper::{batch, common::key::LogicalKey, schema, serializer, table};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = table::Registry::default();
/// let accounts = registry.define(
///     "accounts",
///     schema::SchemaConfig {
///         hash_key: "email".to_string(),
///         ..Default::default()
///     },
/// )?;
/// let batch = batch::orchestrate::Batch::new(client, &serializer::DynamoSerializer, accounts.as_ref());
/// let keys: Vec<LogicalKey> = vec![json!("a@example.com").into(), json!("b@example.com").into()];
/// let accounts = batch.get_items(&keys, &Default::default()).await?.items;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Batch<'a, C, S, T> {
    /// Store the requests are sent to.
    pub client: &'a C,
    /// Converter between logical values and attribute values.
    pub serializer: &'a S,
    /// Target table.
    pub table: &'a T,
}

impl<C, S, T> Clone for Batch<'_, C, S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, S, T> Copy for Batch<'_, C, S, T> {}

impl<'a, C, S, T> Batch<'a, C, S, T>
where
    C: client::StoreClient,
    S: serializer::Serializer,
    T: Table,
{
    /// Batch operations on `table` through `client`.
    pub fn new(client: &'a C, serializer: &'a S, table: &'a T) -> Self {
        Self {
            client,
            serializer,
            table,
        }
    }

    /// Fetch the items with the given keys. Missing items are left out.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_mapper.get_items", skip_all, fields(keys = keys.len()), err)
    )]
    pub async fn get_items(
        &self,
        keys: &[LogicalKey],
        options: &read::common::BatchGetOptions,
    ) -> Result<BatchOutput<T::Item>> {
        let table_name = self.table.table_name();
        let keys = self.serialize_keys(keys.to_vec())?;
        let mut requests = Vec::new();
        for keys in bucket::bucket(keys, bucket::MAX_GET_BATCH_SIZE) {
            let args = options.read_args(table_name.clone(), self.table.schema());
            requests.push(read::batch_get_item::BatchGetItem::new(
                args,
                keys,
                options.return_consumed_capacity.clone(),
            )?);
        }
        let buckets = requests.into_iter().map(move |request| async move {
            paginate::paginate(
                request.request_items.clone(),
                |request_items| {
                    self.client
                        .execute_batch_get(request.with_request_items(request_items))
                },
                options.max_retries,
            )
            .await
        });
        let responses = join_buckets(buckets).await;
        self.collect_items(&table_name, responses)
    }

    /// Delete the items with the given keys.
    ///
    /// The store returns no attributes for deletes, so the output carries no items.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_mapper.delete_items", skip_all, fields(keys = keys.len()), err)
    )]
    pub async fn delete_items(
        &self,
        keys: &[LogicalKey],
        options: &write::common::BatchWriteOptions,
    ) -> Result<BatchOutput<T::Item>> {
        let requests = self
            .serialize_keys(keys.to_vec())?
            .into_iter()
            .map(write::batch_write_item::BatchWriteItemRequest::DeleteItem)
            .collect();
        self.write_items(requests, options).await
    }

    /// Create or replace the given items.
    ///
    /// The store returns no attributes for puts, so the output carries no items.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_mapper.put_items", skip_all, fields(items = items.len()), err)
    )]
    pub async fn put_items(
        &self,
        items: &[Map<String, Value>],
        options: &write::common::BatchWriteOptions,
    ) -> Result<BatchOutput<T::Item>> {
        let schema = self.table.schema();
        let mut requests = Vec::with_capacity(items.len());
        for item in items.to_vec() {
            let item = self.serializer.serialize_item(schema.serialize_item(&item))?;
            requests.push(write::batch_write_item::BatchWriteItemRequest::PutItem(item));
        }
        self.write_items(requests, options).await
    }

    async fn write_items(
        &self,
        requests: Vec<write::batch_write_item::BatchWriteItemRequest>,
        options: &write::common::BatchWriteOptions,
    ) -> Result<BatchOutput<T::Item>> {
        let table_name = self.table.table_name();
        let mut batches = Vec::new();
        for requests in bucket::bucket(requests, bucket::MAX_WRITE_BATCH_SIZE) {
            batches.push(write::batch_write_item::BatchWriteItem::new(
                table_name.clone(),
                requests,
                options,
            )?);
        }
        let buckets = batches.into_iter().map(move |request| async move {
            paginate::paginate(
                request.request_items.clone(),
                |request_items| {
                    self.client
                        .execute_batch_write(request.with_request_items(request_items))
                },
                options.max_retries,
            )
            .await
        });
        let responses = join_buckets(buckets).await;
        self.collect_items(&table_name, responses)
    }

    fn serialize_keys(&self, keys: Vec<LogicalKey>) -> Result<Vec<common::Item>> {
        let schema = self.table.schema();
        keys.into_iter()
            .map(|key| {
                let (hash, range) = key.into_parts(schema)?;
                self.serializer.build_key(hash, range, schema)
            })
            .collect()
    }

    fn collect_items(
        &self,
        table_name: &str,
        responses: Vec<Result<paginate::BatchResponse, StoreError>>,
    ) -> Result<BatchOutput<T::Item>> {
        let schema = self.table.schema();
        let mut output = BatchOutput::default();
        let mut items = Vec::new();
        for response in responses {
            let mut response = response?;
            items.extend(response.responses.shift_remove(table_name).unwrap_or_default());
            output.consumed_capacity.append(&mut response.consumed_capacity);
            for (table_name, metrics) in response.item_collection_metrics {
                output
                    .item_collection_metrics
                    .entry(table_name)
                    .or_default()
                    .extend(metrics);
            }
        }
        output.items = items
            .into_iter()
            .map(|item| {
                let attributes = self.serializer.deserialize_item(item)?;
                let attributes = schema.apply_defaults(schema.deserialize_item(&attributes));
                Ok(self.table.init_item(attributes))
            })
            .collect::<Result<_>>()?;
        Ok(output)
    }
}

/// Run every bucket concurrently and wait for all of them, in completion order.
async fn join_buckets<F>(buckets: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: Future,
{
    buckets.collect::<FuturesUnordered<_>>().collect().await
}
