//! Store client abstraction.
//!
//! Batch calls go through [`StoreClient`] so that the pagination loop only
//! deals with pages and classified errors. [`aws_sdk_dynamodb::Client`]
//! implements it directly.

use crate::{common, error::StoreError, read, write};

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types};
use std::collections;

/// One response of a batch call.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPage<R> {
    /// Items returned per table name. Empty for writes.
    pub responses: collections::HashMap<String, Vec<common::Item>>,
    /// Requests the store did not process, per table name.
    pub unprocessed: Option<collections::HashMap<String, R>>,
    /// Capacity consumed by the call, when requested.
    pub consumed_capacity: Vec<types::ConsumedCapacity>,
    /// Item collection metrics per table name, when requested. Empty for gets.
    pub item_collection_metrics: collections::HashMap<String, Vec<types::ItemCollectionMetrics>>,
}

impl<R> Default for BatchPage<R> {
    fn default() -> Self {
        Self {
            responses: collections::HashMap::new(),
            unprocessed: None,
            consumed_capacity: Vec::new(),
            item_collection_metrics: collections::HashMap::new(),
        }
    }
}

/// Executes batch requests against a store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Send one batch get request.
    async fn execute_batch_get(
        &self,
        request: read::batch_get_item::BatchGetItem,
    ) -> Result<BatchPage<types::KeysAndAttributes>, StoreError>;

    /// Send one batch write request.
    async fn execute_batch_write(
        &self,
        request: write::batch_write_item::BatchWriteItem,
    ) -> Result<BatchPage<Vec<types::WriteRequest>>, StoreError>;
}

#[async_trait]
impl StoreClient for Client {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_mapper.batch_get_item", skip(self), err)
    )]
    async fn execute_batch_get(
        &self,
        request: read::batch_get_item::BatchGetItem,
    ) -> Result<BatchPage<types::KeysAndAttributes>, StoreError> {
        let output = request.send(self).await.map_err(StoreError::from_sdk)?;
        Ok(BatchPage {
            responses: output.responses.unwrap_or_default(),
            unprocessed: output.unprocessed_keys,
            consumed_capacity: output.consumed_capacity.unwrap_or_default(),
            item_collection_metrics: collections::HashMap::new(),
        })
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_mapper.batch_write_item", skip(self), err)
    )]
    async fn execute_batch_write(
        &self,
        request: write::batch_write_item::BatchWriteItem,
    ) -> Result<BatchPage<Vec<types::WriteRequest>>, StoreError> {
        let output = request.send(self).await.map_err(StoreError::from_sdk)?;
        Ok(BatchPage {
            responses: collections::HashMap::new(),
            unprocessed: output.unprocessed_items,
            consumed_capacity: output.consumed_capacity.unwrap_or_default(),
            item_collection_metrics: output.item_collection_metrics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    use std::sync::Mutex;

    /// Scripted reaction to the next call.
    #[derive(Clone, Debug)]
    pub(crate) enum Outcome {
        Retryable,
        Fatal,
        /// Process the call but hand back its last `n` requests per table.
        Unprocess(usize),
    }

    /// In-memory store keyed by the given key attribute names.
    #[derive(Debug, Default)]
    pub(crate) struct MockStore {
        key_names: Vec<String>,
        tables: Mutex<collections::HashMap<String, Vec<common::Item>>>,
        script: Mutex<collections::VecDeque<Outcome>>,
        calls: Mutex<Vec<usize>>,
    }

    impl MockStore {
        pub(crate) fn new(key_names: &[&str]) -> Self {
            Self {
                key_names: key_names.iter().map(|name| name.to_string()).collect(),
                ..Default::default()
            }
        }

        pub(crate) fn script(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
            self.script.lock().unwrap().extend(outcomes);
            self
        }

        pub(crate) fn seed(&self, table_name: &str, items: impl IntoIterator<Item = common::Item>) {
            self.tables
                .lock()
                .unwrap()
                .entry(table_name.to_string())
                .or_default()
                .extend(items);
        }

        pub(crate) fn items(&self, table_name: &str) -> Vec<common::Item> {
            self.tables
                .lock()
                .unwrap()
                .get(table_name)
                .cloned()
                .unwrap_or_default()
        }

        /// Number of requests carried by each call, in call order.
        pub(crate) fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }

        fn next_outcome(&self, size: usize) -> Result<usize, StoreError> {
            self.calls.lock().unwrap().push(size);
            match self.script.lock().unwrap().pop_front() {
                None => Ok(0),
                Some(Outcome::Unprocess(count)) => Ok(count),
                Some(Outcome::Retryable) => Err(StoreError::retryable(
                    "ProvisionedThroughputExceededException",
                    "throttled",
                )),
                Some(Outcome::Fatal) => Err(StoreError::fatal("ValidationException", "rejected")),
            }
        }

        fn key_of(&self, item: &common::Item) -> common::Item {
            item.iter()
                .filter(|(name, _)| self.key_names.contains(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        }
    }

    /// One capacity unit per request the call carried.
    fn capacity(table_name: &str, units: usize) -> types::ConsumedCapacity {
        types::ConsumedCapacity::builder()
            .table_name(table_name)
            .capacity_units(units as f64)
            .build()
    }

    fn matches(item: &common::Item, key: &common::Item) -> bool {
        key.iter().all(|(name, value)| item.get(name) == Some(value))
    }

    #[async_trait]
    impl StoreClient for MockStore {
        async fn execute_batch_get(
            &self,
            request: read::batch_get_item::BatchGetItem,
        ) -> Result<BatchPage<types::KeysAndAttributes>, StoreError> {
            let size = request.request_items.values().map(|keys| keys.keys.len()).sum();
            let held_back = self.next_outcome(size)?;
            let tables = self.tables.lock().unwrap();
            let mut page = BatchPage::default();
            let mut unprocessed = collections::HashMap::new();
            for (table_name, mut keys_and_attributes) in request.request_items {
                let split = keys_and_attributes.keys.len().saturating_sub(held_back);
                let rest = keys_and_attributes.keys.split_off(split);
                let stored = tables.get(&table_name).cloned().unwrap_or_default();
                let found = keys_and_attributes
                    .keys
                    .iter()
                    .filter_map(|key| stored.iter().find(|item| matches(item, key)).cloned())
                    .collect();
                if request.return_consumed_capacity.is_some() {
                    page.consumed_capacity.push(capacity(&table_name, split));
                }
                page.responses.insert(table_name.clone(), found);
                keys_and_attributes.keys = rest;
                unprocessed.insert(table_name, keys_and_attributes);
            }
            page.unprocessed = Some(unprocessed);
            Ok(page)
        }

        async fn execute_batch_write(
            &self,
            request: write::batch_write_item::BatchWriteItem,
        ) -> Result<BatchPage<Vec<types::WriteRequest>>, StoreError> {
            let size = request.request_items.values().map(Vec::len).sum();
            let held_back = self.next_outcome(size)?;
            let mut tables = self.tables.lock().unwrap();
            let mut page = BatchPage::default();
            let mut unprocessed = collections::HashMap::new();
            for (table_name, mut requests) in request.request_items {
                let split = requests.len().saturating_sub(held_back);
                let rest = requests.split_off(split);
                if request.return_consumed_capacity.is_some() {
                    page.consumed_capacity.push(capacity(&table_name, split));
                }
                if request.return_item_collection_metrics.is_some() {
                    page.item_collection_metrics.insert(
                        table_name.clone(),
                        vec![types::ItemCollectionMetrics::builder()
                            .size_estimate_range_gb(split as f64)
                            .build()],
                    );
                }
                let stored = tables.entry(table_name.clone()).or_default();
                for write_request in requests {
                    if let Some(put) = write_request.put_request {
                        let key = self.key_of(&put.item);
                        stored.retain(|item| !matches(item, &key));
                        stored.push(put.item);
                    } else if let Some(delete) = write_request.delete_request {
                        stored.retain(|item| !matches(item, &delete.key));
                    }
                }
                unprocessed.insert(table_name, rest);
            }
            page.unprocessed = Some(unprocessed);
            Ok(page)
        }
    }
}
