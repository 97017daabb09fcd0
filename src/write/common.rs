use aws_sdk_dynamodb::types;

/// Options of batch puts and deletes.
///
/// These apply to every request sent for one call, whatever the number of buckets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchWriteOptions {
    /// Whether to return the consumed capacity information.
    ///
    /// Useful for monitoring and capacity planning.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    ///
    /// Item collection metrics provide information about collections (local secondary indexes)
    /// affected by the operation.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Ceiling on consecutive retryable failures of one bucket. `None` retries forever.
    pub max_retries: Option<u32>,
}
