/// Most keys the store accepts in one batch get call.
pub const MAX_GET_BATCH_SIZE: usize = 100;

/// Most put and delete requests the store accepts in one batch write call.
pub const MAX_WRITE_BATCH_SIZE: usize = 25;

/// Split `items` into consecutive groups of at most `size`.
///
/// ```rust
/// use dynamodb_mapper::batch::bucket::{MAX_GET_BATCH_SIZE, MAX_WRITE_BATCH_SIZE, bucket};
///
/// let buckets = bucket((0..250).collect(), MAX_GET_BATCH_SIZE);
/// assert_eq!(buckets.iter().map(Vec::len).collect::<Vec<_>>(), vec![100, 100, 50]);
///
/// let buckets = bucket((0..60).collect(), MAX_WRITE_BATCH_SIZE);
/// assert_eq!(buckets.iter().map(Vec::len).collect::<Vec<_>>(), vec![25, 25, 10]);
/// ```
pub fn bucket<T>(mut items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut buckets = Vec::with_capacity(items.len().div_ceil(size));
    while !items.is_empty() {
        let take = items.len().min(size);
        buckets.push(items.drain(..take).collect());
    }
    buckets
}
