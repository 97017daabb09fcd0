//! Batch gets, puts and deletes of any size.
//!
//! Inputs are split into buckets the store accepts in one call, each bucket is
//! driven to completion by resending whatever the store left unprocessed, and
//! buckets run concurrently.

/// Splitting inputs into store-sized groups.
pub mod bucket;

/// Batch operations on a table.
pub mod orchestrate;

/// Driving one bucket until nothing is left unprocessed.
pub mod paginate;
