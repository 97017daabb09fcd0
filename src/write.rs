//! Write requests for storing and removing items in DynamoDB tables.
//!
//! This module builds the batch write requests sent by the batch orchestrator:
//! - Putting new items or replacing existing ones
//! - Deleting items by primary key

/// Batch write item request for putting and deleting items.
pub mod batch_write_item;

/// Options shared by write operations.
pub mod common;
