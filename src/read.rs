//! Read requests for retrieving items from DynamoDB tables.
//!
//! This module builds the batch get requests sent by the batch orchestrator,
//! including the projection of a logical selection onto stored names.

/// Batch get item request for retrieving multiple items efficiently.
pub mod batch_get_item;

/// Common utilities and types for read operations.
pub mod common;
