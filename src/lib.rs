#![deny(missing_docs)]

//! # DynamoDB Mapper
//!
//! Schema-driven item mapping and self-paginating batch operations for Amazon DynamoDB tables.
//!
//! ## Overview
//!
//! This library sits between an application's item shape and the attribute maps DynamoDB stores:
//! - Declares typed fields, nested objects, lists of objects, defaults and secondary indexes,
//!   and rejects inconsistent declarations with every violation listed at once
//! - Optionally stores attributes under compact alias names, renaming nested fields on the way
//!   in and back out
//! - Gets, puts and deletes any number of items, splitting them into batches the store
//!   accepts (100 keys per get, 25 requests per write) that run concurrently and resending
//!   whatever the store leaves unprocessed
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_mapper::{batch, common::key::LogicalKey, schema, serializer, table};
//! use dynamodb_mapper::schema::field::{Field, FieldSchema, FieldType, collect_fields};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let mut registry = table::Registry::default();
//! let accounts = registry.define(
//!     "accounts",
//!     schema::SchemaConfig {
//!         hash_key: "id".to_string(),
//!         use_alias: true,
//!         fields: collect_fields([
//!             ("id", Field::uuid().alias("i").into()),
//!             (
//!                 "profile",
//!                 FieldSchema::object("p", [("nick", Field::new(FieldType::String).alias("n").into())]),
//!             ),
//!         ]),
//!         ..Default::default()
//!     },
//! )?;
//! let batch = batch::orchestrate::Batch::new(&client, &serializer::DynamoSerializer, accounts.as_ref());
//!
//! // Stored as {"i": "1", "p": {"n": "ada"}}
//! let item = json!({"id": "1", "profile": {"nick": "ada"}});
//! if let serde_json::Value::Object(item) = item {
//!     batch.put_items(&[item], &Default::default()).await?;
//! }
//!
//! // Read back in logical names, whatever the number of keys
//! let keys: Vec<LogicalKey> = (0..1000).map(|id| json!(id.to_string()).into()).collect();
//! let items = batch.get_items(&keys, &Default::default()).await?.items;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@schema`] - Field declarations, aliasing, validation and defaults
//! - [`mod@batch`] - Bucketing, pagination and the batch operations
//! - [`mod@client`] - Store abstraction and its DynamoDB implementation
//! - [`mod@read`] / [`mod@write`] - Batch request builders

/// Bucketing, pagination and the batch operations.
pub mod batch;

/// Store abstraction and its DynamoDB implementation.
pub mod client;

/// Common utilities for keys and attribute selection.
pub mod common;

/// Crate errors.
pub mod error;

/// Batch get requests.
pub mod read;

/// Table schemas: fields, aliases, indexes, validation and defaults.
pub mod schema;

/// Conversion between logical values and attribute values.
pub mod serializer;

/// Tables and the model registry.
pub mod table;

/// Batch write requests.
pub mod write;
