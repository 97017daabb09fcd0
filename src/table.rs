//! Tables the batch operations run against, and the registry of defined models.

use crate::{error::Result, schema};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A table the batch operations can target.
pub trait Table: Send + Sync {
    /// Item type handed back to callers.
    type Item: Send;

    /// Validated schema of the table.
    fn schema(&self) -> &schema::Schema;

    /// Resolved table name.
    fn table_name(&self) -> String;

    /// Wrap logical attributes into the caller's item type.
    fn init_item(&self, attributes: Map<String, Value>) -> Self::Item;
}

/// Table defined through a [`Registry`].
///
/// Items are plain logical attribute maps.
#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    schema: Arc<schema::Schema>,
}

impl Model {
    /// Build a model, validating its schema.
    pub fn new(name: impl Into<String>, config: schema::SchemaConfig) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            schema: Arc::new(schema::Schema::build(config)?),
        })
    }

    /// Name the model was defined with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Table for Model {
    type Item = Map<String, Value>;

    fn schema(&self) -> &schema::Schema {
        &self.schema
    }

    /// The schema table name, falling back to the model name.
    fn table_name(&self) -> String {
        self.schema.table_name().unwrap_or_else(|| self.name.clone())
    }

    fn init_item(&self, attributes: Map<String, Value>) -> Self::Item {
        attributes
    }
}

/// Defined models, by name.
///
/// ```rust
/// use dynamodb_mapper::{schema, table};
///
/// let mut registry = table::Registry::default();
/// let accounts = registry
///     .define(
///         "accounts",
///         schema::SchemaConfig {
///             hash_key: "email".to_string(),
///             ..Default::default()
///         },
///     )
///     .unwrap();
/// assert_eq!(registry.model("accounts").unwrap().name(), accounts.name());
/// registry.clear();
/// assert!(registry.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    models: IndexMap<String, Arc<Model>>,
}

impl Registry {
    /// Define a model, replacing any model already defined under `name`.
    pub fn define(&mut self, name: impl Into<String>, config: schema::SchemaConfig) -> Result<Arc<Model>> {
        let model = Arc::new(Model::new(name, config)?);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        Ok(model)
    }

    /// Look up a defined model.
    pub fn model(&self, name: &str) -> Option<Arc<Model>> {
        self.models.get(name).cloned()
    }

    /// Forget every defined model.
    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Number of defined models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no model is defined.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
