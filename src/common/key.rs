use crate::{
    common,
    error::{Error, Result},
    schema,
};

use serde::Serialize;
use serde_dynamo::to_attribute_value;
use serde_json::{Map, Value};
use std::collections;

/// Key component.
///
/// ```rust
/// use dynamodb_mapper::common::key;
///
/// let key = key::Key {
///     name: "id".to_string(),
///     value: "1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

/// Primary key (partition key and optional sort key), in wire names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T: Serialize> TryFrom<Keys<T>> for common::Item {
    type Error = Error;

    fn try_from(key: Keys<T>) -> Result<Self> {
        let partition_key_value = to_attribute_value(key.partition_key.value)?;
        let mut keys = collections::HashMap::from([(key.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = key.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            keys.insert(sort_key.name, sort_key_value);
        }
        Ok(keys)
    }
}

/// Key as written by the application.
///
/// ```rust
/// use dynamodb_mapper::common::key::LogicalKey;
/// use serde_json::json;
///
/// let hash_only = LogicalKey::from(json!("user-1"));
/// let composite = LogicalKey::from(json!({"id": "user-1", "date": "2024-01-01"}));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalKey {
    /// Bare hash key value.
    Hash(Value),
    /// Attributes holding the hash key and, if the table has one, the range key,
    /// in logical names.
    Attributes(Map<String, Value>),
}

impl From<Value> for LogicalKey {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(attributes) => Self::Attributes(attributes),
            value => Self::Hash(value),
        }
    }
}

impl LogicalKey {
    /// Split into hash and range values, renaming attributes to wire names first.
    pub fn into_parts(self, schema: &schema::Schema) -> Result<(Value, Option<Value>)> {
        match self {
            Self::Hash(value) => Ok((value, None)),
            Self::Attributes(attributes) => {
                let mut attributes = match schema.aliases() {
                    Some(_) => schema.serialize_item(&attributes),
                    None => attributes,
                };
                let hash = attributes.remove(schema.hash_key()).ok_or_else(|| {
                    Error::InvalidKey(format!("missing hash key `{}`", schema.hash_key()))
                })?;
                let range = schema
                    .range_key()
                    .and_then(|range_key| attributes.remove(range_key));
                Ok((hash, range))
            }
        }
    }
}
