//! Conversion between logical values and attribute-value maps.

use crate::{
    common::{self, key},
    error::{Error, Result},
    schema,
};

use serde_dynamo::{from_item, to_item};
use serde_json::{Map, Value};

/// Converts keys and items to and from wire form.
///
/// Keys and items handed to the serializer already carry wire names.
pub trait Serializer: Send + Sync {
    /// Build the wire key of an item.
    ///
    /// Fails with [`Error::InvalidKey`] when the table has a range key and `range` is missing.
    fn build_key(&self, hash: Value, range: Option<Value>, schema: &schema::Schema) -> Result<common::Item>;

    /// Convert an item to attribute values.
    fn serialize_item(&self, item: Map<String, Value>) -> Result<common::Item>;

    /// Convert attribute values back to an item.
    fn deserialize_item(&self, item: common::Item) -> Result<Map<String, Value>>;
}

/// [`Serializer`] backed by `serde_dynamo`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DynamoSerializer;

impl Serializer for DynamoSerializer {
    fn build_key(&self, hash: Value, range: Option<Value>, schema: &schema::Schema) -> Result<common::Item> {
        let sort_key = match (schema.range_key(), range) {
            (Some(name), Some(value)) => Some(key::Key {
                name: name.to_string(),
                value,
            }),
            (Some(name), None) => {
                return Err(Error::InvalidKey(format!("missing range key `{name}`")));
            }
            (None, _) => None,
        };
        let keys = key::Keys {
            partition_key: key::Key {
                name: schema.hash_key().to_string(),
                value: hash,
            },
            sort_key,
        };
        keys.try_into()
    }

    fn serialize_item(&self, item: Map<String, Value>) -> Result<common::Item> {
        Ok(to_item(item)?)
    }

    fn deserialize_item(&self, item: common::Item) -> Result<Map<String, Value>> {
        Ok(from_item(item)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::{Field, FieldType, collect_fields};

    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use serde_json::json;
    use std::collections;

    fn schema(range_key: Option<&str>) -> schema::Schema {
        schema::Schema::build(schema::SchemaConfig {
            hash_key: "id".to_string(),
            range_key: range_key.map(str::to_string),
            fields: collect_fields([
                ("id", Field::new(FieldType::String).into()),
                ("n", Field::new(FieldType::Number).into()),
            ]),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case::hash_only(
        None,
        json!("a"),
        None,
        collections::HashMap::from([("id".to_string(), types::AttributeValue::S("a".to_string()))])
    )]
    #[case::range_ignored_without_range_key(
        None,
        json!("a"),
        Some(json!(1)),
        collections::HashMap::from([("id".to_string(), types::AttributeValue::S("a".to_string()))])
    )]
    #[case::composite(
        Some("n"),
        json!("a"),
        Some(json!(1)),
        collections::HashMap::from([
            ("id".to_string(), types::AttributeValue::S("a".to_string())),
            ("n".to_string(), types::AttributeValue::N("1".to_string())),
        ])
    )]
    fn test_build_key(
        #[case] range_key: Option<&str>,
        #[case] hash: Value,
        #[case] range: Option<Value>,
        #[case] expected: common::Item,
    ) {
        let actual = DynamoSerializer
            .build_key(hash, range, &schema(range_key))
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_build_key_missing_range() {
        let error = DynamoSerializer
            .build_key(json!("a"), None, &schema(Some("n")))
            .unwrap_err();
        assert!(matches!(error, Error::InvalidKey(message) if message == "missing range key `n`"));
    }

    #[test]
    fn test_item_conversion() {
        let item = match json!({"id": "a", "n": 2, "tags": ["x"], "nested": {"ok": true}}) {
            Value::Object(item) => item,
            _ => unreachable!(),
        };
        let wire = DynamoSerializer.serialize_item(item.clone()).unwrap();
        assert_eq!(wire["n"], types::AttributeValue::N("2".to_string()));
        assert_eq!(DynamoSerializer.deserialize_item(wire).unwrap(), item);
    }
}
