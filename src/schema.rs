//! Table schema.
//!
//! A [`Schema`] is built once per table definition from a [`SchemaConfig`]. Building
//! validates the configuration (reporting every violation), resolves compact
//! attribute aliases, partitions secondary indexes and derives the wire type of
//! every declared field. The result is immutable and can be shared freely across
//! concurrent operations.

/// Compact attribute names and item rewriting.
pub mod alias;

/// Field declarations.
pub mod field;

/// Secondary index declarations.
pub mod index;

/// Item validation and default values.
pub mod validate;

use crate::error::{ConfigurationError, Result};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::{fmt, sync};

/// Attribute added to the declaration when timestamps are enabled.
pub const CREATED_AT: &str = "createdAt";

/// Attribute added to the declaration when timestamps are enabled.
pub const UPDATED_AT: &str = "updatedAt";

/// Table name, either fixed or computed on every use.
#[derive(Clone)]
pub enum TableName {
    /// Fixed name.
    Literal(String),
    /// Deterministic function of no arguments, e.g. an environment-prefixed name.
    Dynamic(sync::Arc<dyn Fn() -> String + Send + Sync>),
}

impl TableName {
    /// Name computed from a function.
    pub fn dynamic(name: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Dynamic(sync::Arc::new(name))
    }

    /// Current name.
    pub fn resolve(&self) -> String {
        match self {
            Self::Literal(name) => name.clone(),
            Self::Dynamic(name) => name(),
        }
    }
}

impl fmt::Debug for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for TableName {
    fn from(name: &str) -> Self {
        Self::Literal(name.to_string())
    }
}

/// Table definition, as written by the application in logical names.
///
/// ```rust
/// use dynamodb_mapper::schema;
/// use dynamodb_mapper::schema::field::{Field, FieldSchema, FieldType, collect_fields};
///
/// let schema = schema::Schema::build(schema::SchemaConfig {
///     hash_key: "id".to_string(),
///     use_alias: true,
///     fields: collect_fields([
///         ("id", Field::new(FieldType::String).alias("i").into()),
///         (
///             "obj",
///             FieldSchema::object("o", [("child", Field::new(FieldType::String).alias("c").into())]),
///         ),
///     ]),
///     ..Default::default()
/// })
/// .unwrap();
/// assert_eq!(schema.hash_key(), "i");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SchemaConfig {
    /// Hash key field (required).
    pub hash_key: String,
    /// Range key field.
    pub range_key: Option<String>,
    /// Table name. When absent the owning model name is used.
    pub table_name: Option<TableName>,
    /// Secondary indexes.
    pub indexes: Vec<index::SecondaryIndex>,
    /// Field declarations keyed by logical name.
    pub fields: field::Fields,
    /// Whether `createdAt` / `updatedAt` are declared automatically.
    pub timestamps: bool,
    /// Whether attributes are stored under their compact alias names.
    pub use_alias: bool,
}

/// Wire type index entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataType {
    /// Leaf attribute tag.
    Tag(field::WireType),
    /// Nested map, indexed recursively.
    Nested(DataTypes),
}

/// Wire type index keyed by wire attribute name.
pub type DataTypes = IndexMap<String, DataType>;

/// The two inverse alias trees.
#[derive(Clone, Debug, PartialEq)]
pub struct Aliases {
    /// Keyed by logical names, holding wire names.
    pub logical_to_alias: alias::AliasMap,
    /// Keyed by wire names, holding logical names.
    pub alias_to_logical: alias::AliasMap,
}

/// Validated, immutable table schema.
#[derive(Clone, Debug)]
pub struct Schema {
    aliases: Option<Aliases>,
    data_types: DataTypes,
    fields: field::Fields,
    global_indexes: IndexMap<String, index::GlobalIndex>,
    hash_key: String,
    local_indexes: IndexMap<String, index::LocalIndex>,
    range_key: Option<String>,
    table_name: Option<TableName>,
    timestamps: bool,
    wire_fields: field::Fields,
}

impl Schema {
    /// Validate `config` and derive the schema.
    ///
    /// Key and index names are rewritten to wire names before validation when
    /// aliasing is enabled, so every check runs against the names actually stored.
    /// Fails with [`crate::error::Error::Configuration`] listing every violation.
    pub fn build(config: SchemaConfig) -> Result<Self> {
        let SchemaConfig {
            mut hash_key,
            mut range_key,
            table_name,
            mut indexes,
            mut fields,
            timestamps,
            use_alias,
        } = config;
        let mut violations = Vec::new();

        if timestamps {
            for name in [CREATED_AT, UPDATED_AT] {
                let timestamp = field::Field::new(field::FieldType::Date).alias(name);
                fields.entry(name.to_string()).or_insert(timestamp.into());
            }
        }

        let aliases = if use_alias {
            let logical_to_alias = alias::logical_to_alias(&fields);
            let alias_to_logical = alias::alias_to_logical(&fields);
            match (logical_to_alias, alias_to_logical) {
                (Ok(logical_to_alias), Ok(alias_to_logical)) => {
                    let rename = |name: &str| {
                        logical_to_alias
                            .get(name)
                            .map(|node| node.name().to_string())
                    };
                    rename_key(&mut hash_key, "hash key", &rename, &mut violations);
                    if let Some(range_key) = range_key.as_mut() {
                        rename_key(range_key, "range key", &rename, &mut violations);
                    }
                    for index in &mut indexes {
                        index.map_key_names(rename, &mut violations);
                    }
                    Some(Aliases {
                        logical_to_alias,
                        alias_to_logical,
                    })
                }
                (_, alias_to_logical) => {
                    violations.extend(alias_to_logical.err().unwrap_or_default());
                    None
                }
            }
        } else {
            None
        };

        if hash_key.is_empty() {
            violations.push("hash key is required".to_string());
        }
        if range_key.as_deref() == Some("") {
            violations.push("range key must not be empty".to_string());
        }
        if let Some(TableName::Literal(name)) = &table_name {
            if name.is_empty() {
                violations.push("table name must not be empty".to_string());
            }
        }

        let mut global_indexes = IndexMap::new();
        let mut local_indexes = IndexMap::new();
        for index in indexes {
            index.validate(&hash_key, &mut violations);
            let name = index.name().to_string();
            if global_indexes.contains_key(&name) || local_indexes.contains_key(&name) {
                violations.push(format!("secondary index name `{name}` is declared more than once"));
                continue;
            }
            match index {
                index::SecondaryIndex::Global(index) => {
                    global_indexes.insert(name, index);
                }
                index::SecondaryIndex::Local(index) => {
                    local_indexes.insert(name, index);
                }
            }
        }

        if !violations.is_empty() {
            return Err(ConfigurationError { violations }.into());
        }

        let wire_fields = match &aliases {
            Some(aliases) => alias::convert_schema_to_wire_names(&fields, &aliases.logical_to_alias),
            None => fields.clone(),
        };
        let data_types = parse_data_types(&wire_fields);
        Ok(Self {
            aliases,
            data_types,
            fields,
            global_indexes,
            hash_key,
            local_indexes,
            range_key,
            table_name,
            timestamps,
            wire_fields,
        })
    }

    /// Hash key attribute, as stored.
    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    /// Range key attribute, as stored.
    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    /// Table name, if configured.
    pub fn table_name(&self) -> Option<String> {
        self.table_name.as_ref().map(TableName::resolve)
    }

    /// Global secondary indexes keyed by name.
    pub fn global_indexes(&self) -> &IndexMap<String, index::GlobalIndex> {
        &self.global_indexes
    }

    /// Local secondary indexes keyed by name.
    pub fn local_indexes(&self) -> &IndexMap<String, index::LocalIndex> {
        &self.local_indexes
    }

    /// Whether `createdAt` / `updatedAt` are declared.
    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Alias trees, when aliasing is enabled.
    pub fn aliases(&self) -> Option<&Aliases> {
        self.aliases.as_ref()
    }

    /// Declaration in logical names.
    pub fn fields(&self) -> &field::Fields {
        &self.fields
    }

    /// Declaration in wire names.
    pub fn wire_fields(&self) -> &field::Fields {
        &self.wire_fields
    }

    /// Wire type index, nested for object fields.
    pub fn data_types(&self) -> &DataTypes {
        &self.data_types
    }

    /// Wire type of a top-level attribute, by wire name.
    pub fn wire_type(&self, name: &str) -> Option<field::WireType> {
        match self.data_types.get(name)? {
            DataType::Tag(wire_type) => Some(*wire_type),
            DataType::Nested(_) => None,
        }
    }

    /// Check a logical item, reporting every violation.
    pub fn validate(&self, item: &Map<String, Value>) -> Result<(), validate::ValidationErrors> {
        let errors = validate::validate(&self.fields, item);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(validate::ValidationErrors { errors })
        }
    }

    /// Fill declared defaults into a logical item.
    ///
    /// Violations do not prevent defaults from being applied.
    pub fn apply_defaults(&self, mut item: Map<String, Value>) -> Map<String, Value> {
        if let Err(_errors) = self.validate(&item) {
            #[cfg(feature = "tracing")]
            tracing::debug!(errors = %_errors, "applying defaults to an invalid item");
        }
        validate::apply_defaults(&self.fields, &mut item);
        item
    }

    /// Rename a logical item to wire names. Identity without aliasing.
    pub fn serialize_item(&self, item: &Map<String, Value>) -> Map<String, Value> {
        match &self.aliases {
            Some(aliases) => alias::serialize_item(item, &aliases.logical_to_alias),
            None => item.clone(),
        }
    }

    /// Rename a wire item to logical names. Identity without aliasing.
    pub fn deserialize_item(&self, item: &Map<String, Value>) -> Map<String, Value> {
        match &self.aliases {
            Some(aliases) => alias::deserialize_item(item, &aliases.alias_to_logical),
            None => item.clone(),
        }
    }
}

fn rename_key(
    key: &mut String,
    label: &str,
    rename: impl Fn(&str) -> Option<String>,
    violations: &mut Vec<String>,
) {
    if key.is_empty() {
        return;
    }
    match rename(key) {
        Some(wire) => *key = wire,
        None => violations.push(format!("{label} `{key}` is not a declared field")),
    }
}

fn parse_data_types(fields: &field::Fields) -> DataTypes {
    fields
        .iter()
        .filter_map(|(name, schema)| {
            let data_type = match schema {
                field::FieldSchema::Scalar(field) => DataType::Tag(field.derived_wire_type()?),
                field::FieldSchema::Object(nested) => DataType::Nested(parse_data_types(&nested.fields)),
                field::FieldSchema::List(_) => DataType::Tag(field::WireType::L),
            };
            Some((name.clone(), data_type))
        })
        .collect()
}
