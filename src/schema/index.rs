use serde_json::Value;

/// Local secondary index: shares the table hash key, adds its own range key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalIndex {
    /// Index name.
    pub name: String,
    /// Hash key. Must be the table hash key; `None` inherits it.
    pub hash_key: Option<String>,
    /// Range key.
    pub range_key: String,
    /// Projection description, passed through to table creation.
    pub projection: Option<Value>,
}

/// Global secondary index: independent hash key and optional capacity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalIndex {
    /// Index name.
    pub name: String,
    /// Hash key.
    pub hash_key: String,
    /// Range key.
    pub range_key: Option<String>,
    /// Projection description, passed through to table creation.
    pub projection: Option<Value>,
    /// Provisioned read capacity units.
    pub read_capacity: Option<i64>,
    /// Provisioned write capacity units.
    pub write_capacity: Option<i64>,
}

/// Secondary index declaration.
///
/// ```rust
/// use dynamodb_mapper::schema::index;
///
/// let by_date = index::SecondaryIndex::Local(index::LocalIndex {
///     name: "ByDate".to_string(),
///     range_key: "date".to_string(),
///     ..Default::default()
/// });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SecondaryIndex {
    /// Local secondary index.
    Local(LocalIndex),
    /// Global secondary index.
    Global(GlobalIndex),
}

impl SecondaryIndex {
    /// Index name.
    pub fn name(&self) -> &str {
        match self {
            Self::Local(index) => &index.name,
            Self::Global(index) => &index.name,
        }
    }

    /// Rename the key attributes with `rename`, reporting names it cannot map.
    pub(crate) fn map_key_names(
        &mut self,
        mut rename: impl FnMut(&str) -> Option<String>,
        violations: &mut Vec<String>,
    ) {
        let name = self.name().to_string();
        let mut map = |key: &mut String| match rename(key) {
            Some(wire) => *key = wire,
            None => violations.push(format!("index `{name}` key `{key}` is not a declared field")),
        };
        match self {
            Self::Local(index) => {
                if let Some(hash_key) = index.hash_key.as_mut() {
                    map(hash_key);
                }
                map(&mut index.range_key);
            }
            Self::Global(index) => {
                map(&mut index.hash_key);
                if let Some(range_key) = index.range_key.as_mut() {
                    map(range_key);
                }
            }
        }
    }

    /// Check the declaration against the table hash key.
    pub(crate) fn validate(&self, table_hash_key: &str, violations: &mut Vec<String>) {
        let name = self.name();
        if name.is_empty() {
            violations.push("secondary index name is required".to_string());
        }
        match self {
            Self::Local(index) => {
                if let Some(hash_key) = &index.hash_key {
                    if hash_key != table_hash_key {
                        violations.push(format!(
                            "local index `{name}` hash key `{hash_key}` must match table hash key `{table_hash_key}`"
                        ));
                    }
                }
                if index.range_key.is_empty() {
                    violations.push(format!("local index `{name}` must declare a range key"));
                }
            }
            Self::Global(index) => {
                if index.hash_key.is_empty() {
                    violations.push(format!("global index `{name}` must declare a hash key"));
                }
                if index.range_key.as_deref() == Some("") {
                    violations.push(format!("global index `{name}` range key must not be empty"));
                }
                for (label, capacity) in [("read", index.read_capacity), ("write", index.write_capacity)] {
                    if capacity.is_some_and(|capacity| capacity < 1) {
                        violations.push(format!("global index `{name}` {label} capacity must be positive"));
                    }
                }
            }
        }
    }
}

impl LocalIndex {
    /// Hash key, resolving an inherited one to the table hash key.
    pub fn hash_key<'a>(&'a self, table_hash_key: &'a str) -> &'a str {
        self.hash_key.as_deref().unwrap_or(table_hash_key)
    }
}
