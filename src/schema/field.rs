use indexmap::IndexMap;
use serde_json::Value;
use std::{fmt, sync};

/// Field declarations keyed by field name.
pub type Fields = IndexMap<String, FieldSchema>;

/// Declared type of a scalar field.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// Date, stored as an ISO-8601 string or an epoch number.
    Date,
    /// Number.
    Number,
    /// Boolean.
    Boolean,
    /// Binary blob, stored as a base64 string or a list of bytes.
    Binary,
    /// List of arbitrary values.
    Array,
    /// Any value; has no wire type.
    Any,
}

impl FieldType {
    /// Wire type tag derived from the declared type.
    pub fn wire_type(self) -> Option<WireType> {
        match self {
            Self::String => Some(WireType::S),
            Self::Date => Some(WireType::Date),
            Self::Number => Some(WireType::N),
            Self::Boolean => Some(WireType::Bool),
            Self::Binary => Some(WireType::B),
            Self::Array => Some(WireType::L),
            Self::Any => None,
        }
    }

    pub(crate) fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Date => value.is_string() || value.is_number(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Binary => value.is_string() || value.is_array(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }
}

/// Attribute type tag as understood by the store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WireType {
    /// String.
    S,
    /// Date (stored as a string).
    Date,
    /// Number.
    N,
    /// Boolean.
    Bool,
    /// Binary.
    B,
    /// List.
    L,
    /// String set.
    Ss,
    /// Number set.
    Ns,
    /// Binary set.
    Bs,
}

impl WireType {
    /// Tag as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::Date => "DATE",
            Self::N => "N",
            Self::Bool => "BOOL",
            Self::B => "B",
            Self::L => "L",
            Self::Ss => "SS",
            Self::Ns => "NS",
            Self::Bs => "BS",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value used for a field that is missing from an item.
#[derive(Clone)]
pub enum DefaultValue {
    /// Literal value, cloned on every use.
    Value(Value),
    /// Generator invoked once per item, so every item gets a fresh value.
    Generator(sync::Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Default backed by a generator function.
    pub fn generator(generator: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Generator(sync::Arc::new(generator))
    }

    /// Produce the value to insert.
    pub fn generate(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Generator(generator) => generator(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Declaration of a scalar (or opaque list) field.
///
/// ```rust
/// use dynamodb_mapper::schema::field;
///
/// let id = field::Field::new(field::FieldType::String).alias("i").required();
/// let tags = field::Field::string_set().alias("t");
/// ```
#[derive(Clone, Debug)]
pub struct Field {
    /// Declared type.
    pub field_type: FieldType,
    /// Compact wire name used when aliasing is enabled.
    pub alias: Option<String>,
    /// Explicit wire type, taking priority over the declared type.
    pub wire_type: Option<WireType>,
    /// Value inserted when the field is missing.
    pub default: Option<DefaultValue>,
    /// Whether validation rejects items missing this field.
    pub required: bool,
}

impl Field {
    /// Field of the given type with no alias, override, default or requirement.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            alias: None,
            wire_type: None,
            default: None,
            required: false,
        }
    }

    /// List of strings stored as a string set.
    pub fn string_set() -> Self {
        Self::new(FieldType::Array).wire_type(WireType::Ss)
    }

    /// List of numbers stored as a number set.
    pub fn number_set() -> Self {
        Self::new(FieldType::Array).wire_type(WireType::Ns)
    }

    /// List of binaries stored as a binary set.
    pub fn binary_set() -> Self {
        Self::new(FieldType::Array).wire_type(WireType::Bs)
    }

    /// String defaulting to a random identifier.
    pub fn uuid() -> Self {
        Self::new(FieldType::String)
            .default_value(DefaultValue::generator(|| Value::String(uuid::Uuid::new_v4().to_string())))
    }

    /// String defaulting to a time-ordered identifier.
    pub fn time_uuid() -> Self {
        Self::new(FieldType::String)
            .default_value(DefaultValue::generator(|| Value::String(uuid::Uuid::now_v7().to_string())))
    }

    /// Set the wire name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Override the derived wire type.
    pub fn wire_type(mut self, wire_type: WireType) -> Self {
        self.wire_type = Some(wire_type);
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub(crate) fn derived_wire_type(&self) -> Option<WireType> {
        self.wire_type.or_else(|| self.field_type.wire_type())
    }
}

/// Declaration of a nested map or of a list whose elements are maps.
#[derive(Clone, Debug, Default)]
pub struct NestedField {
    /// Compact wire name used when aliasing is enabled.
    pub alias: Option<String>,
    /// Declarations of the nested attributes.
    pub fields: Fields,
    /// Whether validation rejects items missing this field.
    pub required: bool,
}

/// Declaration of a single field.
#[derive(Clone, Debug)]
pub enum FieldSchema {
    /// Typed leaf attribute.
    Scalar(Field),
    /// Nested map with individually declared attributes.
    Object(NestedField),
    /// List of maps sharing one element declaration.
    List(NestedField),
}

impl FieldSchema {
    /// Nested map declaration.
    pub fn object<K: Into<String>>(
        alias: impl Into<String>,
        fields: impl IntoIterator<Item = (K, FieldSchema)>,
    ) -> Self {
        Self::Object(NestedField {
            alias: Some(alias.into()),
            fields: collect_fields(fields),
            required: false,
        })
    }

    /// List-of-maps declaration.
    pub fn list<K: Into<String>>(
        alias: impl Into<String>,
        fields: impl IntoIterator<Item = (K, FieldSchema)>,
    ) -> Self {
        Self::List(NestedField {
            alias: Some(alias.into()),
            fields: collect_fields(fields),
            required: false,
        })
    }

    /// Compact wire name, if declared.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Scalar(field) => field.alias.as_deref(),
            Self::Object(nested) | Self::List(nested) => nested.alias.as_deref(),
        }
    }

    /// Whether validation rejects items missing this field.
    pub fn is_required(&self) -> bool {
        match self {
            Self::Scalar(field) => field.required,
            Self::Object(nested) | Self::List(nested) => nested.required,
        }
    }

    pub(crate) fn with_alias(self, alias: Option<String>) -> Self {
        match self {
            Self::Scalar(field) => Self::Scalar(Field { alias, ..field }),
            Self::Object(nested) => Self::Object(NestedField { alias, ..nested }),
            Self::List(nested) => Self::List(NestedField { alias, ..nested }),
        }
    }
}

impl From<Field> for FieldSchema {
    fn from(field: Field) -> Self {
        Self::Scalar(field)
    }
}

/// Collect `(name, declaration)` pairs into [`Fields`].
pub fn collect_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldSchema)>) -> Fields {
    fields
        .into_iter()
        .map(|(name, field)| (name.into(), field))
        .collect()
}
