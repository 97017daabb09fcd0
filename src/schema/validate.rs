use crate::schema::field;

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One item violation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending attribute.
    pub path: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.path, self.message)
    }
}

/// Every violation found in an item.
#[derive(Clone, Debug, Default, Eq, Error, PartialEq)]
#[error("invalid item: {}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors {
    /// Violations in discovery order.
    pub errors: Vec<ValidationError>,
}

/// Check `item` against `fields`, collecting every violation.
pub fn validate(fields: &field::Fields, item: &Map<String, Value>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_recursive(fields, item, "", &mut errors);
    errors
}

fn validate_recursive(
    fields: &field::Fields,
    item: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    for (name, schema) in fields {
        let field_path = join_path(path, name);
        let Some(value) = item.get(name) else {
            let has_default = matches!(schema, field::FieldSchema::Scalar(field) if field.default.is_some());
            if schema.is_required() && !has_default {
                push(errors, field_path, "is required");
            }
            continue;
        };
        match (schema, value) {
            (field::FieldSchema::Scalar(field), value) => {
                if !field.field_type.accepts(value) {
                    push(errors, field_path, format!("must be of type {:?}", field.field_type));
                }
            }
            (field::FieldSchema::Object(nested), Value::Object(object)) => {
                validate_recursive(&nested.fields, object, &field_path, errors);
            }
            (field::FieldSchema::Object(_), _) => push(errors, field_path, "must be an object"),
            (field::FieldSchema::List(nested), Value::Array(elements)) => {
                for (position, element) in elements.iter().enumerate() {
                    let element_path = format!("{field_path}[{position}]");
                    match element {
                        Value::Object(object) => {
                            validate_recursive(&nested.fields, object, &element_path, errors)
                        }
                        _ => push(errors, element_path, "must be an object"),
                    }
                }
            }
            (field::FieldSchema::List(_), _) => push(errors, field_path, "must be an array"),
        }
    }
    for name in item.keys().filter(|name| !fields.contains_key(*name)) {
        push(errors, join_path(path, name), "is not allowed");
    }
}

fn push(errors: &mut Vec<ValidationError>, path: String, message: impl Into<String>) {
    errors.push(ValidationError {
        path,
        message: message.into(),
    });
}

/// Fill every missing field that declares a default, at any depth.
///
/// Generators run here, never at declaration time, so each call yields fresh values.
pub fn apply_defaults(fields: &field::Fields, item: &mut Map<String, Value>) {
    for (name, schema) in fields {
        match schema {
            field::FieldSchema::Scalar(field) => {
                if let (Some(default), false) = (&field.default, item.contains_key(name)) {
                    item.insert(name.clone(), default.generate());
                }
            }
            field::FieldSchema::Object(nested) => {
                if let Some(Value::Object(object)) = item.get_mut(name) {
                    apply_defaults(&nested.fields, object);
                }
            }
            field::FieldSchema::List(nested) => {
                if let Some(Value::Array(elements)) = item.get_mut(name) {
                    for element in elements {
                        if let Value::Object(object) = element {
                            apply_defaults(&nested.fields, object);
                        }
                    }
                }
            }
        }
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
