//! Decoding of parsed model output into typed lists.

use pipeline::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes the list stored under `field` in `value`.
///
/// Models asked for `{"<field>": [...]}` sometimes answer with the bare array
/// instead; both forms are accepted. A single-key object whose only value is
/// an array is accepted too, since some models rename the wrapper key.
pub fn decode_list<T: DeserializeOwned>(
    field: &'static str,
    value: Value,
) -> Result<Vec<T>, ValidationError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(shape(
                    field,
                    format!("expected an array, found {}", kind(&other)),
                ))
            }
            None if map.len() == 1 => match map.into_iter().next() {
                Some((_, Value::Array(items))) => items,
                _ => return Err(shape(field, format!("missing \"{field}\" array"))),
            },
            None => return Err(shape(field, format!("missing \"{field}\" array"))),
        },
        other => {
            return Err(shape(
                field,
                format!("expected an array or object, found {}", kind(&other)),
            ))
        }
    };

    serde_json::from_value(Value::Array(items)).map_err(|e| shape(field, e.to_string()))
}

fn shape(field: &'static str, message: String) -> ValidationError {
    ValidationError::Shape { field, message }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
