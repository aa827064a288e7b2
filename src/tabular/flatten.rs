//! One-level record flattening

use serde_json::{Map, Value};

/// Reduce a value to something CSV-friendly
///
/// Null becomes an empty string, scalars pass through, and anything nested
/// (arrays, deeper objects) is JSON-encoded into a single cell.
pub fn to_scalar(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => value.clone(),
        other => Value::String(serde_json::to_string(other).unwrap_or_default()),
    }
}

/// Flatten one level of nesting: `{"a": {"b": 1}}` becomes `{"a.b": 1}`
///
/// Key order follows the record's own key order, which keeps dynamic CSV
/// headers stable for a given response shape. Non-object records flatten
/// to an empty row.
pub fn flatten_one_level(record: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    let Some(obj) = record.as_object() else {
        return flat;
    };

    for (key, value) in obj {
        match value {
            Value::Object(nested) => {
                for (sub_key, sub_value) in nested {
                    flat.insert(format!("{key}.{sub_key}"), to_scalar(sub_value));
                }
            }
            other => {
                flat.insert(key.clone(), to_scalar(other));
            }
        }
    }

    flat
}
