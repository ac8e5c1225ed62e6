//! Minimal JSON-schema checks for tool arguments
//!
//! Covers what the tool schemas actually use: an object with `required`
//! keys, primitive `type`s, `enum`s and typed array items. Unknown keys are
//! ignored, as the model sometimes sends extras.

use crate::error::{Error, Result};
use serde_json::Value;

/// Validate `input` against an object `schema`
pub fn validate(schema: &Value, input: &Value) -> Result<()> {
    let object = input
        .as_object()
        .ok_or_else(|| Error::InvalidInput("Input must be an object".to_string()))?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            match object.get(field) {
                None | Some(Value::Null) => {
                    return Err(Error::InvalidInput(format!(
                        "Missing required parameter '{field}'"
                    )));
                }
                Some(_) => {}
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, value) in object {
        if value.is_null() {
            continue;
        }
        if let Some(property) = properties.get(name) {
            check_value(name, property, value)?;
        }
    }

    Ok(())
}

fn check_value(name: &str, property: &Value, value: &Value) -> Result<()> {
    if let Some(expected) = property.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            return Err(Error::InvalidInput(format!(
                "Parameter '{name}' must be of type {expected}"
            )));
        }
    }

    if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect();
            return Err(Error::InvalidInput(format!(
                "Parameter '{name}' must be one of: {}",
                options.join(", ")
            )));
        }
    }

    if let (Some(items), Some(array)) = (property.get("items"), value.as_array()) {
        for (i, item) in array.iter().enumerate() {
            check_value(&format!("{name}[{i}]"), items, item)?;
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "limit": {"type": "integer"},
                "mode": {"type": "string", "enum": ["content", "count"]},
                "ignore": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["file_path"]
        })
    }

    #[test]
    fn test_valid_input() {
        let input = json!({"file_path": "a.rs", "limit": 10, "mode": "count", "ignore": ["*.log"]});
        assert!(validate(&schema(), &input).is_ok());
    }

    #[test]
    fn test_missing_required() {
        let err = validate(&schema(), &json!({"limit": 5})).unwrap_err();
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn test_wrong_type() {
        let err = validate(&schema(), &json!({"file_path": 3})).unwrap_err();
        assert!(err.to_string().contains("must be of type string"));
    }

    #[test]
    fn test_enum_and_items() {
        assert!(validate(&schema(), &json!({"file_path": "a", "mode": "lines"})).is_err());
        assert!(validate(&schema(), &json!({"file_path": "a", "ignore": [1]})).is_err());
    }

    #[test]
    fn test_non_object_and_extras() {
        assert!(validate(&schema(), &json!("a.rs")).is_err());
        assert!(validate(&schema(), &json!({"file_path": "a", "extra": true})).is_ok());
    }
}
