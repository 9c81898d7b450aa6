//! JSON validation tool.

use serde::Serialize;
use serde_json::Value;

/// Result of validating a JSON document.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonValidation {
    Valid {
        valid: bool,
        parsed_data: Value,
        data_type: &'static str,
    },
    Invalid {
        valid: bool,
        error: String,
        error_position: usize,
    },
}

impl JsonValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, JsonValidation::Valid { .. })
    }
}

/// Parse `input` and describe the top-level value, or where parsing failed.
pub fn validate_json(input: &str) -> JsonValidation {
    match serde_json::from_str::<Value>(input) {
        Ok(parsed) => JsonValidation::Valid {
            valid: true,
            data_type: type_name(&parsed),
            parsed_data: parsed,
        },
        Err(e) => JsonValidation::Invalid {
            valid: false,
            error_position: char_offset(input, e.line(), e.column()),
            error: e.to_string(),
        },
    }
}

/// Python-style name of a JSON value's type.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "dict",
        Value::Array(_) => "list",
        Value::String(_) => "str",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::Bool(_) => "bool",
        Value::Null => "NoneType",
    }
}

/// Convert a 1-based line/column pair into a character offset.
fn char_offset(input: &str, line: usize, column: usize) -> usize {
    let line_start: usize = input
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    let mut byte_offset = (line_start + column.saturating_sub(1)).min(input.len());
    while !input.is_char_boundary(byte_offset) {
        byte_offset -= 1;
    }

    input[..byte_offset].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_types() {
        let cases = [
            (r#"{"a": 1}"#, "dict"),
            ("[1, 2]", "list"),
            (r#""hi""#, "str"),
            ("42", "int"),
            ("4.5", "float"),
            ("true", "bool"),
            ("null", "NoneType"),
        ];

        for (input, expected) in cases {
            match validate_json(input) {
                JsonValidation::Valid { data_type, valid, .. } => {
                    assert!(valid);
                    assert_eq!(data_type, expected, "input: {}", input);
                }
                other => panic!("expected valid for {}: {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let result = validate_json("{\"a\": 1,\n \"b\": }");
        assert!(!result.is_valid());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert!(json["error"].as_str().is_some());
        assert!(json["error_position"].as_u64().unwrap() > 9);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(validate_json("[1]")).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["data_type"], "list");
        assert_eq!(json["parsed_data"], serde_json::json!([1]));
    }
}
