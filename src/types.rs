//! Core types shared by schemas and the validator.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared type of a field.
///
/// Used for documentation, JSON Schema export and optional coercion. Type
/// checking itself is done by the `is_string`/`is_boolean`/`is_array` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Any,
    String,
    Boolean,
    Number,
    Array,
}

impl FieldType {
    /// Returns the JSON Schema `type` keyword for this type, if any.
    pub fn json_type(&self) -> Option<&'static str> {
        match self {
            FieldType::Any => None,
            FieldType::String => Some("string"),
            FieldType::Boolean => Some("boolean"),
            FieldType::Number => Some("number"),
            FieldType::Array => Some("array"),
        }
    }

    /// Convert `value` to this type when the conversion is lossless.
    ///
    /// Values that cannot be converted are returned unchanged so the
    /// field's type rule reports them.
    pub fn coerce(&self, value: &Value) -> Value {
        match (self, value) {
            (FieldType::String, Value::Number(n)) => Value::String(n.to_string()),
            (FieldType::String, Value::Bool(b)) => Value::String(b.to_string()),
            (FieldType::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value.clone(),
            },
            (FieldType::Number, Value::String(s)) => parse_number(s.trim())
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        }
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    // An integer out of u64 range would be rounded by f64.
    if is_integer_text(s) {
        return None;
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_integer_text(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Options for payload validation.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// When true, keys not declared in the schema are reported as
    /// `whitelist` violations instead of being dropped silently.
    pub strict: bool,
    /// When true, present values are converted to the field's declared
    /// type before its rules run.
    pub coerce: bool,
}

impl ValidateOptions {
    /// Create options with strict mode and coercion disabled (default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode (reject undeclared keys).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set implicit type coercion.
    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_type_json_type() {
        assert_eq!(FieldType::String.json_type(), Some("string"));
        assert_eq!(FieldType::Array.json_type(), Some("array"));
        assert_eq!(FieldType::Any.json_type(), None);
    }

    #[test]
    fn coerce_to_string() {
        assert_eq!(FieldType::String.coerce(&json!(42)), json!("42"));
        assert_eq!(FieldType::String.coerce(&json!(true)), json!("true"));
        assert_eq!(FieldType::String.coerce(&json!(["a"])), json!(["a"]));
    }

    #[test]
    fn coerce_to_boolean() {
        assert_eq!(FieldType::Boolean.coerce(&json!("true")), json!(true));
        assert_eq!(FieldType::Boolean.coerce(&json!("false")), json!(false));
        assert_eq!(FieldType::Boolean.coerce(&json!("yes")), json!("yes"));
    }

    #[test]
    fn coerce_to_number() {
        assert_eq!(FieldType::Number.coerce(&json!("7")), json!(7));
        assert_eq!(FieldType::Number.coerce(&json!("2.5")), json!(2.5));
        assert_eq!(FieldType::Number.coerce(&json!("seven")), json!("seven"));
        assert_eq!(
            FieldType::Number.coerce(&json!("18446744073709551615")),
            json!(u64::MAX)
        );
        assert_eq!(
            FieldType::Number.coerce(&json!("12345678901234567890123")),
            json!("12345678901234567890123")
        );
        assert_eq!(
            FieldType::Number.coerce(&json!("-99999999999999999999")),
            json!("-99999999999999999999")
        );
    }

    #[test]
    fn any_and_array_never_coerce() {
        assert_eq!(FieldType::Any.coerce(&json!("1")), json!("1"));
        assert_eq!(FieldType::Array.coerce(&json!("1")), json!("1"));
    }

    #[test]
    fn validate_options_builder() {
        let opts = ValidateOptions::new();
        assert!(!opts.strict);
        assert!(!opts.coerce);

        let opts = ValidateOptions::new().strict(true).coerce(true);
        assert!(opts.strict);
        assert!(opts.coerce);
    }
}
