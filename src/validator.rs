//! Payload validation and whitelisting against a schema.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::Violation;
use crate::schema::Schema;
use crate::types::{json_type_name, ValidateOptions};

/// Outcome of validating one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every field passed. `value` holds only exposed, declared fields.
    Ok { value: Map<String, Value> },
    /// One or more violations, in field declaration order.
    Fail { errors: Vec<Violation> },
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok { .. })
    }

    /// The transformed object, if validation passed.
    pub fn value(&self) -> Option<&Map<String, Value>> {
        match self {
            ValidationResult::Ok { value } => Some(value),
            ValidationResult::Fail { .. } => None,
        }
    }

    /// The violations, empty if validation passed.
    pub fn errors(&self) -> &[Violation] {
        match self {
            ValidationResult::Ok { .. } => &[],
            ValidationResult::Fail { errors } => errors,
        }
    }

    pub fn into_result(self) -> Result<Map<String, Value>, Vec<Violation>> {
        match self {
            ValidationResult::Ok { value } => Ok(value),
            ValidationResult::Fail { errors } => Err(errors),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResult", 2)?;
        match self {
            ValidationResult::Ok { value } => {
                s.serialize_field("valid", &true)?;
                s.serialize_field("value", value)?;
            }
            ValidationResult::Fail { errors } => {
                s.serialize_field("valid", &false)?;
                s.serialize_field("errors", errors)?;
            }
        }
        s.end()
    }
}

/// Validate a raw object against a schema with default options.
///
/// Undeclared keys are dropped silently and no coercion is applied.
pub fn validate(schema: &Schema, raw: &Map<String, Value>) -> ValidationResult {
    validate_with(schema, raw, &ValidateOptions::default())
}

/// Validate a raw object against a schema.
///
/// Fields are processed in declaration order. For each field the first
/// failing rule is reported and the remaining rules for that field are
/// skipped; violations accumulate across fields. An optional field that is
/// absent or `null` skips its rules. Valid exposed fields are
/// copied to the output. Keys not declared in the schema never reach the
/// output; with `options.strict` they are also reported.
pub fn validate_with(
    schema: &Schema,
    raw: &Map<String, Value>,
    options: &ValidateOptions,
) -> ValidationResult {
    let mut output = Map::new();
    let mut errors = Vec::new();

    for field in schema.fields() {
        let name = field.name();
        let Some(raw_value) = raw.get(name) else {
            if field.is_required() {
                trace!(field = name, "required field missing");
                errors.push(Violation::new(
                    name,
                    "required",
                    format!("{} is required", name),
                ));
            }
            continue;
        };

        if raw_value.is_null() && !field.is_required() {
            trace!(field = name, "optional field is null");
            if field.is_exposed() {
                output.insert(name.to_string(), Value::Null);
            }
            continue;
        }

        let value = if options.coerce {
            field.declared_type().coerce(raw_value)
        } else {
            raw_value.clone()
        };

        let failed = field
            .rule_list()
            .iter()
            .find_map(|rule| rule.evaluate(name, Some(&value)).err());

        match failed {
            Some(violation) => {
                trace!(field = name, rule = %violation.rule, "rule failed");
                errors.push(violation);
            }
            None if field.is_exposed() => {
                output.insert(name.to_string(), value);
            }
            None => {}
        }
    }

    if options.strict {
        for key in raw.keys().filter(|k| !schema.contains(k)) {
            errors.push(Violation::new(
                key.as_str(),
                "whitelist",
                format!("property {} should not exist", key),
            ));
        }
    }

    if errors.is_empty() {
        debug!(schema = schema.id(), fields = output.len(), "payload valid");
        ValidationResult::Ok { value: output }
    } else {
        debug!(schema = schema.id(), errors = errors.len(), "payload invalid");
        ValidationResult::Fail { errors }
    }
}

/// Validate any JSON value. Non-object payloads fail with a single
/// `$root` type violation.
pub fn validate_value(
    schema: &Schema,
    payload: &Value,
    options: &ValidateOptions,
) -> ValidationResult {
    match payload {
        Value::Object(raw) => validate_with(schema, raw, options),
        other => ValidationResult::Fail {
            errors: vec![Violation::new(
                "$root",
                "type",
                format!("payload must be an object, got {}", json_type_name(other)),
            )],
        },
    }
}
