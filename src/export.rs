//! JSON Schema export for documentation and tooling.
//!
//! The export describes the same contract as the schema but is metadata
//! only: validation always goes through [`crate::validate`]. Undeclared
//! keys are dropped by the validator rather than rejected, so the export
//! leaves `additionalProperties` open. Fields that are validated but not
//! exposed are marked `writeOnly`.

use serde_json::{json, Map, Value};

use crate::field::FieldDescriptor;
use crate::rule::RuleKind;
use crate::schema::Schema;
use crate::types::FieldType;

const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Render `schema` as a draft 2020-12 object schema.
pub fn to_json_schema(schema: &Schema) -> Value {
    let properties: Map<String, Value> = schema
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), property(f)))
        .collect();
    let required: Vec<&str> = schema
        .fields()
        .iter()
        .filter(|f| f.is_required())
        .map(FieldDescriptor::name)
        .collect();

    json!({
        "$schema": DRAFT_2020_12,
        "title": schema.id(),
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn property(field: &FieldDescriptor) -> Value {
    let mut prop = Map::new();

    let ty = match field.declared_type() {
        FieldType::Any => field.rule_list().iter().find_map(|r| match r.kind {
            RuleKind::IsString | RuleKind::IsEmail | RuleKind::Pattern { .. } => Some("string"),
            RuleKind::IsBoolean => Some("boolean"),
            RuleKind::IsArray => Some("array"),
            _ => None,
        }),
        declared => declared.json_type(),
    };
    if let Some(ty) = ty {
        prop.insert("type".into(), json!(ty));
    }

    for rule in field.rule_list() {
        match &rule.kind {
            RuleKind::NotEmpty => match ty {
                Some("string") => {
                    prop.insert("minLength".into(), json!(1));
                }
                Some("array") => {
                    prop.insert("minItems".into(), json!(1));
                }
                _ => {}
            },
            RuleKind::IsEmail => {
                prop.insert("format".into(), json!("email"));
            }
            RuleKind::Pattern { pattern } => {
                prop.insert("pattern".into(), json!(anchored(pattern.as_str())));
            }
            RuleKind::IsEnum { values } => {
                prop.insert("enum".into(), Value::Array(values.clone()));
            }
            RuleKind::IsString | RuleKind::IsBoolean | RuleKind::IsArray => {}
        }
    }

    if let Some(description) = field.description_text() {
        prop.insert("description".into(), json!(description));
    }
    if let Some(example) = field.example_value() {
        prop.insert("examples".into(), json!([example]));
    }
    if !field.is_exposed() {
        prop.insert("writeOnly".into(), json!(true));
    }

    Value::Object(prop)
}

// JSON Schema patterns are unanchored; validation matches the whole value.
// Alternation can escape the outer anchors, so those patterns stay wrapped.
fn anchored(source: &str) -> String {
    let closed = source.ends_with('$') && !source.ends_with("\\$");
    if source.starts_with('^') && closed && !source.contains('|') {
        source.to_string()
    } else {
        format!("^(?:{})$", source)
    }
}
