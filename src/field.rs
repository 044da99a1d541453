//! Field descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::Rule;
use crate::types::FieldType;

fn default_exposed() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// Contract for a single named field.
///
/// Built with [`FieldDescriptor::new`] and the builder methods. The name is
/// fixed at creation; derivation produces modified copies rather than
/// changing a descriptor in place.
///
/// ```
/// use dto_schema::{FieldDescriptor, FieldType, Rule};
///
/// let email = FieldDescriptor::new("email")
///     .required(true)
///     .field_type(FieldType::String)
///     .rule(Rule::email())
///     .example("test@test.com");
/// assert_eq!(email.name(), "email");
/// assert!(email.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    #[serde(rename = "type", default)]
    field_type: FieldType,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    rules: Vec<Rule>,
    /// Whether a valid value is copied into the transformed output.
    #[serde(default = "default_exposed", skip_serializing_if = "is_true")]
    exposed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example: Option<Value>,
}

impl FieldDescriptor {
    /// New optional, exposed field of type `Any` with no rules.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Any,
            required: false,
            rules: Vec::new(),
            exposed: true,
            description: None,
            example: None,
        }
    }

    /// Mark the field as required; a missing key is then reported.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Append a rule. Rules run in the order they are added.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules in order.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Set whether a valid value is copied to the output.
    pub fn exposed(mut self, exposed: bool) -> Self {
        self.exposed = exposed;
        self
    }

    /// Set the declared type used for coercion and export.
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Attach a human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an example value.
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Field name (the payload key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if a missing key is a violation.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if valid values appear in the output.
    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    /// Rules in evaluation order.
    pub fn rule_list(&self) -> &[Rule] {
        &self.rules
    }

    /// Declared type, `Any` when unset.
    pub fn declared_type(&self) -> FieldType {
        self.field_type
    }

    /// Description, if one was attached.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Example value, if one was attached.
    pub fn example_value(&self) -> Option<&Value> {
        self.example.as_ref()
    }
}
