//! Atomic validation rules.
//!
//! A [`Rule`] is a pure predicate over an optional JSON value plus an
//! optional custom failure message. Rules never mutate their input and are
//! safe to share across threads.
//!
//! # Serialized form
//!
//! ```json
//! { "rule": "pattern", "pattern": "^[^@]+$", "message": "should not be an email address" }
//! { "rule": "is_enum", "values": ["email_verification", "login"] }
//! { "rule": "not_empty" }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchemaError, Violation};

/// A full-match regular expression.
///
/// The source text is kept for display and serialization; equality compares
/// the source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` as an anchored regular expression.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPattern` if `source` is not a valid regex.
    pub fn new(source: impl Into<String>) -> Result<Self, SchemaError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            SchemaError::InvalidPattern {
                pattern: source.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(Self { source, regex })
    }

    /// The pattern as written, without the implicit anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole of `s` matches.
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = SchemaError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// The predicate a rule applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleKind {
    /// Fails on absent, `null`, empty string or empty array.
    NotEmpty,
    /// Fails unless the value is a syntactically valid email address.
    IsEmail,
    IsString,
    IsBoolean,
    IsArray,
    /// Fails unless the value is a string fully matching the pattern.
    Pattern { pattern: Pattern },
    /// Fails unless the value equals one of `values`.
    IsEnum { values: Vec<Value> },
}

impl RuleKind {
    /// Violation tag reported when this rule fails.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::NotEmpty => "not_empty",
            RuleKind::IsEmail => "format",
            RuleKind::IsString | RuleKind::IsBoolean | RuleKind::IsArray => "type",
            RuleKind::Pattern { .. } => "pattern",
            RuleKind::IsEnum { .. } => "enum",
        }
    }
}

/// A single validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(flatten)]
    pub kind: RuleKind,
    /// Replaces the generic failure message when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Rule {
    /// Wrap a rule kind with the default failure message.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Value must be present and not `null`, `""` or `[]`.
    pub fn not_empty() -> Self {
        Self::new(RuleKind::NotEmpty)
    }

    /// Value must be a string shaped like an email address.
    pub fn email() -> Self {
        Self::new(RuleKind::IsEmail)
    }

    /// Value must be a JSON string.
    pub fn string() -> Self {
        Self::new(RuleKind::IsString)
    }

    /// Value must be a JSON boolean.
    pub fn boolean() -> Self {
        Self::new(RuleKind::IsBoolean)
    }

    /// Value must be a JSON array.
    pub fn array() -> Self {
        Self::new(RuleKind::IsArray)
    }

    /// Full-match pattern rule.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPattern` if `source` does not compile.
    pub fn pattern(source: impl Into<String>) -> Result<Self, SchemaError> {
        Ok(Self::new(RuleKind::Pattern {
            pattern: Pattern::new(source)?,
        }))
    }

    /// Value must equal one of `values`.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(RuleKind::IsEnum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Set a custom failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Violation tag reported when this rule fails.
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// Returns true if `value` passes this rule.
    ///
    /// `None` means the field is absent from the input.
    pub fn check(&self, value: Option<&Value>) -> bool {
        match &self.kind {
            RuleKind::NotEmpty => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Array(a)) => !a.is_empty(),
                Some(_) => true,
            },
            RuleKind::IsEmail => matches!(value, Some(Value::String(s)) if is_email(s)),
            RuleKind::IsString => matches!(value, Some(Value::String(_))),
            RuleKind::IsBoolean => matches!(value, Some(Value::Bool(_))),
            RuleKind::IsArray => matches!(value, Some(Value::Array(_))),
            RuleKind::Pattern { pattern } => {
                matches!(value, Some(Value::String(s)) if pattern.is_match(s))
            }
            RuleKind::IsEnum { values } => value.map_or(false, |v| values.contains(v)),
        }
    }

    /// Evaluate this rule for `field`, returning the violation on failure.
    pub fn evaluate(&self, field: &str, value: Option<&Value>) -> Result<(), Violation> {
        if self.check(value) {
            Ok(())
        } else {
            Err(Violation::new(field, self.tag(), self.failure_message(field)))
        }
    }

    /// The message reported when this rule fails for `field`.
    pub fn failure_message(&self, field: &str) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            RuleKind::NotEmpty => format!("{} should not be empty", field),
            RuleKind::IsEmail => format!("{} must be an email", field),
            RuleKind::IsString => format!("{} must be a string", field),
            RuleKind::IsBoolean => format!("{} must be a boolean value", field),
            RuleKind::IsArray => format!("{} must be an array", field),
            RuleKind::Pattern { pattern } => {
                format!("{} must match {} regular expression", field, pattern.as_str())
            }
            RuleKind::IsEnum { values } => format!(
                "{} must be one of the following values: {}",
                field,
                values
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Syntactic email check: `local@domain.tld`.
///
/// The local part must be non-empty. The domain must contain at least one
/// `.` with no empty labels. Neither part may contain whitespace.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
