//! Schema derivation: `pick`, `omit`, `partial` and `extend`.
//!
//! Every operation is a pure function from an existing schema to a new one.
//! The source is never modified. Each derived schema records the step that
//! produced it (see [`DerivationRecord`]) after the source's own lineage.
//!
//! | Operation | Fields kept | `required` | Unknown names |
//! |-----------|-------------|------------|---------------|
//! | `pick` | only named, in schema order | unchanged | error |
//! | `omit` | all but named | unchanged | error |
//! | `partial` | all | forced `false` | n/a |
//! | `extend` | all, replaced or appended | from override | n/a |
//!
//! `extend` replaces a same-named field wholesale. Rule lists are never
//! merged.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::schema::{check_unique, Schema};

/// Kind of derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Pick,
    Omit,
    Partial,
    Extend,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Pick => "pick",
            Operation::Omit => "omit",
            Operation::Partial => "partial",
            Operation::Extend => "extend",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One derivation step, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRecord {
    /// Id of the schema the step was applied to.
    pub source: String,
    pub operation: Operation,
    /// Field names involved: picked/omitted names, or the names an
    /// `extend` added or replaced. Empty for `partial`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Keep only the named fields, in schema order.
///
/// # Errors
///
/// Returns `SchemaError::UnknownField` if a name is not in `schema`.
pub fn pick<I, S>(schema: &Schema, names: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = known_names(schema, names)?;
    let fields = schema
        .fields()
        .iter()
        .filter(|f| names.contains(f.name()))
        .cloned()
        .collect();
    Ok(derive_from(schema, Operation::Pick, ordered_args(schema, &names), fields))
}

/// Keep every field except the named ones.
///
/// # Errors
///
/// Returns `SchemaError::UnknownField` if a name is not in `schema`.
pub fn omit<I, S>(schema: &Schema, names: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = known_names(schema, names)?;
    let fields = schema
        .fields()
        .iter()
        .filter(|f| !names.contains(f.name()))
        .cloned()
        .collect();
    Ok(derive_from(schema, Operation::Omit, ordered_args(schema, &names), fields))
}

/// Mark every field optional. Rules are preserved unchanged.
pub fn partial(schema: &Schema) -> Schema {
    let fields = schema
        .fields()
        .iter()
        .map(|f| f.clone().required(false))
        .collect();
    derive_from(schema, Operation::Partial, Vec::new(), fields)
}

/// Add or replace fields.
///
/// A descriptor whose name already exists replaces that field in place
/// (rules, required and exposed all come from the override). Other
/// descriptors are appended in the order given.
///
/// # Errors
///
/// Returns `SchemaError::DuplicateField` if `overrides` names a field twice.
pub fn extend(
    schema: &Schema,
    overrides: impl IntoIterator<Item = FieldDescriptor>,
) -> Result<Schema, SchemaError> {
    let overrides: Vec<FieldDescriptor> = overrides.into_iter().collect();
    check_unique(schema.id(), &overrides)?;

    let args = overrides.iter().map(|f| f.name().to_string()).collect();
    let mut fields: Vec<FieldDescriptor> = schema.fields().to_vec();
    for incoming in overrides {
        match fields.iter_mut().find(|f| f.name() == incoming.name()) {
            Some(existing) => *existing = incoming,
            None => fields.push(incoming),
        }
    }
    Ok(derive_from(schema, Operation::Extend, args, fields))
}

impl Schema {
    /// See [`pick`].
    pub fn pick<I, S>(&self, names: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pick(self, names)
    }

    /// See [`omit`].
    pub fn omit<I, S>(&self, names: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        omit(self, names)
    }

    /// See [`partial`].
    pub fn partial(&self) -> Schema {
        partial(self)
    }

    /// See [`extend`].
    pub fn extend(
        &self,
        overrides: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Schema, SchemaError> {
        extend(self, overrides)
    }
}

// --- Internal implementation ---

fn known_names<I, S>(schema: &Schema, names: I) -> Result<HashSet<String>, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = HashSet::new();
    for name in names {
        let name = name.as_ref();
        if !schema.contains(name) {
            return Err(SchemaError::UnknownField {
                schema: schema.id().to_string(),
                field: name.to_string(),
            });
        }
        set.insert(name.to_string());
    }
    Ok(set)
}

/// Named fields in schema order, so records do not depend on hash order.
fn ordered_args(schema: &Schema, names: &HashSet<String>) -> Vec<String> {
    schema
        .names()
        .filter(|n| names.contains(*n))
        .map(String::from)
        .collect()
}

fn derive_from(
    source: &Schema,
    operation: Operation,
    args: Vec<String>,
    fields: Vec<FieldDescriptor>,
) -> Schema {
    let id = format!("{}({})", operation, source.id());
    debug!(
        source = source.id(),
        %operation,
        fields = fields.len(),
        "derived schema {}",
        id
    );

    let mut lineage = source.lineage().to_vec();
    lineage.push(DerivationRecord {
        source: source.id().to_string(),
        operation,
        args,
    });
    Schema::derived(id, fields, lineage)
}
