//! Schemas: ordered, duplicate-free sets of field descriptors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::derive::DerivationRecord;
use crate::error::SchemaError;
use crate::field::FieldDescriptor;

/// A named, ordered set of field contracts.
///
/// Schemas are immutable. The derivation functions in [`crate::derive`]
/// always return new instances. Field order is declaration order, which
/// fixes the order of validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef")]
pub struct Schema {
    id: String,
    fields: Vec<FieldDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lineage: Vec<DerivationRecord>,
}

#[derive(Deserialize)]
struct SchemaDef {
    id: String,
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    lineage: Vec<DerivationRecord>,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        let schema = Schema::new(def.id, def.fields)?;
        Ok(schema.with_lineage(def.lineage))
    }
}

impl Schema {
    /// Build a schema from field descriptors.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateField` if two descriptors share a name.
    pub fn new(
        id: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();
        check_unique(&id, &fields)?;
        Ok(Self {
            id,
            fields,
            lineage: Vec::new(),
        })
    }

    /// Build a derived schema. Callers guarantee names are unique.
    pub(crate) fn derived(
        id: String,
        fields: Vec<FieldDescriptor>,
        lineage: Vec<DerivationRecord>,
    ) -> Self {
        Self {
            id,
            fields,
            lineage,
        }
    }

    /// Return this schema under a new id. Fields and lineage are kept.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn with_lineage(mut self, lineage: Vec<DerivationRecord>) -> Self {
        self.lineage = lineage;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::name)
    }

    /// Names of fields copied into validated output.
    pub fn exposed_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.is_exposed())
            .map(FieldDescriptor::name)
    }

    /// Derivation steps that produced this schema, oldest first.
    ///
    /// Empty for schemas built directly with [`Schema::new`].
    pub fn lineage(&self) -> &[DerivationRecord] {
        &self.lineage
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub(crate) fn check_unique(schema: &str, fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(SchemaError::DuplicateField {
                schema: schema.to_string(),
                field: field.name().to_string(),
            });
        }
    }
    Ok(())
}
