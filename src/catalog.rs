//! Catalogs: named schema sets built from declarative documents.
//!
//! A catalog document lists base schemas (with `fields`) and derived schemas
//! (with `derive`). Derived entries name a source declared earlier in the
//! same document and a sequence of derivation steps:
//!
//! ```json
//! {
//!   "schemas": [
//!     { "id": "Register", "fields": [ { "name": "username", "required": true } ] },
//!     { "id": "Create", "derive": { "from": "Register", "steps": [
//!         "partial",
//!         { "extend": [ { "name": "role", "required": true } ] }
//!     ] } }
//!   ]
//! }
//! ```
//!
//! Documents are checked against an embedded meta-schema before parsing so
//! structural mistakes are reported with their JSON Pointer location.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::derive::{extend, omit, partial, pick};
use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::schema::Schema;

/// An ordered collection of schemas with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: Vec<Schema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from schemas.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchema` if two schemas share an id.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Result<Self, SchemaError> {
        let mut catalog = Self::new();
        for schema in schemas {
            catalog.insert(schema)?;
        }
        Ok(catalog)
    }

    /// Add a schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchema` if the id is already present.
    pub fn insert(&mut self, schema: Schema) -> Result<(), SchemaError> {
        if self.get(schema.id()).is_some() {
            return Err(SchemaError::DuplicateSchema {
                id: schema.id().to_string(),
            });
        }
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id() == id)
    }

    /// Look up a schema, failing with `SchemaError::UnknownSchema`.
    pub fn require(&self, id: &str) -> Result<&Schema, SchemaError> {
        self.get(id).ok_or_else(|| SchemaError::UnknownSchema { id: id.to_string() })
    }

    /// Schema ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(Schema::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Build a catalog from a parsed catalog document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDefinition` if the document does not
    /// match the catalog format, or any structural error raised while
    /// building or deriving its schemas.
    pub fn from_document(document: &Value) -> Result<Self, SchemaError> {
        check_document(document)?;

        let parsed: CatalogDocument = serde_json::from_value(document.clone()).map_err(|e| {
            SchemaError::InvalidDefinition {
                message: e.to_string(),
            }
        })?;

        let mut catalog = Self::new();
        for entry in parsed.schemas {
            let schema = build_entry(&catalog, entry)?;
            catalog.insert(schema)?;
        }

        debug!(schemas = catalog.len(), "catalog built");
        Ok(catalog)
    }
}

// --- Document format ---

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    schemas: Vec<SchemaEntry>,
}

#[derive(Debug, Deserialize)]
struct SchemaEntry {
    id: String,
    #[serde(default)]
    fields: Option<Vec<FieldDescriptor>>,
    #[serde(default)]
    derive: Option<DeriveSpec>,
}

#[derive(Debug, Deserialize)]
struct DeriveSpec {
    from: String,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Step {
    Pick(Vec<String>),
    Omit(Vec<String>),
    Partial,
    Extend(Vec<FieldDescriptor>),
}

fn build_entry(catalog: &Catalog, entry: SchemaEntry) -> Result<Schema, SchemaError> {
    match (entry.fields, entry.derive) {
        (Some(fields), None) => Schema::new(entry.id, fields),
        (None, Some(spec)) => {
            let mut schema = catalog.require(&spec.from)?.clone();
            for step in spec.steps {
                schema = apply_step(&schema, step)?;
            }
            Ok(schema.with_id(entry.id))
        }
        _ => Err(SchemaError::InvalidDefinition {
            message: format!(
                "schema '{}' must declare exactly one of 'fields' or 'derive'",
                entry.id
            ),
        }),
    }
}

fn apply_step(schema: &Schema, step: Step) -> Result<Schema, SchemaError> {
    match step {
        Step::Pick(names) => pick(schema, &names),
        Step::Omit(names) => omit(schema, &names),
        Step::Partial => Ok(partial(schema)),
        Step::Extend(fields) => extend(schema, fields),
    }
}

fn check_document(document: &Value) -> Result<(), SchemaError> {
    let meta = catalog_meta_schema();
    let validator =
        jsonschema::validator_for(&meta).map_err(|e| SchemaError::InvalidDefinition {
            message: format!("catalog meta-schema: {}", e),
        })?;

    let messages: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("{}: {}", display_path(&e.instance_path.to_string()), e))
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::InvalidDefinition {
            message: messages.join("; "),
        })
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// JSON Schema describing the catalog document format.
pub fn catalog_meta_schema() -> Value {
    let names = json!({ "type": "array", "items": { "type": "string" } });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["schemas"],
        "properties": {
            "schemas": { "type": "array", "items": { "$ref": "#/$defs/entry" } }
        },
        "$defs": {
            "entry": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "string", "minLength": 1 },
                    "fields": { "type": "array", "items": { "$ref": "#/$defs/field" } },
                    "derive": { "$ref": "#/$defs/derive" }
                },
                "oneOf": [
                    { "required": ["fields"] },
                    { "required": ["derive"] }
                ]
            },
            "field": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string", "minLength": 1 },
                    "type": { "enum": ["any", "string", "boolean", "number", "array"] },
                    "required": { "type": "boolean" },
                    "exposed": { "type": "boolean" },
                    "description": { "type": "string" },
                    "rules": { "type": "array", "items": { "$ref": "#/$defs/rule" } }
                }
            },
            "rule": {
                "type": "object",
                "required": ["rule"],
                "properties": {
                    "rule": {
                        "enum": [
                            "not_empty", "is_email", "is_string", "is_boolean",
                            "is_array", "pattern", "is_enum"
                        ]
                    },
                    "pattern": { "type": "string" },
                    "values": { "type": "array" },
                    "message": { "type": "string" }
                }
            },
            "derive": {
                "type": "object",
                "required": ["from", "steps"],
                "properties": {
                    "from": { "type": "string" },
                    "steps": { "type": "array", "items": { "$ref": "#/$defs/step" } }
                }
            },
            "step": {
                "oneOf": [
                    { "const": "partial" },
                    {
                        "type": "object",
                        "required": ["pick"],
                        "additionalProperties": false,
                        "properties": { "pick": names.clone() }
                    },
                    {
                        "type": "object",
                        "required": ["omit"],
                        "additionalProperties": false,
                        "properties": { "omit": names }
                    },
                    {
                        "type": "object",
                        "required": ["extend"],
                        "additionalProperties": false,
                        "properties": {
                            "extend": { "type": "array", "items": { "$ref": "#/$defs/field" } }
                        }
                    }
                ]
            }
        }
    })
}
