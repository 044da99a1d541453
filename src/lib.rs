//! DTO Schema
//!
//! Declarative schema validation and transformation for request/response
//! DTOs.
//!
//! A [`Schema`] is an ordered set of [`FieldDescriptor`]s, each with a
//! required flag, an exposure flag and a list of [`Rule`]s. New schemas are
//! derived from existing ones with [`pick`], [`omit`], [`partial`] and
//! [`extend`]. [`validate`] checks a raw JSON object against a schema and
//! returns either the whitelisted object or every violation found.
//!
//! # Example
//!
//! ```
//! use dto_schema::{validate, FieldDescriptor, Rule, Schema};
//! use serde_json::json;
//!
//! let registration = Schema::new(
//!     "Registration",
//!     [
//!         FieldDescriptor::new("username")
//!             .required(true)
//!             .rule(Rule::pattern("^[^@]+$").unwrap().with_message("should not be an email address")),
//!         FieldDescriptor::new("password").required(true).rule(Rule::not_empty()),
//!         FieldDescriptor::new("email").required(true).rule(Rule::email()),
//!     ],
//! )
//! .unwrap();
//!
//! // Mostly optional, but `role` is mandatory.
//! let creation = registration
//!     .partial()
//!     .extend([FieldDescriptor::new("role").required(true).rule(Rule::string())])
//!     .unwrap();
//!
//! let raw = json!({ "password": "x", "email": "a@b.com", "role": "admin", "extra": 1 });
//! let result = validate(&creation, raw.as_object().unwrap());
//!
//! let value = result.value().unwrap();
//! assert_eq!(value.len(), 3);
//! assert!(value.get("extra").is_none());
//! ```
//!
//! # Validation
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Required field absent | `required` violation |
//! | Optional field absent | Skipped |
//! | Rule fails | First failing rule reported, rest of the field skipped |
//! | Undeclared key | Dropped (reported in strict mode) |
//! | Field valid, not exposed | Validated, not copied to output |

pub mod accounts;
mod catalog;
mod derive;
mod error;
mod export;
mod field;
mod loader;
mod rule;
mod schema;
mod types;
mod validator;

pub use catalog::{catalog_meta_schema, Catalog};
pub use derive::{extend, omit, partial, pick, DerivationRecord, Operation};
pub use error::{LoadError, SchemaError, Violation};
pub use export::to_json_schema;
pub use field::FieldDescriptor;
pub use loader::{is_url, load_catalog, load_catalog_auto, load_catalog_str, load_json};
pub use rule::{is_email, Pattern, Rule, RuleKind};
pub use schema::Schema;
pub use types::{json_type_name, FieldType, ValidateOptions};
pub use validator::{validate, validate_value, validate_with, ValidationResult};

#[cfg(feature = "remote")]
pub use loader::load_catalog_url;
