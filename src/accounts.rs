//! Built-in account DTO schemas.
//!
//! - `AccountRegisterRequest`: self-service registration.
//! - `AccountRegisterResponse`: what the client should do next.
//! - `AccountCreateRequest`: administrative account creation, derived from
//!   the registration request with `redirectTo` omitted, everything made
//!   optional, and the identity fields plus `role` required again.
//!
//! Schemas are built on first use and cached for the life of the process.

use std::sync::OnceLock;

use crate::catalog::Catalog;
use crate::derive::{extend, omit, partial};
use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::rule::Rule;
use crate::schema::Schema;
use crate::types::FieldType;

pub const ACCOUNT_REGISTER_REQUEST: &str = "AccountRegisterRequest";
pub const ACCOUNT_REGISTER_RESPONSE: &str = "AccountRegisterResponse";
pub const ACCOUNT_CREATE_REQUEST: &str = "AccountCreateRequest";

const NOT_AN_EMAIL: &str = "^[^@]+$";

type Cached = OnceLock<Result<Schema, SchemaError>>;

static REGISTER_REQUEST: Cached = OnceLock::new();
static REGISTER_RESPONSE: Cached = OnceLock::new();
static CREATE_REQUEST: Cached = OnceLock::new();

fn cached(
    cell: &'static Cached,
    build: fn() -> Result<Schema, SchemaError>,
) -> Result<&'static Schema, SchemaError> {
    cell.get_or_init(build).as_ref().map_err(Clone::clone)
}

/// Registration request schema.
pub fn register_request() -> Result<&'static Schema, SchemaError> {
    cached(&REGISTER_REQUEST, build_register_request)
}

/// Registration response schema.
pub fn register_response() -> Result<&'static Schema, SchemaError> {
    cached(&REGISTER_RESPONSE, build_register_response)
}

/// Administrative account creation schema.
pub fn create_request() -> Result<&'static Schema, SchemaError> {
    cached(&CREATE_REQUEST, build_create_request)
}

/// All built-in schemas, registration request first.
pub fn builtin_catalog() -> Result<Catalog, SchemaError> {
    Catalog::from_schemas([
        register_request()?.clone(),
        register_response()?.clone(),
        create_request()?.clone(),
    ])
}

fn optional_string(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name)
        .field_type(FieldType::String)
        .rule(Rule::string())
}

fn username(rules: impl IntoIterator<Item = Rule>) -> Result<FieldDescriptor, SchemaError> {
    Ok(FieldDescriptor::new("username")
        .required(true)
        .field_type(FieldType::String)
        .rules(rules)
        .rule(Rule::pattern(NOT_AN_EMAIL)?.with_message("should not be an email address"))
        .description("account name")
        .example("testuser"))
}

fn password() -> FieldDescriptor {
    FieldDescriptor::new("password")
        .required(true)
        .field_type(FieldType::String)
        .rule(Rule::not_empty())
        .description("password of the account")
        .example("asdasda2345345243")
}

fn email() -> FieldDescriptor {
    FieldDescriptor::new("email")
        .required(true)
        .field_type(FieldType::String)
        .rule(Rule::email())
        .description("account email")
        .example("test@test.com")
}

fn build_register_request() -> Result<Schema, SchemaError> {
    Schema::new(
        ACCOUNT_REGISTER_REQUEST,
        [
            username([])?,
            password(),
            email(),
            optional_string("gender"),
            optional_string("first_name").required(true),
            optional_string("last_name").required(true),
            optional_string("organization"),
            optional_string("state"),
            optional_string("country"),
            optional_string("locale"),
            optional_string("timezone"),
            optional_string("birthday").description("yyyy-MM-DD"),
            optional_string("address"),
            optional_string("address_details"),
            optional_string("phone"),
            optional_string("town"),
            optional_string("postcode"),
            optional_string("redirectTo").description(
                "URL the user is redirected to after confirming their e-mail address",
            ),
            FieldDescriptor::new("acceptedPolicyTranslationIDs")
                .required(true)
                .field_type(FieldType::Array)
                .rule(Rule::array())
                .exposed(false),
        ],
    )
}

fn build_register_response() -> Result<Schema, SchemaError> {
    Schema::new(
        ACCOUNT_REGISTER_RESPONSE,
        [FieldDescriptor::new("nextAction")
            .required(true)
            .field_type(FieldType::String)
            .rules([
                Rule::string(),
                Rule::one_of(["email_verification", "login"]),
            ])],
    )
}

fn build_create_request() -> Result<Schema, SchemaError> {
    let base = omit(register_request()?, ["redirectTo"])?;
    let overrides = [
        username([Rule::not_empty(), Rule::string()])?,
        password(),
        email(),
        FieldDescriptor::new("role")
            .required(true)
            .field_type(FieldType::String)
            .rules([Rule::not_empty(), Rule::string()])
            .description("general account role"),
        optional_string("organization"),
        optional_string("state"),
        optional_string("country"),
        optional_string("locale"),
        optional_string("timezone"),
        optional_string("comment"),
        FieldDescriptor::new("active")
            .field_type(FieldType::Boolean)
            .rule(Rule::boolean()),
    ];
    Ok(extend(&partial(&base), overrides)?.with_id(ACCOUNT_CREATE_REQUEST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::Operation;

    #[test]
    fn register_request_shape() {
        let schema = register_request().unwrap();
        assert_eq!(schema.id(), ACCOUNT_REGISTER_REQUEST);
        assert!(schema.field("username").unwrap().is_required());
        assert!(!schema.field("gender").unwrap().is_required());
        assert!(!schema
            .field("acceptedPolicyTranslationIDs")
            .unwrap()
            .is_exposed());
        assert_eq!(
            schema.fields().last().unwrap().name(),
            "acceptedPolicyTranslationIDs"
        );
    }

    #[test]
    fn create_request_derivation() {
        let schema = create_request().unwrap();
        assert_eq!(schema.id(), ACCOUNT_CREATE_REQUEST);
        assert!(!schema.contains("redirectTo"));
        for name in ["username", "password", "email", "role"] {
            assert!(schema.field(name).unwrap().is_required(), "{}", name);
        }
        for name in [
            "first_name",
            "gender",
            "comment",
            "active",
            "acceptedPolicyTranslationIDs",
        ] {
            assert!(!schema.field(name).unwrap().is_required(), "{}", name);
        }
        let ops: Vec<_> = schema.lineage().iter().map(|r| r.operation).collect();
        assert_eq!(ops, vec![Operation::Omit, Operation::Partial, Operation::Extend]);
    }

    #[test]
    fn create_request_username_rules_replaced() {
        let schema = create_request().unwrap();
        let tags: Vec<_> = schema
            .field("username")
            .unwrap()
            .rule_list()
            .iter()
            .map(Rule::tag)
            .collect();
        assert_eq!(tags, vec!["not_empty", "type", "pattern"]);
    }

    #[test]
    fn cached_instances_are_shared() {
        let a = register_request().unwrap();
        let b = register_request().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn builtin_catalog_ids() {
        let catalog = builtin_catalog().unwrap();
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(
            ids,
            vec![
                ACCOUNT_REGISTER_REQUEST,
                ACCOUNT_REGISTER_RESPONSE,
                ACCOUNT_CREATE_REQUEST
            ]
        );
    }
}
