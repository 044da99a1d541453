//! Integration tests for catalog documents.

use std::fs;

use dto_schema::{
    load_catalog, load_catalog_auto, load_catalog_str, to_json_schema, validate, LoadError,
    SchemaError,
};
use serde_json::json;
use tempfile::TempDir;

const ACCOUNTS: &str = r#"{
    "schemas": [
        {
            "id": "Register",
            "fields": [
                { "name": "username", "type": "string", "required": true,
                  "rules": [{ "rule": "pattern", "pattern": "^[^@]+$",
                              "message": "should not be an email address" }] },
                { "name": "password", "required": true, "rules": [{ "rule": "not_empty" }] },
                { "name": "email", "required": true, "rules": [{ "rule": "is_email" }],
                  "description": "account email", "example": "test@test.com" },
                { "name": "redirectTo", "type": "string", "rules": [{ "rule": "is_string" }] }
            ]
        },
        {
            "id": "Create",
            "derive": {
                "from": "Register",
                "steps": [
                    { "omit": ["redirectTo"] },
                    "partial",
                    { "extend": [
                        { "name": "email", "required": true, "rules": [{ "rule": "is_email" }] },
                        { "name": "role", "required": true,
                          "rules": [{ "rule": "not_empty" }, { "rule": "is_string" }] },
                        { "name": "active", "type": "boolean", "rules": [{ "rule": "is_boolean" }] }
                    ] }
                ]
            }
        },
        {
            "id": "Login",
            "derive": { "from": "Register", "steps": [{ "pick": ["username", "password"] }] }
        }
    ]
}"#;

mod loading {
    use super::*;

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(&path, ACCOUNTS).unwrap();

        let catalog = load_catalog(&path).unwrap();
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(ids, vec!["Register", "Create", "Login"]);
    }

    #[test]
    fn derived_schema_validates() {
        let catalog = load_catalog_str(ACCOUNTS).unwrap();
        let create = catalog.get("Create").unwrap();

        let raw = json!({ "email": "a@b.com", "role": "admin", "redirectTo": "/x" });
        let result = validate(create, raw.as_object().unwrap());
        let value = result.value().expect("should be valid");
        assert_eq!(value.len(), 2);
        assert!(value.get("redirectTo").is_none());

        let raw = json!({ "email": "a@b.com" });
        let result = validate(create, raw.as_object().unwrap());
        assert_eq!(result.errors()[0].field, "role");
    }

    #[test]
    fn picked_schema_keeps_base_rules() {
        let catalog = load_catalog_str(ACCOUNTS).unwrap();
        let login = catalog.get("Login").unwrap();

        let raw = json!({ "username": "a@b", "password": "x", "email": "a@b.com" });
        let result = validate(login, raw.as_object().unwrap());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].message, "should not be an email address");
    }

    #[test]
    fn metadata_survives_loading() {
        let catalog = load_catalog_str(ACCOUNTS).unwrap();
        let exported = to_json_schema(catalog.get("Register").unwrap());
        assert_eq!(
            exported["properties"]["email"]["examples"],
            json!(["test@test.com"])
        );
    }
}

mod failures {
    use super::*;

    #[test]
    fn missing_file() {
        let result = load_catalog_auto("/no/such/catalog.json");
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn bad_pattern_is_structural() {
        let result = load_catalog_str(
            r#"{"schemas":[{"id":"A","fields":[
                {"name":"x","rules":[{"rule":"pattern","pattern":"(oops"}]}
            ]}]}"#,
        );
        match result {
            Err(LoadError::Schema(SchemaError::InvalidDefinition { message })) => {
                assert!(message.contains("(oops"), "{}", message);
            }
            other => panic!("expected invalid definition, got {:?}", other),
        }
    }

    #[test]
    fn unknown_step_rejected_by_meta_schema() {
        let result = load_catalog_str(
            r#"{"schemas":[
                {"id":"A","fields":[{"name":"x"}]},
                {"id":"B","derive":{"from":"A","steps":["required"]}}
            ]}"#,
        );
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/schemas/1/derive/steps/0"), "{}", err);
    }

    #[test]
    fn missing_schemas_key() {
        let result = load_catalog_str(r#"{"schema": []}"#);
        assert!(matches!(
            result,
            Err(LoadError::Schema(SchemaError::InvalidDefinition { .. }))
        ));
    }
}

#[cfg(feature = "remote")]
mod remote {
    use super::*;
    use dto_schema::load_catalog_url;

    #[test]
    fn load_from_url() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/catalogs/accounts.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ACCOUNTS)
            .create();

        let url = format!("{}/catalogs/accounts.json", server.url());
        let catalog = load_catalog_auto(&url).unwrap();
        assert!(catalog.get("Create").is_some());
        mock.assert();
    }

    #[test]
    fn http_error_is_network_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/missing.json")
            .with_status(404)
            .create();

        let url = format!("{}/missing.json", server.url());
        let result = load_catalog_url(&url);
        match result {
            Err(err @ LoadError::NetworkError { .. }) => assert_eq!(err.exit_code(), 3),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
