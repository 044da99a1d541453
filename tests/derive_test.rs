//! Integration tests for schema derivation.

use dto_schema::{
    extend, omit, partial, pick, FieldDescriptor, Operation, Rule, Schema, SchemaError,
};

fn base() -> Schema {
    Schema::new(
        "Base",
        [
            FieldDescriptor::new("username")
                .required(true)
                .rules([Rule::not_empty(), Rule::string()]),
            FieldDescriptor::new("password")
                .required(true)
                .rule(Rule::not_empty()),
            FieldDescriptor::new("email").required(true).rule(Rule::email()),
            FieldDescriptor::new("locale").rule(Rule::string()),
            FieldDescriptor::new("redirectTo").rule(Rule::string()),
        ],
    )
    .unwrap()
}

mod laws {
    use super::*;

    #[test]
    fn pick_is_idempotent() {
        let names = ["email", "username"];
        let once = pick(&base(), names).unwrap();
        let twice = pick(&once, names).unwrap();
        assert_eq!(twice.fields(), once.fields());
    }

    #[test]
    fn partial_is_idempotent() {
        let once = partial(&base());
        let twice = partial(&once);
        assert_eq!(twice.fields(), once.fields());
    }

    #[test]
    fn pick_and_omit_are_complementary() {
        let picked = pick(&base(), ["username", "email"]).unwrap();
        let omitted = omit(&base(), ["password", "locale", "redirectTo"]).unwrap();
        assert_eq!(picked.fields(), omitted.fields());
    }

    #[test]
    fn extend_replaces_wholesale() {
        let extended = extend(
            &base(),
            [FieldDescriptor::new("username")
                .required(true)
                .rule(Rule::email())],
        )
        .unwrap();
        assert_eq!(
            extended.field("username").unwrap().rule_list(),
            &[Rule::email()]
        );
    }

    #[test]
    fn extend_override_flags_come_from_override() {
        let extended = extend(
            &base(),
            [FieldDescriptor::new("password").exposed(false)],
        )
        .unwrap();
        let password = extended.field("password").unwrap();
        assert!(!password.is_required());
        assert!(!password.is_exposed());
        assert!(password.rule_list().is_empty());
    }

    #[test]
    fn derivation_never_mutates_source() {
        let source = base();
        let snapshot = source.clone();
        let _ = partial(&source);
        let _ = omit(&source, ["email"]).unwrap();
        let _ = extend(&source, [FieldDescriptor::new("email")]).unwrap();
        assert_eq!(source, snapshot);
    }
}

mod composition {
    use super::*;

    #[test]
    fn partial_then_required_override() {
        let derived = base()
            .omit(["redirectTo"])
            .unwrap()
            .partial()
            .extend([
                FieldDescriptor::new("email").required(true).rule(Rule::email()),
                FieldDescriptor::new("role")
                    .required(true)
                    .rules([Rule::not_empty(), Rule::string()]),
            ])
            .unwrap()
            .with_id("Create");

        assert_eq!(derived.id(), "Create");
        let required: Vec<_> = derived
            .fields()
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name())
            .collect();
        assert_eq!(required, vec!["email", "role"]);
        assert!(!derived.contains("redirectTo"));
    }

    #[test]
    fn lineage_records_each_step() {
        let derived = pick(&partial(&base()), ["email"]).unwrap();
        let lineage = derived.lineage();
        assert_eq!(lineage.len(), 2);
        assert_eq!(lineage[0].operation, Operation::Partial);
        assert_eq!(lineage[0].source, "Base");
        assert_eq!(lineage[1].operation, Operation::Pick);
        assert_eq!(lineage[1].source, "partial(Base)");
        assert_eq!(lineage[1].args, vec!["email"]);
    }

    #[test]
    fn lineage_serializes() {
        let derived = omit(&base(), ["locale"]).unwrap();
        let value = serde_json::to_value(&derived).unwrap();
        assert_eq!(
            value["lineage"],
            serde_json::json!([{ "source": "Base", "operation": "omit", "args": ["locale"] }])
        );
    }
}

mod errors {
    use super::*;

    #[test]
    fn omit_typo_is_rejected() {
        let result = omit(&base(), ["redirect_to"]);
        assert_eq!(
            result.unwrap_err(),
            SchemaError::UnknownField {
                schema: "Base".into(),
                field: "redirect_to".into()
            }
        );
    }

    #[test]
    fn pick_typo_is_rejected() {
        assert!(matches!(
            pick(&base(), ["email", "emial"]),
            Err(SchemaError::UnknownField { field, .. }) if field == "emial"
        ));
    }

    #[test]
    fn duplicate_construction_is_rejected() {
        let result = Schema::new(
            "Dup",
            [FieldDescriptor::new("a"), FieldDescriptor::new("a")],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }
}
