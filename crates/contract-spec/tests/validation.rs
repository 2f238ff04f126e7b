use regex::Regex;
use serde_json::{Map, Value, json};

use contract_spec::validate::is_phone;
use contract_spec::{
    QuestionCatalog, answers_schema, default_catalog, resolve_visibility, validate,
    validate_section,
};

fn answers(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn finance_catalog() -> QuestionCatalog {
    let catalog = default_catalog().expect("catalog");
    let finance = catalog.section("finance").expect("finance").clone();
    QuestionCatalog::from_config(contract_spec::CatalogConfig {
        id: "finance-only".into(),
        title: "Finance".into(),
        version: "1.0.0".into(),
        description: None,
        sections: vec![finance],
    })
    .expect("finance catalog")
}

#[test]
fn validation_reports_missing_visible_questions_only() {
    let catalog = finance_catalog();
    let result = validate(&catalog, &answers(json!({ "financingType": "CASH" })));
    assert!(!result.valid);
    assert_eq!(result.missing_required, vec!["proofOfFundsProvided"]);

    let complete = validate(
        &catalog,
        &answers(json!({ "financingType": "CASH", "proofOfFundsProvided": true })),
    );
    assert!(complete.valid, "{complete:?}");
}

#[test]
fn referral_links_and_optional_questions_are_never_required() {
    let catalog = finance_catalog();
    let result = validate(
        &catalog,
        &answers(json!({
            "financingType": "BYTHIRDPARTY",
            "loanType": "VA",
            "loanAmount": 280000,
            "loanTermYears": 30,
            "vaFundingFeePaidBySeller": false,
            "hasLender": false
        })),
    );
    assert!(result.valid, "{result:?}");
    assert!(!result.missing_required.contains(&"wantsLenderReferral".to_string()));
}

#[test]
fn type_mismatches_are_reported_with_codes() {
    let catalog = finance_catalog();
    let result = validate(
        &catalog,
        &answers(json!({
            "financingType": "BYTHIRDPARTY",
            "loanType": "JUMBO",
            "loanAmount": "lots",
            "loanTermYears": 30,
            "hasLender": "yes"
        })),
    );
    assert!(!result.valid);
    let codes: Vec<_> = result
        .errors
        .iter()
        .map(|error| (error.field_id.as_deref().unwrap_or(""), error.code.as_deref().unwrap_or("")))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("loanType", "invalid_option"),
            ("loanAmount", "type_mismatch"),
            ("hasLender", "type_mismatch"),
        ]
    );
}

#[test]
fn hidden_answers_are_stale_but_do_not_invalidate() {
    let catalog = finance_catalog();
    let result = validate(
        &catalog,
        &answers(json!({
            "financingType": "CASH",
            "proofOfFundsProvided": true,
            "loanType": "FHA",
            "interestRate": 6.5
        })),
    );
    assert!(result.valid, "{result:?}");
    assert_eq!(result.stale_fields, vec!["interestRate", "loanType"]);
}

#[test]
fn unknown_answer_fields_invalidate() {
    let catalog = finance_catalog();
    let result = validate(
        &catalog,
        &answers(json!({
            "financingType": "CASH",
            "proofOfFundsProvided": true,
            "escrowAgent": "Jamie"
        })),
    );
    assert!(!result.valid);
    assert_eq!(result.unknown_fields, vec!["escrowAgent"]);
}

#[test]
fn section_validation_ignores_other_sections() {
    let catalog = default_catalog().expect("catalog");
    let result = validate_section(
        &catalog,
        "homeownersAssociation",
        &answers(json!({ "hasHomeownersAssociation": false })),
    )
    .expect("section");
    assert!(result.valid, "{result:?}");

    let full = validate(&catalog, &answers(json!({ "hasHomeownersAssociation": false })));
    assert!(full.missing_required.contains(&"buyerName".to_string()));

    assert!(validate_section(&catalog, "escrow", &Map::new()).is_err());
}

#[test]
fn phone_and_date_answers_are_checked() {
    let catalog = default_catalog().expect("catalog");
    let result = validate_section(
        &catalog,
        "buyers",
        &answers(json!({
            "buyerName": "Alex Rivera",
            "buyerPhone": "555-0100",
            "buyerEmail": "alex@example.com",
            "hasCoBuyer": false
        })),
    )
    .expect("buyers");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code.as_deref(), Some("invalid_phone"));

    let result = validate_section(
        &catalog,
        "closing",
        &answers(json!({ "closingDate": "2025-02-30", "proratedTaxes": true })),
    )
    .expect("closing");
    assert_eq!(result.errors[0].code.as_deref(), Some("invalid_date"));
}

#[test]
fn answers_schema_lists_visible_properties() {
    let catalog = default_catalog().expect("catalog");
    let current = json!({ "hasHomeownersAssociation": true });
    let visibility =
        resolve_visibility(&catalog, "homeownersAssociation", &current).expect("visibility");
    let schema = answers_schema(&catalog, "homeownersAssociation", &visibility).expect("schema");

    let properties = schema["properties"].as_object().expect("properties");
    assert!(properties.contains_key("associationName"));
    assert_eq!(
        schema["properties"]["associationDuesFrequency"]["enum"],
        json!(["MONTHLY", "QUARTERLY", "ANNUALLY"])
    );
    let required = schema["required"].as_array().expect("required");
    assert!(required.iter().any(|value| value.as_str() == Some("associationDues")));
    assert!(!required.iter().any(|value| value.as_str() == Some("subdivisionInfoDays")));

    let hidden = resolve_visibility(&catalog, "homeownersAssociation", &json!({}))
        .expect("visibility");
    let schema = answers_schema(&catalog, "homeownersAssociation", &hidden).expect("schema");
    let properties = schema["properties"].as_object().expect("properties");
    assert_eq!(properties.len(), 1);
}

#[test]
fn answers_schema_phone_pattern_agrees_with_validation() {
    let catalog = default_catalog().expect("catalog");
    let visibility = resolve_visibility(&catalog, "buyers", &json!({})).expect("visibility");
    let schema = answers_schema(&catalog, "buyers", &visibility).expect("schema");
    let pattern = schema["properties"]["buyerPhone"]["pattern"]
        .as_str()
        .expect("pattern");
    let regex = Regex::new(pattern).expect("pattern compiles");

    for candidate in ["(555) 123-4567", "+1 555.123.4567", "555-1234", "2-555-123-4567"] {
        assert_eq!(regex.is_match(candidate), is_phone(candidate), "{candidate}");
    }
}
