use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::answers::{ValidationError, ValidationResult};
use crate::catalog::QuestionCatalog;
use crate::error::CatalogError;
use crate::spec::catalog::SectionSpec;
use crate::spec::question::{AnswerType, QuestionDescriptor};
use crate::visibility::is_eligible;

/// US phone number: ten digits, optionally led by a country code `1`, with
/// `()-. +` separators anywhere.
pub const PHONE_PATTERN: &str = r"^[()\-. +]*(?:1[()\-. +]*)?(?:[0-9][()\-. +]*){10}$";
const DATE_PATTERN: &str = r"^(\d{4})-(\d{2})-(\d{2})$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_PATTERN).expect("date pattern compiles"));

/// Checks every section's answers against the catalog.
pub fn validate(catalog: &QuestionCatalog, answers: &Map<String, Value>) -> ValidationResult {
    validate_sections(catalog, catalog.sections(), answers)
}

/// Checks only the answers belonging to `section_id`.
pub fn validate_section(
    catalog: &QuestionCatalog,
    section_id: &str,
    answers: &Map<String, Value>,
) -> Result<ValidationResult, CatalogError> {
    let section = catalog.section(section_id)?;
    Ok(validate_sections(
        catalog,
        std::slice::from_ref(section),
        answers,
    ))
}

fn validate_sections(
    catalog: &QuestionCatalog,
    sections: &[SectionSpec],
    answers: &Map<String, Value>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();
    let mut hidden = BTreeSet::new();
    let mut shown = BTreeSet::new();

    for question in sections.iter().flat_map(|section| section.questions.iter()) {
        if !question.is_answerable() {
            continue;
        }
        if !is_eligible(question, answers) {
            hidden.insert(question.field_id.as_str());
            continue;
        }
        shown.insert(question.field_id.as_str());

        match answers.get(&question.field_id) {
            None | Some(Value::Null) => {
                if question.is_required() {
                    missing_required.push(question.field_id.clone());
                }
            }
            Some(value) => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
        }
    }

    let stale_fields = hidden
        .difference(&shown)
        .filter(|field| answers.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    let unknown_fields: Vec<String> = answers
        .keys()
        .filter(|key| catalog.find_field(key).is_none())
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
        stale_fields,
    }
}

/// Checks a single answer against the question's answer type.
pub fn validate_value(question: &QuestionDescriptor, value: &Value) -> Option<ValidationError> {
    let kind = question.answer_type?;
    let problem = match kind {
        AnswerType::Boolean | AnswerType::ReferralLink => {
            (!value.is_boolean()).then_some(("expected true or false", "type_mismatch"))
        }
        AnswerType::Text => (!value.is_string()).then_some(("expected text", "type_mismatch")),
        AnswerType::Number => {
            (!value.is_number()).then_some(("expected a number", "type_mismatch"))
        }
        AnswerType::Currency => match value {
            Value::Number(number) if is_currency(number) => None,
            Value::Number(_) => Some((
                "currency must be non-negative with at most two decimals",
                "invalid_currency",
            )),
            _ => Some(("expected a currency amount", "type_mismatch")),
        },
        AnswerType::Phone => match value.as_str() {
            Some(text) if is_phone(text) => None,
            Some(_) => Some(("expected a 10 digit phone number", "invalid_phone")),
            None => Some(("expected a phone number", "type_mismatch")),
        },
        AnswerType::Date => match value.as_str() {
            Some(text) if is_date(text) => None,
            Some(_) => Some(("expected a date formatted YYYY-MM-DD", "invalid_date")),
            None => Some(("expected a date", "type_mismatch")),
        },
        AnswerType::SingleSelect => match value.as_str() {
            Some(text) if question.option_values().any(|option| option == text) => None,
            Some(_) => Some(("value is not one of the options", "invalid_option")),
            None => Some(("expected one of the options", "type_mismatch")),
        },
    };

    problem.map(|(message, code)| ValidationError {
        section_id: Some(question.section_id.clone()),
        field_id: Some(question.field_id.clone()),
        message: message.into(),
        code: Some(code.into()),
    })
}

fn is_currency(number: &Number) -> bool {
    if number.as_f64().map(|amount| amount < 0.0).unwrap_or(true) {
        return false;
    }
    let text = number.to_string();
    if text.contains(['e', 'E']) {
        return false;
    }
    match text.split_once('.') {
        Some((_, cents)) => cents.len() <= 2,
        None => true,
    }
}

/// Accepts common US formats such as `(555) 123-4567` or `+1 555.123.4567`.
pub fn is_phone(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

/// Calendar-checked ISO date, e.g. `2024-02-29`.
pub fn is_date(text: &str) -> bool {
    let Some(captures) = DATE_RE.captures(text) else {
        return false;
    };
    let part = |index: usize| captures[index].parse::<u32>().unwrap_or(0);
    let (year, month, day) = (part(1), part(2), part(3));
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}
