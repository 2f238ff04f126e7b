use serde_json::{Map, Value, json};

use crate::catalog::QuestionCatalog;
use crate::error::CatalogError;
use crate::spec::question::{AnswerType, QuestionDescriptor};
use crate::validate::PHONE_PATTERN;
use crate::visibility::VisibilityMap;

/// JSON Schema for the answers of one section, limited to visible questions.
pub fn generate(
    catalog: &QuestionCatalog,
    section_id: &str,
    visibility: &VisibilityMap,
) -> Result<Value, CatalogError> {
    let section = catalog.section(section_id)?;
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in &section.questions {
        let visible = visibility
            .get(&question.field_id)
            .copied()
            .unwrap_or(true);
        if !question.is_answerable() || !visible {
            continue;
        }
        properties.insert(question.field_id.clone(), property_schema(question));
        if question.is_required() {
            required.push(Value::String(question.field_id.clone()));
        }
    }

    Ok(json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": format!("{} / {}", catalog.title(), section.title),
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    }))
}

fn property_schema(question: &QuestionDescriptor) -> Value {
    let mut schema = match question.answer_type {
        Some(AnswerType::Boolean) | Some(AnswerType::ReferralLink) => json!({ "type": "boolean" }),
        Some(AnswerType::Number) => json!({ "type": "number" }),
        Some(AnswerType::Currency) => json!({ "type": "number", "minimum": 0, "multipleOf": 0.01 }),
        Some(AnswerType::Phone) => json!({ "type": "string", "pattern": PHONE_PATTERN }),
        Some(AnswerType::Date) => json!({ "type": "string", "format": "date" }),
        Some(AnswerType::SingleSelect) => json!({
            "type": "string",
            "enum": question.option_values().collect::<Vec<_>>(),
        }),
        Some(AnswerType::Text) | None => json!({ "type": "string" }),
    };
    if let (Some(prompt), Some(map)) = (&question.prompt, schema.as_object_mut()) {
        map.insert("description".into(), Value::String(prompt.clone()));
    }
    schema
}
