use serde_json::{Map, Value, json};

use crate::{
    answers::AnswerSource,
    catalog::QuestionCatalog,
    error::CatalogError,
    progress::{SectionProgress, next_question, section_progress},
    spec::question::{AnswerType, SelectOption, SideEffect},
    template::PromptRenderer,
    visibility::{is_eligible, triggered_side_effects},
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// An eligible question still lacks an answer.
    NeedInput,
    /// Every eligible question of the section is answered.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub field_id: String,
    pub prompt: Option<String>,
    pub narrative: Option<String>,
    pub answer_type: Option<AnswerType>,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<Value>,
    pub options: Vec<SelectOption>,
    pub side_effect: Option<SideEffect>,
}

/// Everything the rendering layer needs for one section.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub catalog_id: String,
    pub catalog_title: String,
    pub section_id: String,
    pub section_title: String,
    pub section_description: Option<String>,
    pub section_index: usize,
    pub section_count: usize,
    pub status: RenderStatus,
    pub next_question_id: Option<String>,
    pub progress: SectionProgress,
    pub questions: Vec<RenderQuestion>,
    pub side_effects: Vec<SideEffect>,
}

impl RenderPayload {
    pub fn visible_questions(&self) -> impl Iterator<Item = &RenderQuestion> {
        self.questions.iter().filter(|question| question.visible)
    }

    pub fn question(&self, field_id: &str) -> Option<&RenderQuestion> {
        self.questions
            .iter()
            .find(|question| question.field_id == field_id)
    }
}

/// Build the renderer payload for `section_id` against the current answers.
pub fn build_render_payload<A: AnswerSource + ?Sized>(
    catalog: &QuestionCatalog,
    section_id: &str,
    answers: &A,
) -> Result<RenderPayload, CatalogError> {
    let section = catalog.section(section_id)?;
    let section_index = catalog.navigator().position(section_id).unwrap_or_default();
    let next_question_id = next_question(catalog, section_id, answers)?
        .map(|question| question.field_id.clone());
    let progress = section_progress(catalog, section_id, answers)?;
    let renderer = PromptRenderer::for_catalog(catalog);

    let questions = section
        .questions
        .iter()
        .map(|question| RenderQuestion {
            field_id: question.field_id.clone(),
            prompt: renderer.prompt_for(question, answers),
            narrative: question.narrative.clone(),
            answer_type: question.answer_type,
            required: question.is_required(),
            visible: is_eligible(question, answers),
            current_value: answers.get(&question.field_id).cloned(),
            options: question.options.clone(),
            side_effect: question.side_effect.clone(),
        })
        .collect();

    let side_effects = triggered_side_effects(&section.questions, answers)
        .into_iter()
        .cloned()
        .collect();

    let status = if next_question_id.is_some() {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Complete
    };

    Ok(RenderPayload {
        catalog_id: catalog.id().to_string(),
        catalog_title: catalog.title().to_string(),
        section_id: section.id.clone(),
        section_title: section.title.clone(),
        section_description: section.description.clone(),
        section_index,
        section_count: catalog.section_count(),
        status,
        next_question_id,
        progress,
        questions,
        side_effects,
    })
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("fieldId".into(), Value::String(question.field_id.clone()));
            map.insert(
                "prompt".into(),
                question
                    .prompt
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
            if let Some(narrative) = &question.narrative {
                map.insert("narrative".into(), Value::String(narrative.clone()));
            }
            if let Some(kind) = question.answer_type {
                map.insert("answerType".into(), Value::String(kind.as_str().into()));
            }
            map.insert("required".into(), Value::Bool(question.required));
            map.insert("visible".into(), Value::Bool(question.visible));
            if let Some(current_value) = &question.current_value {
                map.insert("currentValue".into(), current_value.clone());
            }
            if !question.options.is_empty() {
                map.insert("options".into(), json!(question.options));
            }
            if let Some(effect) = &question.side_effect {
                map.insert("sideEffect".into(), json!(effect));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "catalogId": payload.catalog_id,
        "catalogTitle": payload.catalog_title,
        "section": {
            "id": payload.section_id,
            "title": payload.section_title,
            "description": payload.section_description,
            "index": payload.section_index,
            "count": payload.section_count,
        },
        "status": payload.status.as_str(),
        "nextQuestionId": payload.next_question_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
        "sideEffects": payload.side_effects,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Section {}/{}: {} ({})",
        payload.section_index + 1,
        payload.section_count,
        payload.section_title,
        payload.section_id
    ));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    if let Some(description) = &payload.section_description {
        lines.push(description.clone());
    }

    match payload
        .next_question_id
        .as_deref()
        .and_then(|field_id| payload.question(field_id))
    {
        Some(question) => {
            lines.push(format!("Next question: {}", question.field_id));
            if let Some(prompt) = &question.prompt {
                lines.push(format!("  Prompt: {}", prompt));
            }
            if !question.options.is_empty() {
                let labels = question
                    .options
                    .iter()
                    .map(|option| format!("{} ({})", option.label, option.value))
                    .collect::<Vec<_>>();
                lines.push(format!("  Options: {}", labels.join(", ")));
            }
        }
        None => lines.push("All visible questions are answered.".to_string()),
    }

    lines.push("Visible questions:".to_string());
    for question in payload.visible_questions() {
        let Some(prompt) = &question.prompt else {
            if let Some(narrative) = &question.narrative {
                lines.push(format!(" * {}", narrative));
            }
            continue;
        };
        let mut entry = format!(" - {}: {}", question.field_id, prompt);
        if question.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", value_to_display(current_value)));
        }
        lines.push(entry);
    }

    for effect in &payload.side_effects {
        lines.push(format!("Action: {} -> {}", effect.action, effect.target));
    }

    lines.join("\n")
}

pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        other => other.to_string(),
    }
}
