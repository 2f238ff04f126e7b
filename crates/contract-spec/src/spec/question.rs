use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input kinds a question can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AnswerType {
    Boolean,
    Text,
    Number,
    Currency,
    Phone,
    Date,
    SingleSelect,
    ReferralLink,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Boolean => "boolean",
            AnswerType::Text => "text",
            AnswerType::Number => "number",
            AnswerType::Currency => "currency",
            AnswerType::Phone => "phone",
            AnswerType::Date => "date",
            AnswerType::SingleSelect => "singleSelect",
            AnswerType::ReferralLink => "referralLink",
        }
    }

    /// Referral links are informational and never block completion.
    pub fn is_required_by_default(&self) -> bool {
        !matches!(self, AnswerType::ReferralLink)
    }
}

/// One selectable value of a `singleSelect` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Gate on a prior answer: matches when `answers[field_id] == value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyClause {
    pub field_id: String,
    pub value: Value,
}

impl DependencyClause {
    pub fn new(field_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_id: field_id.into(),
            value: value.into(),
        }
    }
}

/// Opaque instruction for the rendering layer, e.g. `navigateToComponent`.
///
/// The engine only carries these tokens; it never interprets the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SideEffect {
    pub action: String,
    pub target: String,
}

/// Static metadata for one question of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDescriptor {
    /// Filled from the enclosing section when the catalog is loaded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section_id: String,
    pub field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Explanatory text shown before or instead of a prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_type: Option<AnswerType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on_all: Vec<DependencyClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on_any: Vec<DependencyClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effect: Option<SideEffect>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl QuestionDescriptor {
    pub fn new(field_id: impl Into<String>, answer_type: AnswerType) -> Self {
        Self {
            section_id: String::new(),
            field_id: field_id.into(),
            prompt: None,
            narrative: None,
            answer_type: Some(answer_type),
            options: Vec::new(),
            depends_on_all: Vec::new(),
            depends_on_any: Vec::new(),
            side_effect: None,
            optional: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    pub fn depends_on_all(mut self, clause: DependencyClause) -> Self {
        self.depends_on_all.push(clause);
        self
    }

    pub fn depends_on_any(mut self, clause: DependencyClause) -> Self {
        self.depends_on_any.push(clause);
        self
    }

    /// Intro descriptors carry narrative only and never collect an answer.
    pub fn is_answerable(&self) -> bool {
        self.prompt.is_some() && self.answer_type.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.is_answerable()
            && !self.optional
            && self
                .answer_type
                .map(|kind| kind.is_required_by_default())
                .unwrap_or(false)
    }

    pub fn has_dependencies(&self) -> bool {
        !self.depends_on_all.is_empty() || !self.depends_on_any.is_empty()
    }

    /// Every field id this descriptor's visibility reads.
    pub fn dependency_fields(&self) -> impl Iterator<Item = &str> {
        self.depends_on_all
            .iter()
            .chain(self.depends_on_any.iter())
            .map(|clause| clause.field_id.as_str())
    }

    pub fn option_values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.value.as_str())
    }
}
