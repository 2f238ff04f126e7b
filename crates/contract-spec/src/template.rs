use handlebars::{Handlebars, no_escape};
use serde_json::{Map, Value};
use tracing::warn;

use crate::answers::AnswerSource;
use crate::catalog::QuestionCatalog;
use crate::error::TemplateError;
use crate::spec::question::QuestionDescriptor;

/// Renders prompt text that interpolates earlier answers, e.g.
/// `"Is {{buyerName}} obtaining a loan?"`.
///
/// The template context holds every known field that has an answer, so
/// block helpers such as `{{#if hasCoBuyer}}` see the same values as plain
/// placeholders.
pub struct PromptRenderer {
    registry: Handlebars<'static>,
    fields: Vec<String>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Renderer without known fields; prompts render with an empty context.
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_escape_fn(no_escape);
        Self {
            registry,
            fields: Vec::new(),
        }
    }

    /// Renderer whose prompt context covers every field declared in `catalog`.
    pub fn for_catalog(catalog: &QuestionCatalog) -> Self {
        Self::new().with_fields(
            catalog
                .sections()
                .iter()
                .flat_map(|section| section.questions.iter())
                .map(|question| question.field_id.as_str()),
        )
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
        self
    }

    pub fn render(
        &self,
        template: &str,
        answers: &Map<String, Value>,
    ) -> Result<String, TemplateError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }
        Ok(self.registry.render_template(template, answers)?)
    }

    /// Renders the question prompt, falling back to the raw text on failure.
    pub fn prompt_for<A: AnswerSource + ?Sized>(
        &self,
        question: &QuestionDescriptor,
        answers: &A,
    ) -> Option<String> {
        let template = question.prompt.as_deref()?;
        let context = self.context(answers);
        match self.render(template, &context) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(field_id = %question.field_id, error = %err, "prompt template failed");
                Some(template.to_string())
            }
        }
    }

    fn context<A: AnswerSource + ?Sized>(&self, answers: &A) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|field| {
                answers
                    .get(field)
                    .map(|value| (field.clone(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::question::AnswerType;
    use serde_json::json;

    #[test]
    fn interpolates_prior_answers() {
        let renderer = PromptRenderer::new().with_fields(["buyerName"]);
        let question = QuestionDescriptor::new("buyerPhone", AnswerType::Phone)
            .with_prompt("What is {{buyerName}}'s phone number?");
        let prompt = renderer.prompt_for(&question, &json!({ "buyerName": "Jordan & Sam" }));
        assert_eq!(
            prompt.as_deref(),
            Some("What is Jordan & Sam's phone number?")
        );
    }

    #[test]
    fn block_helpers_see_known_fields() {
        let renderer =
            PromptRenderer::new().with_fields(["buyerName", "hasCoBuyer", "coBuyerName"]);
        let question = QuestionDescriptor::new("buyerPhone", AnswerType::Phone)
            .with_prompt("Phone for {{buyerName}}{{#if hasCoBuyer}} and {{coBuyerName}}{{/if}}?");

        let both = json!({ "buyerName": "Alex", "hasCoBuyer": true, "coBuyerName": "Sam" });
        assert_eq!(
            renderer.prompt_for(&question, &both).as_deref(),
            Some("Phone for Alex and Sam?")
        );

        let single = json!({ "buyerName": "Alex", "hasCoBuyer": false, "coBuyerName": "Sam" });
        assert_eq!(
            renderer.prompt_for(&question, &single).as_deref(),
            Some("Phone for Alex?")
        );
    }

    #[test]
    fn missing_answers_render_empty() {
        let renderer = PromptRenderer::new();
        let text = renderer
            .render("Seller: {{sellerName}}.", &Map::new())
            .expect("render");
        assert_eq!(text, "Seller: .");
    }

    #[test]
    fn broken_template_falls_back_to_raw_prompt() {
        let renderer = PromptRenderer::new();
        let question = QuestionDescriptor::new("closingDate", AnswerType::Date)
            .with_prompt("Closing on {{#if}}?");
        let prompt = renderer.prompt_for(&question, &json!({}));
        assert_eq!(prompt.as_deref(), Some("Closing on {{#if}}?"));
    }
}
