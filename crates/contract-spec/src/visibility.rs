use serde_json::Value;
use tracing::trace;

use crate::answers::AnswerSource;
use crate::catalog::QuestionCatalog;
use crate::error::CatalogError;
use crate::spec::question::{DependencyClause, QuestionDescriptor, SideEffect};

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Whether a single clause holds against the current answers.
///
/// An unanswered field matches only an explicit `null` expectation.
pub fn clause_matches<A: AnswerSource + ?Sized>(clause: &DependencyClause, answers: &A) -> bool {
    match answers.get(&clause.field_id) {
        Some(actual) => actual == &clause.value,
        None => clause.value.is_null(),
    }
}

/// Decides whether `question` should currently be presented.
///
/// `depends_on_all` requires every clause to match, `depends_on_any` requires
/// at least one, and both groups must hold when both are configured. Only the
/// direct clauses are evaluated; the visibility of the referenced questions is
/// not consulted.
pub fn is_eligible<A: AnswerSource + ?Sized>(question: &QuestionDescriptor, answers: &A) -> bool {
    if !question
        .depends_on_all
        .iter()
        .all(|clause| clause_matches(clause, answers))
    {
        trace!(field_id = %question.field_id, "hidden: dependsOnAll failed");
        return false;
    }

    if !question.depends_on_any.is_empty()
        && !question
            .depends_on_any
            .iter()
            .any(|clause| clause_matches(clause, answers))
    {
        trace!(field_id = %question.field_id, "hidden: dependsOnAny failed");
        return false;
    }

    true
}

/// The currently askable subset of `questions`, in declaration order.
pub fn eligible_questions<'a, A: AnswerSource + ?Sized>(
    questions: &'a [QuestionDescriptor],
    answers: &A,
) -> Vec<&'a QuestionDescriptor> {
    questions
        .iter()
        .filter(|question| is_eligible(question, answers))
        .collect()
}

/// Eligibility of every question in `section_id`, keyed by field id.
pub fn resolve_visibility<A: AnswerSource + ?Sized>(
    catalog: &QuestionCatalog,
    section_id: &str,
    answers: &A,
) -> Result<VisibilityMap, CatalogError> {
    let questions = catalog.questions_for_section(section_id)?;
    Ok(questions
        .iter()
        .map(|question| (question.field_id.clone(), is_eligible(question, answers)))
        .collect())
}

/// Side effects of eligible questions whose answer is truthy, in order.
///
/// The effects are handed back untouched for the rendering layer to act on.
pub fn triggered_side_effects<'a, A: AnswerSource + ?Sized>(
    questions: &'a [QuestionDescriptor],
    answers: &A,
) -> Vec<&'a SideEffect> {
    questions
        .iter()
        .filter_map(|question| {
            let effect = question.side_effect.as_ref()?;
            let answer = answers.get(&question.field_id)?;
            (is_truthy(answer) && is_eligible(question, answers)).then_some(effect)
        })
        .collect()
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_answer_shape() {
        assert!(is_truthy(&json!(true)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(2.5)));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn null_expectation_matches_unanswered_field() {
        let clause = DependencyClause::new("sellerAgent", Value::Null);
        assert!(clause_matches(&clause, &json!({})));
        assert!(clause_matches(&clause, &json!({ "sellerAgent": null })));
        assert!(!clause_matches(&clause, &json!({ "sellerAgent": "Pat" })));
    }
}
