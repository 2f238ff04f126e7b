use std::collections::{BTreeMap, BTreeSet, HashMap};

use schemars::Schema;
use tracing::{debug, warn};

use crate::error::{CatalogError, LoadError};
use crate::navigator::SectionNavigator;
use crate::spec::catalog::{CatalogConfig, SectionSpec};
use crate::spec::question::{AnswerType, QuestionDescriptor};

/// Purchase-contract catalog shipped with the crate.
pub const DEFAULT_CATALOG_JSON: &str = include_str!("../catalogs/purchase_contract.json");

/// Loads the bundled purchase-contract catalog.
pub fn default_catalog() -> Result<QuestionCatalog, LoadError> {
    QuestionCatalog::from_json(DEFAULT_CATALOG_JSON)
}

/// Validated, immutable set of sections and their question descriptors.
///
/// Sections keep their configured order; a lookup table from section id to
/// position is built once at load.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    id: String,
    title: String,
    version: String,
    description: Option<String>,
    sections: Vec<SectionSpec>,
    index: HashMap<String, usize>,
}

impl QuestionCatalog {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: CatalogConfig = serde_json::from_str(json).map_err(LoadError::Parse)?;
        Self::from_config(config)
    }

    pub fn from_config(config: CatalogConfig) -> Result<Self, LoadError> {
        let CatalogConfig {
            id,
            title,
            version,
            description,
            mut sections,
        } = config;

        if sections.is_empty() {
            return Err(LoadError::EmptyCatalog(id));
        }

        let mut index = HashMap::with_capacity(sections.len());
        for (position, section) in sections.iter_mut().enumerate() {
            if index.insert(section.id.clone(), position).is_some() {
                return Err(LoadError::DuplicateSection(section.id.clone()));
            }
            assign_section(section)?;
        }

        validate_questions(&sections)?;
        detect_cycles(&sections)?;

        let catalog = Self {
            id,
            title,
            version,
            description,
            sections,
            index,
        };
        debug!(
            catalog = %catalog.id,
            sections = catalog.section_count(),
            questions = catalog.question_count(),
            "question catalog loaded"
        );
        Ok(catalog)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Questions of `section_id` in declaration order.
    pub fn questions_for_section(
        &self,
        section_id: &str,
    ) -> Result<&[QuestionDescriptor], CatalogError> {
        self.section(section_id)
            .map(|section| section.questions.as_slice())
    }

    pub fn section(&self, section_id: &str) -> Result<&SectionSpec, CatalogError> {
        self.index
            .get(section_id)
            .map(|position| &self.sections[*position])
            .ok_or_else(|| CatalogError::UnknownSection {
                section_id: section_id.to_string(),
            })
    }

    pub fn question(
        &self,
        section_id: &str,
        field_id: &str,
    ) -> Result<Option<&QuestionDescriptor>, CatalogError> {
        Ok(self
            .questions_for_section(section_id)?
            .iter()
            .find(|question| question.field_id == field_id))
    }

    /// First descriptor declaring `field_id`, searching sections in order.
    pub fn find_field(&self, field_id: &str) -> Option<&QuestionDescriptor> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
            .find(|question| question.field_id == field_id)
    }

    pub fn all_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .map(|section| section.id.as_str())
            .collect()
    }

    pub fn all_questions(&self) -> Vec<(&str, &[QuestionDescriptor])> {
        self.sections
            .iter()
            .map(|section| (section.id.as_str(), section.questions.as_slice()))
            .collect()
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn question_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }

    pub fn navigator(&self) -> SectionNavigator {
        SectionNavigator::new(self.all_sections())
    }

    /// JSON Schema describing the catalog configuration format.
    pub fn config_schema() -> Schema {
        schemars::schema_for!(CatalogConfig)
    }
}

fn assign_section(section: &mut SectionSpec) -> Result<(), LoadError> {
    for question in &mut section.questions {
        if question.section_id.is_empty() {
            question.section_id = section.id.clone();
        } else if question.section_id != section.id {
            return Err(LoadError::SectionMismatch {
                section_id: section.id.clone(),
                field_id: question.field_id.clone(),
                declared: question.section_id.clone(),
            });
        }
    }
    Ok(())
}

fn validate_questions(sections: &[SectionSpec]) -> Result<(), LoadError> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    let mut answerable: BTreeSet<&str> = BTreeSet::new();

    for section in sections {
        let mut seen = BTreeSet::new();
        for question in &section.questions {
            if !seen.insert(question.field_id.as_str()) {
                return Err(LoadError::DuplicateField {
                    section_id: section.id.clone(),
                    field_id: question.field_id.clone(),
                });
            }
            if let Some(first) = owners.insert(question.field_id.as_str(), section.id.as_str()) {
                warn!(
                    field_id = %question.field_id,
                    first_section = first,
                    section = %section.id,
                    "field id is declared in several sections; they share one answer"
                );
            }
            validate_question(question)?;
            if question.is_answerable() {
                answerable.insert(question.field_id.as_str());
            }
        }
    }

    for section in sections {
        for question in &section.questions {
            for dependency in question.dependency_fields() {
                if !owners.contains_key(dependency) {
                    return Err(LoadError::UnknownDependency {
                        section_id: section.id.clone(),
                        field_id: question.field_id.clone(),
                        dependency: dependency.to_string(),
                    });
                }
                if !answerable.contains(dependency) {
                    return Err(LoadError::UnanswerableDependency {
                        section_id: section.id.clone(),
                        field_id: question.field_id.clone(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn validate_question(question: &QuestionDescriptor) -> Result<(), LoadError> {
    if question.prompt.is_some() && question.answer_type.is_none() {
        return Err(LoadError::MissingAnswerType {
            section_id: question.section_id.clone(),
            field_id: question.field_id.clone(),
        });
    }

    if question.answer_type == Some(AnswerType::SingleSelect) {
        if question.options.is_empty() {
            return Err(LoadError::MissingOptions {
                section_id: question.section_id.clone(),
                field_id: question.field_id.clone(),
            });
        }
        let mut values = BTreeSet::new();
        for value in question.option_values() {
            if !values.insert(value) {
                return Err(LoadError::DuplicateOption {
                    section_id: question.section_id.clone(),
                    field_id: question.field_id.clone(),
                    value: value.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Rejects catalogs where a field's visibility depends on itself, directly
/// or through other fields. Such questions could never become eligible.
fn detect_cycles(sections: &[SectionSpec]) -> Result<(), LoadError> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for question in sections.iter().flat_map(|section| section.questions.iter()) {
        graph
            .entry(question.field_id.as_str())
            .or_default()
            .extend(question.dependency_fields());
    }

    let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
    let mut stack: Vec<&str> = Vec::new();
    for node in graph.keys() {
        visit(*node, &graph, &mut marks, &mut stack)?;
    }
    Ok(())
}

fn visit<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    marks: &mut BTreeMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Result<(), LoadError> {
    match marks.get(node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack
                .iter()
                .position(|entry| *entry == node)
                .unwrap_or(0);
            let mut path: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            path.push(node.to_string());
            return Err(LoadError::DependencyCycle { path });
        }
        None => {}
    }

    marks.insert(node, Mark::Visiting);
    stack.push(node);
    if let Some(edges) = graph.get(node) {
        for next in edges {
            visit(*next, graph, marks, stack)?;
        }
    }
    stack.pop();
    marks.insert(node, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_from(value: serde_json::Value) -> Result<QuestionCatalog, LoadError> {
        QuestionCatalog::from_config(serde_json::from_value(value).expect("config"))
    }

    #[test]
    fn sections_fill_question_section_ids() {
        let catalog = catalog_from(json!({
            "id": "t", "title": "T", "version": "1",
            "sections": [{ "id": "title", "title": "Title", "questions": [
                { "fieldId": "titleCompany", "prompt": "Title company?", "answerType": "text" }
            ]}]
        }))
        .expect("catalog");
        let questions = catalog.questions_for_section("title").expect("section");
        assert_eq!(questions[0].section_id, "title");
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = catalog_from(json!({
            "id": "t", "title": "T", "version": "1",
            "sections": [{ "id": "s", "title": "S", "questions": [
                { "fieldId": "a", "prompt": "A?", "answerType": "boolean",
                  "dependsOnAll": [{ "fieldId": "a", "value": true }] }
            ]}]
        }))
        .expect_err("cycle");
        match err {
            LoadError::DependencyCycle { path } => assert_eq!(path, vec!["a", "a"]),
            other => panic!("unexpected error {other}"),
        }
    }
}
