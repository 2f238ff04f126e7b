use thiserror::Error;

/// Lookup failures raised by the catalog and the section navigator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown section '{section_id}'")]
    UnknownSection { section_id: String },
    #[error("section index {index} is out of range (section count {count})")]
    IndexOutOfRange { index: isize, count: usize },
}

/// Configuration problems found while loading a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("catalog '{0}' defines no sections")]
    EmptyCatalog(String),
    #[error("section '{0}' is defined more than once")]
    DuplicateSection(String),
    #[error("field '{field_id}' is defined more than once in section '{section_id}'")]
    DuplicateField {
        section_id: String,
        field_id: String,
    },
    #[error("question '{field_id}' in '{section_id}' declares section '{declared}'")]
    SectionMismatch {
        section_id: String,
        field_id: String,
        declared: String,
    },
    #[error("question '{section_id}/{field_id}' has a prompt but no answer type")]
    MissingAnswerType {
        section_id: String,
        field_id: String,
    },
    #[error("single select question '{section_id}/{field_id}' has no options")]
    MissingOptions {
        section_id: String,
        field_id: String,
    },
    #[error("single select question '{section_id}/{field_id}' repeats option '{value}'")]
    DuplicateOption {
        section_id: String,
        field_id: String,
        value: String,
    },
    #[error("question '{section_id}/{field_id}' depends on unknown field '{dependency}'")]
    UnknownDependency {
        section_id: String,
        field_id: String,
        dependency: String,
    },
    #[error(
        "question '{section_id}/{field_id}' depends on '{dependency}', which is never asked"
    )]
    UnanswerableDependency {
        section_id: String,
        field_id: String,
        dependency: String,
    },
    #[error("dependency cycle: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },
}

/// Failure while rendering a prompt template.
#[derive(Debug, Error)]
#[error("prompt render failed: {0}")]
pub struct TemplateError(#[source] Box<handlebars::RenderError>);

impl From<handlebars::RenderError> for TemplateError {
    fn from(value: handlebars::RenderError) -> Self {
        Self(Box::new(value))
    }
}
