#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod catalog;
pub mod error;
pub mod navigator;
pub mod progress;
pub mod render;
pub mod spec;
pub mod template;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerSet, AnswerSource, ValidationError, ValidationResult};
pub use answers_schema::generate as answers_schema;
pub use catalog::{DEFAULT_CATALOG_JSON, QuestionCatalog, default_catalog};
pub use error::{CatalogError, LoadError, TemplateError};
pub use navigator::SectionNavigator;
pub use progress::{FlowCursor, FlowPosition, SectionProgress, next_question, section_progress};
pub use render::{
    RenderPayload, RenderQuestion, RenderStatus, build_render_payload, render_json_ui, render_text,
};
pub use spec::{
    AnswerType, CatalogConfig, DependencyClause, QuestionDescriptor, SectionSpec, SelectOption,
    SideEffect,
};
pub use template::PromptRenderer;
pub use validate::{validate, validate_section};
pub use visibility::{
    VisibilityMap, eligible_questions, is_eligible, resolve_visibility, triggered_side_effects,
};
