pub mod catalog;
pub mod question;

pub use catalog::{CatalogConfig, SectionSpec};
pub use question::{AnswerType, DependencyClause, QuestionDescriptor, SelectOption, SideEffect};
