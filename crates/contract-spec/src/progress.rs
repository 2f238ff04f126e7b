use crate::answers::AnswerSource;
use crate::catalog::QuestionCatalog;
use crate::error::CatalogError;
use crate::navigator::SectionNavigator;
use crate::spec::question::QuestionDescriptor;
use crate::visibility::is_eligible;

/// Where the caller currently is in the linear section sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPosition {
    BeforeFirst,
    OnSection(usize),
    AfterLast,
}

/// Moves through sections one at a time.
///
/// Moving never touches answers; clearing answers of questions that became
/// hidden is left to the caller.
#[derive(Debug, Clone)]
pub struct FlowCursor {
    navigator: SectionNavigator,
    position: FlowPosition,
}

impl FlowCursor {
    pub fn new(navigator: SectionNavigator) -> Self {
        Self {
            navigator,
            position: FlowPosition::BeforeFirst,
        }
    }

    pub fn position(&self) -> FlowPosition {
        self.position
    }

    pub fn navigator(&self) -> &SectionNavigator {
        &self.navigator
    }

    pub fn current_section(&self) -> Option<&str> {
        match self.position {
            FlowPosition::OnSection(index) => self.navigator.section_at(index).ok(),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position == FlowPosition::AfterLast
    }

    /// Steps forward; from the last section this lands on `AfterLast`.
    pub fn advance(&mut self) -> FlowPosition {
        let count = self.navigator.section_count();
        self.position = match self.position {
            FlowPosition::BeforeFirst if count > 0 => FlowPosition::OnSection(0),
            FlowPosition::OnSection(index) if index + 1 < count => {
                FlowPosition::OnSection(index + 1)
            }
            _ => FlowPosition::AfterLast,
        };
        self.position
    }

    /// Steps backward; from the first section this lands on `BeforeFirst`.
    pub fn retreat(&mut self) -> FlowPosition {
        let count = self.navigator.section_count();
        self.position = match self.position {
            FlowPosition::AfterLast if count > 0 => FlowPosition::OnSection(count - 1),
            FlowPosition::OnSection(index) if index > 0 => FlowPosition::OnSection(index - 1),
            _ => FlowPosition::BeforeFirst,
        };
        self.position
    }

    pub fn jump_to(&mut self, section_id: &str) -> Result<FlowPosition, CatalogError> {
        let index = self
            .navigator
            .position(section_id)
            .ok_or_else(|| CatalogError::UnknownSection {
                section_id: section_id.to_string(),
            })?;
        self.position = FlowPosition::OnSection(index);
        Ok(self.position)
    }
}

/// Answered vs. askable counts for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionProgress {
    pub answered: usize,
    pub total: usize,
}

impl SectionProgress {
    pub fn is_complete(&self) -> bool {
        self.answered >= self.total
    }
}

/// First eligible, answerable question of the section that has no answer yet.
pub fn next_question<'a, A: AnswerSource + ?Sized>(
    catalog: &'a QuestionCatalog,
    section_id: &str,
    answers: &A,
) -> Result<Option<&'a QuestionDescriptor>, CatalogError> {
    Ok(catalog
        .questions_for_section(section_id)?
        .iter()
        .filter(|question| question.is_answerable())
        .find(|question| {
            is_eligible(question, answers) && !answers.has_answer(&question.field_id)
        }))
}

pub fn section_progress<A: AnswerSource + ?Sized>(
    catalog: &QuestionCatalog,
    section_id: &str,
    answers: &A,
) -> Result<SectionProgress, CatalogError> {
    let askable = catalog
        .questions_for_section(section_id)?
        .iter()
        .filter(|question| question.is_answerable() && is_eligible(question, answers));
    let mut progress = SectionProgress::default();
    for question in askable {
        progress.total += 1;
        if answers.has_answer(&question.field_id) {
            progress.answered += 1;
        }
    }
    Ok(progress)
}
