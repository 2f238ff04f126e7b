use std::collections::HashMap;

use crate::error::CatalogError;

/// Ordered section ids with index-based lookup in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNavigator {
    order: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SectionNavigator {
    /// Builds a navigator from section ids in traversal order. Repeated ids
    /// resolve to their first position.
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let order: Vec<String> = sections.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(order.len());
        for (index, id) in order.iter().enumerate() {
            positions.entry(id.clone()).or_insert(index);
        }
        Self { order, positions }
    }

    pub fn section_at(&self, index: usize) -> Result<&str, CatalogError> {
        self.order
            .get(index)
            .map(String::as_str)
            .ok_or(CatalogError::IndexOutOfRange {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                count: self.order.len(),
            })
    }

    /// Position of `section_id`, or `-1` when the id is not configured.
    pub fn index_of(&self, section_id: &str) -> isize {
        self.position(section_id)
            .map(|index| index as isize)
            .unwrap_or(-1)
    }

    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.positions.get(section_id).copied()
    }

    pub fn section_count(&self) -> usize {
        self.order.len()
    }

    pub fn sections(&self) -> &[String] {
        &self.order
    }

    /// Section following `section_id`; `IndexOutOfRange` past the last one.
    pub fn next_section(&self, section_id: &str) -> Result<&str, CatalogError> {
        let index = self.require(section_id)?;
        self.section_at(index + 1)
    }

    /// Section preceding `section_id`; `IndexOutOfRange` before the first one.
    pub fn previous_section(&self, section_id: &str) -> Result<&str, CatalogError> {
        let index = self.require(section_id)?;
        match index.checked_sub(1) {
            Some(previous) => self.section_at(previous),
            None => Err(CatalogError::IndexOutOfRange {
                index: -1,
                count: self.order.len(),
            }),
        }
    }

    fn require(&self, section_id: &str) -> Result<usize, CatalogError> {
        self.position(section_id)
            .ok_or_else(|| CatalogError::UnknownSection {
                section_id: section_id.to_string(),
            })
    }
}
