use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read access to collected answers, keyed by field id.
///
/// This is the only input the visibility evaluator consumes beyond the
/// descriptor itself.
pub trait AnswerSource {
    fn get(&self, field_id: &str) -> Option<&Value>;

    /// Whether `field_id` holds a usable answer. A stored `null` counts as
    /// unanswered.
    fn has_answer(&self, field_id: &str) -> bool {
        self.get(field_id).is_some_and(|value| !value.is_null())
    }
}

impl AnswerSource for Map<String, Value> {
    fn get(&self, field_id: &str) -> Option<&Value> {
        Map::get(self, field_id)
    }
}

impl AnswerSource for Value {
    fn get(&self, field_id: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(field_id))
    }
}

impl AnswerSource for BTreeMap<String, Value> {
    fn get(&self, field_id: &str) -> Option<&Value> {
        BTreeMap::get(self, field_id)
    }
}

impl AnswerSource for HashMap<String, Value> {
    fn get(&self, field_id: &str) -> Option<&Value> {
        HashMap::get(self, field_id)
    }
}

impl<T: AnswerSource + ?Sized> AnswerSource for &T {
    fn get(&self, field_id: &str) -> Option<&Value> {
        (**self).get(field_id)
    }
}

/// Answers collected for one in-progress contract session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSet {
    pub catalog_id: String,
    pub catalog_version: String,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

impl AnswerSet {
    pub fn new(catalog_id: impl Into<String>, catalog_version: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            catalog_version: catalog_version.into(),
            answers: Map::new(),
        }
    }

    pub fn with_answers(mut self, answers: Map<String, Value>) -> Self {
        self.answers = answers;
        self
    }

    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.answers.get(field_id)
    }

    /// Stores an answer, returning the previous value if any.
    pub fn insert(&mut self, field_id: impl Into<String>, value: Value) -> Option<Value> {
        self.answers.insert(field_id.into(), value)
    }

    pub fn remove(&mut self, field_id: &str) -> Option<Value> {
        self.answers.remove(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.answers.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

impl AnswerSource for AnswerSet {
    fn get(&self, field_id: &str) -> Option<&Value> {
        self.answers.get(field_id)
    }
}

/// Single problem found while validating answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub section_id: Option<String>,
    pub field_id: Option<String>,
    pub message: String,
    pub code: Option<String>,
}

/// Outcome of validating an answer set against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<String>,
    pub unknown_fields: Vec<String>,
    /// Answers kept for questions that are currently hidden. Informational.
    pub stale_fields: Vec<String>,
}
