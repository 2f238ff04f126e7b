use std::env;
use std::fs;
use std::path::PathBuf;

use contract_spec::{AnswerSet, QuestionCatalog, default_catalog};
use serde_json::Value;
use tracing::{debug, info};

use crate::CliResult;

pub const CATALOG_ENV: &str = "CONTRACT_QA_CATALOG";
pub const LOG_ENV: &str = "CONTRACT_QA_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings resolved from flags first, then the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
}

impl CliConfig {
    pub fn resolve(catalog: Option<PathBuf>, log_level: Option<String>) -> Self {
        let catalog_path = catalog.or_else(|| {
            env::var_os(CATALOG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        });
        let log_level = log_level
            .or_else(|| env::var(LOG_ENV).ok().filter(|value| !value.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Self {
            catalog_path,
            log_level,
        }
    }

    /// Loads the configured catalog, or the bundled purchase contract.
    pub fn load_catalog(&self) -> CliResult<QuestionCatalog> {
        let catalog = match &self.catalog_path {
            Some(path) => {
                debug!(path = %path.display(), "loading catalog");
                let contents = fs::read_to_string(path)
                    .map_err(|err| format!("cannot read catalog {}: {}", path.display(), err))?;
                QuestionCatalog::from_json(&contents)?
            }
            None => default_catalog()?,
        };
        info!(
            catalog = catalog.id(),
            version = catalog.version(),
            "catalog ready"
        );
        Ok(catalog)
    }
}

/// Reads answers from either a bare `{fieldId: value}` object or a saved
/// answer set document.
pub fn load_answers(path: Option<&PathBuf>, catalog: &QuestionCatalog) -> CliResult<AnswerSet> {
    let empty = AnswerSet::new(catalog.id(), catalog.version());
    let Some(path) = path else {
        return Ok(empty);
    };
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    parse_answers(value, empty)
}

fn parse_answers(value: Value, empty: AnswerSet) -> CliResult<AnswerSet> {
    let Value::Object(map) = value else {
        return Err("answers file must contain a JSON object".into());
    };
    if map.contains_key("catalogId") && map.get("answers").is_some_and(Value::is_object) {
        return Ok(serde_json::from_value(Value::Object(map))?);
    }
    Ok(empty.with_answers(map))
}
