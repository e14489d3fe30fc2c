use std::path::Path;

use serde::Deserialize;

use crate::errors::{FormulaError, Result};

/// Evaluation and validation knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Register upper- and lower-cased copies of every field name.
    pub case_variants: bool,
    /// Validation also rejects identifiers that are not declared fields.
    pub strict_validation: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            case_variants: true,
            strict_validation: false,
        }
    }
}

impl EvaluatorConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| FormulaError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FormulaError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }
}
