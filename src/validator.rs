use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;
use crate::expression;
use crate::fields::{self, FieldTable, PatternCache};

pub const EMPTY_FORMULA: &str = "Formula cannot be empty";
pub const INVALID_SYNTAX: &str = "Invalid formula syntax";

/// Authoring-time verdict on a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self { valid: true, error: None }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self { valid: false, error: Some(msg.into()) }
    }
}

/// Checks formulas against the fields a sheet declares.
///
/// By default only the shape of the formula is checked: declared names are
/// replaced by `1` and the rest must be parseable arithmetic. An identifier
/// that is not declared is then caught by the character check, but a name
/// that is declared here and absent from a later row is not. Strict mode
/// additionally names every undeclared identifier.
#[derive(Debug, Clone, Default)]
pub struct FormulaValidator {
    config: EvaluatorConfig,
    patterns: PatternCache,
}

impl FormulaValidator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config, patterns: PatternCache::new() }
    }

    pub fn validate<S: AsRef<str>>(&self, expression: &str, field_names: &[S]) -> Validation {
        if expression.trim().is_empty() {
            return Validation::invalid(EMPTY_FORMULA);
        }

        let table = FieldTable::from_names(field_names, "1", self.config.case_variants);
        let substituted = table.substitute(expression, &self.patterns);

        if self.config.strict_validation {
            let unknown = fields::identifiers(&substituted);
            if !unknown.is_empty() {
                return Validation::invalid(format!("Unknown fields: {}", unknown.iter().join(", ")));
            }
        }

        if !fields::is_arithmetic(&substituted) {
            let bad = fields::disallowed_chars(&substituted).iter().join(" ");
            return Validation::invalid(format!("Formula contains invalid characters: {bad}"));
        }

        match expression::parse_expr(&substituted) {
            Ok(_) => Validation::ok(),
            Err(e) => {
                tracing::debug!(expression, error = %e, "formula failed syntax check");
                Validation::invalid(INVALID_SYNTAX)
            }
        }
    }
}
