use crate::config::EvaluatorConfig;
use crate::context::EvaluationContext;
use crate::errors::{FormulaError, Result};
use crate::expression;
use crate::fields::{self, FieldTable, PatternCache};

/// Computes calculated-column formulas for one row at a time.
///
/// Field references are replaced by the row's numeric values, the result is
/// checked to be plain arithmetic and then evaluated. Failures never escape
/// [`FormulaEvaluator::evaluate`]; they are logged and reported as `None`.
#[derive(Debug, Clone, Default)]
pub struct FormulaEvaluator {
    config: EvaluatorConfig,
    patterns: PatternCache,
}

impl FormulaEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config, patterns: PatternCache::new() }
    }

    /// Distinct substitution patterns compiled by this evaluator and its clones.
    pub fn compiled_patterns(&self) -> usize {
        self.patterns.compiled_count()
    }

    /// Value of `expression` for `row`, or `None` when it cannot be computed.
    pub fn evaluate(&self, expression: &str, row: &EvaluationContext) -> Option<f64> {
        match self.try_evaluate(expression, row) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(expression, error = %e, "formula evaluation failed");
                None
            }
        }
    }

    /// Same as [`evaluate`](Self::evaluate) but says why it failed.
    pub fn try_evaluate(&self, expression: &str, row: &EvaluationContext) -> Result<f64> {
        if expression.trim().is_empty() {
            return Err(FormulaError::EmptyExpression);
        }

        let table = FieldTable::from_context(row, self.config.case_variants);
        let substituted = table.substitute(expression, &self.patterns);
        tracing::debug!(expression, %substituted, fields = table.len(), "substituted field references");

        if !fields::is_arithmetic(&substituted) {
            let bad: String = fields::disallowed_chars(&substituted).into_iter().collect();
            return Err(FormulaError::InvalidCharacters(bad));
        }

        let value = expression::eval_str(&substituted)?;
        if !value.is_finite() {
            return Err(FormulaError::NonFiniteResult(value));
        }
        Ok(value)
    }
}
