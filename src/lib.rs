pub mod errors;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod validator;
pub mod sheet;
pub mod store;
pub mod expression; // numeric-only arithmetic parser
pub mod fields;
mod parser;

pub use config::EvaluatorConfig;
pub use context::{CellValue, EvaluationContext};
pub use errors::{FormulaError, Result};
pub use evaluator::FormulaEvaluator;
pub use sheet::{CalculatedColumn, Column, ComputedRow, Sheet};
pub use store::{InMemorySheetStore, SheetStore};
pub use validator::{FormulaValidator, Validation};

/// Convenience: evaluate with the default configuration. `None` on any failure.
pub fn evaluate(expression: &str, row: &EvaluationContext) -> Option<f64> {
    FormulaEvaluator::default().evaluate(expression, row)
}

/// Convenience: permissive validation with the default configuration.
pub fn validate<S: AsRef<str>>(expression: &str, field_names: &[S]) -> Validation {
    FormulaValidator::default().validate(expression, field_names)
}
