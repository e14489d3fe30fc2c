//! Dynamic sheets: plain columns, calculated columns and rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::EvaluationContext;
use crate::evaluator::FormulaEvaluator;
use crate::validator::{FormulaValidator, Validation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    #[serde(default)]
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedColumn {
    pub field: String,
    #[serde(default)]
    pub header: String,
    pub formula: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub calculated_columns: Vec<CalculatedColumn>,
    #[serde(default)]
    pub rows: Vec<EvaluationContext>,
}

/// A row together with its calculated values (`None` renders as blank).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedRow {
    #[serde(flatten)]
    pub row: EvaluationContext,
    pub calculated: BTreeMap<String, Option<f64>>,
}

impl Sheet {
    /// Declared plain column fields, in column order.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    /// Evaluate every calculated column for every row. Formulas only see the
    /// row's own fields, never another calculated column.
    pub fn compute(&self, evaluator: &FormulaEvaluator) -> Vec<ComputedRow> {
        self.rows
            .iter()
            .map(|row| ComputedRow {
                row: row.clone(),
                calculated: self
                    .calculated_columns
                    .iter()
                    .map(|col| (col.field.clone(), evaluator.evaluate(&col.formula, row)))
                    .collect(),
            })
            .collect()
    }

    /// Validation for each calculated column, keyed by its field.
    pub fn validate_formulas(&self, validator: &FormulaValidator) -> BTreeMap<String, Validation> {
        let fields = self.field_names();
        self.calculated_columns
            .iter()
            .map(|col| (col.field.clone(), validator.validate(&col.formula, fields.as_slice())))
            .collect()
    }
}
