use thiserror::Error;

// Every way a formula can fail to produce a number for a row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    // Blank after trimming
    #[error("formula cannot be empty")]
    EmptyExpression,

    // Something other than digits, whitespace and `+ - * / ( )` survived substitution
    #[error("formula contains invalid characters: {0}")]
    InvalidCharacters(String),

    // NaN or +/-Infinity, e.g. division by zero
    #[error("formula result is not finite: {0}")]
    NonFiniteResult(f64),

    // The arithmetic parser rejected the substituted string
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("sheet store error: {0}")]
    Store(String),
}

// Type alias for results that use `FormulaError` as the error type
pub type Result<T> = std::result::Result<T, FormulaError>;
