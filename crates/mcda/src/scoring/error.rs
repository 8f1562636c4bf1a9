use std::fmt;

/// Identifies the column a scoring failure refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Positional column of a flat decision matrix.
    Index(usize),
    /// Named (sub-)criterion of a hierarchical request.
    Named(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(index) => write!(f, "index {index}"),
            ColumnRef::Named(name) => write!(f, "criterion '{name}'"),
        }
    }
}

/// Validation and arithmetic failures raised while scoring.
///
/// Every variant aborts the whole call; nothing is persisted once one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("unknown criterion type '{value}' at {column}")]
    UnknownCriterionType { value: String, column: ColumnRef },
    #[error("{reason} at {column}, cannot divide by zero")]
    DivideByZero {
        reason: &'static str,
        column: ColumnRef,
    },
    #[error("value for criterion '{criterion}' is missing on alternative '{alternative}'")]
    MissingValue {
        criterion: String,
        alternative: String,
    },
    #[error("value {value} for criterion '{criterion}' on alternative '{alternative}' must be positive")]
    InvalidValue {
        criterion: String,
        alternative: String,
        value: f64,
    },
    #[error("{0}")]
    WeightNormalization(String),
}
