use serde::Serialize;
use tracing::debug;

use super::domain::CriterionType;
use super::error::{ColumnRef, ScoringError};

const RELATIVE_TOLERANCE: f64 = 1e-5;
const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Tolerant float comparison used for every "sums to one" and "is zero" check.
pub(crate) fn approx_eq(value: f64, expected: f64) -> bool {
    (value - expected).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * expected.abs()
}

/// How strictly a divisor must be zero before it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZeroCheck {
    Exact,
    Tolerant,
}

impl ZeroCheck {
    fn is_zero(self, value: f64) -> bool {
        match self {
            ZeroCheck::Exact => value == 0.0,
            ZeroCheck::Tolerant => approx_eq(value, 0.0),
        }
    }
}

/// Rectangular, non-empty grid of raw values: rows are alternatives, columns are criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionMatrix {
    rows: Vec<Vec<f64>>,
}

impl DecisionMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, ScoringError> {
        let columns = match rows.first() {
            Some(first) => first.len(),
            None => {
                return Err(ScoringError::ShapeMismatch {
                    what: "decision matrix must contain at least one alternative",
                    expected: 1,
                    found: 0,
                })
            }
        };
        if columns == 0 {
            return Err(ScoringError::ShapeMismatch {
                what: "decision matrix must contain at least one criterion column",
                expected: 1,
                found: 0,
            });
        }
        if let Some(ragged) = rows.iter().find(|row| row.len() != columns) {
            return Err(ScoringError::ShapeMismatch {
                what: "every decision matrix row must have the same number of columns",
                expected: columns,
                found: ragged.len(),
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// Textual form kept inside stored records.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.rows)
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

/// Resolved description of one matrix column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Column {
    pub(crate) label: ColumnRef,
    pub(crate) kind: CriterionType,
    pub(crate) weight: f64,
}

pub(crate) fn resolve_columns<F>(
    weights: &[f64],
    types: &[String],
    label: F,
) -> Result<Vec<Column>, ScoringError>
where
    F: Fn(usize) -> ColumnRef,
{
    weights
        .iter()
        .zip(types)
        .enumerate()
        .map(|(index, (&weight, raw))| {
            let kind = CriterionType::resolve(raw, label(index))?;
            Ok(Column {
                label: label(index),
                kind,
                weight,
            })
        })
        .collect()
}

fn normalize_column(
    values: &[f64],
    column: &Column,
    zero: ZeroCheck,
) -> Result<Vec<f64>, ScoringError> {
    match column.kind {
        CriterionType::Cost => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            if zero.is_zero(min) {
                return Err(ScoringError::DivideByZero {
                    reason: "minimum value for cost criterion is zero",
                    column: column.label.clone(),
                });
            }
            Ok(values.iter().map(|value| min / value).collect())
        }
        CriterionType::Benefit => {
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if zero.is_zero(max) {
                return Err(ScoringError::DivideByZero {
                    reason: "maximum value for benefit criterion is zero",
                    column: column.label.clone(),
                });
            }
            Ok(values.iter().map(|value| value / max).collect())
        }
    }
}

fn power_column(values: &[f64], column: &Column) -> Result<Vec<f64>, ScoringError> {
    match column.kind {
        CriterionType::Cost => {
            if values.iter().any(|value| *value == 0.0) {
                return Err(ScoringError::DivideByZero {
                    reason: "zero value found in cost criterion",
                    column: column.label.clone(),
                });
            }
            Ok(values
                .iter()
                .map(|value| (1.0 / value).powf(column.weight))
                .collect())
        }
        CriterionType::Benefit => Ok(values
            .iter()
            .map(|value| value.powf(column.weight))
            .collect()),
    }
}

/// Simple Additive Weighting: normalize each column by orientation, weight it, and sum per row.
pub(crate) fn additive_scores(
    matrix: &DecisionMatrix,
    columns: &[Column],
    zero: ZeroCheck,
) -> Result<Vec<f64>, ScoringError> {
    let mut scores = vec![0.0; matrix.row_count()];
    for (index, column) in columns.iter().enumerate() {
        let normalized = normalize_column(&matrix.column(index), column, zero)?;
        debug!(column = %column.label, kind = column.kind.label(), ?normalized, "normalized column");
        for (score, value) in scores.iter_mut().zip(&normalized) {
            *score += value * column.weight;
        }
    }
    Ok(scores)
}

/// Weighted Product: raise each column to its weight (reciprocal for costs) and multiply per row.
///
/// The weights are used as given; callers normalize them beforehand.
pub(crate) fn product_scores(
    matrix: &DecisionMatrix,
    columns: &[Column],
) -> Result<Vec<f64>, ScoringError> {
    let mut scores = vec![1.0; matrix.row_count()];
    for (index, column) in columns.iter().enumerate() {
        let powered = power_column(&matrix.column(index), column)?;
        debug!(column = %column.label, kind = column.kind.label(), ?powered, "powered column");
        for (score, value) in scores.iter_mut().zip(&powered) {
            *score *= value;
        }
    }
    Ok(scores)
}

/// Divides every value by the total. A zero total is reported by the caller.
pub(crate) fn normalize_to_unit_sum(values: &mut [f64]) -> f64 {
    let total: f64 = values.iter().sum();
    for value in values.iter_mut() {
        *value /= total;
    }
    total
}
