//! Turns a two-level criteria tree into parallel weight/type/name vectors.
//!
//! The SAW and WP paths distribute a parent's weight differently and both behaviours are kept:
//! SAW multiplies raw sub-weights by the parent weight and then insists the grand total is one,
//! WP normalizes sub-weights within their parent and only requires positivity.

use serde::Serialize;

use super::domain::Criterion;
use super::error::{ColumnRef, ScoringError};
use super::matrix::{approx_eq, resolve_columns, Column};

/// Depth-first leaves of a criteria tree. Order defines the derived matrix column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenedCriteria {
    pub weights: Vec<f64>,
    pub types: Vec<String>,
    pub names: Vec<String>,
}

impl FlattenedCriteria {
    fn push(&mut self, weight: f64, kind: &str, name: &str) {
        self.weights.push(weight);
        self.types.push(kind.to_string());
        self.names.push(name.to_string());
    }

    fn push_leaf(&mut self, criterion: &Criterion) {
        self.push(criterion.weight, criterion.kind_label(), &criterion.name);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub(crate) fn columns(&self) -> Result<Vec<Column>, ScoringError> {
        resolve_columns(&self.weights, &self.types, |index| {
            ColumnRef::Named(self.names[index].clone())
        })
    }
}

/// SAW flattening: `parent.weight * sub.weight`, then the grand total must be one.
pub fn flatten_for_saw(criteria: &[Criterion]) -> Result<FlattenedCriteria, ScoringError> {
    let mut flattened = FlattenedCriteria::default();
    for criterion in criteria {
        if criterion.is_leaf() {
            flattened.push_leaf(criterion);
            continue;
        }
        for sub in &criterion.subcriteria {
            flattened.push(criterion.weight * sub.weight, sub.kind_label(), &sub.name);
        }
    }

    let total = flattened.total_weight();
    if !approx_eq(total, 1.0) {
        return Err(ScoringError::WeightNormalization(describe_saw_imbalance(
            criteria, total,
        )));
    }
    Ok(flattened)
}

fn describe_saw_imbalance(criteria: &[Criterion], total: f64) -> String {
    let groups: Vec<String> = criteria
        .iter()
        .filter(|criterion| !criterion.is_leaf())
        .filter(|criterion| {
            let sub_total: f64 = criterion.subcriteria.iter().map(|sub| sub.weight).sum();
            !approx_eq(sub_total, 1.0)
        })
        .map(|criterion| {
            let names: Vec<&str> = criterion
                .subcriteria
                .iter()
                .map(|sub| sub.name.as_str())
                .collect();
            let weights: Vec<String> = criterion
                .subcriteria
                .iter()
                .map(|sub| sub.weight.to_string())
                .collect();
            format!(
                "criterion '{}' has sub-criteria {} with weights {{{}}}",
                criterion.name,
                names.join(", "),
                weights.join(", ")
            )
        })
        .collect();

    // Leaves are only suspects once every sub-divided group is internally consistent.
    let offenders = if groups.is_empty() {
        criteria
            .iter()
            .filter(|criterion| criterion.is_leaf())
            .map(|criterion| {
                format!(
                    "criterion '{}' has weight {}",
                    criterion.name, criterion.weight
                )
            })
            .collect()
    } else {
        groups
    };

    if offenders.is_empty() {
        format!(
            "total criteria weight for SAW must equal 1 (found {total}), but no criterion could be singled out"
        )
    } else {
        format!(
            "total criteria weight for SAW must equal 1 (found {total}); {}",
            offenders.join("; ")
        )
    }
}

/// WP flattening: sub-weights are normalized within their parent and scaled by its weight.
pub fn flatten_for_wp(criteria: &[Criterion]) -> Result<FlattenedCriteria, ScoringError> {
    let mut flattened = FlattenedCriteria::default();
    for criterion in criteria {
        if criterion.is_leaf() {
            flattened.push_leaf(criterion);
            continue;
        }

        let sibling_total: f64 = criterion.subcriteria.iter().map(|sub| sub.weight).sum();
        if sibling_total == 0.0 {
            return Err(ScoringError::WeightNormalization(format!(
                "total sub-criteria weight for criterion '{}' must not be zero",
                criterion.name
            )));
        }
        for sub in &criterion.subcriteria {
            let weight = sub.weight / sibling_total * criterion.weight;
            if weight <= 0.0 {
                return Err(ScoringError::WeightNormalization(format!(
                    "sub-criterion '{}' weight after normalization ({weight}) must be positive",
                    sub.name
                )));
            }
            flattened.push(weight, sub.kind_label(), &sub.name);
        }
    }

    if let Some((name, weight)) = flattened
        .names
        .iter()
        .zip(&flattened.weights)
        .find(|(_, weight)| **weight <= 0.0)
    {
        return Err(ScoringError::WeightNormalization(format!(
            "weight of criterion '{name}' must be positive (found {weight})"
        )));
    }
    Ok(flattened)
}
