use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{ColumnRef, ScoringError};

/// Orientation of a criterion column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    /// Higher raw values are better.
    Benefit,
    /// Lower raw values are better.
    Cost,
}

impl CriterionType {
    pub fn label(&self) -> &'static str {
        match self {
            CriterionType::Benefit => "benefit",
            CriterionType::Cost => "cost",
        }
    }

    pub(crate) fn resolve(raw: &str, column: ColumnRef) -> Result<Self, ScoringError> {
        match raw {
            "benefit" => Ok(CriterionType::Benefit),
            "cost" => Ok(CriterionType::Cost),
            other => Err(ScoringError::UnknownCriterionType {
                value: other.to_string(),
                column,
            }),
        }
    }
}

/// Node of the two-level criteria tree submitted with hierarchical requests.
///
/// A criterion with an empty `subcriteria` list is a leaf and contributes its own weight and
/// type. Parents only need a name and a weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub weight: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcriteria: Vec<Criterion>,
}

impl Criterion {
    pub fn leaf(name: impl Into<String>, weight: f64, kind: CriterionType) -> Self {
        Self {
            name: name.into(),
            weight,
            kind: Some(kind.label().to_string()),
            subcriteria: Vec::new(),
        }
    }

    pub fn parent(name: impl Into<String>, weight: f64, subcriteria: Vec<Criterion>) -> Self {
        Self {
            name: name.into(),
            weight,
            kind: None,
            subcriteria,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.subcriteria.is_empty()
    }

    pub(crate) fn kind_label(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }
}

/// One named alternative with its raw value per (sub-)criterion name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScores {
    pub alternative: String,
    pub criteria_scores: BTreeMap<String, f64>,
}

/// Positional request: one weight and (optionally) one type per decision matrix column.
///
/// Missing `criteria_types` treats every column as a benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRequest {
    pub criteria_weights: Vec<f64>,
    pub decision_matrix: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_types: Option<Vec<String>>,
}

/// Named request built from a criteria tree and per-alternative score maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalRequest {
    pub criteria: Vec<Criterion>,
    pub decision_matrix: Vec<AlternativeScores>,
}

/// Either request shape, as read from a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoringRequest {
    Flat(FlatRequest),
    Hierarchical(HierarchicalRequest),
}

/// Scores produced by the engine: positional for flat requests, keyed by alternative name (in
/// input order) for hierarchical ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreResult {
    Positional(Vec<f64>),
    Named(IndexMap<String, f64>),
}

impl ScoreResult {
    pub fn len(&self) -> usize {
        match self {
            ScoreResult::Positional(scores) => scores.len(),
            ScoreResult::Named(scores) => scores.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Method family selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodFamily {
    Saw,
    Wp,
}

/// Concrete method name recorded alongside every stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    SimpleAdditiveWeighting,
    WeightedProduct,
    SimpleAdditiveWeightingWithSubcriteria,
    WeightedProductWithSubcriteria,
}

impl ScoringMethod {
    pub fn flat(family: MethodFamily) -> Self {
        match family {
            MethodFamily::Saw => ScoringMethod::SimpleAdditiveWeighting,
            MethodFamily::Wp => ScoringMethod::WeightedProduct,
        }
    }

    pub fn hierarchical(family: MethodFamily) -> Self {
        match family {
            MethodFamily::Saw => ScoringMethod::SimpleAdditiveWeightingWithSubcriteria,
            MethodFamily::Wp => ScoringMethod::WeightedProductWithSubcriteria,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::SimpleAdditiveWeighting => "simple_additive_weighting",
            ScoringMethod::WeightedProduct => "weighted_product",
            ScoringMethod::SimpleAdditiveWeightingWithSubcriteria => {
                "simple_additive_weighting_with_subcriteria"
            }
            ScoringMethod::WeightedProductWithSubcriteria => "weighted_product_with_subcriteria",
        }
    }
}
