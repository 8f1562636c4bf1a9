use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use super::domain::{
    FlatRequest, HierarchicalRequest, MethodFamily, ScoreResult, ScoringMethod, ScoringRequest,
};
use super::error::{ColumnRef, ScoringError};
use super::flatten::{flatten_for_saw, flatten_for_wp, FlattenedCriteria};
use super::matrix::{
    additive_scores, approx_eq, normalize_to_unit_sum, product_scores, resolve_columns, Column,
    DecisionMatrix, ZeroCheck,
};
use super::repository::{NewRecord, ResultStore, ResultView, StoreError, StoredRecord};

/// Inclusive target interval for min-max rescaling of hierarchical scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

impl ScoreRange {
    fn rescale(&self, scores: &mut [f64]) {
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == min {
            let midpoint = (self.low + self.high) / 2.0;
            scores.iter_mut().for_each(|score| *score = midpoint);
            return;
        }
        for score in scores.iter_mut() {
            *score = (*score - min) / (max - min) * (self.high - self.low) + self.low;
        }
    }
}

/// Post-processing applied to hierarchical scores. Both steps are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringOptions {
    pub score_range: Option<ScoreRange>,
    pub round_decimals: Option<u32>,
}

impl ScoringOptions {
    fn finish(&self, scores: &mut [f64]) {
        if let Some(range) = self.score_range {
            range.rescale(scores);
        }
        if let Some(decimals) = self.round_decimals {
            let factor = 10f64.powi(decimals as i32);
            scores
                .iter_mut()
                .for_each(|score| *score = (*score * factor).round() / factor);
        }
    }
}

/// Stateless scorer that reports every result to the injected store.
pub struct ScoringEngine<S> {
    store: Arc<S>,
    options: ScoringOptions,
}

impl<S> ScoringEngine<S>
where
    S: ResultStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, ScoringOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: ScoringOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> ScoringOptions {
        self.options
    }

    /// Flat SAW. Scores follow the input row order and are not clamped.
    pub fn simple_additive_weighting(&self, request: &FlatRequest) -> Result<Vec<f64>, EngineError> {
        let (matrix, columns) = flat_inputs(request)?;
        let scores = additive_scores(&matrix, &columns, ZeroCheck::Exact)?;

        self.persist(
            ScoringMethod::SimpleAdditiveWeighting,
            request.criteria_weights.clone(),
            &matrix,
            ScoreResult::Positional(scores.clone()),
        )?;
        Ok(scores)
    }

    /// Flat WP. Weights and final scores are both normalized to sum to one.
    pub fn weighted_product(&self, request: &FlatRequest) -> Result<Vec<f64>, EngineError> {
        let (matrix, mut columns) = flat_inputs(request)?;

        let mut weights = request.criteria_weights.clone();
        let weight_total = normalize_to_unit_sum(&mut weights);
        if weight_total == 0.0 {
            return Err(ScoringError::WeightNormalization(
                "criteria weights must not sum to zero".to_string(),
            )
            .into());
        }
        for (column, weight) in columns.iter_mut().zip(&weights) {
            column.weight = *weight;
        }
        debug!(?weights, "normalized criteria weights");

        let mut scores = product_scores(&matrix, &columns)?;
        product_total(&scores)?;
        normalize_to_unit_sum(&mut scores);

        self.persist(
            ScoringMethod::WeightedProduct,
            weights,
            &matrix,
            ScoreResult::Positional(scores.clone()),
        )?;
        Ok(scores)
    }

    /// SAW over a criteria tree. Fails before reading the matrix unless the flattened weights
    /// sum to one.
    pub fn simple_additive_weighting_with_subcriteria(
        &self,
        request: &HierarchicalRequest,
    ) -> Result<IndexMap<String, f64>, EngineError> {
        let flattened = flatten_for_saw(&request.criteria)?;
        let matrix = named_matrix(request, &flattened)?;
        let columns = flattened.columns()?;

        let mut scores = additive_scores(&matrix, &columns, ZeroCheck::Tolerant)?;
        self.options.finish(&mut scores);

        let results = label_scores(request, scores);
        self.persist(
            ScoringMethod::SimpleAdditiveWeightingWithSubcriteria,
            flattened.weights,
            &matrix,
            ScoreResult::Named(results.clone()),
        )?;
        Ok(results)
    }

    /// WP over a criteria tree, with sub-weights normalized inside each parent.
    pub fn weighted_product_with_subcriteria(
        &self,
        request: &HierarchicalRequest,
    ) -> Result<IndexMap<String, f64>, EngineError> {
        let mut flattened = flatten_for_wp(&request.criteria)?;
        let matrix = named_matrix(request, &flattened)?;

        if !approx_eq(flattened.total_weight(), 1.0) {
            normalize_to_unit_sum(&mut flattened.weights);
        }
        debug!(weights = ?flattened.weights, "normalized sub-criteria weights");
        let columns = flattened.columns()?;

        let mut scores = product_scores(&matrix, &columns)?;
        if !approx_eq(product_total(&scores)?, 1.0) {
            normalize_to_unit_sum(&mut scores);
        }
        self.options.finish(&mut scores);

        let results = label_scores(request, scores);
        self.persist(
            ScoringMethod::WeightedProductWithSubcriteria,
            flattened.weights,
            &matrix,
            ScoreResult::Named(results.clone()),
        )?;
        Ok(results)
    }

    /// Dispatches on the request shape; flat requests yield positional scores, hierarchical
    /// requests yield named ones.
    pub fn score(
        &self,
        family: MethodFamily,
        request: &ScoringRequest,
    ) -> Result<ScoreResult, EngineError> {
        match (family, request) {
            (MethodFamily::Saw, ScoringRequest::Flat(flat)) => self
                .simple_additive_weighting(flat)
                .map(ScoreResult::Positional),
            (MethodFamily::Wp, ScoringRequest::Flat(flat)) => {
                self.weighted_product(flat).map(ScoreResult::Positional)
            }
            (MethodFamily::Saw, ScoringRequest::Hierarchical(tree)) => self
                .simple_additive_weighting_with_subcriteria(tree)
                .map(ScoreResult::Named),
            (MethodFamily::Wp, ScoringRequest::Hierarchical(tree)) => self
                .weighted_product_with_subcriteria(tree)
                .map(ScoreResult::Named),
        }
    }

    /// Stores a result computed elsewhere, verbatim.
    pub fn save(
        &self,
        method: ScoringMethod,
        criteria_weights: Vec<f64>,
        decision_matrix: Vec<Vec<f64>>,
        scores: ScoreResult,
    ) -> Result<StoredRecord, EngineError> {
        let decision_matrix = serde_json::to_string(&decision_matrix).map_err(StoreError::from)?;
        let stored = self.store.add(NewRecord {
            method,
            criteria_weights,
            decision_matrix,
            scores,
        })?;
        info!(method = method.as_str(), id = %stored.id, "saved scoring result");
        Ok(stored)
    }

    /// Every stored record, matrices decoded where possible.
    pub fn results(&self) -> Result<Vec<ResultView>, EngineError> {
        let records = self.store.stream()?;
        Ok(records.iter().map(StoredRecord::view).collect())
    }

    fn persist(
        &self,
        method: ScoringMethod,
        criteria_weights: Vec<f64>,
        matrix: &DecisionMatrix,
        scores: ScoreResult,
    ) -> Result<StoredRecord, EngineError> {
        let alternatives = scores.len();
        let stored = self.store.add(NewRecord {
            method,
            criteria_weights,
            decision_matrix: matrix.to_json().map_err(StoreError::from)?,
            scores,
        })?;
        info!(method = method.as_str(), alternatives, id = %stored.id, "scoring completed");
        Ok(stored)
    }
}

fn flat_inputs(request: &FlatRequest) -> Result<(DecisionMatrix, Vec<Column>), ScoringError> {
    let matrix = DecisionMatrix::new(request.decision_matrix.clone())?;
    if request.criteria_weights.len() != matrix.column_count() {
        return Err(ScoringError::ShapeMismatch {
            what: "the number of criteria weights must match the number of columns in the decision matrix",
            expected: matrix.column_count(),
            found: request.criteria_weights.len(),
        });
    }

    let types = match &request.criteria_types {
        Some(types) if types.len() != matrix.column_count() => {
            return Err(ScoringError::ShapeMismatch {
                what: "the number of criteria types must match the number of columns in the decision matrix",
                expected: matrix.column_count(),
                found: types.len(),
            })
        }
        Some(types) => types.clone(),
        None => vec!["benefit".to_string(); matrix.column_count()],
    };

    let columns = resolve_columns(&request.criteria_weights, &types, ColumnRef::Index)?;
    Ok((matrix, columns))
}

/// Sum of the raw products, which must be finite and non-zero to normalize them.
fn product_total(scores: &[f64]) -> Result<f64, ScoringError> {
    let total: f64 = scores.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(ScoringError::WeightNormalization(format!(
            "weighted product scores sum to {total} and cannot be normalized"
        )));
    }
    Ok(total)
}

fn named_matrix(
    request: &HierarchicalRequest,
    flattened: &FlattenedCriteria,
) -> Result<DecisionMatrix, ScoringError> {
    let mut rows = Vec::with_capacity(request.decision_matrix.len());
    for alternative in &request.decision_matrix {
        let mut row = Vec::with_capacity(flattened.len());
        for name in &flattened.names {
            let value = *alternative.criteria_scores.get(name).ok_or_else(|| {
                ScoringError::MissingValue {
                    criterion: name.clone(),
                    alternative: alternative.alternative.clone(),
                }
            })?;
            if value <= 0.0 {
                return Err(ScoringError::InvalidValue {
                    criterion: name.clone(),
                    alternative: alternative.alternative.clone(),
                    value,
                });
            }
            row.push(value);
        }
        rows.push(row);
    }
    DecisionMatrix::new(rows)
}

fn label_scores(request: &HierarchicalRequest, scores: Vec<f64>) -> IndexMap<String, f64> {
    request
        .decision_matrix
        .iter()
        .map(|alternative| alternative.alternative.clone())
        .zip(scores)
        .collect()
}

/// Error raised by the scoring engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
