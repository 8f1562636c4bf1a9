use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::adapters::InMemoryResultStore;
use crate::scoring::domain::{
    AlternativeScores, Criterion, CriterionType, FlatRequest, HierarchicalRequest,
};
use crate::scoring::engine::{ScoringEngine, ScoringOptions};
use crate::scoring::repository::{NewRecord, ResultStore, StoreError, StoredRecord};

#[track_caller]
pub(super) fn assert_within(value: f64, expected: f64, tolerance: f64) {
    let diff = (value - expected).abs();
    assert!(
        diff <= tolerance,
        "Expected value of {expected} +- {tolerance} but got {value} which is off by {diff}",
    );
}

pub(super) fn build_engine() -> (ScoringEngine<InMemoryResultStore>, Arc<InMemoryResultStore>) {
    build_engine_with(ScoringOptions::default())
}

pub(super) fn build_engine_with(
    options: ScoringOptions,
) -> (ScoringEngine<InMemoryResultStore>, Arc<InMemoryResultStore>) {
    let store = Arc::new(InMemoryResultStore::default());
    let engine = ScoringEngine::with_options(store.clone(), options);
    (engine, store)
}

pub(super) fn benefit_request() -> FlatRequest {
    FlatRequest {
        criteria_weights: vec![0.5, 0.5],
        decision_matrix: vec![vec![80.0, 70.0], vec![60.0, 90.0]],
        criteria_types: Some(vec!["benefit".to_string(), "benefit".to_string()]),
    }
}

pub(super) fn mixed_request() -> FlatRequest {
    FlatRequest {
        criteria_weights: vec![0.6, 0.4],
        decision_matrix: vec![vec![200.0, 3.0], vec![100.0, 5.0]],
        criteria_types: Some(vec!["cost".to_string(), "benefit".to_string()]),
    }
}

/// Quality (0.6, leaf) plus Cost (0.4) split evenly into Price and Maintenance.
pub(super) fn saw_criteria() -> Vec<Criterion> {
    vec![
        Criterion::leaf("Quality", 0.6, CriterionType::Benefit),
        Criterion::parent(
            "Cost",
            0.4,
            vec![
                Criterion::leaf("Price", 0.5, CriterionType::Cost),
                Criterion::leaf("Maintenance", 0.5, CriterionType::Cost),
            ],
        ),
    ]
}

/// Same tree with unnormalized weights, as WP callers usually send it.
pub(super) fn wp_criteria() -> Vec<Criterion> {
    vec![
        Criterion::leaf("Quality", 3.0, CriterionType::Benefit),
        Criterion::parent(
            "Cost",
            2.0,
            vec![
                Criterion::leaf("Price", 1.0, CriterionType::Cost),
                Criterion::leaf("Maintenance", 1.0, CriterionType::Cost),
            ],
        ),
    ]
}

pub(super) fn alternative(name: &str, values: &[(&str, f64)]) -> AlternativeScores {
    AlternativeScores {
        alternative: name.to_string(),
        criteria_scores: values
            .iter()
            .map(|(criterion, value)| (criterion.to_string(), *value))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub(super) fn alternatives() -> Vec<AlternativeScores> {
    vec![
        alternative(
            "Supplier A",
            &[("Quality", 80.0), ("Price", 100.0), ("Maintenance", 20.0)],
        ),
        alternative(
            "Supplier B",
            &[("Quality", 60.0), ("Price", 50.0), ("Maintenance", 40.0)],
        ),
    ]
}

pub(super) fn saw_tree_request() -> HierarchicalRequest {
    HierarchicalRequest {
        criteria: saw_criteria(),
        decision_matrix: alternatives(),
    }
}

pub(super) fn wp_tree_request() -> HierarchicalRequest {
    HierarchicalRequest {
        criteria: wp_criteria(),
        decision_matrix: alternatives(),
    }
}

pub(super) struct UnavailableStore;

impl ResultStore for UnavailableStore {
    fn add(&self, _record: NewRecord) -> Result<StoredRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn stream(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
