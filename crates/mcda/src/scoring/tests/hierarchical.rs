use super::common::*;
use crate::scoring::domain::{
    Criterion, CriterionType, MethodFamily, ScoreResult, ScoringMethod, ScoringRequest,
};
use crate::scoring::engine::{EngineError, ScoreRange, ScoringOptions};
use crate::scoring::error::{ColumnRef, ScoringError};
use crate::scoring::repository::ResultStore;

#[test]
fn saw_tree_scores_alternatives_by_name() {
    let (engine, store) = build_engine();

    let scores = engine
        .simple_additive_weighting_with_subcriteria(&saw_tree_request())
        .expect("tree saw succeeds");

    let names: Vec<&str> = scores.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Supplier A", "Supplier B"]);
    assert_within(scores["Supplier A"], 0.9, 1e-9);
    assert_within(scores["Supplier B"], 0.75, 1e-9);

    let records = store.stream().unwrap();
    assert_eq!(
        records[0].method,
        ScoringMethod::SimpleAdditiveWeightingWithSubcriteria
    );
    let weights = &records[0].criteria_weights;
    assert_within(weights[0], 0.6, 1e-12);
    assert_within(weights[1], 0.2, 1e-12);
    assert_within(weights[2], 0.2, 1e-12);
    assert_eq!(
        records[0].decision_matrix,
        "[[80.0,100.0,20.0],[60.0,50.0,40.0]]"
    );
}

#[test]
fn saw_tree_blames_the_unbalanced_group() {
    let (engine, store) = build_engine();
    let mut request = saw_tree_request();
    request.criteria[1].subcriteria[1].weight = 0.475;

    let err = engine
        .simple_additive_weighting_with_subcriteria(&request)
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("criterion 'Cost'"), "{message}");
    assert!(message.contains("Price, Maintenance"), "{message}");
    assert!(!message.contains("'Quality'"), "{message}");
    assert!(store.is_empty());
}

#[test]
fn saw_tree_blames_leaves_when_groups_are_balanced() {
    let (engine, _) = build_engine();
    let mut request = saw_tree_request();
    request.criteria[0].weight = 0.5;

    let err = engine
        .simple_additive_weighting_with_subcriteria(&request)
        .unwrap_err();

    match err {
        EngineError::Scoring(ScoringError::WeightNormalization(message)) => {
            assert!(message.contains("criterion 'Quality' has weight 0.5"), "{message}");
        }
        other => panic!("expected weight normalization failure, got {other:?}"),
    }
}

#[test]
fn saw_tree_checks_weights_before_reading_values() {
    let (engine, _) = build_engine();
    let mut request = saw_tree_request();
    request.criteria[0].weight = 0.9;
    request.decision_matrix[0].criteria_scores.remove("Price");

    let err = engine
        .simple_additive_weighting_with_subcriteria(&request)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Scoring(ScoringError::WeightNormalization(_))
    ));
}

#[test]
fn missing_value_names_criterion_and_alternative() {
    let (engine, _) = build_engine();
    let mut request = wp_tree_request();
    request.decision_matrix[1]
        .criteria_scores
        .remove("Maintenance");

    let err = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap_err();

    match err {
        EngineError::Scoring(ScoringError::MissingValue {
            criterion,
            alternative,
        }) => {
            assert_eq!(criterion, "Maintenance");
            assert_eq!(alternative, "Supplier B");
        }
        other => panic!("expected missing value, got {other:?}"),
    }
}

#[test]
fn non_positive_values_are_rejected_for_both_methods() {
    let (engine, store) = build_engine();
    let mut saw = saw_tree_request();
    saw.decision_matrix[0]
        .criteria_scores
        .insert("Quality".to_string(), 0.0);
    let mut wp = wp_tree_request();
    wp.decision_matrix[0]
        .criteria_scores
        .insert("Price".to_string(), -3.0);

    let saw_err = engine
        .simple_additive_weighting_with_subcriteria(&saw)
        .unwrap_err();
    let wp_err = engine.weighted_product_with_subcriteria(&wp).unwrap_err();

    assert!(matches!(
        saw_err,
        EngineError::Scoring(ScoringError::InvalidValue { .. })
    ));
    assert!(matches!(
        wp_err,
        EngineError::Scoring(ScoringError::InvalidValue { value, .. }) if value == -3.0
    ));
    assert!(store.is_empty());
}

#[test]
fn unknown_leaf_type_names_the_criterion() {
    let (engine, _) = build_engine();
    let mut request = wp_tree_request();
    request.criteria[1].subcriteria[0].kind = Some("cheap".to_string());

    let err = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap_err();

    match err {
        EngineError::Scoring(ScoringError::UnknownCriterionType { value, column }) => {
            assert_eq!(value, "cheap");
            assert_eq!(column, ColumnRef::Named("Price".to_string()));
        }
        other => panic!("expected unknown criterion type, got {other:?}"),
    }
}

#[test]
fn wp_tree_normalizes_unscaled_weights() {
    let (engine, store) = build_engine();

    let scores = engine
        .weighted_product_with_subcriteria(&wp_tree_request())
        .expect("tree wp succeeds");

    assert_within(scores["Supplier A"], 0.543_045_5, 1e-6);
    assert_within(scores["Supplier B"], 0.456_954_5, 1e-6);
    assert_within(scores.values().sum(), 1.0, 1e-9);

    let records = store.stream().unwrap();
    assert_eq!(records[0].method, ScoringMethod::WeightedProductWithSubcriteria);
    let weights = &records[0].criteria_weights;
    assert_within(weights[0], 0.6, 1e-12);
    assert_within(weights[1], 0.2, 1e-12);
    assert_within(weights[2], 0.2, 1e-12);
}

#[test]
fn wp_tree_accepts_normalized_weights_unchanged() {
    let (engine, _) = build_engine();
    let request = crate::scoring::domain::HierarchicalRequest {
        criteria: saw_criteria(),
        decision_matrix: alternatives(),
    };

    let from_normalized = engine.weighted_product_with_subcriteria(&request).unwrap();
    let from_raw = engine
        .weighted_product_with_subcriteria(&wp_tree_request())
        .unwrap();

    for (name, score) in &from_normalized {
        assert_within(*score, from_raw[name], 1e-9);
    }
}

#[test]
fn wp_tree_rejects_zero_sibling_total() {
    let (engine, _) = build_engine();
    let mut request = wp_tree_request();
    request.criteria[1] = Criterion::parent(
        "Cost",
        2.0,
        vec![
            Criterion::leaf("Price", 0.0, CriterionType::Cost),
            Criterion::leaf("Maintenance", 0.0, CriterionType::Cost),
        ],
    );

    let err = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap_err();

    assert!(err.to_string().contains("criterion 'Cost' must not be zero"));
}

#[test]
fn wp_tree_checks_sibling_weights_before_reading_values() {
    let (engine, store) = build_engine();
    let mut request = wp_tree_request();
    request.criteria[1].subcriteria[0].weight = 0.0;
    request.criteria[1].subcriteria[1].weight = 0.0;
    request.decision_matrix[0].criteria_scores.remove("Price");
    request.decision_matrix[1]
        .criteria_scores
        .insert("Quality".to_string(), -1.0);

    let err = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap_err();

    match err {
        EngineError::Scoring(ScoringError::WeightNormalization(message)) => {
            assert!(message.contains("criterion 'Cost'"), "{message}");
        }
        other => panic!("expected weight normalization failure, got {other:?}"),
    }
    assert!(store.is_empty());
}

#[test]
fn wp_tree_rejects_non_positive_leaf_weight() {
    let (engine, _) = build_engine();
    let mut request = wp_tree_request();
    request.criteria[0].weight = 0.0;

    let err = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap_err();

    assert!(err.to_string().contains("'Quality'"));
}

#[test]
fn score_range_rescales_tree_results() {
    let options = ScoringOptions {
        score_range: Some(ScoreRange {
            low: 1.0,
            high: 5.0,
        }),
        round_decimals: None,
    };
    let (engine, _) = build_engine_with(options);

    let scores = engine
        .weighted_product_with_subcriteria(&wp_tree_request())
        .unwrap();

    assert_within(scores["Supplier A"], 5.0, 1e-12);
    assert_within(scores["Supplier B"], 1.0, 1e-12);
}

#[test]
fn score_range_maps_ties_to_midpoint() {
    let options = ScoringOptions {
        score_range: Some(ScoreRange {
            low: 1.0,
            high: 5.0,
        }),
        round_decimals: None,
    };
    let (engine, _) = build_engine_with(options);
    let mut request = wp_tree_request();
    request.decision_matrix[1] = alternative(
        "Supplier B",
        &[("Quality", 80.0), ("Price", 100.0), ("Maintenance", 20.0)],
    );

    let scores = engine
        .weighted_product_with_subcriteria(&request)
        .unwrap();

    assert_within(scores["Supplier A"], 3.0, 1e-12);
    assert_within(scores["Supplier B"], 3.0, 1e-12);
}

#[test]
fn rounding_applies_to_tree_results_only() {
    let options = ScoringOptions {
        score_range: None,
        round_decimals: Some(4),
    };
    let (engine, _) = build_engine_with(options);

    let tree = engine
        .weighted_product_with_subcriteria(&wp_tree_request())
        .unwrap();
    let flat = engine
        .simple_additive_weighting(&benefit_request())
        .unwrap();

    assert_eq!(tree["Supplier A"], 0.543);
    assert_eq!(tree["Supplier B"], 0.457);
    assert_ne!(flat[0], 0.8889);
}

#[test]
fn score_dispatches_on_request_shape() {
    let (engine, store) = build_engine();
    let flat: ScoringRequest = serde_json::from_value(serde_json::json!({
        "criteria_weights": [0.5, 0.5],
        "decision_matrix": [[80.0, 70.0], [60.0, 90.0]],
        "criteria_types": ["benefit", "benefit"]
    }))
    .expect("flat request parses");
    let tree = ScoringRequest::Hierarchical(saw_tree_request());

    let positional = engine.score(MethodFamily::Saw, &flat).unwrap();
    let named = engine.score(MethodFamily::Wp, &tree).unwrap();

    assert!(matches!(positional, ScoreResult::Positional(ref scores) if scores.len() == 2));
    assert!(matches!(named, ScoreResult::Named(ref scores) if scores.contains_key("Supplier B")));

    let methods: Vec<ScoringMethod> = store
        .stream()
        .unwrap()
        .into_iter()
        .map(|record| record.method)
        .collect();
    assert_eq!(
        methods,
        vec![
            ScoringMethod::SimpleAdditiveWeighting,
            ScoringMethod::WeightedProductWithSubcriteria
        ]
    );
}
