use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::domain::{FlatRequest, HierarchicalRequest, MethodFamily, ScoreResult, ScoringMethod};
use super::engine::{EngineError, ScoringEngine};
use super::repository::ResultStore;

/// Payload of the save endpoints: a result computed elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub criteria_weights: Vec<f64>,
    pub decision_matrix: Vec<Vec<f64>>,
    pub scores: ScoreResult,
}

/// Router exposing one route group per method family (`/saw/...`, `/wp/...`).
pub fn scoring_router<S>(engine: Arc<ScoringEngine<S>>) -> Router
where
    S: ResultStore + 'static,
{
    Router::new()
        .route("/:family/calculate", post(calculate_handler::<S>))
        .route("/:family/v2/calculate", post(calculate_tree_handler::<S>))
        .route("/:family/save", post(save_handler::<S>))
        .route("/:family/results", get(results_handler::<S>))
        .with_state(engine)
}

pub(crate) async fn calculate_handler<S>(
    State(engine): State<Arc<ScoringEngine<S>>>,
    Path(family): Path<MethodFamily>,
    Json(request): Json<FlatRequest>,
) -> Response
where
    S: ResultStore + 'static,
{
    let outcome = match family {
        MethodFamily::Saw => engine.simple_additive_weighting(&request),
        MethodFamily::Wp => engine.weighted_product(&request),
    };
    match outcome {
        Ok(scores) => (StatusCode::OK, Json(json!({ "scores": scores }))).into_response(),
        Err(err) => failure_response(family, err),
    }
}

pub(crate) async fn calculate_tree_handler<S>(
    State(engine): State<Arc<ScoringEngine<S>>>,
    Path(family): Path<MethodFamily>,
    Json(request): Json<HierarchicalRequest>,
) -> Response
where
    S: ResultStore + 'static,
{
    let outcome = match family {
        MethodFamily::Saw => engine.simple_additive_weighting_with_subcriteria(&request),
        MethodFamily::Wp => engine.weighted_product_with_subcriteria(&request),
    };
    match outcome {
        Ok(scores) => (StatusCode::OK, Json(json!({ "scores": scores }))).into_response(),
        Err(err) => failure_response(family, err),
    }
}

pub(crate) async fn save_handler<S>(
    State(engine): State<Arc<ScoringEngine<S>>>,
    Path(family): Path<MethodFamily>,
    Json(request): Json<SaveRequest>,
) -> Response
where
    S: ResultStore + 'static,
{
    let SaveRequest {
        criteria_weights,
        decision_matrix,
        scores,
    } = request;
    match engine.save(
        ScoringMethod::flat(family),
        criteria_weights,
        decision_matrix,
        scores,
    ) {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Results saved successfully." })),
        )
            .into_response(),
        Err(err) => failure_response(family, err),
    }
}

pub(crate) async fn results_handler<S>(
    State(engine): State<Arc<ScoringEngine<S>>>,
    Path(family): Path<MethodFamily>,
) -> Response
where
    S: ResultStore + 'static,
{
    match engine.results() {
        Ok(results) => (StatusCode::OK, Json(json!({ "results": results }))).into_response(),
        Err(err) => failure_response(family, err),
    }
}

fn failure_response(family: MethodFamily, err: EngineError) -> Response {
    match err {
        EngineError::Scoring(err) => {
            warn!(?family, error = %err, "rejected scoring request");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": err.to_string() })),
            )
                .into_response()
        }
        EngineError::Store(err) => {
            error!(?family, error = %err, "result store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
