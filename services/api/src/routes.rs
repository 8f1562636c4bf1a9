use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use mcda::error::AppError;
use mcda::scoring::{scoring_router, ResultStore, ScoringEngine};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_scoring_routes<S>(engine: Arc<ScoringEngine<S>>) -> axum::Router
where
    S: ResultStore + 'static,
{
    scoring_router(engine)
        .route("/", axum::routing::get(connection_check))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

/// Reports how many results the store currently holds.
pub(crate) async fn connection_check(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = state.results.stream()?.len();
    Ok(Json(json!({
        "message": format!("Connected successfully! Collection has {count} documents.")
    })))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use mcda::scoring::{
        InMemoryResultStore, NewRecord, ResultStore, StoreError, StoredRecord,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct OfflineStore;

    impl ResultStore for OfflineStore {
        fn add(&self, _record: NewRecord) -> Result<StoredRecord, StoreError> {
            Err(StoreError::Unavailable("no route to host".to_string()))
        }

        fn stream(&self) -> Result<Vec<StoredRecord>, StoreError> {
            Err(StoreError::Unavailable("no route to host".to_string()))
        }
    }

    fn app_state(results: Arc<dyn ResultStore>, ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            results,
        }
    }

    async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn connection_check_counts_stored_results() {
        let store = Arc::new(InMemoryResultStore::default());
        let engine = Arc::new(ScoringEngine::new(store.clone()));
        let app = with_scoring_routes(engine).layer(Extension(app_state(store, true)));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/saw/calculate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "criteria_weights": [0.5, 0.5],
                            "decision_matrix": [[80.0, 70.0], [60.0, 90.0]],
                            "criteria_types": ["benefit", "benefit"]
                        })
                        .to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(
            body["message"],
            "Connected successfully! Collection has 1 documents."
        );
    }

    #[tokio::test]
    async fn connection_check_reports_store_outage() {
        let Err(err) = connection_check(Extension(app_state(Arc::new(OfflineStore), true))).await
        else {
            panic!("offline store must fail the connection check");
        };

        assert_eq!(
            err.to_string(),
            "Connection failed: result store unavailable: no route to host"
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Connection failed:"));
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let store: Arc<dyn ResultStore> = Arc::new(InMemoryResultStore::default());

        let starting = readiness_endpoint(Extension(app_state(store.clone(), false)))
            .await
            .into_response();
        let ready = readiness_endpoint(Extension(app_state(store, true)))
            .await
            .into_response();

        assert_eq!(starting.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthcheck_is_static() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
