use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::conflicts::ConflictSummary;
use crate::dataset::{DelaysView, Overview, SweepView, ThresholdView};
use crate::error::{ApiError, ApiResult};
use crate::predictor::PredictorClient;
use crate::sweep::Scope;
use crate::Dataset;

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub predictor: Arc<PredictorClient>,
}

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub scope: Option<Scope>,
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rentals": state.dataset.rentals().len(),
    }))
}

async fn overview(State(state): State<AppState>) -> Json<Overview> {
    Json(state.dataset.overview())
}

async fn delays(State(state): State<AppState>) -> Json<DelaysView> {
    Json(state.dataset.delays())
}

async fn conflicts(State(state): State<AppState>) -> Json<ConflictSummary> {
    Json(state.dataset.conflicts())
}

async fn thresholds(State(state): State<AppState>) -> Json<SweepView> {
    Json(state.dataset.thresholds())
}

async fn threshold(
    State(state): State<AppState>,
    Path(minutes): Path<u32>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Json<ThresholdView>> {
    state
        .dataset
        .threshold(minutes, q.scope)
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "threshold {} is not one of {:?}",
                minutes,
                state.dataset.ladder().as_slice()
            ))
        })
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(car) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::debug!(url = state.predictor.predict_url(), "forwarding prediction request");
    let prediction = state.predictor.predict(&car).await.map_err(|e| {
        tracing::warn!(error = %e, "prediction request failed");
        ApiError::from(e)
    })?;
    Ok(Json(json!({ "prediction": prediction })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/overview", get(overview))
        .route("/api/delays", get(delays))
        .route("/api/conflicts", get(conflicts))
        .route("/api/thresholds", get(thresholds))
        .route("/api/thresholds/:minutes", get(threshold))
        .route("/api/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
