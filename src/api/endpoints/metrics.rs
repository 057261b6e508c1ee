use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::AppState;
use crate::pipeline::orchestrator::MetricsSnapshot;

/// `GET /api/metrics`
pub async fn snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.evaluator.metrics())
}

/// `POST /api/metrics/reset`
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.evaluator.reset_metrics();
    StatusCode::NO_CONTENT
}
