//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::AppState;
use crate::pipeline::orchestrator::HealthReport;

#[derive(Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub report: HealthReport,
}

/// `GET /api/health`: LLM reachability plus per-stage error rates.
///
/// Always answers 200; degradation is reported in the body.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.evaluator.health_check().await;
    Json(HealthResponse {
        service: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        report,
    })
}
