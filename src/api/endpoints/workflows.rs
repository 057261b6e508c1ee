//! Workflow lookup endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AppState, ListQuery, WorkflowListResponse, WorkflowSummary};
use crate::pipeline::orchestrator::WorkflowResult;

/// `GET /api/workflows`: finished workflows, most recent first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<WorkflowListResponse> {
    let workflows: Vec<WorkflowSummary> = state
        .evaluator
        .recent_workflows(query.effective_limit())
        .iter()
        .map(WorkflowSummary::from)
        .collect();

    Json(WorkflowListResponse {
        count: workflows.len(),
        workflows,
    })
}

/// `GET /api/workflows/:id`: one workflow, running or finished.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowResult>, ApiError> {
    state
        .evaluator
        .workflow_status(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Workflow {id} not found")))
}
