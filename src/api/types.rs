//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pipeline::orchestrator::{TenderEvaluator, WorkflowResult, WorkflowStatus};

/// Winners picked when the request omits `top_n`.
pub const DEFAULT_TOP_N: usize = 3;
pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

/// Shared state for all API routes.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<TenderEvaluator>,
}

impl AppState {
    pub fn new(evaluator: Arc<TenderEvaluator>) -> Self {
        Self { evaluator }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}

/// Row in the workflow history listing. Omits the full result payload.
#[derive(Debug, Serialize)]
pub struct WorkflowSummary {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    pub processing_time: f64,
    pub start_time: String,
    pub terms_file: String,
    pub proposal_count: usize,
    pub top_n: usize,
    pub error_message: Option<String>,
}

impl From<&WorkflowResult> for WorkflowSummary {
    fn from(w: &WorkflowResult) -> Self {
        Self {
            workflow_id: w.workflow_id.clone(),
            status: w.status,
            processing_time: w.processing_time,
            start_time: w.metadata.start_time.clone(),
            terms_file: w.metadata.terms_file.clone(),
            proposal_count: w.metadata.proposal_count,
            top_n: w.metadata.top_n,
            error_message: w.error_message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<WorkflowSummary>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_defaults_and_clamps() {
        assert_eq!(ListQuery::default().effective_limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(ListQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(ListQuery { limit: Some(5000) }.effective_limit(), MAX_LIST_LIMIT);
    }
}
