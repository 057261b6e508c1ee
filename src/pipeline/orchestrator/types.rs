use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EVALUATION_PHASES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PdfProcessing,
    CriteriaDetection,
    ProposalAnalysis,
    Scoring,
    ResponseGeneration,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::PdfProcessing,
        Stage::CriteriaDetection,
        Stage::ProposalAnalysis,
        Stage::Scoring,
        Stage::ResponseGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfProcessing => "pdf_processing",
            Self::CriteriaDetection => "criteria_detection",
            Self::ProposalAnalysis => "proposal_analysis",
            Self::Scoring => "scoring",
            Self::ResponseGeneration => "response_generation",
        }
    }

    /// Human-readable phase name reported in workflow metadata.
    pub fn phase(&self) -> &'static str {
        EVALUATION_PHASES[*self as usize]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Failed,
}

/// What one stage did during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Seconds.
    pub processing_time: f64,
    pub summary: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// RFC 3339.
    pub start_time: String,
    pub terms_file: String,
    pub proposal_count: usize,
    pub top_n: usize,
}

/// One evaluation run as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    pub final_result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub processing_time: f64,
    pub agent_results: BTreeMap<String, StageReport>,
    pub metadata: WorkflowMetadata,
}

impl WorkflowResult {
    pub fn running(workflow_id: String, metadata: WorkflowMetadata) -> Self {
        Self {
            workflow_id,
            status: WorkflowStatus::Running,
            final_result: None,
            error_message: None,
            processing_time: 0.0,
            agent_results: BTreeMap::new(),
            metadata,
        }
    }

    pub fn record_stage(&mut self, report: StageReport) {
        self.agent_results.insert(report.stage.as_str().to_string(), report);
    }
}

/// `workflow_` followed by eight hex characters.
pub fn new_workflow_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("workflow_{}", &simple[..8])
}
