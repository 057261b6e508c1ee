//! Runs the five stages in order and keeps workflow bookkeeping.
//!
//! ```text
//! validate inputs
//!   → pdf_processing → criteria_detection → proposal_analysis
//!   → scoring → response_generation
//!   → Completed
//!
//! any terminal error → Failed + whole-run fallback envelope
//! ```

pub mod types;
pub mod registry;
pub mod metrics;
pub mod fallback;
pub mod evaluator;

pub use types::*;
pub use registry::WorkflowRegistry;
pub use metrics::*;
pub use fallback::{fallback_envelope, FALLBACK_REASONS};
pub use evaluator::TenderEvaluator;

use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::scoring::ScoringError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Terms document could not be read: {0}")]
    TermsExtraction(#[source] ExtractionError),

    #[error("None of the {failed} proposal documents could be read")]
    NoProposals { failed: usize },

    #[error("None of the proposals could be analyzed")]
    NoAnalyses,

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Response envelope failed validation: {}", .0.join("; "))]
    InvalidEnvelope(Vec<String>),

    #[error("Result serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stage task failed: {0}")]
    Task(String),

    #[error("Evaluation failed and no fallback result could be produced: {0}")]
    Fatal(String),
}

impl PipelineError {
    /// Caller mistakes, as opposed to failures during the run.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
