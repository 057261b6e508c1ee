//! Proposal text × rubric → per-criterion scores with rationale.
//!
//! Each criterion gets one LLM call; a failed call falls back to a keyword
//! estimate for that pair only. Proposals are analyzed in parallel under a
//! semaphore, criteria sequentially within a proposal.

pub mod types;
pub mod keywords;
pub mod prompt;
pub mod criterion;
pub mod overall;
pub mod quality;
pub mod analyzer;

pub use types::*;
pub use keywords::*;
pub use criterion::*;
pub use overall::*;
pub use quality::*;
pub use analyzer::*;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Proposal from '{company_name}' has no text to analyze")]
    EmptyProposal { company_name: String },

    #[error("No evaluation criteria supplied")]
    NoCriteria,
}
