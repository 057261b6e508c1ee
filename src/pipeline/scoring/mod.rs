//! Analyses + rubric → weighted totals, ranking, and statistics.

pub mod types;
pub mod stats;
pub mod weights;
pub mod rank;
pub mod distribution;

pub use types::*;
pub use stats::score_statistics;
pub use weights::*;
pub use rank::*;
pub use distribution::*;

use crate::pipeline::analysis::ProposalAnalysis;
use crate::pipeline::criteria::Criterion;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("No successful analyses to score")]
    NoAnalyses,

    #[error("No evaluation criteria to score against")]
    NoCriteria,
}

/// Turns analyses into ranked company scores.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    normalize: bool,
}

impl Scorer {
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    pub fn score(
        &self,
        analyses: &[ProposalAnalysis],
        criteria: &[Criterion],
    ) -> Result<ScoringOutcome, ScoringError> {
        if analyses.is_empty() {
            return Err(ScoringError::NoAnalyses);
        }
        if criteria.is_empty() {
            return Err(ScoringError::NoCriteria);
        }

        let weights = effective_weights(criteria);
        let mut company_scores: Vec<CompanyScore> =
            analyses.iter().map(|a| company_score(a, &weights)).collect();

        let normalization_applied = self.normalize && normalize_totals(&mut company_scores);
        let statistics = score_statistics(&company_scores);

        tracing::info!(
            companies = company_scores.len(),
            mean = statistics.mean,
            normalization_applied,
            "Scores calculated"
        );

        Ok(ScoringOutcome {
            company_scores,
            normalization_applied,
            statistics,
        })
    }

    pub fn rank(&self, scores: Vec<CompanyScore>, top_n: usize) -> Result<Ranking, ScoringError> {
        if scores.is_empty() {
            return Err(ScoringError::NoAnalyses);
        }
        let ranking = rank_companies(scores, top_n);
        if ranking.statistics.close_competition {
            tracing::info!(
                margin = ranking.statistics.margin_to_next,
                "Close competition at the selection cut"
            );
        }
        Ok(ranking)
    }
}
