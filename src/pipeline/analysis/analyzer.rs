use std::sync::Arc;

use super::criterion::analyze_criterion;
use super::overall::analyze_overall;
use super::quality::assess_quality;
use super::types::{AnalysisFailure, BatchAnalysis, ProposalAnalysis, ProposalInput};
use super::AnalysisError;
use crate::pipeline::criteria::Criterion;
use crate::pipeline::fanout::scatter_gather;
use crate::pipeline::llm::LlmClient;

/// Scores proposals against a rubric.
pub struct ProposalAnalyzer {
    llm: Arc<dyn LlmClient>,
    max_proposal_chars: usize,
    overall_sample_chars: usize,
}

impl ProposalAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, max_proposal_chars: usize, overall_sample_chars: usize) -> Self {
        Self {
            llm,
            max_proposal_chars,
            overall_sample_chars,
        }
    }

    /// Criteria are scored one after another, then one overall call.
    pub fn analyze_proposal(
        &self,
        input: &ProposalInput,
        criteria: &[Criterion],
    ) -> Result<ProposalAnalysis, AnalysisError> {
        if input.text.trim().is_empty() {
            return Err(AnalysisError::EmptyProposal {
                company_name: input.company_name.clone(),
            });
        }
        if criteria.is_empty() {
            return Err(AnalysisError::NoCriteria);
        }

        let _span = tracing::info_span!("proposal_analysis", company = %input.company_name).entered();

        let criterion_analyses: Vec<_> = criteria
            .iter()
            .map(|criterion| {
                analyze_criterion(
                    self.llm.as_ref(),
                    &input.text,
                    criterion,
                    &input.company_name,
                    self.max_proposal_chars,
                )
            })
            .collect();

        let overall_analysis = analyze_overall(
            self.llm.as_ref(),
            &input.text,
            criteria,
            &input.company_name,
            self.overall_sample_chars,
        );
        let proposal_quality = assess_quality(&criterion_analyses);

        tracing::info!(
            quality = proposal_quality.quality_score,
            level = %proposal_quality.quality_level,
            "Proposal analyzed"
        );

        Ok(ProposalAnalysis {
            company_name: input.company_name.clone(),
            criterion_analyses,
            overall_analysis,
            proposal_quality,
        })
    }

    /// Analyze every proposal with at most `concurrency` in flight.
    ///
    /// A proposal that errors or panics lands in `failed_analyses`; the
    /// rest carry on.
    pub async fn analyze_batch(
        self: Arc<Self>,
        proposals: Vec<ProposalInput>,
        criteria: Arc<Vec<Criterion>>,
        concurrency: usize,
    ) -> BatchAnalysis {
        let names: Vec<String> = proposals.iter().map(|p| p.company_name.clone()).collect();

        let results = scatter_gather(proposals, concurrency, move |input: ProposalInput| {
            self.analyze_proposal(&input, &criteria)
        })
        .await;

        let mut batch = BatchAnalysis::default();
        for (company_name, result) in names.into_iter().zip(results) {
            match result {
                Ok(analysis) => batch.analyses.push(analysis),
                Err(error) => {
                    tracing::warn!(company = %company_name, error = %error, "Proposal analysis failed");
                    batch.failed_analyses.push(AnalysisFailure { company_name, error });
                }
            }
        }

        tracing::info!(
            analyzed = batch.analyses.len(),
            failed = batch.failed_analyses.len(),
            "Batch analysis finished"
        );
        batch
    }
}
