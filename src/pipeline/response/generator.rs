use std::sync::Arc;

use super::justify::justify;
use super::summary::evaluation_summary;
use super::types::{ChosenCompany, GeneratedResponse, ResponseEnvelope};
use super::validate::validate_envelope;
use crate::pipeline::analysis::ProposalAnalysis;
use crate::pipeline::criteria::Criterion;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::scoring::Ranking;

/// Builds the final envelope with justified winners.
pub struct ResponseGenerator {
    llm: Arc<dyn LlmClient>,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// The validation report is attached, never enforced here.
    pub fn generate(
        &self,
        ranking: &Ranking,
        analyses: &[ProposalAnalysis],
        criteria: &[Criterion],
    ) -> GeneratedResponse {
        let chosen: Vec<ChosenCompany> = ranking
            .chosen
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let analysis = analyses.iter().find(|a| a.company_name == score.company);
                if analysis.is_none() {
                    tracing::warn!(company = %score.company, "No analysis for chosen company, using generic reasons");
                }
                ChosenCompany {
                    company: score.company.clone(),
                    total_score: score.total_score,
                    rank: score.rank.unwrap_or(i + 1),
                    reasons: justify(self.llm.as_ref(), analysis, score.total_score),
                }
            })
            .collect();

        let evaluation_summary = evaluation_summary(&chosen, ranking.not_chosen.len());
        let envelope = ResponseEnvelope {
            chosen,
            not_chosen: ranking.not_chosen.clone(),
            evaluation_criteria: criteria.to_vec(),
            evaluation_summary,
        };
        let validation = validate_envelope(&envelope);
        if !validation.is_valid {
            tracing::warn!(issues = ?validation.issues, "Response envelope failed validation");
        }

        GeneratedResponse { envelope, validation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::FailingLlmClient;
    use crate::pipeline::scoring::weights::tests::analysis;
    use crate::pipeline::scoring::Scorer;

    #[test]
    fn envelope_is_valid_even_during_outage() {
        let criteria = vec![Criterion::new("a", Some(50), ""), Criterion::new("b", Some(50), "")];
        let analyses = vec![
            analysis("Alpha", &[("a", 90), ("b", 80)]),
            analysis("Beta", &[("a", 70), ("b", 60)]),
            analysis("Gamma", &[("a", 50), ("b", 55)]),
        ];
        let scorer = Scorer::new(false);
        let outcome = scorer.score(&analyses, &criteria).unwrap();
        let ranking = scorer.rank(outcome.company_scores, 2).unwrap();

        let generated = ResponseGenerator::new(Arc::new(FailingLlmClient::new()))
            .generate(&ranking, &analyses, &criteria);

        assert!(generated.validation.is_valid, "{:?}", generated.validation.issues);
        let chosen = &generated.envelope.chosen;
        assert_eq!(chosen.len(), 2);
        assert_eq!(chosen[0].company, "Alpha");
        assert_eq!(chosen[0].rank, 1);
        assert!(chosen.iter().all(|c| (3..=4).contains(&c.reasons.len())));
        assert_eq!(generated.envelope.not_chosen[0].company, "Gamma");
        assert_eq!(generated.envelope.evaluation_summary.total_companies_evaluated, 3);
        assert_eq!(generated.envelope.evaluation_criteria, criteria);
    }
}
