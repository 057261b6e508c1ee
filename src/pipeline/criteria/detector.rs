use std::sync::Arc;

use super::defaults::default_criteria;
use super::llm::detect_with_llm;
use super::normalize::{normalize_criteria, validate_criteria};
use super::pattern::detect_by_pattern;
use super::types::{CriteriaDetection, Criterion, DetectionMethod};
use crate::pipeline::llm::LlmClient;
use crate::pipeline::strategy::{first_success, Strategy, StrategyOutcome};

/// Pattern scan → LLM extraction → static defaults, then normalization.
pub struct CriteriaDetector {
    llm: Arc<dyn LlmClient>,
    max_terms_chars: usize,
}

impl CriteriaDetector {
    pub fn new(llm: Arc<dyn LlmClient>, max_terms_chars: usize) -> Self {
        Self { llm, max_terms_chars }
    }

    /// Never fails: the last tier always produces the default rubric.
    pub fn detect(&self, terms_text: &str) -> CriteriaDetection {
        let _span = tracing::info_span!("criteria_detection", chars = terms_text.len()).entered();

        let strategies: [Strategy<str, (DetectionMethod, Vec<Criterion>)>; 3] = [
            Strategy::new("pattern", |text: &str| match detect_by_pattern(text) {
                Some(found) => StrategyOutcome::Found((DetectionMethod::Pattern, found)),
                None => StrategyOutcome::Empty,
            }),
            Strategy::new("llm", |text: &str| {
                StrategyOutcome::from_result(
                    detect_with_llm(self.llm.as_ref(), text, self.max_terms_chars)
                        .map(|found| found.map(|c| (DetectionMethod::Llm, c))),
                )
            }),
            Strategy::new("default", |_: &str| {
                StrategyOutcome::Found((DetectionMethod::Default, default_criteria()))
            }),
        ];

        let (method, raw, skipped) = match first_success(terms_text, &strategies) {
            Ok(resolution) => {
                let (method, raw) = resolution.value;
                (method, raw, resolution.skipped)
            }
            // The default tier always succeeds; keep the compiler honest anyway.
            Err(skipped) => (DetectionMethod::Default, default_criteria(), skipped),
        };

        let has_weights = raw.iter().all(|c| c.weight.is_some());
        let criteria = normalize_criteria(raw);
        let validation = validate_criteria(&criteria);

        tracing::info!(
            method = %method,
            count = criteria.len(),
            has_weights,
            "Criteria detected"
        );
        if !validation.is_valid {
            tracing::warn!(issues = ?validation.issues, "Rubric validation issues");
        }

        CriteriaDetection {
            total_criteria: criteria.len(),
            criteria,
            method,
            has_weights,
            skipped,
            validation,
        }
    }
}
