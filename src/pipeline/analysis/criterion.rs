use serde_json::Value;

use super::keywords::keyword_fallback_analysis;
use super::prompt::{build_criterion_prompt, ANALYST_SYSTEM_PROMPT};
use super::types::{AnalysisSource, CriterionAnalysis};
use crate::pipeline::criteria::Criterion;
use crate::pipeline::llm::{parse_first_object, sanitize_llm_output, LlmClient, LlmError};
use crate::pipeline::strategy::{first_success, Strategy, StrategyOutcome};
use crate::pipeline::text::{truncate_chars, truncate_with_ellipsis};

/// Score substituted for a malformed LLM score.
pub const MALFORMED_SCORE_SENTINEL: u32 = 50;

/// Evidence quotes are cut to this many characters.
pub const MAX_EVIDENCE_CHARS: usize = 200;

/// Score one criterion: LLM first, keyword estimate when that fails.
pub fn analyze_criterion(
    client: &dyn LlmClient,
    proposal_text: &str,
    criterion: &Criterion,
    company_name: &str,
    max_chars: usize,
) -> CriterionAnalysis {
    let strategies: [Strategy<str, CriterionAnalysis>; 2] = [
        Strategy::new("llm", |text: &str| {
            StrategyOutcome::from_result(
                llm_criterion_analysis(client, text, criterion, company_name, max_chars).map(Some),
            )
        }),
        Strategy::new("keyword", |text: &str| {
            StrategyOutcome::Found(keyword_fallback_analysis(text, &criterion.name))
        }),
    ];

    match first_success(proposal_text, &strategies) {
        Ok(resolution) => {
            if let Some(attempt) = resolution.skipped.first() {
                tracing::warn!(
                    company = company_name,
                    criterion = %criterion.name,
                    reason = %attempt,
                    "LLM criterion analysis failed, using keyword estimate"
                );
            }
            resolution.value
        }
        Err(_) => keyword_fallback_analysis(proposal_text, &criterion.name),
    }
}

fn llm_criterion_analysis(
    client: &dyn LlmClient,
    proposal_text: &str,
    criterion: &Criterion,
    company_name: &str,
    max_chars: usize,
) -> Result<CriterionAnalysis, LlmError> {
    let excerpt = truncate_chars(proposal_text, max_chars);
    let prompt = build_criterion_prompt(company_name, criterion, excerpt);
    let raw = client.generate(&prompt, ANALYST_SYSTEM_PROMPT)?;
    let payload: Value = parse_first_object(&sanitize_llm_output(&raw))?;

    Ok(CriterionAnalysis {
        criterion_name: criterion.name.clone(),
        score: coerce_score(payload.get("score")),
        strengths: string_list(payload.get("strengths")),
        weaknesses: string_list(payload.get("weaknesses")),
        evidence: string_list(payload.get("evidence"))
            .into_iter()
            .map(|e| truncate_with_ellipsis(&e, MAX_EVIDENCE_CHARS))
            .collect(),
        justification: payload
            .get("justification")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        source: AnalysisSource::Llm,
    })
}

/// JSON numbers within 0–100 are kept (rounded); anything else, including
/// a missing field, becomes the sentinel.
pub fn coerce_score(value: Option<&Value>) -> u32 {
    match value.and_then(Value::as_f64) {
        Some(score) if (0.0..=100.0).contains(&score) => score.round() as u32,
        _ => MALFORMED_SCORE_SENTINEL,
    }
}

/// Array of strings (non-strings skipped) or a lone string.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
