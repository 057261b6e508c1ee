use serde_json::Value;

use super::criterion::string_list;
use super::prompt::{build_overall_prompt, ANALYST_SYSTEM_PROMPT};
use super::types::OverallAnalysis;
use crate::pipeline::criteria::Criterion;
use crate::pipeline::llm::{parse_first_object, sanitize_llm_output, LlmClient, LlmError};
use crate::pipeline::text::truncate_chars;

const MAX_OVERALL_POINTS: usize = 3;

/// One LLM call over a bounded sample; generic payload when it fails.
pub fn analyze_overall(
    client: &dyn LlmClient,
    proposal_text: &str,
    criteria: &[Criterion],
    company_name: &str,
    sample_chars: usize,
) -> OverallAnalysis {
    match llm_overall_analysis(client, proposal_text, criteria, company_name, sample_chars) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!(company = company_name, error = %e, "Overall analysis failed, using generic summary");
            fallback_overall_analysis(company_name)
        }
    }
}

fn llm_overall_analysis(
    client: &dyn LlmClient,
    proposal_text: &str,
    criteria: &[Criterion],
    company_name: &str,
    sample_chars: usize,
) -> Result<OverallAnalysis, LlmError> {
    let sample = truncate_chars(proposal_text, sample_chars);
    let prompt = build_overall_prompt(company_name, criteria, sample);
    let raw = client.generate(&prompt, ANALYST_SYSTEM_PROMPT)?;
    let payload: Value = parse_first_object(&sanitize_llm_output(&raw))?;

    let mut strengths = string_list(payload.get("overall_strengths"));
    strengths.truncate(MAX_OVERALL_POINTS);
    let mut weaknesses = string_list(payload.get("overall_weaknesses"));
    weaknesses.truncate(MAX_OVERALL_POINTS);

    let text_field = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(OverallAnalysis {
        overall_strengths: strengths,
        overall_weaknesses: weaknesses,
        overall_quality: text_field("overall_quality").unwrap_or_else(|| "متوسط".to_string()),
        summary: text_field("summary").unwrap_or_else(|| format!("عرض تقني من {company_name}")),
    })
}

pub fn fallback_overall_analysis(company_name: &str) -> OverallAnalysis {
    OverallAnalysis {
        overall_strengths: vec!["عرض فني متكامل".to_string()],
        overall_weaknesses: vec!["يحتاج مراجعة تفصيلية".to_string()],
        overall_quality: "متوسط".to_string(),
        summary: format!("عرض تقني من {company_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::{FailingLlmClient, MockLlmClient};

    #[test]
    fn caps_points_at_three() {
        let client = MockLlmClient::new(
            r#"{"overall_strengths": ["a", "b", "c", "d"], "overall_weaknesses": ["w"], "overall_quality": "جيد", "summary": "عرض قوي"}"#,
        );
        let overall = analyze_overall(&client, "text", &[], "Acme", 1500);
        assert_eq!(overall.overall_strengths, vec!["a", "b", "c"]);
        assert_eq!(overall.overall_weaknesses, vec!["w"]);
        assert_eq!(overall.overall_quality, "جيد");
        assert_eq!(overall.summary, "عرض قوي");
    }

    #[test]
    fn failure_gives_generic_payload() {
        let overall = analyze_overall(&FailingLlmClient::new(), "text", &[], "Acme", 1500);
        assert_eq!(overall, fallback_overall_analysis("Acme"));
        assert_eq!(overall.summary, "عرض تقني من Acme");
    }

    #[test]
    fn missing_label_defaults_to_average() {
        let client = MockLlmClient::new(r#"{"overall_strengths": ["a"]}"#);
        let overall = analyze_overall(&client, "text", &[], "Acme", 1500);
        assert_eq!(overall.overall_quality, "متوسط");
        assert!(overall.overall_weaknesses.is_empty());
    }
}
