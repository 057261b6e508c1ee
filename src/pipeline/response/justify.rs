//! Arabic justification sentences for selected companies.

use serde_json::{json, Value};

use crate::pipeline::analysis::{CriterionAnalysis, ProposalAnalysis};
use crate::pipeline::llm::{parse_first_array, sanitize_llm_output, LlmClient, LlmError};

pub const MIN_REASONS: usize = 3;
pub const MAX_REASONS: usize = 4;

const STRONG_CRITERION_SCORE: u32 = 75;
const MAX_EVIDENCE_IN_REASON: usize = 100;
const MAX_LLM_REASON_WORDS: usize = 25;
const MIN_LLM_REASON_CHARS: usize = 10;

/// Padding used when fewer than three reasons could be produced.
pub const GENERIC_REASON_POOL: [&str; 4] = [
    "تمتلك الشركة خبرة سابقة في مجال المشروع",
    "قدمت الشركة عرضاً فنياً متكاملاً",
    "أظهرت الشركة فهماً جيداً لمتطلبات المشروع",
    "تتوافق مؤهلات الشركة مع احتياجات المشروع",
];

const REASONS_SYSTEM_PROMPT: &str = "أنت خبير في صياغة تبريرات اختيار الشركات في العطاءات الحكومية.";

fn band_word(score: u32) -> &'static str {
    if score >= 85 {
        "ممتازة"
    } else if score >= 70 {
        "جيدة"
    } else {
        "مقبولة"
    }
}

pub fn criterion_reason(analysis: &CriterionAnalysis, strength: &str) -> String {
    let mut reason = format!(
        "حققت الشركة نتائج {} في معيار {}",
        band_word(analysis.score),
        analysis.criterion_name
    );
    if !strength.is_empty() {
        reason.push_str(&format!(" حيث {strength}"));
    }
    if let Some(evidence) = analysis.evidence.first() {
        if evidence.chars().count() < MAX_EVIDENCE_IN_REASON {
            reason.push_str(&format!(" وقد تبين ذلك من خلال {evidence}"));
        }
    }
    reason
}

/// Sentences from the analysis alone: strong top-3 criteria plus the lead
/// overall strength.
pub fn analysis_reasons(analysis: &ProposalAnalysis) -> Vec<String> {
    let mut ranked: Vec<&CriterionAnalysis> = analysis.criterion_analyses.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let mut reasons: Vec<String> = ranked
        .into_iter()
        .take(3)
        .filter(|a| a.score >= STRONG_CRITERION_SCORE)
        .filter_map(|a| a.strengths.first().map(|s| criterion_reason(a, s)))
        .collect();

    if let Some(strength) = analysis.overall_analysis.overall_strengths.first() {
        reasons.push(format!(
            "أظهرت الشركة {strength} مما يؤكد قدرتها على تنفيذ المشروع بنجاح"
        ));
    }
    reasons
}

pub fn build_reasons_prompt(analysis: &ProposalAnalysis) -> String {
    let summary: Vec<Value> = analysis
        .criterion_analyses
        .iter()
        .map(|a| {
            json!({
                "معيار": a.criterion_name,
                "درجة": a.score,
                "نقاط_قوة": a.strengths,
            })
        })
        .collect();

    format!(
        r#"الشركة: {company}
تقييم المعايير: {summary}

اكتب 2-3 جمل تبريرية باللغة العربية توضح أسباب اختيار هذه الشركة.
كل جملة يجب أن تكون واضحة ومهنية، تركز على نقطة قوة محددة، ولا تتجاوز 25 كلمة.

أرجع النتيجة كقائمة JSON فقط:
["السبب الأول", "السبب الثاني", "السبب الثالث"]"#,
        company = analysis.company_name,
        summary = Value::Array(summary),
    )
}

/// Extra sentences from the LLM, filtered to usable lengths.
pub fn llm_reasons(client: &dyn LlmClient, analysis: &ProposalAnalysis) -> Result<Vec<String>, LlmError> {
    let raw = client.generate(&build_reasons_prompt(analysis), REASONS_SYSTEM_PROMPT)?;
    let items: Vec<Value> = parse_first_array(&sanitize_llm_output(&raw))?;
    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|r| r.chars().count() > MIN_LLM_REASON_CHARS)
        .filter(|r| r.split_whitespace().count() <= MAX_LLM_REASON_WORDS)
        .map(str::to_string)
        .collect())
}

/// Four sentences parameterized only by the total.
pub fn fallback_reasons(total_score: f64) -> Vec<String> {
    let closing = if total_score >= 85.0 {
        "حققت الشركة أداءً متميزاً في جميع معايير التقييم"
    } else if total_score >= 75.0 {
        "أظهرت الشركة كفاءة عالية في المعايير الأساسية للمشروع"
    } else {
        "استوفت الشركة الحد الأدنى من المتطلبات الفنية"
    };
    vec![
        format!("حققت الشركة درجة إجمالية {total_score} في التقييم الفني"),
        "أظهرت الشركة التزاماً بمتطلبات كراسة الشروط والمواصفات".to_string(),
        "تتمتع الشركة بالمؤهلات الفنية المطلوبة لتنفيذ المشروع".to_string(),
        closing.to_string(),
    ]
}

/// Truncate to four, or pad to three from the generic pool without repeats.
pub fn clamp_reasons(mut reasons: Vec<String>) -> Vec<String> {
    reasons.truncate(MAX_REASONS);
    for candidate in GENERIC_REASON_POOL {
        if reasons.len() >= MIN_REASONS {
            break;
        }
        if !reasons.iter().any(|r| r == candidate) {
            reasons.push(candidate.to_string());
        }
    }
    reasons
}

/// Full reason list for one chosen company, always 3–4 entries.
pub fn justify(client: &dyn LlmClient, analysis: Option<&ProposalAnalysis>, total_score: f64) -> Vec<String> {
    let Some(analysis) = analysis else {
        return clamp_reasons(fallback_reasons(total_score));
    };

    let mut reasons = analysis_reasons(analysis);
    if reasons.len() < MIN_REASONS {
        match llm_reasons(client, analysis) {
            Ok(extra) => reasons.extend(extra),
            Err(e) => tracing::warn!(
                company = %analysis.company_name,
                error = %e,
                "LLM justification top-up failed"
            ),
        }
    }
    clamp_reasons(reasons)
}
