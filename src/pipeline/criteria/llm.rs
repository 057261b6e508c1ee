use serde::Deserialize;

use super::types::Criterion;
use crate::pipeline::llm::{parse_first_object, sanitize_llm_output, LlmClient, LlmError};
use crate::pipeline::text::{normalize_digits, truncate_chars};

const CRITERIA_SYSTEM_PROMPT: &str =
    "أنت خبير في تحليل كراسات الشروط والمواصفات للمناقصات وتحديد معايير التقييم الفني وأوزانها.";

pub fn build_criteria_prompt(terms_text: &str) -> String {
    format!(
        r#"حلل نص كراسة الشروط التالي واستخرج معايير التقييم الفني وأوزانها.

التعليمات:
1. ابحث عن قسم "معايير التقييم" أو "أسس المفاضلة" أو "جدول الدرجات"، وقد يرد القسم في ملحق بعد الإشارة إليه بما يصل إلى 3 صفحات.
2. استخرج لكل معيار: الاسم، والوزن كنسبة مئوية (عدد صحيح)، ووصفاً مختصراً.
3. إذا وردت الأوزان بالنقاط أو الدرجات فحوّلها إلى نسب مئوية يكون مجموعها 100.
4. إذا لم تجد جدولاً للمعايير في النص، اقترح خمسة معايير قياسية لمناقصات خدمات دعم أنظمة تخطيط موارد المؤسسات (ERP) مجموع أوزانها 100.

أعد النتيجة بصيغة JSON فقط دون أي نص إضافي:
{{"criteria": [{{"name": "اسم المعيار", "weight": 30, "description": "وصف المعيار"}}]}}

نص الكراسة:
{terms_text}"#
    )
}

#[derive(Debug, Deserialize)]
struct CriteriaPayload {
    #[serde(default)]
    criteria: Vec<RawCriterion>,
}

/// Models return weights as numbers, numeric strings (`"30%"`), or null,
/// and sometimes null names or descriptions.
#[derive(Debug, Deserialize)]
struct RawCriterion {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    weight: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
}

fn lenient_weight(value: &serde_json::Value) -> Option<u32> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let digits = normalize_digits(s);
            digits
                .trim()
                .trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.')
                .trim()
                .parse::<f64>()
                .ok()?
        }
        _ => return None,
    };
    (0.0..=100.0).contains(&number).then(|| number.round() as u32)
}

/// Ask the LLM for the rubric. `Ok(None)` when the answer names no criteria.
pub fn detect_with_llm(
    client: &dyn LlmClient,
    terms_text: &str,
    max_chars: usize,
) -> Result<Option<Vec<Criterion>>, LlmError> {
    let prompt = build_criteria_prompt(truncate_chars(terms_text, max_chars));
    let raw = client.generate(&prompt, CRITERIA_SYSTEM_PROMPT)?;
    let payload: CriteriaPayload = parse_first_object(&sanitize_llm_output(&raw))?;

    let criteria: Vec<Criterion> = payload
        .criteria
        .into_iter()
        .filter_map(|c| {
            let name = c.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
            let description = c.description.as_deref().unwrap_or("").trim();
            Some(Criterion::new(name, lenient_weight(&c.weight), description))
        })
        .collect();

    Ok((!criteria.is_empty()).then_some(criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::{FailingLlmClient, MockLlmClient};
    use serde_json::json;

    #[test]
    fn parses_wrapped_response() {
        let client = MockLlmClient::new(
            "إليك النتيجة:\n```json\n{\"criteria\": [{\"name\": \"الخبرة\", \"weight\": 60, \"description\": \"سنوات\"}, {\"name\": \"السعر\", \"weight\": \"40%\"}]}\n```",
        );
        let criteria = detect_with_llm(&client, "نص", 1000).unwrap().unwrap();
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria[0].weight, Some(60));
        assert_eq!(criteria[1].weight, Some(40));
        assert_eq!(criteria[1].description, "");
    }

    #[test]
    fn nameless_and_empty_lists_yield_none() {
        let client = MockLlmClient::new("{\"criteria\": [{\"name\": \"  \", \"weight\": 50}]}");
        assert!(detect_with_llm(&client, "x", 100).unwrap().is_none());
    }

    #[test]
    fn null_fields_keep_the_rest_of_the_rubric() {
        let client = MockLlmClient::new(
            r#"{"criteria": [
                {"name": "الخبرة", "weight": 50, "description": null},
                {"name": null, "weight": 10, "description": "بلا اسم"},
                {"name": "المنهجية", "weight": 30, "description": "خطة العمل"},
                {"name": "فريق العمل", "weight": 20}
            ]}"#,
        );
        let criteria = detect_with_llm(&client, "نص", 1000).unwrap().unwrap();
        let names: Vec<&str> = criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["الخبرة", "المنهجية", "فريق العمل"]);
        assert_eq!(criteria[0].description, "");
        assert_eq!(criteria[1].description, "خطة العمل");
    }

    #[test]
    fn prose_only_is_an_error() {
        let client = MockLlmClient::new("I could not find any criteria.");
        assert!(matches!(
            detect_with_llm(&client, "x", 100),
            Err(LlmError::NoJson("object"))
        ));
    }

    #[test]
    fn outage_is_an_error() {
        assert!(detect_with_llm(&FailingLlmClient::new(), "x", 100).is_err());
    }

    #[test]
    fn lenient_weights() {
        assert_eq!(lenient_weight(&json!(25)), Some(25));
        assert_eq!(lenient_weight(&json!(12.6)), Some(13));
        assert_eq!(lenient_weight(&json!("٣٠٪")), Some(30));
        assert_eq!(lenient_weight(&json!("15 points")), Some(15));
        assert_eq!(lenient_weight(&json!(null)), None);
        assert_eq!(lenient_weight(&json!(150)), None);
        assert_eq!(lenient_weight(&json!("high")), None);
    }

    #[test]
    fn prompt_embeds_terms_text() {
        let prompt = build_criteria_prompt("كراسة توريد أجهزة");
        assert!(prompt.contains("كراسة توريد أجهزة"));
        assert!(prompt.contains("\"criteria\""));
        assert!(prompt.contains("ERP"));
    }
}
