use crate::pipeline::criteria::Criterion;

pub const ANALYST_SYSTEM_PROMPT: &str =
    "أنت خبير تقييم عروض فنية ومالية لدى جهة حكومية. تلتزم بالأدلة الواردة في النص وتعيد JSON فقط.";

/// Per-criterion scoring prompt. `excerpt` is already truncated.
pub fn build_criterion_prompt(company_name: &str, criterion: &Criterion, excerpt: &str) -> String {
    format!(
        r#"المهمة: قياس مدى استيفاء عرض شركة «{company_name}» لمعيار التقييم التالي مع تبرير الدرجة بالأدلة.

المعيار:
- الاسم: {name}
- الوصف: {description}

مقتطف من العرض (قد يكون مقتطعاً):
"""
{excerpt}
"""

أعد JSON فقط بالبنية التالية دون أي تعليق:
{{
  "score": <عدد صحيح من 0 إلى 100؛ 90 فأكثر ممتاز، 75-89 جيد، 60-74 متوسط، أقل من 60 ضعيف>,
  "strengths": ["..."],
  "weaknesses": ["..."],
  "evidence": ["اقتباس حقيقي من النص لا يتجاوز 200 حرف"],
  "justification": "جملة مختصرة تلخص سبب الدرجة"
}}

تعليمات:
- لا تضف حقولاً ولا تحذف حقولاً.
- إذا لم يرد أي ذكر واضح للمعيار فاجعل الدرجة منخفضة وسجل ضعفاً مناسباً.
- الأدلة اقتباسات حرفية من النص ويمكن تقصيرها بعلامة "...". "#,
        name = criterion.name,
        description = if criterion.description.is_empty() {
            "-"
        } else {
            criterion.description.as_str()
        },
    )
}

/// Whole-proposal prompt asking for strengths, weaknesses, and a label.
pub fn build_overall_prompt(company_name: &str, criteria: &[Criterion], sample: &str) -> String {
    let criteria_list = criteria
        .iter()
        .map(|c| format!("- {} ({}%)", c.name, c.weight_or_zero()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"قدّم تحليلاً عاماً لعرض شركة «{company_name}» في ضوء معايير التقييم التالية:
{criteria_list}

نص العرض (مقتطف):
"""
{sample}
"""

أعد JSON فقط:
{{
  "overall_strengths": ["ثلاث نقاط قوة بالضبط"],
  "overall_weaknesses": ["حتى ثلاث نقاط ضعف"],
  "overall_quality": "ممتاز | جيد | متوسط | ضعيف",
  "summary": "ملخص في جملة واحدة"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_prompt_names_company_and_criterion() {
        let criterion = Criterion::new("الخبرة السابقة", Some(30), "مشاريع مماثلة");
        let prompt = build_criterion_prompt("شركة النور", &criterion, "نص العرض");
        assert!(prompt.contains("شركة النور"));
        assert!(prompt.contains("الخبرة السابقة"));
        assert!(prompt.contains("مشاريع مماثلة"));
        assert!(prompt.contains("نص العرض"));
        assert!(prompt.contains("\"score\""));
    }

    #[test]
    fn empty_description_is_dashed() {
        let criterion = Criterion::new("السعر", Some(40), "");
        assert!(build_criterion_prompt("x", &criterion, "y").contains("الوصف: -"));
    }

    #[test]
    fn overall_prompt_lists_weights() {
        let criteria = vec![Criterion::new("السعر", Some(40), ""), Criterion::new("الجودة", Some(60), "")];
        let prompt = build_overall_prompt("Acme", &criteria, "sample");
        assert!(prompt.contains("- السعر (40%)"));
        assert!(prompt.contains("- الجودة (60%)"));
        assert!(prompt.contains("overall_strengths"));
    }
}
