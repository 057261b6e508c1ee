//! Deterministic keyword scoring used when the LLM is unavailable.

use std::collections::BTreeSet;

use super::types::{AnalysisSource, CriterionAnalysis};

struct KeywordGroup {
    /// Criterion-name fragments that select this group. The first entry is
    /// the canonical Arabic name; its words are used for the loose match.
    aliases: &'static [&'static str],
    keywords: &'static [&'static str],
}

const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        aliases: &["الكفاءة الفنية", "technical", "technology"],
        keywords: &[
            "تقني", "تكنولوج", "مهارة", "ابتكار", "معمارية", "تكامل", "صيانة", "دعم فني",
            "أمن", "اعتمادية", "sla", "architecture", "security", "integration", "maintenance",
        ],
    },
    KeywordGroup {
        aliases: &["الخبرة السابقة", "experience"],
        keywords: &[
            "خبرة", "مشروع", "تنفيذ", "إنجاز", "مرجع", "عميل", "نجاح", "شهادة", "مشاريع مماثلة",
            "case study", "reference", "track record",
        ],
    },
    KeywordGroup {
        aliases: &["خطة التنفيذ", "implementation", "methodology", "work plan"],
        keywords: &[
            "خطة", "جدول", "زمني", "مرحلة", "منهجية", "موارد", "مخاطر", "نشاط", "agile", "sprint",
            "gantt", "timeline", "milestone",
        ],
    },
    KeywordGroup {
        aliases: &["فريق العمل", "team", "staff", "personnel"],
        keywords: &[
            "فريق", "هيكل", "سيرة ذاتية", "مهندس", "محلل", "مدير مشروع", "متخصص", "خبير", "pmp",
            "cv", "team structure", "consultant",
        ],
    },
    KeywordGroup {
        aliases: &["القيمة المالية", "financial", "price", "cost"],
        keywords: &[
            "سعر", "تكلفة", "عرض مالي", "ميزانية", "دفع", "خصم", "قيمة", "وفر", "جدوى", "roi",
            "cost", "price", "budget",
        ],
    },
    KeywordGroup {
        aliases: &["مدى المطابقة", "compliance", "conformity", "specification"],
        keywords: &[
            "مطابقة", "مواصفة", "متطلبات", "توافق", "لائحة", "ضمان", "معتمد", "متوافق", "iso",
            "compliance", "standard",
        ],
    },
    KeywordGroup {
        aliases: &["التسليم", "delivery", "handover"],
        keywords: &[
            "تسليم", "مدة", "مهلة", "تشغيل", "موعد نهائي", "استلام", "handover", "commissioning",
            "deadline", "delivery",
        ],
    },
    KeywordGroup {
        aliases: &["الأداء السابق", "past performance", "performance"],
        keywords: &[
            "أداء", "مؤشر", "رضا", "تقييم", "موثوقية", "kpi", "satisfaction", "reliability",
            "uptime",
        ],
    },
];

const GENERIC_KEYWORDS: &[&str] = &["جودة", "تميز", "كفاءة", "احتراف", "value", "best practice"];

/// Keyword list for a criterion name.
///
/// A group is chosen when one of its aliases appears whole in the name;
/// failing that, when any word of its canonical Arabic name does. Names
/// matching nothing get the generic list.
pub fn keywords_for(criterion_name: &str) -> &'static [&'static str] {
    let name = criterion_name.to_lowercase();

    if let Some(group) = KEYWORD_GROUPS
        .iter()
        .find(|g| g.aliases.iter().any(|alias| name.contains(alias)))
    {
        return group.keywords;
    }

    KEYWORD_GROUPS
        .iter()
        .find(|g| {
            g.aliases[0]
                .split_whitespace()
                .filter(|w| w.chars().count() >= 3)
                .any(|w| name.contains(w))
        })
        .map(|g| g.keywords)
        .unwrap_or(GENERIC_KEYWORDS)
}

/// Distinct keywords present in `text`, compared case-insensitively.
pub fn matched_keywords(text: &str, keywords: &[&'static str]) -> BTreeSet<&'static str> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .copied()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .collect()
}

/// `min(40 + 10 × distinct keywords found, 100)`.
pub fn keyword_score(text: &str, criterion_name: &str) -> u32 {
    let found = matched_keywords(text, keywords_for(criterion_name)).len() as u32;
    (40 + 10 * found).min(100)
}

/// Analysis record built from the keyword score alone.
pub fn keyword_fallback_analysis(text: &str, criterion_name: &str) -> CriterionAnalysis {
    let score = keyword_score(text, criterion_name);
    CriterionAnalysis {
        criterion_name: criterion_name.to_string(),
        score,
        strengths: vec!["تم العثور على محتوى متعلق بالمعيار".to_string()],
        weaknesses: vec!["يحتاج تحليل أكثر تفصيلاً".to_string()],
        evidence: Vec::new(),
        justification: format!("تقييم أولي بناء على الكلمات المفتاحية - {score}/100"),
        source: AnalysisSource::KeywordFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_arabic_key_selects_group() {
        assert!(keywords_for("القيمة المالية").contains(&"سعر"));
        assert!(keywords_for("مدى المطابقة للمواصفات").contains(&"مطابقة"));
    }

    #[test]
    fn english_alias_selects_group() {
        assert!(keywords_for("Financial Value").contains(&"price"));
        assert!(keywords_for("Delivery Plan").contains(&"deadline"));
    }

    #[test]
    fn partial_word_match_selects_group() {
        // "الفنية" is one word of "الكفاءة الفنية".
        assert!(keywords_for("القدرات الفنية للمورد").contains(&"تقني"));
    }

    #[test]
    fn unknown_name_gets_generic_list() {
        assert_eq!(keywords_for("Sustainability"), GENERIC_KEYWORDS);
    }

    #[test]
    fn score_counts_distinct_keywords_case_insensitively() {
        let text = "Our PRICE is competitive. The price includes a 5% discount within budget.";
        // price, budget (cost absent)
        assert_eq!(keyword_score(text, "Financial Value"), 60);
    }

    #[test]
    fn score_caps_at_100() {
        let text = "خبرة مشروع تنفيذ إنجاز مرجع عميل نجاح شهادة reference";
        assert_eq!(keyword_score(text, "الخبرة السابقة"), 100);
    }

    #[test]
    fn score_floor_is_40() {
        assert_eq!(keyword_score("", "الخبرة السابقة"), 40);
    }

    #[test]
    fn fallback_is_deterministic() {
        let text = "نلتزم بخطة تنفيذ واضحة وجدول زمني ومنهجية agile";
        let a = keyword_fallback_analysis(text, "خطة التنفيذ");
        let b = keyword_fallback_analysis(text, "خطة التنفيذ");
        assert_eq!(a, b);
        assert_eq!(a.source, AnalysisSource::KeywordFallback);
        assert!(a.justification.contains(&format!("{}/100", a.score)));
    }
}
