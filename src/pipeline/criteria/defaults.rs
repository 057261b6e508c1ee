use super::types::Criterion;

/// Rubric used when neither the pattern scan nor the LLM yields criteria.
pub fn default_criteria() -> Vec<Criterion> {
    vec![
        Criterion::new(
            "القيمة المالية",
            Some(40),
            "مقارنة السعر بالعطاءات الأخرى وميزانية الجهة",
        ),
        Criterion::new(
            "مدى المطابقة للمواصفات",
            Some(30),
            "درجة الالتزام بالمتطلبات الفنية والقانونية الواردة في الكراسة",
        ),
        Criterion::new(
            "خطة التسليم",
            Some(20),
            "سرعة وواقعية جدول التسليم والتنفيذ المقترح",
        ),
        Criterion::new(
            "الأداء السابق",
            Some(10),
            "سجل مقدم العرض وخبرته في تنفيذ مشاريع مماثلة بجودة عالية",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sum_to_100() {
        let total: u32 = default_criteria().iter().map(|c| c.weight_or_zero()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn defaults_are_ordered_by_weight() {
        let weights: Vec<u32> = default_criteria().iter().map(|c| c.weight_or_zero()).collect();
        assert_eq!(weights, vec![40, 30, 20, 10]);
    }

    #[test]
    fn defaults_have_descriptions() {
        assert!(default_criteria().iter().all(|c| !c.description.is_empty()));
    }
}
