/// Share of Arabic-block letters among all alphabetic characters (0–1).
pub fn arabic_ratio(text: &str) -> f64 {
    let (arabic, alphabetic) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(a, t), c| {
            let is_arabic = ('\u{0600}'..='\u{06FF}').contains(&c);
            (a + usize::from(is_arabic), t + 1)
        });
    if alphabetic == 0 {
        0.0
    } else {
        arabic as f64 / alphabetic as f64
    }
}

/// Informational extraction quality, 0–1, rounded to 3 decimals.
///
/// `arabic×0.4 + length×0.3 + terminators×0.2 + (1 − whitespace excess)×0.1`
/// with length capped at 1000 chars, terminators at 10 and whitespace
/// share saturating at 30%.
pub fn text_quality_score(text: &str) -> f64 {
    let length = text.chars().count();
    if length == 0 {
        return 0.0;
    }

    let arabic = arabic_ratio(text);
    let length_factor = (length as f64 / 1000.0).min(1.0);
    let terminators = text
        .chars()
        .filter(|c| matches!(c, '.' | '!' | '?' | '؟' | '۔'))
        .count();
    let terminator_factor = (terminators as f64 / 10.0).min(1.0);
    let whitespace = text.chars().filter(|c| c.is_whitespace()).count();
    let ws_ratio = whitespace as f64 / length as f64;
    let whitespace_factor = 1.0 - (ws_ratio / 0.30).min(1.0);

    let score = arabic * 0.4 + length_factor * 0.3 + terminator_factor * 0.2 + whitespace_factor * 0.1;
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_for_pure_arabic() {
        assert_eq!(arabic_ratio("معايير التقييم"), 1.0);
    }

    #[test]
    fn ratio_ignores_digits_and_punctuation() {
        assert_eq!(arabic_ratio("abcd 1234 !!"), 0.0);
        assert!((arabic_ratio("ab عر") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ratio_of_empty_text_is_zero() {
        assert_eq!(arabic_ratio(""), 0.0);
        assert_eq!(arabic_ratio("123"), 0.0);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(text_quality_score(""), 0.0);
    }

    #[test]
    fn long_arabic_prose_scores_high() {
        let sentence = "تلتزم الشركة بتنفيذ المشروع وفق الجدول الزمني المحدد. ";
        let text = sentence.repeat(30);
        let score = text_quality_score(&text);
        // arabic 0.4 + length 0.3 + terminators 0.2, whitespace share ~13%
        assert!(score > 0.9, "got {score}");
        assert!(score <= 1.0);
    }

    #[test]
    fn whitespace_heavy_text_loses_whitespace_component() {
        let text = "a          b";
        let score = text_quality_score(text);
        // length 12 → 0.0036, no arabic, no terminators, ws ratio > 0.30
        assert!((score - 0.004).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn score_is_rounded_to_three_decimals() {
        let score = text_quality_score("Some English text. More text!");
        assert_eq!((score * 1000.0).round() / 1000.0, score);
    }
}
