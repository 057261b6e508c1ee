use super::types::{CriterionAnalysis, ProposalQuality, QualityLevel};
use crate::pipeline::text::round_to;

/// Mean of the criterion scores, bucketed into a quality level.
pub fn assess_quality(analyses: &[CriterionAnalysis]) -> ProposalQuality {
    let scores: Vec<u32> = analyses.iter().map(|a| a.score).collect();
    if scores.is_empty() {
        return ProposalQuality {
            quality_score: 0.0,
            quality_level: QualityLevel::Weak,
            score_distribution: scores,
            min_score: 0,
            max_score: 0,
        };
    }

    let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
    ProposalQuality {
        quality_score: round_to(mean, 1),
        quality_level: QualityLevel::from_score(mean),
        min_score: scores.iter().copied().min().unwrap_or(0),
        max_score: scores.iter().copied().max().unwrap_or(0),
        score_distribution: scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis::keywords::keyword_fallback_analysis;

    fn with_score(score: u32) -> CriterionAnalysis {
        let mut a = keyword_fallback_analysis("", "x");
        a.score = score;
        a
    }

    #[test]
    fn averages_and_buckets() {
        let q = assess_quality(&[with_score(90), with_score(80), with_score(71)]);
        assert_eq!(q.quality_score, 80.3);
        assert_eq!(q.quality_level, QualityLevel::Good);
        assert_eq!(q.min_score, 71);
        assert_eq!(q.max_score, 90);
        assert_eq!(q.score_distribution, vec![90, 80, 71]);
    }

    #[test]
    fn empty_is_weak_zero() {
        let q = assess_quality(&[]);
        assert_eq!(q.quality_score, 0.0);
        assert_eq!(q.quality_level, QualityLevel::Weak);
    }
}
