use super::types::{ChosenCompany, EvaluationSummary, ScoreRange};
use crate::pipeline::text::round_to;

pub fn evaluation_summary(chosen: &[ChosenCompany], not_chosen_count: usize) -> EvaluationSummary {
    let total = chosen.len() + not_chosen_count;
    let scores: Vec<f64> = chosen.iter().map(|c| c.total_score).collect();

    let selection_rate = if total == 0 {
        0.0
    } else {
        round_to(chosen.len() as f64 / total as f64 * 100.0, 1)
    };
    let average_winning_score = if scores.is_empty() {
        0.0
    } else {
        round_to(scores.iter().sum::<f64>() / scores.len() as f64, 1)
    };
    let score_range = if scores.is_empty() {
        ScoreRange { highest: 0.0, lowest: 0.0 }
    } else {
        ScoreRange {
            highest: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            lowest: scores.iter().copied().fold(f64::INFINITY, f64::min),
        }
    };

    let quality_assessment = if average_winning_score >= 85.0 {
        "مستوى عالي من الجودة في العروض المختارة"
    } else if average_winning_score >= 75.0 {
        "مستوى جيد من الجودة في العروض المختارة"
    } else {
        "مستوى مقبول من الجودة في العروض المختارة"
    };

    EvaluationSummary {
        total_companies_evaluated: total,
        companies_selected: chosen.len(),
        selection_rate,
        average_winning_score,
        score_range,
        quality_assessment: quality_assessment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chosen(score: f64, rank: usize) -> ChosenCompany {
        ChosenCompany {
            company: format!("c{rank}"),
            total_score: score,
            rank,
            reasons: Vec::new(),
        }
    }

    #[test]
    fn rates_and_range() {
        let summary = evaluation_summary(&[chosen(90.0, 1), chosen(81.0, 2)], 1);
        assert_eq!(summary.total_companies_evaluated, 3);
        assert_eq!(summary.selection_rate, 66.7);
        assert_eq!(summary.average_winning_score, 85.5);
        assert_eq!(summary.score_range, ScoreRange { highest: 90.0, lowest: 81.0 });
        assert_eq!(summary.quality_assessment, "مستوى عالي من الجودة في العروض المختارة");
    }

    #[test]
    fn empty_selection_is_zeroed() {
        let summary = evaluation_summary(&[], 0);
        assert_eq!(summary.selection_rate, 0.0);
        assert_eq!(summary.average_winning_score, 0.0);
        assert_eq!(summary.quality_assessment, "مستوى مقبول من الجودة في العروض المختارة");
    }
}
