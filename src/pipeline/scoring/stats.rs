use std::collections::BTreeMap;

use super::types::{CompanyScore, CriterionStatistics, ScoreStatistics};
use crate::pipeline::text::round_to;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; 0 below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn totals(scores: &[CompanyScore]) -> Vec<f64> {
    scores.iter().map(|s| s.total_score).collect()
}

/// Raw scores for one criterion across companies; missing counts as 0.
pub fn criterion_column(scores: &[CompanyScore], criterion: &str) -> Vec<u32> {
    scores
        .iter()
        .map(|s| s.criterion_scores.get(criterion).copied().unwrap_or(0))
        .collect()
}

/// Criterion names in the order of the first company's breakdown.
pub fn criterion_names(scores: &[CompanyScore]) -> Vec<String> {
    scores
        .first()
        .map(|s| s.score_breakdown.iter().map(|b| b.criterion.clone()).collect())
        .unwrap_or_default()
}

pub fn score_statistics(scores: &[CompanyScore]) -> ScoreStatistics {
    let values = totals(scores);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if values.is_empty() { (0.0, 0.0) } else { (min, max) };

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let (q1, q3) = if n >= 4 {
        (Some(sorted[n / 4]), Some(sorted[3 * n / 4]))
    } else {
        (None, None)
    };

    let criterion_statistics: BTreeMap<String, CriterionStatistics> = criterion_names(scores)
        .into_iter()
        .map(|name| {
            let column = criterion_column(scores, &name);
            let as_f64: Vec<f64> = column.iter().map(|&v| f64::from(v)).collect();
            let stats = CriterionStatistics {
                mean: round_to(mean(&as_f64), 2),
                min: column.iter().copied().min().unwrap_or(0),
                max: column.iter().copied().max().unwrap_or(0),
                std_dev: round_to(std_dev(&as_f64), 2),
            };
            (name, stats)
        })
        .collect();

    ScoreStatistics {
        count: n,
        mean: round_to(mean(&values), 2),
        median: round_to(median(&values), 2),
        min,
        max,
        range: round_to(max - min, 2),
        std_dev: round_to(std_dev(&values), 2),
        q1,
        q3,
        criterion_statistics,
    }
}
