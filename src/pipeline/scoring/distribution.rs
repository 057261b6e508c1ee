//! Descriptive analysis of how totals and criterion scores are spread.

use std::collections::BTreeMap;

use super::stats::{criterion_column, criterion_names, mean, median, std_dev, totals};
use super::types::{
    CompanyScore, CriterionPerformance, DistributionAnalysis, DistributionShape, Outliers, ScoreBands,
};
use crate::pipeline::text::round_to;

const OUTLIER_SIGMAS: f64 = 1.5;

pub fn score_bands(values: &[f64]) -> ScoreBands {
    let mut bands = ScoreBands::default();
    for &v in values {
        if v >= 85.0 {
            bands.excellent += 1;
        } else if v >= 70.0 {
            bands.good += 1;
        } else if v >= 50.0 {
            bands.average += 1;
        } else {
            bands.poor += 1;
        }
    }
    bands
}

fn overall_quality_label(bands: &ScoreBands, total: usize) -> &'static str {
    let share = |n: usize| n as f64 / total as f64;
    if share(bands.excellent) >= 0.3 {
        "جودة عالية"
    } else if share(bands.excellent + bands.good) >= 0.5 {
        "جودة جيدة"
    } else if share(bands.average) >= 0.4 {
        "جودة متوسطة"
    } else {
        "جودة ضعيفة"
    }
}

fn difficulty_label(average: f64) -> &'static str {
    if average >= 80.0 {
        "سهل"
    } else if average >= 65.0 {
        "متوسط"
    } else if average >= 50.0 {
        "صعب"
    } else {
        "صعب جداً"
    }
}

/// Companies beyond 1.5σ from the mean. Needs at least three.
pub fn detect_outliers(scores: &[CompanyScore]) -> Outliers {
    let mut outliers = Outliers::default();
    if scores.len() < 3 {
        return outliers;
    }
    let values = totals(scores);
    let m = mean(&values);
    let threshold = OUTLIER_SIGMAS * std_dev(&values);

    for s in scores {
        if s.total_score > m + threshold {
            outliers.high_outliers.push(s.company.clone());
        } else if s.total_score < m - threshold {
            outliers.low_outliers.push(s.company.clone());
        }
    }
    outliers
}

/// `None` for an empty field.
pub fn analyze_distribution(scores: &[CompanyScore]) -> Option<DistributionAnalysis> {
    if scores.is_empty() {
        return None;
    }
    let values = totals(scores);
    let bands = score_bands(&values);

    let (m, med) = (mean(&values), median(&values));
    let distribution_shape = if m > med {
        DistributionShape::Right
    } else if m < med {
        DistributionShape::Left
    } else {
        DistributionShape::Symmetric
    };

    let largest_band = [bands.excellent, bands.good, bands.average, bands.poor]
        .into_iter()
        .max()
        .unwrap_or(0);

    let criterion_performance: BTreeMap<String, CriterionPerformance> = criterion_names(scores)
        .into_iter()
        .map(|name| {
            let column = criterion_column(scores, &name);
            let as_f64: Vec<f64> = column.iter().map(|&v| f64::from(v)).collect();
            let average = mean(&as_f64);
            let performance = CriterionPerformance {
                average_score: round_to(average, 2),
                difficulty_level: difficulty_label(average).to_string(),
                discrimination_power: round_to(std_dev(&as_f64), 2),
                top_performers: column.iter().filter(|&&v| v >= 80).count(),
            };
            (name, performance)
        })
        .collect();

    Some(DistributionAnalysis {
        quality_level: overall_quality_label(&bands, values.len()).to_string(),
        concentration: round_to(largest_band as f64 / values.len() as f64, 2),
        score_ranges: bands,
        distribution_shape,
        criterion_performance,
        outliers: detect_outliers(scores),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::weights::tests::bare;

    #[test]
    fn bands_use_half_open_ranges() {
        let bands = score_bands(&[85.0, 84.99, 70.0, 50.0, 49.0]);
        assert_eq!(bands, ScoreBands { excellent: 1, good: 2, average: 1, poor: 1 });
    }

    #[test]
    fn outliers_need_three_companies() {
        let scores = vec![bare("a", 10.0), bare("b", 90.0)];
        assert_eq!(detect_outliers(&scores), Outliers::default());
    }

    #[test]
    fn low_outlier_detected() {
        let mut scores: Vec<_> = (0..6).map(|i| bare(&format!("c{i}"), 80.0)).collect();
        scores.push(bare("weak", 20.0));
        let outliers = detect_outliers(&scores);
        assert_eq!(outliers.low_outliers, vec!["weak"]);
        assert!(outliers.high_outliers.is_empty());
    }

    #[test]
    fn shape_and_quality_label() {
        let scores = vec![bare("a", 90.0), bare("b", 88.0), bare("c", 60.0)];
        let analysis = analyze_distribution(&scores).unwrap();
        assert_eq!(analysis.distribution_shape, DistributionShape::Left);
        assert_eq!(analysis.quality_level, "جودة عالية");
        assert_eq!(analysis.concentration, 0.67);
    }

    #[test]
    fn empty_field_has_no_analysis() {
        assert!(analyze_distribution(&[]).is_none());
    }
}
