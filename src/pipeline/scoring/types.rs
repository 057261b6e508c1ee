use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub criterion: String,
    pub raw_score: u32,
    /// Effective weight after rescaling, so not always an integer.
    pub weight: f64,
    pub weighted_score: f64,
}

/// Weighted result for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScore {
    pub company: String,
    pub criterion_scores: BTreeMap<String, u32>,
    pub weighted_scores: BTreeMap<String, f64>,
    pub total_score: f64,
    /// Pre-normalization total, present only when normalization ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_total_score: Option<f64>,
    pub score_breakdown: Vec<ScoreBreakdown>,
    /// 1-based, set on chosen companies only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl CompanyScore {
    /// Highest single raw criterion score, the first tie-breaker.
    pub fn best_criterion_score(&self) -> u32 {
        self.criterion_scores.values().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionStatistics {
    pub mean: f64,
    pub min: u32,
    pub max: u32,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub std_dev: f64,
    /// Only with four or more companies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q3: Option<f64>,
    pub criterion_statistics: BTreeMap<String, CriterionStatistics>,
}

/// Totals for every company plus summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub company_scores: Vec<CompanyScore>,
    pub normalization_applied: bool,
    pub statistics: ScoreStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingStatistics {
    /// Lowest chosen total.
    pub winner_threshold: f64,
    pub winner_spread: f64,
    /// Lowest chosen minus highest not-chosen; 0 when nobody is left out.
    pub margin_to_next: f64,
    pub close_competition: bool,
    /// Share of companies at 70 or above.
    pub competitive_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub chosen: Vec<CompanyScore>,
    pub not_chosen: Vec<CompanyScore>,
    pub statistics: RankingStatistics,
    pub total_companies: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionShape {
    /// Mean above median.
    Right,
    Left,
    Symmetric,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBands {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionPerformance {
    pub average_score: f64,
    pub difficulty_level: String,
    /// Standard deviation across companies.
    pub discrimination_power: f64,
    /// Companies scoring 80 or above.
    pub top_performers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outliers {
    pub high_outliers: Vec<String>,
    pub low_outliers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionAnalysis {
    pub score_ranges: ScoreBands,
    pub distribution_shape: DistributionShape,
    /// Share of companies in the most populated band.
    pub concentration: f64,
    pub quality_level: String,
    pub criterion_performance: BTreeMap<String, CriterionPerformance>,
    pub outliers: Outliers,
}
