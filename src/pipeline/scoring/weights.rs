use std::collections::BTreeMap;

use super::types::{CompanyScore, ScoreBreakdown};
use crate::pipeline::analysis::ProposalAnalysis;
use crate::pipeline::criteria::Criterion;
use crate::pipeline::text::round_to;

/// Lower edge of the display range used by total normalization.
pub const NORMALIZED_MIN: f64 = 60.0;
pub const NORMALIZED_MAX: f64 = 95.0;
/// Totals are remapped only when max − min exceeds this.
pub const NORMALIZATION_SPREAD: f64 = 10.0;

/// Effective weights in rubric order, rescaled to sum to 100 when they don't.
pub fn effective_weights(criteria: &[Criterion]) -> Vec<(String, f64)> {
    let total: u32 = criteria.iter().map(Criterion::weight_or_zero).sum();
    criteria
        .iter()
        .map(|c| {
            let weight = f64::from(c.weight_or_zero());
            let weight = if total != 100 && total > 0 {
                weight * 100.0 / f64::from(total)
            } else {
                weight
            };
            (c.name.clone(), weight)
        })
        .collect()
}

/// `total = round2(Σ raw × weight / 100)` for one analysis.
pub fn company_score(analysis: &ProposalAnalysis, weights: &[(String, f64)]) -> CompanyScore {
    let mut criterion_scores = BTreeMap::new();
    let mut weighted_scores = BTreeMap::new();
    let mut score_breakdown = Vec::with_capacity(weights.len());
    let mut total = 0.0;

    for (name, weight) in weights {
        let raw_score = analysis.score_for(name).unwrap_or(0);
        let weighted_score = f64::from(raw_score) * weight / 100.0;
        total += weighted_score;

        criterion_scores.insert(name.clone(), raw_score);
        weighted_scores.insert(name.clone(), weighted_score);
        score_breakdown.push(ScoreBreakdown {
            criterion: name.clone(),
            raw_score,
            weight: *weight,
            weighted_score,
        });
    }

    CompanyScore {
        company: analysis.company_name.clone(),
        criterion_scores,
        weighted_scores,
        total_score: round_to(total, 2),
        original_total_score: None,
        score_breakdown,
        rank: None,
    }
}

/// Remap totals into [60, 95] when the field is spread wide enough.
///
/// Returns whether the remap happened. Relative order is preserved and the
/// old total is kept in `original_total_score`.
pub fn normalize_totals(scores: &mut [CompanyScore]) -> bool {
    if scores.len() < 2 {
        return false;
    }
    let min = scores.iter().map(|s| s.total_score).fold(f64::INFINITY, f64::min);
    let max = scores.iter().map(|s| s.total_score).fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread <= NORMALIZATION_SPREAD {
        return false;
    }

    for score in scores.iter_mut() {
        let original = score.total_score;
        let remapped = NORMALIZED_MIN + (original - min) / spread * (NORMALIZED_MAX - NORMALIZED_MIN);
        score.original_total_score = Some(original);
        score.total_score = round_to(remapped, 2);
    }
    true
}
