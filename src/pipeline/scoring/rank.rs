use std::cmp::Ordering;

use super::types::{CompanyScore, Ranking, RankingStatistics};
use crate::pipeline::text::round_to;

/// Margins below this many points count as close competition.
pub const CLOSE_COMPETITION_MARGIN: f64 = 5.0;
pub const COMPETITIVE_SCORE: f64 = 70.0;

/// Total descending, then best single criterion descending, then name.
pub fn ranking_order(a: &CompanyScore, b: &CompanyScore) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.best_criterion_score().cmp(&a.best_criterion_score()))
        .then_with(|| a.company.cmp(&b.company))
}

/// Sort and split into chosen (ranked 1..=top_n) and not chosen.
pub fn rank_companies(mut scores: Vec<CompanyScore>, top_n: usize) -> Ranking {
    scores.sort_by(ranking_order);
    let total_companies = scores.len();
    let cut = top_n.min(total_companies);

    let not_chosen: Vec<CompanyScore> = scores
        .split_off(cut)
        .into_iter()
        .map(|mut s| {
            s.rank = None;
            s
        })
        .collect();
    let chosen: Vec<CompanyScore> = scores
        .into_iter()
        .enumerate()
        .map(|(i, mut s)| {
            s.rank = Some(i + 1);
            s
        })
        .collect();

    let statistics = ranking_statistics(&chosen, &not_chosen);
    Ranking {
        chosen,
        not_chosen,
        statistics,
        total_companies,
    }
}

pub fn ranking_statistics(chosen: &[CompanyScore], not_chosen: &[CompanyScore]) -> RankingStatistics {
    let chosen_min = chosen.iter().map(|c| c.total_score).fold(f64::INFINITY, f64::min);
    let chosen_max = chosen.iter().map(|c| c.total_score).fold(f64::NEG_INFINITY, f64::max);
    let rest_max = not_chosen
        .iter()
        .map(|c| c.total_score)
        .fold(f64::NEG_INFINITY, f64::max);

    let winner_threshold = if chosen.is_empty() { 0.0 } else { chosen_min };
    let winner_spread = if chosen.len() > 1 { chosen_max - chosen_min } else { 0.0 };
    let margin = (!chosen.is_empty() && !not_chosen.is_empty()).then(|| chosen_min - rest_max);

    let total = chosen.len() + not_chosen.len();
    let competitive = chosen
        .iter()
        .chain(not_chosen)
        .filter(|c| c.total_score >= COMPETITIVE_SCORE)
        .count();

    RankingStatistics {
        winner_threshold,
        winner_spread: round_to(winner_spread, 2),
        margin_to_next: round_to(margin.unwrap_or(0.0), 2),
        close_competition: margin.is_some_and(|m| m < CLOSE_COMPETITION_MARGIN),
        competitive_ratio: if total == 0 {
            0.0
        } else {
            round_to(competitive as f64 / total as f64, 2)
        },
    }
}
