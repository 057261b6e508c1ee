use std::collections::HashSet;

use super::defaults::default_criteria;
use super::types::{CriteriaValidation, Criterion};

/// Deviation from 100 tolerated before weights are discarded.
pub const WEIGHT_TOLERANCE: u32 = 10;

/// Deviation from 100 reported as a validation issue.
pub const VALIDATION_TOLERANCE: u32 = 5;

/// Final pass applied to every rubric, whatever tier produced it.
///
/// * nameless entries are dropped (nothing left → default rubric)
/// * any missing weight, or a total more than 10 away from 100 → equal split,
///   the first `100 % n` criteria getting one extra point
/// * otherwise a total within tolerance is rescaled proportionally with
///   largest-remainder rounding
///
/// The output always sums to exactly 100 with no missing weight, so a
/// second application is a no-op.
pub fn normalize_criteria(criteria: Vec<Criterion>) -> Vec<Criterion> {
    let mut criteria: Vec<Criterion> = criteria
        .into_iter()
        .filter_map(|mut c| {
            let name = c.name.trim();
            if name.is_empty() {
                return None;
            }
            c.name = name.to_string();
            c.description = c.description.trim().to_string();
            Some(c)
        })
        .collect();

    if criteria.is_empty() {
        return default_criteria();
    }

    let any_missing = criteria.iter().any(|c| c.weight.is_none());
    let total: u32 = criteria.iter().map(Criterion::weight_or_zero).sum();

    if any_missing || total.abs_diff(100) > WEIGHT_TOLERANCE {
        redistribute_equally(&mut criteria);
    } else if total != 100 {
        rescale_largest_remainder(&mut criteria, total);
    }
    criteria
}

fn redistribute_equally(criteria: &mut [Criterion]) {
    let n = criteria.len() as u32;
    let base = 100 / n;
    let remainder = (100 % n) as usize;
    for (i, c) in criteria.iter_mut().enumerate() {
        c.weight = Some(if i < remainder { base + 1 } else { base });
    }
}

fn rescale_largest_remainder(criteria: &mut [Criterion], total: u32) {
    let mut floors: Vec<(usize, u32, u32)> = criteria
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let scaled = c.weight_or_zero() * 100;
            (i, scaled / total, scaled % total)
        })
        .collect();

    let assigned: u32 = floors.iter().map(|(_, floor, _)| floor).sum();
    let mut deficit = 100 - assigned;

    // Largest remainder first, earlier criteria win ties.
    let mut order: Vec<usize> = (0..floors.len()).collect();
    order.sort_by(|&a, &b| floors[b].2.cmp(&floors[a].2).then(a.cmp(&b)));
    for idx in order {
        if deficit == 0 {
            break;
        }
        floors[idx].1 += 1;
        deficit -= 1;
    }

    for (i, floor, _) in floors {
        criteria[i].weight = Some(floor);
    }
}

/// Report rubric problems without changing anything.
pub fn validate_criteria(criteria: &[Criterion]) -> CriteriaValidation {
    let mut issues = Vec::new();
    let total_weight: u32 = criteria.iter().map(Criterion::weight_or_zero).sum();

    if criteria.is_empty() {
        issues.push("No criteria defined".to_string());
    }
    if total_weight.abs_diff(100) > VALIDATION_TOLERANCE {
        issues.push(format!(
            "Total weight is {total_weight}%, expected 100% (±{VALIDATION_TOLERANCE})"
        ));
    }

    let mut seen = HashSet::new();
    for (i, c) in criteria.iter().enumerate() {
        let name = c.name.trim();
        if name.is_empty() {
            issues.push(format!("Criterion {} has no name", i + 1));
            continue;
        }
        if c.weight.is_none() {
            issues.push(format!("Criterion '{name}' has no weight"));
        }
        if !seen.insert(name.to_string()) {
            issues.push(format!("Duplicate criterion name: '{name}'"));
        }
    }

    CriteriaValidation {
        is_valid: issues.is_empty(),
        issues,
        total_weight,
        criterion_count: criteria.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unweighted(n: usize) -> Vec<Criterion> {
        (0..n)
            .map(|i| Criterion::new(format!("criterion {i}"), None, ""))
            .collect()
    }

    fn weights(criteria: &[Criterion]) -> Vec<u32> {
        criteria.iter().map(|c| c.weight.unwrap()).collect()
    }

    #[test]
    fn five_unweighted_get_twenty_each() {
        assert_eq!(weights(&normalize_criteria(unweighted(5))), vec![20, 20, 20, 20, 20]);
    }

    #[test]
    fn seven_unweighted_spread_remainder_first() {
        assert_eq!(
            weights(&normalize_criteria(unweighted(7))),
            vec![15, 15, 14, 14, 14, 14, 14]
        );
    }

    #[test]
    fn exact_weights_untouched() {
        let input = vec![
            Criterion::new("a", Some(40), "x"),
            Criterion::new("b", Some(30), "y"),
            Criterion::new("c", Some(20), "z"),
            Criterion::new("d", Some(10), "w"),
        ];
        assert_eq!(normalize_criteria(input.clone()), input);
    }

    #[test]
    fn one_missing_weight_forces_equal_split() {
        let input = vec![
            Criterion::new("a", Some(50), ""),
            Criterion::new("b", Some(50), ""),
            Criterion::new("c", None, ""),
        ];
        assert_eq!(weights(&normalize_criteria(input)), vec![34, 33, 33]);
    }

    #[test]
    fn total_far_from_100_forces_equal_split() {
        let input = vec![
            Criterion::new("a", Some(60), ""),
            Criterion::new("b", Some(60), ""),
        ];
        assert_eq!(weights(&normalize_criteria(input)), vec![50, 50]);
    }

    #[test]
    fn near_total_is_rescaled_proportionally() {
        // 35 + 35 + 25 = 95 → 36.84, 36.84, 26.32 → floors 36, 36, 26 (+2 deficit)
        let input = vec![
            Criterion::new("a", Some(35), ""),
            Criterion::new("b", Some(35), ""),
            Criterion::new("c", Some(25), ""),
        ];
        let out = normalize_criteria(input);
        assert_eq!(weights(&out), vec![37, 37, 26]);
        assert_eq!(weights(&out).iter().sum::<u32>(), 100);
    }

    #[test]
    fn nameless_entries_dropped() {
        let input = vec![
            Criterion::new("  ", Some(50), ""),
            Criterion::new("a", Some(50), ""),
            Criterion::new("b", Some(50), ""),
        ];
        let out = normalize_criteria(input);
        assert_eq!(out.len(), 2);
        assert_eq!(weights(&out), vec![50, 50]);
    }

    #[test]
    fn nothing_left_falls_back_to_defaults() {
        let out = normalize_criteria(vec![Criterion::new("", None, "")]);
        assert_eq!(out, default_criteria());
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = vec![
            unweighted(7),
            unweighted(3),
            vec![
                Criterion::new("a", Some(33), ""),
                Criterion::new("b", Some(33), ""),
                Criterion::new("c", Some(27), ""),
            ],
            vec![Criterion::new("solo", Some(100), "")],
            vec![
                Criterion::new("a", Some(0), ""),
                Criterion::new("b", Some(0), ""),
            ],
        ];
        for input in inputs {
            let once = normalize_criteria(input);
            let twice = normalize_criteria(once.clone());
            assert_eq!(once, twice);
            assert_eq!(once.iter().map(|c| c.weight.unwrap()).sum::<u32>(), 100);
        }
    }

    #[test]
    fn validation_accepts_clean_rubric() {
        let report = validate_criteria(&default_criteria());
        assert!(report.is_valid);
        assert_eq!(report.total_weight, 100);
        assert_eq!(report.criterion_count, 4);
    }

    #[test]
    fn validation_flags_weight_and_duplicates() {
        let report = validate_criteria(&[
            Criterion::new("a", Some(50), ""),
            Criterion::new("a", Some(30), ""),
            Criterion::new("", Some(10), ""),
        ]);
        assert!(!report.is_valid);
        assert_eq!(report.total_weight, 90);
        assert_eq!(report.issues.len(), 3);
        assert!(report.issues.iter().any(|i| i.contains("Duplicate")));
        assert!(report.issues.iter().any(|i| i.contains("no name")));
    }

    #[test]
    fn validation_tolerates_small_drift() {
        let report = validate_criteria(&[
            Criterion::new("a", Some(52), ""),
            Criterion::new("b", Some(52), ""),
        ]);
        assert!(report.is_valid);
    }
}
