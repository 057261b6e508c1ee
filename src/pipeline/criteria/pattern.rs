//! Rule-based rubric detection.
//!
//! Finds an evaluation-criteria header, then reads numbered or bulleted
//! lines until the next top-level section. Weights may be percentages,
//! points, or degrees; a range keeps its upper bound.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Criterion;
use crate::pipeline::text::normalize_digits;

/// Fewer criteria than this and the scan result is discarded.
pub const MIN_PATTERN_CRITERIA: usize = 3;

/// Candidate lines shorter than this (in characters) are ignored.
const MIN_LINE_CHARS: usize = 10;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(معايير\s+التقييم|أسس\s+المفاضلة|جدول\s+الدرجات|معايير\s+الاختيار|أسس\s+التقييم|الدرجات\s+والنقاط|evaluation\s+criteria|preference\s+basis|scoring\s+table|selection\s+criteria|evaluation\s+basis)",
    )
    .expect("valid regex")
});

static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\(?\s*\b(\d{1,3})(?:\s*[-–—]\s*(\d{1,3}))?\s*(%|درجات|درجة|نقاط|نقطة|points|point|pts|degrees|degree|marks|mark)\s*\)?",
    )
    .expect("valid regex")
});

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-•*▪●◦–]|\(?\d{1,2}\s*[.)\-:]|\(?[a-zA-Zأ-ي]\s*[.)])\s*").expect("valid regex")
});

static TOP_LEVEL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})\s*[.)\-]").expect("valid regex"));

static SEGMENT_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,،;؛]").expect("valid regex"));

static NAME_DESCRIPTION_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?::|\s[-–—]\s)\s*").expect("valid regex"));

/// Scan `text` for a criteria table. `None` when no header is present or
/// fewer than three criteria were found.
pub fn detect_by_pattern(text: &str) -> Option<Vec<Criterion>> {
    let text = normalize_digits(text);
    let header = HEADER_RE.find(&text)?;
    let section = &text[header.end()..];

    let lines: Vec<&str> = section.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut criteria: Vec<Criterion> = Vec::new();
    let mut weighted_seen = false;
    let mut last_number: Option<u32> = None;

    for (i, line) in lines.iter().copied().enumerate() {
        let has_weight = WEIGHT_RE.is_match(line);
        let number = top_level_number(line);
        if !has_weight && number.is_some() {
            if weighted_seen {
                break;
            }
            // Unweighted numbered lists end where numbering breaks sequence
            // or where items turn into headings followed by body text.
            if !criteria.is_empty() {
                let out_of_sequence = matches!((last_number, number), (Some(prev), Some(n)) if n != prev + 1);
                if out_of_sequence || opens_numbered_section(&lines, i) {
                    break;
                }
            }
        }

        let segments = weighted_segments(line);
        if segments.len() >= 2 {
            for segment in segments {
                if let Some(c) = parse_candidate(segment) {
                    criteria.push(c);
                }
            }
            weighted_seen = true;
            continue;
        }

        if line.chars().count() < MIN_LINE_CHARS || !LIST_MARKER_RE.is_match(line) {
            continue;
        }
        if let Some(c) = parse_candidate(line) {
            weighted_seen |= c.weight.is_some();
            if number.is_some() {
                last_number = number;
            }
            criteria.push(c);
        }
    }

    if criteria.len() < MIN_PATTERN_CRITERIA {
        tracing::debug!(found = criteria.len(), "Pattern scan found too few criteria");
        return None;
    }
    Some(criteria)
}

/// True when the numbered line at `index` is followed by prose and the
/// numbering then continues, i.e. it heads a section rather than a list item.
fn opens_numbered_section(lines: &[&str], index: usize) -> bool {
    let Some(n) = top_level_number(lines[index]) else {
        return false;
    };
    let followed_by_prose = lines
        .get(index + 1)
        .is_some_and(|next| !LIST_MARKER_RE.is_match(next) && !WEIGHT_RE.is_match(next));
    followed_by_prose
        && lines[index + 1..]
            .iter()
            .find_map(|l| top_level_number(l))
            .is_some_and(|next| next == n + 1)
}

fn top_level_number(line: &str) -> Option<u32> {
    TOP_LEVEL_NUMBER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Split a run-on line like `A 40%, B 30%, C 30%` when every piece carries a weight.
fn weighted_segments(line: &str) -> Vec<&str> {
    let segments: Vec<&str> = SEGMENT_SPLIT_RE
        .split(line)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() >= 2 && segments.iter().all(|s| WEIGHT_RE.is_match(s)) {
        segments
    } else {
        Vec::new()
    }
}

fn parse_candidate(line: &str) -> Option<Criterion> {
    let body = LIST_MARKER_RE.replace(line, "");

    let (weight, without_weight) = match WEIGHT_RE.captures(&body) {
        Some(caps) => {
            let lower = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let upper = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            let weight = upper.or(lower).filter(|w| *w <= 100);
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let mut rest = String::with_capacity(body.len());
            rest.push_str(&body[..whole.start]);
            rest.push(' ');
            rest.push_str(&body[whole.end..]);
            (weight, rest)
        }
        None => (None, body.to_string()),
    };

    let cleaned = without_weight.replace("()", " ");
    let cleaned = cleaned.trim_matches(|c: char| c.is_whitespace() || ":-–—.,()[]".contains(c));

    let mut parts = NAME_DESCRIPTION_SPLIT_RE.splitn(cleaned, 2);
    let name = parts
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| c.is_whitespace() || ":-–—.,".contains(c))
        .to_string();
    let description = parts.next().unwrap_or_default().trim().to_string();

    if name.is_empty() {
        return None;
    }
    Some(Criterion::new(name, weight, description))
}
