use serde::{Deserialize, Serialize};

use crate::pipeline::criteria::Criterion;
use crate::pipeline::scoring::CompanyScore;

/// A selected company as it appears in the final envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenCompany {
    pub company: String,
    pub total_score: f64,
    pub rank: usize,
    /// Three or four Arabic sentences.
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub highest: f64,
    pub lowest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_companies_evaluated: usize,
    pub companies_selected: usize,
    pub selection_rate: f64,
    pub average_winning_score: f64,
    pub score_range: ScoreRange,
    pub quality_assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub chosen: Vec<ChosenCompany>,
    pub not_chosen: Vec<CompanyScore>,
    pub evaluation_criteria: Vec<Criterion>,
    pub evaluation_summary: EvaluationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_issues: usize,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            total_issues: issues.len(),
            issues,
        }
    }
}

/// Envelope plus its structural check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub envelope: ResponseEnvelope,
    pub validation: ValidationReport,
}
