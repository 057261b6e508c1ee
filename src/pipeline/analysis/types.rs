use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a criterion score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Llm,
    KeywordFallback,
}

/// Score and rationale for one (proposal, criterion) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionAnalysis {
    pub criterion_name: String,
    /// Always within 0–100.
    pub score: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Quotes from the proposal, each at most 200 characters.
    pub evidence: Vec<String>,
    pub justification: String,
    pub source: AnalysisSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub overall_strengths: Vec<String>,
    pub overall_weaknesses: Vec<String>,
    pub overall_quality: String,
    pub summary: String,
}

/// Four-band label shared by proposal quality and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityLevel {
    #[serde(rename = "ضعيف")]
    Weak,
    #[serde(rename = "متوسط")]
    Average,
    #[serde(rename = "جيد")]
    Good,
    #[serde(rename = "ممتاز")]
    Excellent,
}

impl QualityLevel {
    /// ≥85 excellent, ≥70 good, ≥50 average, else weak.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Average
        } else {
            Self::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "ممتاز",
            Self::Good => "جيد",
            Self::Average => "متوسط",
            Self::Weak => "ضعيف",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalQuality {
    /// Mean criterion score, one decimal.
    pub quality_score: f64,
    pub quality_level: QualityLevel,
    pub score_distribution: Vec<u32>,
    pub min_score: u32,
    pub max_score: u32,
}

/// Full analysis of one proposal. Never mutated after the analyzer returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalAnalysis {
    pub company_name: String,
    /// One entry per rubric criterion, in rubric order.
    pub criterion_analyses: Vec<CriterionAnalysis>,
    pub overall_analysis: OverallAnalysis,
    pub proposal_quality: ProposalQuality,
}

impl ProposalAnalysis {
    pub fn score_for(&self, criterion_name: &str) -> Option<u32> {
        self.criterion_analyses
            .iter()
            .find(|a| a.criterion_name == criterion_name)
            .map(|a| a.score)
    }
}

/// A proposal ready for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalInput {
    pub company_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub company_name: String,
    pub error: String,
}

/// Gathered batch output, successes in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub analyses: Vec<ProposalAnalysis>,
    pub failed_analyses: Vec<AnalysisFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_bands() {
        assert_eq!(QualityLevel::from_score(85.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(84.9), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(70.0), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(50.0), QualityLevel::Average);
        assert_eq!(QualityLevel::from_score(49.9), QualityLevel::Weak);
    }

    #[test]
    fn quality_level_serializes_as_arabic_label() {
        assert_eq!(serde_json::to_string(&QualityLevel::Excellent).unwrap(), "\"ممتاز\"");
        let back: QualityLevel = serde_json::from_str("\"ضعيف\"").unwrap();
        assert_eq!(back, QualityLevel::Weak);
        assert_eq!(QualityLevel::Good.to_string(), "جيد");
    }
}
