use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::strategy::Attempt;

/// One rubric dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    /// Integer percentage. `None` until normalization assigns one.
    pub weight: Option<u32>,
    #[serde(default)]
    pub description: String,
}

impl Criterion {
    pub fn new(name: impl Into<String>, weight: Option<u32>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
        }
    }

    /// Weight after normalization (0 when unset).
    pub fn weight_or_zero(&self) -> u32 {
        self.weight.unwrap_or(0)
    }
}

/// Which tier produced the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Pattern,
    Llm,
    Default,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern => write!(f, "pattern"),
            Self::Llm => write!(f, "llm"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Normalized rubric plus how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct CriteriaDetection {
    pub criteria: Vec<Criterion>,
    pub method: DetectionMethod,
    pub total_criteria: usize,
    /// Whether the source supplied weights for every criterion.
    pub has_weights: bool,
    /// Tiers tried before the winning one.
    pub skipped: Vec<Attempt>,
    pub validation: CriteriaValidation,
}

/// Informational rubric check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_weight: u32,
    pub criterion_count: usize,
}
