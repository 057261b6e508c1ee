//! Pipeline configuration.
//!
//! Concurrency gates, LLM provider selection and timeouts, score
//! normalization toggle, and workflow retention. Defaults are usable for a
//! local Ollama instance; every value can be overridden through `TENDER_*`
//! environment variables (a `.env` file is loaded by the binary first).

use serde::Serialize;
use thiserror::Error;

use crate::config::DEFAULT_BIND_ADDR;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when the Gemini provider is selected")]
    MissingApiKey(&'static str),
}

/// Which completion endpoint backs the pipeline's LLM calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Local Ollama `/api/generate`.
    Ollama,
    /// Google Gemini `generateContent`.
    Gemini,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub llm_provider: LlmProvider,
    /// Ollama base URL (ignored for Gemini).
    pub ollama_url: String,
    /// Model name passed to the provider.
    pub model: String,
    /// Gemini API key. Never serialized.
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    /// Per-request LLM timeout. A timed-out call is an LLM failure.
    pub llm_timeout_secs: u64,
    /// Simultaneous PDF extractions.
    pub extraction_concurrency: usize,
    /// Simultaneous proposal analyses.
    pub analysis_concurrency: usize,
    /// Remap widely spread totals into the [60, 95] display range.
    pub normalize_scores: bool,
    /// Finished workflows retained for status queries.
    pub registry_capacity: usize,
    /// Proposal prefix sent with each per-criterion prompt.
    pub max_proposal_chars: usize,
    /// Proposal prefix sent with the overall-analysis prompt.
    pub overall_sample_chars: usize,
    /// Terms prefix sent with the criteria-extraction prompt.
    pub max_terms_chars: usize,
    pub bind_addr: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Ollama,
            ollama_url: "http://localhost:11434".into(),
            model: "llama3.1".into(),
            gemini_api_key: None,
            llm_timeout_secs: 120,
            extraction_concurrency: 3,
            analysis_concurrency: 2,
            normalize_scores: true,
            registry_capacity: 100,
            max_proposal_chars: 4000,
            overall_sample_chars: 1500,
            max_terms_chars: 12_000,
            bind_addr: DEFAULT_BIND_ADDR.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("TENDER_LLM_PROVIDER") {
            config.llm_provider = match v.trim().to_ascii_lowercase().as_str() {
                "ollama" => LlmProvider::Ollama,
                "gemini" => LlmProvider::Gemini,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "TENDER_LLM_PROVIDER",
                        value: v,
                        reason: "expected ollama or gemini".into(),
                    })
                }
            };
        }
        if let Some(v) = lookup("TENDER_OLLAMA_URL") {
            config.ollama_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("TENDER_MODEL") {
            config.model = v.trim().to_string();
        } else if config.llm_provider == LlmProvider::Gemini {
            config.model = "gemini-2.0-flash".into();
        }
        config.gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        if config.llm_provider == LlmProvider::Gemini && config.gemini_api_key.is_none() {
            return Err(ConfigError::MissingApiKey("GEMINI_API_KEY"));
        }

        if let Some(v) = lookup("TENDER_LLM_TIMEOUT_SECS") {
            config.llm_timeout_secs = parse_positive("TENDER_LLM_TIMEOUT_SECS", &v)? as u64;
        }
        if let Some(v) = lookup("TENDER_EXTRACTION_CONCURRENCY") {
            config.extraction_concurrency = parse_positive("TENDER_EXTRACTION_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("TENDER_ANALYSIS_CONCURRENCY") {
            config.analysis_concurrency = parse_positive("TENDER_ANALYSIS_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("TENDER_REGISTRY_CAPACITY") {
            config.registry_capacity = parse_positive("TENDER_REGISTRY_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("TENDER_NORMALIZE_SCORES") {
            config.normalize_scores = parse_bool("TENDER_NORMALIZE_SCORES", &v)?;
        }
        if let Some(v) = lookup("TENDER_BIND_ADDR") {
            config.bind_addr = v.trim().to_string();
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a positive integer".into(),
        }),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_gates() {
        let config = PipelineConfig::default();
        assert_eq!(config.extraction_concurrency, 3);
        assert_eq!(config.analysis_concurrency, 2);
        assert_eq!(config.registry_capacity, 100);
        assert_eq!(config.max_proposal_chars, 4000);
        assert_eq!(config.overall_sample_chars, 1500);
        assert!(config.normalize_scores);
        assert_eq!(config.llm_provider, LlmProvider::Ollama);
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.llm_timeout_secs, 120);
    }

    #[test]
    fn overrides_are_applied() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TENDER_ANALYSIS_CONCURRENCY", "4"),
            ("TENDER_NORMALIZE_SCORES", "off"),
            ("TENDER_OLLAMA_URL", "http://gpu-box:11434/"),
            ("TENDER_LLM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.analysis_concurrency, 4);
        assert!(!config.normalize_scores);
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.llm_timeout_secs, 30);
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[(
            "TENDER_EXTRACTION_CONCURRENCY",
            "0",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TENDER_EXTRACTION_CONCURRENCY", .. }));
    }

    #[test]
    fn unknown_provider_rejected() {
        let result = PipelineConfig::from_lookup(lookup_from(&[("TENDER_LLM_PROVIDER", "gpt")]));
        assert!(result.is_err());
    }

    #[test]
    fn gemini_requires_api_key() {
        let err =
            PipelineConfig::from_lookup(lookup_from(&[("TENDER_LLM_PROVIDER", "gemini")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey("GEMINI_API_KEY"));
    }

    #[test]
    fn gemini_defaults_model() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TENDER_LLM_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "k-123"),
        ]))
        .unwrap();
        assert_eq!(config.llm_provider, LlmProvider::Gemini);
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn api_key_not_serialized() {
        let config = PipelineConfig {
            gemini_api_key: Some("secret".into()),
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"llm_provider\":\"ollama\""));
    }
}
