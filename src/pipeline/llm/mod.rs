pub mod types;
pub mod ollama;
pub mod gemini;
pub mod mock;
pub mod json_scan;
pub mod sanitize;

pub use types::*;
pub use ollama::*;
pub use gemini::*;
pub use mock::*;
pub use json_scan::*;
pub use sanitize::*;

use std::sync::Arc;

use thiserror::Error;

use crate::pipeline_config::{LlmProvider, PipelineConfig};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM service is not reachable at {0}")]
    Connection(String),

    #[error("LLM service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("No JSON {0} found in LLM response")]
    NoJson(&'static str),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),
}

/// Build the configured provider as a shareable client.
pub fn client_from_config(config: &PipelineConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    match config.llm_provider {
        LlmProvider::Ollama => Ok(Arc::new(OllamaClient::new(
            &config.ollama_url,
            &config.model,
            config.llm_timeout_secs,
        )?)),
        LlmProvider::Gemini => {
            let key = config
                .gemini_api_key
                .as_deref()
                .ok_or_else(|| LlmError::HttpClient("missing Gemini API key".into()))?;
            Ok(Arc::new(GeminiClient::new(key, &config.model, config.llm_timeout_secs)?))
        }
    }
}
