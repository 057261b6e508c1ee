use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::LlmClient;
use super::LlmError;

/// Returns the same configured response to every prompt.
pub struct MockLlmClient {
    response: String,
    calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn is_available(&self) -> Result<bool, LlmError> {
        Ok(true)
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Client whose every call fails, simulating a total outage.
pub struct FailingLlmClient {
    calls: AtomicUsize,
}

impl FailingLlmClient {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmClient for FailingLlmClient {
    fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Connection("mock://offline".into()))
    }

    fn is_available(&self) -> Result<bool, LlmError> {
        Err(LlmError::Connection("mock://offline".into()))
    }

    fn model(&self) -> &str {
        "offline"
    }
}

/// Client that answers by prompt content: the first rule whose needle
/// appears in the prompt wins, otherwise the fallback answer is used
/// (or an error when there is none).
pub struct ScriptedLlmClient {
    rules: Vec<(String, String)>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn when(mut self, needle: &str, response: &str) -> Self {
        self.rules.push((needle.to_string(), response.to_string()));
        self
    }

    pub fn otherwise(mut self, response: &str) -> Self {
        self.fallback = Some(response.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmClient for ScriptedLlmClient {
    fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| LlmError::MalformedResponse("no scripted answer".into()))
    }

    fn is_available(&self) -> Result<bool, LlmError> {
        Ok(true)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
