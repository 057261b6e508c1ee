use super::LlmError;

/// Text-in/text-out completion endpoint.
///
/// Every prompt is self-contained: no streaming, no conversation state.
/// Implementations are blocking and must be called from a blocking context
/// (`tokio::task::spawn_blocking`) when used inside the runtime.
pub trait LlmClient: Send + Sync {
    /// Generate a completion for `prompt` under the `system` instruction.
    fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Cheap reachability probe used by health checks.
    fn is_available(&self) -> Result<bool, LlmError>;

    /// Model identifier used for generation.
    fn model(&self) -> &str;
}
