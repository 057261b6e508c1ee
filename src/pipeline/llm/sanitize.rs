//! Post-LLM output cleanup.
//!
//! Strips reasoning preambles and stray tokenizer artifacts so the JSON
//! scanner only sees the answer.

use std::sync::LazyLock;

use regex::Regex;

/// Strip model-specific artifacts from raw LLM output.
///
/// Handles:
/// 1. `<think>...</think>` reasoning blocks (an unterminated block drops the rest)
/// 2. Gemma-style `<unusedN>thought\n` preambles
/// 3. Stray `<unusedN>` tokens
pub fn sanitize_llm_output(raw: &str) -> String {
    static THINK_BLOCK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<think>.*?(</think>|$)").expect("valid regex"));
    static UNUSED_TOKEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<unused\d+>").expect("valid regex"));

    let mut text = THINK_BLOCK_RE.replace_all(raw, "").to_string();

    if let Some(idx) = text.find("<unused") {
        if let Some(thought_offset) = text[idx..].find("thought\n") {
            text = text[idx + thought_offset + "thought\n".len()..].to_string();
        }
    }

    text = UNUSED_TOKEN_RE.replace_all(&text, "").to_string();
    text.trim().to_string()
}
