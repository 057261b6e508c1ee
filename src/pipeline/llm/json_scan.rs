//! Locate JSON inside free-form LLM output.
//!
//! Models wrap their JSON in prose, markdown fences, or thinking preambles.
//! The scanner returns the first top-level balanced `{...}` or `[...]` span,
//! ignoring brackets that appear inside JSON string literals. Everything
//! around the span is discarded.

use serde::de::DeserializeOwned;

use super::LlmError;

/// First balanced `{...}` span, or `None`.
pub fn first_json_object(text: &str) -> Option<&str> {
    first_balanced(text, b'{', b'}')
}

/// First balanced `[...]` span, or `None`.
pub fn first_json_array(text: &str) -> Option<&str> {
    first_balanced(text, b'[', b']')
}

/// Scan for the first object span and deserialize it.
pub fn parse_first_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let span = first_json_object(text).ok_or(LlmError::NoJson("object"))?;
    Ok(serde_json::from_str(span)?)
}

/// Scan for the first array span and deserialize it.
pub fn parse_first_array<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let span = first_json_array(text).ok_or(LlmError::NoJson("array"))?;
    Ok(serde_json::from_str(span)?)
}

fn first_balanced(text: &str, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    // An opener that never closes (e.g. a stray brace in prose) must not
    // hide a well-formed span that starts after it.
    while let Some(offset) = bytes[search_from..].iter().position(|&b| b == open) {
        let start = search_from + offset;
        if let Some(end) = balanced_end(bytes, start, open, close) {
            // Both ends are ASCII, so the slice sits on char boundaries.
            return Some(&text[start..=end]);
        }
        search_from = start + 1;
    }
    None
}

fn balanced_end(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
