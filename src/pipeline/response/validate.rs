use serde_json::Value;

use super::justify::{MAX_REASONS, MIN_REASONS};
use super::types::{ResponseEnvelope, ValidationReport};

const REQUIRED_CHOSEN_FIELDS: [&str; 4] = ["company", "total_score", "rank", "reasons"];

/// Structural check of a serialized envelope.
pub fn validate_value(response: &Value) -> ValidationReport {
    let mut issues = Vec::new();

    for key in ["chosen", "not_chosen"] {
        if response.get(key).is_none() {
            issues.push(format!("Missing '{key}' key"));
        }
    }

    match response.get("chosen") {
        None => {}
        Some(Value::Array(entries)) => {
            for (i, entry) in entries.iter().enumerate() {
                let Some(fields) = entry.as_object() else {
                    issues.push(format!("Chosen company {i} is not an object"));
                    continue;
                };
                for field in REQUIRED_CHOSEN_FIELDS {
                    if !fields.contains_key(field) {
                        issues.push(format!("Chosen company {i} missing field: {field}"));
                    }
                }
                match fields.get("reasons") {
                    None => {}
                    Some(Value::Array(reasons)) if reasons.len() < MIN_REASONS => {
                        issues.push(format!("Chosen company {i} has fewer than {MIN_REASONS} reasons"));
                    }
                    Some(Value::Array(reasons)) if reasons.len() > MAX_REASONS => {
                        issues.push(format!("Chosen company {i} has more than {MAX_REASONS} reasons"));
                    }
                    Some(Value::Array(_)) => {}
                    Some(_) => issues.push(format!("Chosen company {i} reasons is not a list")),
                }
            }
        }
        Some(_) => issues.push("'chosen' is not a list".to_string()),
    }

    if let Err(e) = serde_json::to_string(response) {
        issues.push(format!("Response is not JSON serializable: {e}"));
    }

    ValidationReport::from_issues(issues)
}

/// Serialize then validate.
pub fn validate_envelope(envelope: &ResponseEnvelope) -> ValidationReport {
    match serde_json::to_value(envelope) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationReport::from_issues(vec![format!("Response is not JSON serializable: {e}")]),
    }
}
