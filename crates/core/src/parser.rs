//! Tolerant decoding of the JSON arrays returned for clause extraction and
//! question generation.
//!
//! Model output is untrusted. Every function here is total: malformed input
//! yields an empty list or a defaulted field, never an error.

use serde_json::{Map, Value};

use crate::types::{ConfusingClause, RiskLevel, SuggestedQuestion};

pub const RELATED_CLAUSE_MAX_CHARS: usize = 100;
pub const FALLBACK_QUESTION: &str = "What should I ask my lawyer about this section?";
pub const DEFAULT_CONTEXT: &str = "General";

/// Decode a clause-extraction payload. Records without both `clause` and
/// `whyConfusing` are dropped.
pub fn parse_clauses(payload: &str, section_index: usize) -> Vec<ConfusingClause> {
    let Some(records) = decode_array(payload) else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let clause = text_field(record, "clause")?;
            let why_confusing = text_field(record, "whyConfusing")?;
            let risk_level = record
                .get("riskLevel")
                .and_then(Value::as_str)
                .and_then(RiskLevel::parse)
                .unwrap_or_default();

            Some(ConfusingClause {
                clause,
                why_confusing,
                suggested_rewrite: text_field(record, "suggestedRewrite"),
                risk_level,
                section_index,
            })
        })
        .collect()
}

/// Decode a question-generation payload, filling in defaults for missing fields.
pub fn parse_questions(payload: &str, segment_text: &str) -> Vec<SuggestedQuestion> {
    let Some(records) = decode_array(payload) else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            let related = text_field(record, "relatedClause")
                .unwrap_or_else(|| segment_text.to_string());
            SuggestedQuestion {
                question: text_field(record, "question")
                    .unwrap_or_else(|| FALLBACK_QUESTION.to_string()),
                context: text_field(record, "context")
                    .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
                related_clause: truncate_chars(&related, RELATED_CLAUSE_MAX_CHARS),
            }
        })
        .collect()
}

/// Non-blank string field, or `None`.
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Try the payload as-is, then without a markdown fence, then the outermost
/// `[...]` slice. The first candidate that decodes decides the outcome: a
/// decoded non-array is `None`.
fn decode_array(payload: &str) -> Option<Vec<Value>> {
    let trimmed = payload.trim();
    let candidates = [
        Some(trimmed),
        strip_code_fence(trimmed),
        bracketed_slice(trimmed),
    ];

    let value = candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok());

    match value {
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            tracing::debug!("generation payload decoded to a non-array value");
            None
        }
        None => {
            tracing::debug!(len = payload.len(), "generation payload is not valid JSON");
            None
        }
    }
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let body = text.strip_prefix("```")?;
    // Drop the info string (```json) up to the end of the opening line.
    let body = &body[body.find('\n')? + 1..];
    let body = body.trim_end();
    Some(body.strip_suffix("```").unwrap_or(body).trim())
}

fn bracketed_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}
