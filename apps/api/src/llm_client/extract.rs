//! Recovers a JSON array from free-form model output.
//!
//! Models asked for "JSON only" still wrap it in prose or code fences. Two
//! strategies are tried in order: a greedy slice from the first `[` to the last
//! `]`, then code-fence stripping when no such slice exists. If neither decodes,
//! the caller's original list comes back with the failure attached.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Decode failure, carrying the offending model output for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("The model returned invalid JSON. (Error: {message})")]
pub struct ExtractError {
    pub message: String,
    pub raw_output: String,
}

/// Result of `extract_list`: either the decoded items, or the fallback plus why.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub items: Vec<T>,
    pub error: Option<ExtractError>,
}

impl<T> Extracted<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn bracket_slice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // (?s) lets `.` span newlines; `.*` is greedy so the slice ends at the last `]`.
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("bracket regex is valid"))
}

/// Extracts a JSON array of `T` from `raw_text`, or returns `fallback` unchanged.
///
/// Elements are decoded generically; no field-level validation happens here.
pub fn extract_list<T>(raw_text: &str, fallback: &[T]) -> Extracted<T>
where
    T: DeserializeOwned + Clone,
{
    let candidate = match bracket_slice_regex().find(raw_text) {
        Some(found) => found.as_str(),
        None => strip_code_fences(raw_text),
    };

    match serde_json::from_str::<Vec<T>>(candidate) {
        Ok(items) => Extracted { items, error: None },
        Err(e) => {
            let error = ExtractError {
                message: e.to_string(),
                raw_output: raw_text.to_string(),
            };
            warn!("{error}");
            Extracted {
                items: fallback.to_vec(),
                error: Some(error),
            }
        }
    }
}

/// Strips a leading ```` ```lang ```` marker and a trailing ```` ``` ```` from trimmed text.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text.strip_suffix("```").map(str::trim).unwrap_or(text);
    };
    // Drop the language tag, if any, up to the end of the opening line.
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.trim();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
