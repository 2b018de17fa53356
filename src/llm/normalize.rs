//! Extraction of a [`SummaryRecord`] from free-text model output.
//!
//! The JSON span is taken greedily: from the first `{` to the last `}` in the
//! whole text. That tolerates commentary before and after a single object, but
//! two separate objects in one reply get merged into one span, which then fails
//! to parse. Tests pin this behavior down.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::summary::SummaryRecord;

pub const REQUIRED_KEYS: [&str; 4] = ["summary", "category", "priority", "response_required"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("no JSON object found in model output")]
    NoStructureFound,
    #[error("could not parse model output as JSON: {0}")]
    ParseFailure(String),
    #[error("model output is missing keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
}

/// Greedy `{ ... }` span of `raw`, if it has one.
pub fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn normalize(raw: &str) -> Result<SummaryRecord, NormalizationError> {
    let span = json_span(raw).ok_or(NormalizationError::NoStructureFound)?;

    // a span opening with `{` that parses at all is an object
    let obj: Map<String, Value> =
        serde_json::from_str(span).map_err(|e| NormalizationError::ParseFailure(e.to_string()))?;

    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|k| string_field(&obj, k).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(NormalizationError::MissingKeys(missing));
    }

    let field = |k: &str| string_field(&obj, k).unwrap_or_default();
    Ok(SummaryRecord {
        summary: field("summary"),
        category: field("category"),
        priority: field("priority"),
        response_required: field("response_required"),
    })
}

// A key only counts as present when it holds a string that is not blank.
// The value itself is returned untouched.
fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
