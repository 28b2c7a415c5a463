//! Model reply parsing and repair
//!
//! Turning a free-text reply into an [`AnalysisResponse`] happens in three
//! steps, each with its own failure:
//!
//! 1. [`extract_json_block`]: the last fenced ```` ```json ```` block holding
//!    an object, otherwise the whole trimmed reply.
//! 2. [`repair_candidate`]: coerce `flow` and `wastes` into the taxonomy.
//! 3. Strict serde decoding of the repaired object.

use crate::classifier::MAX_WASTES;
use crate::output::AnalysisResponse;
use crate::taxonomy::{Taxonomy, DEFAULT_FLOW, DEFAULT_WASTE};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Reply is empty")]
    EmptyReply,
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("Reply does not match the analysis schema: {0}")]
    SchemaMismatch(String),
}

fn fenced_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```json\s*(\{[\s\S]*?\})\s*```").expect("valid fenced JSON regex"))
}

/// Returns the candidate JSON text of a reply
pub fn extract_json_block(reply: &str) -> &str {
    match fenced_json_regex().captures_iter(reply).last() {
        Some(captures) => match captures.get(1) {
            Some(m) => m.as_str(),
            None => reply.trim(),
        },
        None => reply.trim(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Forces `flow` and `wastes` of a decoded object into the taxonomy
///
/// An unknown or missing flow becomes `field_ops`. Wastes are filtered to
/// known ids and capped at three; an empty result becomes `[motion]`.
pub fn repair_candidate(object: &mut serde_json::Map<String, Value>, taxonomy: &Taxonomy) {
    let flow_valid = object
        .get("flow")
        .and_then(Value::as_str)
        .map_or(false, |flow| taxonomy.is_flow(flow));
    if !flow_valid {
        debug!("Repairing flow {:?} -> {}", object.get("flow"), DEFAULT_FLOW);
        object.insert("flow".to_string(), Value::String(DEFAULT_FLOW.to_string()));
    }

    let mut wastes: Vec<Value> = object
        .get("wastes")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|w| taxonomy.is_waste(w))
                .map(|w| Value::String(w.to_string()))
                .collect()
        })
        .unwrap_or_default();
    wastes.truncate(MAX_WASTES);
    if wastes.is_empty() {
        wastes.push(Value::String(DEFAULT_WASTE.to_string()));
    }
    object.insert("wastes".to_string(), Value::Array(wastes));
}

/// Extracts, repairs and decodes a model reply
pub fn parse_analysis_reply(reply: &str, taxonomy: &Taxonomy) -> Result<AnalysisResponse, ParseError> {
    if reply.trim().is_empty() {
        return Err(ParseError::EmptyReply);
    }

    let candidate = extract_json_block(reply);
    debug!("Candidate JSON ({} chars)", candidate.len());

    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        warn!("JSON parse error: {}", e);
        ParseError::InvalidJson(format!(
            "{}: {}",
            e,
            candidate.chars().take(100).collect::<String>()
        ))
    })?;

    let mut object = match value {
        Value::Object(map) => map,
        other => return Err(ParseError::NotAnObject(value_kind(&other))),
    };

    repair_candidate(&mut object, taxonomy);

    serde_json::from_value(Value::Object(object))
        .map_err(|e| ParseError::SchemaMismatch(e.to_string()))
}
