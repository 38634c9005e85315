//! Result Normalizer — coerces the scoring service's untyped response into
//! ranked `Candidate`s.
//!
//! The response shape is not contractually guaranteed, so every field is
//! optional here. The only hard failure is a missing or non-array
//! `candidates` field.

use serde_json::{Map, Value};
use tracing::warn;

use crate::screening::error::ScreeningError;
use crate::screening::models::{
    rank_candidates, Candidate, ReasoningEntry, ScoreBand, SkillAssessment,
};

pub const UNNAMED_CANDIDATE: &str = "Unnamed candidate";

const SCORE_KEYS: &[&str] = &["score", "overallScore"];
const REASONING_KEYS: &[&str] = &["reasoning", "aiReasoning"];

/// Normalizes a raw scoring response into candidates ordered by descending
/// score, ties broken by ascending id.
pub fn normalize(raw: &Value) -> Result<Vec<Candidate>, ScreeningError> {
    let entries = match raw.get("candidates") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ScreeningError::schema(format!(
                "`candidates` must be an array, got {}",
                json_type(other)
            )))
        }
        None => return Err(ScreeningError::schema("response has no `candidates` field")),
    };

    let mut candidates = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::Object(fields) => candidates.push(normalize_candidate(index, fields)),
            other => warn!(
                "Skipping candidate #{}: expected an object, got {}",
                index + 1,
                json_type(other)
            ),
        }
    }

    rank_candidates(&mut candidates);
    Ok(candidates)
}

fn normalize_candidate(index: usize, fields: &Map<String, Value>) -> Candidate {
    let id = fields
        .get("id")
        .and_then(coerce_string)
        .unwrap_or_else(|| format!("candidate-{}", index + 1));

    let name = fields
        .get("name")
        .and_then(coerce_string)
        .unwrap_or_else(|| UNNAMED_CANDIDATE.to_string());

    let score = first_present(fields, SCORE_KEYS)
        .and_then(coerce_score)
        .unwrap_or_else(|| {
            warn!("Candidate '{id}' has no usable score; defaulting to 0");
            0
        });

    let mut skills: Vec<SkillAssessment> = fields
        .get("skills")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_skill).collect())
        .unwrap_or_default();
    // stable: bare skill names keep their original order
    skills.sort_by(|a, b| b.level.cmp(&a.level));

    let reasoning = first_present(fields, REASONING_KEYS)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_reasoning).collect())
        .unwrap_or_default();

    Candidate {
        email: fields.get("email").and_then(coerce_string),
        match_reason: fields
            .get("matchReason")
            .and_then(coerce_string)
            .unwrap_or_default(),
        band: ScoreBand::for_score(score),
        id,
        name,
        score,
        skills,
        reasoning,
    }
}

fn normalize_skill(item: &Value) -> Option<SkillAssessment> {
    match item {
        Value::String(name) if !name.trim().is_empty() => Some(SkillAssessment {
            name: name.trim().to_string(),
            level: 0,
        }),
        Value::Object(fields) => Some(SkillAssessment {
            name: fields.get("name").and_then(coerce_string)?,
            level: fields.get("level").and_then(coerce_score).unwrap_or(0),
        }),
        _ => None,
    }
}

fn normalize_reasoning(item: &Value) -> Option<ReasoningEntry> {
    let fields = item.as_object()?;
    Some(ReasoningEntry {
        factor: fields.get("factor").and_then(coerce_string)?,
        score: fields.get("score").and_then(coerce_score).unwrap_or(0),
        note: fields
            .get("note")
            .and_then(coerce_string)
            .unwrap_or_default(),
    })
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
}

/// Non-empty strings pass through trimmed; numbers are rendered as text.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings, rounded and clamped into 0..=100.
fn coerce_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_nan() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
