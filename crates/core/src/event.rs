// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical event record (spec §3.1 / §4.A).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::new_event_id;

/// Schema version of the current event shape.
pub const CURRENT_VERSION: u32 = 1;

/// The canonical DevLog event record.
///
/// `payload` is always present, possibly empty, and round-trips arbitrary
/// JSON-typed values per `(source, type)` without the core knowing their
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "v", default = "default_version")]
    pub version: u32,
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

/// Top-level keys the wire format recognises; anything else at the top
/// level is rejected (spec §4.A: "top-level unknown keys are rejected").
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "v", "id", "timestamp", "source", "type", "repo", "branch", "payload",
];

/// Errors from [`Event::validate`] / [`Event::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum EventValidationError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),
    #[error("timestamp does not parse as ISO-8601: {0}")]
    BadTimestamp(String),
    #[error("unknown top-level field: {0}")]
    UnknownField(String),
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Event {
    /// `new(source, type)`: fresh id, timestamp = now, empty payload
    /// (spec §4.A).
    pub fn new(source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            version: CURRENT_VERSION,
            id: new_event_id(),
            timestamp: Utc::now(),
            source: source.into(),
            event_type: event_type.into(),
            repo: None,
            branch: None,
            payload: Map::new(),
        }
    }

    /// Validate the required-field invariants from spec §3.1:
    /// `id`, `timestamp`, `source`, `type` non-empty.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.trim().is_empty() {
            return Err(EventValidationError::MissingField("id"));
        }
        if self.source.trim().is_empty() {
            return Err(EventValidationError::MissingField("source"));
        }
        if self.event_type.trim().is_empty() {
            return Err(EventValidationError::MissingField("type"));
        }
        Ok(())
    }

    /// Encode to canonical JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, EventValidationError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from JSON bytes, rejecting stray top-level keys and invalid
    /// required fields.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventValidationError> {
        let raw: Value = serde_json::from_slice(bytes)?;
        if let Value::Object(map) = &raw {
            for key in map.keys() {
                if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
                    return Err(EventValidationError::UnknownField(key.clone()));
                }
            }
        }
        let event: Event = serde_json::from_value(raw)?;
        event.validate()?;
        Ok(event)
    }

    /// The text projection used for full-text indexing (spec §3.2):
    /// the first present key among `message`, `command`, `text`,
    /// `summary`, falling back to `type`.
    pub fn text_projection(&self) -> String {
        for key in ["message", "command", "text", "summary"] {
            if let Some(Value::String(s)) = self.payload.get(key) {
                if !s.is_empty() {
                    return s.clone();
                }
            }
        }
        self.event_type.clone()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
