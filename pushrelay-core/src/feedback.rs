//! Feedback results.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::{PushError, Result};

const TIMESTAMP_FORMATS: &[&str] = &["%Y%m%dT%H:%M:%S", "%Y%m%dT%H%M%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// A device token the push service reported as inactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    /// When the token stopped accepting notifications.
    pub expired_at: NaiveDateTime,
    /// Hex device token.
    pub token: String,
}

impl FeedbackEntry {
    /// Decode a raw `feedback` result: a list of `[timestamp, token]` pairs.
    /// A `null` result means no feedback.
    pub fn parse_list(result: &Value) -> Result<Vec<Self>> {
        match result {
            Value::Null => Ok(Vec::new()),
            Value::Array(entries) => entries.iter().map(Self::parse).collect(),
            other => Err(malformed(format!("expected a list, got {other}"))),
        }
    }

    fn parse(entry: &Value) -> Result<Self> {
        let [timestamp, token] = entry.as_array().map(Vec::as_slice).unwrap_or_default() else {
            return Err(malformed(format!("expected [timestamp, token], got {entry}")));
        };
        let Some(token) = token.as_str() else {
            return Err(malformed(format!("token is not a string: {token}")));
        };

        Ok(Self {
            expired_at: parse_timestamp(timestamp)?,
            token: token.to_string(),
        })
    }
}

fn parse_timestamp(value: &Value) -> Result<NaiveDateTime> {
    let parsed = match value {
        Value::String(s) => TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.naive_utc())
            }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    };

    parsed.ok_or_else(|| malformed(format!("unreadable timestamp: {value}")))
}

fn malformed(message: String) -> PushError {
    PushError::Serialization(format!("malformed feedback: {message}"))
}
