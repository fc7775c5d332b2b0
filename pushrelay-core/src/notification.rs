//! Notification payloads and their wire encoding.
//!
//! The wire form is a mapping with an optional `aps` sub-map holding
//! `alert`, `badge` and `sound`, plus any extra top-level keys. Encoding
//! drops null values at every nesting level and never wraps twice, so
//! `encode(encode(x)) == encode(x)`.

use serde_json::{Map, Value};

use crate::{PushError, Result};

const APS: &str = "aps";
const ALERT: &str = "alert";
const BADGE: &str = "badge";
const SOUND: &str = "sound";

/// Push notification content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    /// Alert text.
    pub alert: Option<String>,
    /// Badge count.
    pub badge: Option<i64>,
    /// Sound name.
    pub sound: Option<String>,
    /// Extra top-level payload keys.
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Create a notification with alert text.
    pub fn new(alert: impl Into<String>) -> Self {
        Self {
            alert: Some(alert.into()),
            ..Default::default()
        }
    }

    /// Set the alert text.
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Set the badge count.
    pub fn badge(mut self, badge: i64) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Set the sound.
    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Add an extra top-level key.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Loose mapping of this notification: extra keys at the top level and
    /// the builder fields under `aps`, overriding any `aps` extra.
    pub fn to_value(&self) -> Value {
        let mut wire = self.extra.clone();

        let mut aps = match wire.remove(APS) {
            Some(Value::Object(fields)) => fields,
            Some(other) if self.alert.is_none() && self.badge.is_none() && self.sound.is_none() => {
                wire.insert(APS.into(), other);
                return Value::Object(wire);
            }
            _ => Map::new(),
        };
        if let Some(alert) = &self.alert {
            aps.insert(ALERT.into(), Value::String(alert.clone()));
        }
        if let Some(badge) = self.badge {
            aps.insert(BADGE.into(), Value::from(badge));
        }
        if let Some(sound) = &self.sound {
            aps.insert(SOUND.into(), Value::String(sound.clone()));
        }

        wire.insert(APS.into(), Value::Object(aps));
        Value::Object(wire)
    }

    /// Encode into the wire form, exactly as [`encode`] does for
    /// [`Notification::to_value`].
    pub fn encode(&self) -> Result<Value> {
        encode(&self.to_value())
    }
}

/// Notifications convert to their loose mapping; the client encodes it on
/// dispatch.
impl From<Notification> for Value {
    fn from(notification: Notification) -> Self {
        notification.to_value()
    }
}

/// Encode a loose notification mapping into the wire form.
///
/// Accepts both an already-encoded mapping (`{"aps": {...}, ...}`) and a flat
/// one with `alert`/`badge`/`sound` at the top level; flat fields are moved
/// under `aps` unless `aps` already carries them. An `aps` map left empty
/// after filtering is omitted.
pub fn encode(note: &Value) -> Result<Value> {
    let Value::Object(input) = note else {
        return Err(invalid(format!("notification must be a mapping, got {note}")));
    };

    let mut aps = Map::new();
    if let Some(nested) = input.get(APS) {
        match nested {
            Value::Object(fields) => {
                for (key, value) in fields {
                    if let Some(value) = coerce_aps_field(key, value)? {
                        aps.insert(key.clone(), value);
                    }
                }
            }
            Value::Null => {}
            other => return Err(invalid(format!("aps must be a mapping, got {other}"))),
        }
    }

    let mut wire = Map::new();
    for (key, value) in input {
        match key.as_str() {
            APS => {}
            ALERT | BADGE | SOUND => {
                if aps.contains_key(key) {
                    continue;
                }
                if let Some(value) = coerce_aps_field(key, value)? {
                    aps.insert(key.clone(), value);
                }
            }
            _ if value.is_null() => {}
            _ => {
                wire.insert(key.clone(), strip_nulls(value.clone()));
            }
        }
    }

    if !aps.is_empty() {
        wire.insert(APS.into(), Value::Object(aps));
    }
    Ok(Value::Object(wire))
}

/// Validate the token/notification pairing and encode every notification.
///
/// A single token pairs with a single notification; a token list pairs
/// positionally with a notification list of the same length. Spaces inside
/// tokens are removed.
pub(crate) fn encode_batch(tokens: Value, notifications: Value) -> Result<(Value, Value)> {
    match (tokens, notifications) {
        (Value::String(token), note @ Value::Object(_)) => {
            Ok((Value::String(compact_token(&token)), encode(&note)?))
        }
        (Value::Array(tokens), Value::Array(notes)) => {
            if tokens.is_empty() {
                return Err(invalid("token list is empty"));
            }
            if tokens.len() != notes.len() {
                return Err(invalid(format!(
                    "{} tokens paired with {} notifications",
                    tokens.len(),
                    notes.len()
                )));
            }
            let tokens = tokens
                .iter()
                .map(|token| match token {
                    Value::String(token) => Ok(Value::String(compact_token(token))),
                    other => Err(invalid(format!("token must be a string, got {other}"))),
                })
                .collect::<Result<Vec<_>>>()?;
            let notes = notes.iter().map(encode).collect::<Result<Vec<_>>>()?;
            Ok((Value::Array(tokens), Value::Array(notes)))
        }
        (tokens, notes) => Err(invalid(format!(
            "tokens and notifications must be a token with one notification or two lists, got {} and {}",
            kind(&tokens),
            kind(&notes)
        ))),
    }
}

fn coerce_aps_field(key: &str, value: &Value) -> Result<Option<Value>> {
    let coerced = match (key, value) {
        (_, Value::Null) => None,
        (BADGE, Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(badge), _) => Some(Value::from(badge)),
            (None, Some(f)) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Some(Value::from(f as i64))
            }
            _ => return Err(invalid(format!("badge is not an integer: {n}"))),
        },
        (BADGE, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(badge) => Some(Value::from(badge)),
            Err(_) => return Err(invalid(format!("badge is not an integer: {s:?}"))),
        },
        (BADGE, other) => return Err(invalid(format!("badge is not an integer: {other}"))),
        (ALERT | SOUND, Value::Bool(_) | Value::Number(_)) => {
            Some(Value::String(value.to_string()))
        }
        (_, other) => Some(strip_nulls(other.clone())),
    };
    Ok(coerced)
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

fn compact_token(token: &str) -> String {
    token.chars().filter(|c| *c != ' ').collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn invalid(message: impl Into<String>) -> PushError {
    PushError::invalid_arguments("notify", message)
}
