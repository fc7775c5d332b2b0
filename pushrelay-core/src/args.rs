//! Operation signatures and argument normalization.
//!
//! Every relay operation declares an ordered list of required fields. Callers
//! may supply those fields either as one named bundle or as a positional list
//! in signature order; both reduce to the same ordered argument list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::{PushError, Result};

/// Remote operations exposed by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Register an app id with its certificate and environment.
    Provision,
    /// Send notifications to device tokens.
    Notify,
    /// Fetch tokens the push service reported as inactive.
    Feedback,
}

impl Operation {
    /// All operations.
    pub const ALL: [Operation; 3] = [Self::Provision, Self::Notify, Self::Feedback];

    /// Remote method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Provision => "provision",
            Self::Notify => "notify",
            Self::Feedback => "feedback",
        }
    }

    /// Required fields, in positional order.
    pub fn signature(&self) -> &'static [&'static str] {
        match self {
            Self::Provision => &["app_id", "cert", "env", "timeout"],
            Self::Notify => &["app_id", "tokens", "notifications"],
            Self::Feedback => &["app_id"],
        }
    }

    /// Alternate field names accepted in named bundles, as `(alias, field)`.
    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Provision => &[("environment", "env")],
            Self::Notify => &[("token", "tokens"), ("notification", "notifications")],
            Self::Feedback => &[],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Raw call arguments: one named bundle or a positional list.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// Fields keyed by name.
    Named(Map<String, Value>),
    /// Values in signature order.
    Positional(Vec<Value>),
}

impl From<Map<String, Value>> for CallArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self::Named(map)
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

impl From<Value> for CallArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Named(map),
            Value::Array(values) => Self::Positional(values),
            other => Self::Positional(vec![other]),
        }
    }
}

impl From<&str> for CallArgs {
    fn from(value: &str) -> Self {
        Self::Positional(vec![Value::String(value.to_string())])
    }
}

/// Reduce raw arguments to the ordered list for `operation`.
///
/// A positional list holding a single mapping is read as a named bundle.
///
/// Validation is all-or-nothing: every field of the signature must be present
/// and non-null, otherwise the whole call fails with
/// [`PushError::InvalidArguments`] naming the missing fields.
pub fn normalize(operation: Operation, args: CallArgs) -> Result<Vec<Value>> {
    let signature = operation.signature();

    let args = match args {
        CallArgs::Positional(mut values) if values.len() == 1 && values[0].is_object() => {
            match values.pop() {
                Some(Value::Object(map)) => CallArgs::Named(map),
                _ => CallArgs::Positional(values),
            }
        }
        other => other,
    };

    let values = match args {
        CallArgs::Named(mut map) => signature
            .iter()
            .map(|field| take_field(operation, &mut map, field))
            .collect::<Vec<_>>(),
        CallArgs::Positional(values) => {
            if values.len() != signature.len() {
                return Err(PushError::invalid_arguments(
                    operation.method(),
                    format!(
                        "expected {} positional arguments ({}), got {}",
                        signature.len(),
                        signature.join(", "),
                        values.len()
                    ),
                ));
            }
            values
        }
    };

    let missing: Vec<&str> = signature
        .iter()
        .zip(&values)
        .filter(|(_, value)| value.is_null())
        .map(|(field, _)| *field)
        .collect();

    if !missing.is_empty() {
        return Err(PushError::invalid_arguments(
            operation.method(),
            format!(
                "missing required fields [{}] (expected {})",
                missing.join(", "),
                signature.join(", ")
            ),
        ));
    }

    Ok(values)
}

fn take_field(operation: Operation, map: &mut Map<String, Value>, field: &str) -> Value {
    match map.remove(field) {
        Some(value) if !value.is_null() => value,
        _ => operation
            .aliases()
            .iter()
            .filter(|(_, canonical)| *canonical == field)
            .find_map(|(alias, _)| map.remove(*alias).filter(|v| !v.is_null()))
            .unwrap_or(Value::Null),
    }
}

fn named<const N: usize>(fields: [(&str, Option<Value>); N]) -> CallArgs {
    CallArgs::Named(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.unwrap_or(Value::Null)))
            .collect(),
    )
}

/// Push service environment a certificate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development/sandbox gateway.
    #[default]
    Sandbox,
    /// Production gateway.
    Production,
}

impl Environment {
    /// Wire name of the environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sandbox" | "development" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(PushError::Config(format!("unknown environment: {other}"))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed arguments for `provision`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionArgs {
    /// App id to provision.
    pub app_id: Option<String>,
    /// Certificate path or PEM contents.
    pub cert: Option<String>,
    /// Environment the certificate belongs to.
    pub env: Option<Environment>,
    /// Relay-side connection timeout in seconds.
    pub timeout: Option<u64>,
}

impl ProvisionArgs {
    /// Create fully populated provisioning arguments.
    pub fn new(
        app_id: impl Into<String>,
        cert: impl Into<String>,
        env: Environment,
        timeout: u64,
    ) -> Self {
        Self {
            app_id: Some(app_id.into()),
            cert: Some(cert.into()),
            env: Some(env),
            timeout: Some(timeout),
        }
    }
}

impl From<ProvisionArgs> for CallArgs {
    fn from(args: ProvisionArgs) -> Self {
        named([
            ("app_id", args.app_id.map(Value::from)),
            ("cert", args.cert.map(Value::from)),
            ("env", args.env.map(|e| Value::from(e.as_str()))),
            ("timeout", args.timeout.map(Value::from)),
        ])
    }
}

/// Typed arguments for `notify`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyArgs {
    /// App id to send through.
    pub app_id: Option<String>,
    /// One token string or a list of tokens.
    pub tokens: Option<Value>,
    /// One notification or a list paired with `tokens`.
    pub notifications: Option<Value>,
}

impl NotifyArgs {
    /// One notification to one device.
    pub fn single(
        app_id: impl Into<String>,
        token: impl Into<String>,
        notification: impl Into<Value>,
    ) -> Self {
        Self {
            app_id: Some(app_id.into()),
            tokens: Some(Value::String(token.into())),
            notifications: Some(notification.into()),
        }
    }

    /// Notifications paired positionally with tokens.
    pub fn batch<T, N>(
        app_id: impl Into<String>,
        tokens: impl IntoIterator<Item = T>,
        notifications: impl IntoIterator<Item = N>,
    ) -> Self
    where
        T: Into<String>,
        N: Into<Value>,
    {
        Self {
            app_id: Some(app_id.into()),
            tokens: Some(Value::Array(
                tokens.into_iter().map(|t| Value::String(t.into())).collect(),
            )),
            notifications: Some(Value::Array(
                notifications.into_iter().map(Into::into).collect(),
            )),
        }
    }
}

impl From<NotifyArgs> for CallArgs {
    fn from(args: NotifyArgs) -> Self {
        named([
            ("app_id", args.app_id.map(Value::from)),
            ("tokens", args.tokens),
            ("notifications", args.notifications),
        ])
    }
}

/// Typed arguments for `feedback`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackArgs {
    /// App id to query.
    pub app_id: Option<String>,
}

impl FeedbackArgs {
    /// Feedback query for an app id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
        }
    }
}

impl From<FeedbackArgs> for CallArgs {
    fn from(args: FeedbackArgs) -> Self {
        named([("app_id", args.app_id.map(Value::from))])
    }
}
