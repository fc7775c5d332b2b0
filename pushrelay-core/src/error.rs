//! Push relay client error types.

use thiserror::Error;

/// Result type for push relay operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Push relay client errors.
///
/// The first five variants form the domain taxonomy callers match on.
/// `Fault` carries any remote fault the client has no mapping for, with the
/// relay's code and message intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// An operation was attempted before the client was configured.
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Required fields were missing, null, or malformed.
    #[error("Invalid arguments supplied to {operation}: {message}")]
    InvalidArguments {
        /// Operation the arguments were supplied to.
        operation: &'static str,
        /// What was wrong with them.
        message: String,
    },

    /// The relay has never provisioned the app id (remote code 404).
    #[error("Unknown app id: {0}")]
    UnknownAppId(String),

    /// Bad certificate/environment pairing (remote code 401).
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// The relay timed out reaching the upstream push service (remote code 500).
    #[error("Server timeout: {0}")]
    ServerTimeout(String),

    /// Remote fault with a code the client does not translate.
    #[error("Remote fault {code}: {message}")]
    Fault {
        /// Remote fault code.
        code: i32,
        /// Remote fault message.
        message: String,
    },

    /// Transport failure that is not a remote fault.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PushError {
    /// Build an `InvalidArguments` error for an operation.
    pub fn invalid_arguments(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation,
            message: message.into(),
        }
    }

    /// Check if this error is one of the typed domain errors rather than a
    /// passthrough fault or transport failure.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured(_)
                | Self::InvalidArguments { .. }
                | Self::UnknownAppId(_)
                | Self::InvalidEnvironment(_)
                | Self::ServerTimeout(_)
        )
    }

    /// Remote fault code this error originated from, if any.
    pub fn fault_code(&self) -> Option<i32> {
        match self {
            Self::UnknownAppId(_) => Some(crate::fault::UNKNOWN_APP_ID),
            Self::InvalidEnvironment(_) => Some(crate::fault::INVALID_ENVIRONMENT),
            Self::ServerTimeout(_) => Some(crate::fault::SERVER_TIMEOUT),
            Self::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PushError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for PushError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
