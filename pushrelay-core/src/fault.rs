//! Remote fault translation.

use thiserror::Error;
use tracing::warn;

use crate::PushError;

/// Remote code for an app id that was never provisioned.
pub const UNKNOWN_APP_ID: i32 = 404;
/// Remote code for a bad certificate/environment pairing.
pub const INVALID_ENVIRONMENT: i32 = 401;
/// Remote code for a relay-side timeout reaching the push service.
pub const SERVER_TIMEOUT: i32 = 500;

/// Structured fault raised by the relay on protocol-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fault {code}: {message}")]
pub struct Fault {
    /// Numeric fault code.
    pub code: i32,
    /// Human-readable fault message.
    pub message: String,
}

impl Fault {
    /// Create a new fault.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Translate this fault into the client error taxonomy.
    ///
    /// Known codes map to their domain error carrying the fault message.
    /// Any other code is returned as [`PushError::Fault`] unchanged.
    pub fn translate(self) -> PushError {
        match self.code {
            UNKNOWN_APP_ID => PushError::UnknownAppId(self.message),
            INVALID_ENVIRONMENT => PushError::InvalidEnvironment(self.message),
            SERVER_TIMEOUT => PushError::ServerTimeout(self.message),
            code => {
                warn!(code, message = %self.message, "Untranslated relay fault");
                PushError::Fault {
                    code,
                    message: self.message,
                }
            }
        }
    }
}

impl From<Fault> for PushError {
    fn from(fault: Fault) -> Self {
        fault.translate()
    }
}

/// Failure reported by a transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The relay answered with a structured fault.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// The relay could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The relay answered with something that is not a valid response.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<TransportError> for PushError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Fault(fault) => fault.translate(),
            other => PushError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            Fault::new(404, "no such app").translate(),
            PushError::UnknownAppId("no such app".into())
        );
        assert_eq!(
            Fault::new(401, "bad env").translate(),
            PushError::InvalidEnvironment("bad env".into())
        );
        assert_eq!(
            Fault::new(500, "apple unreachable").translate(),
            PushError::ServerTimeout("apple unreachable".into())
        );
    }

    #[test]
    fn test_unknown_code_passthrough() {
        for code in [0, 1, 400, 403, 501, -32601] {
            let err = Fault::new(code, "something else").translate();
            assert_eq!(
                err,
                PushError::Fault {
                    code,
                    message: "something else".into()
                }
            );
        }
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: PushError = TransportError::Fault(Fault::new(404, "gone")).into();
        assert!(matches!(err, PushError::UnknownAppId(ref m) if m == "gone"));

        let err: PushError = TransportError::Connection("refused".into()).into();
        assert_eq!(err, PushError::Transport("Connection error: refused".into()));
    }
}
