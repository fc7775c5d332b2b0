//! XML-RPC transport error types.

use pushrelay_core::{Fault, TransportError};
use thiserror::Error;

/// Result type for XML-RPC operations.
pub type Result<T> = std::result::Result<T, XmlRpcError>;

/// XML-RPC transport errors.
#[derive(Debug, Error)]
pub enum XmlRpcError {
    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that is not a valid XML-RPC response.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The server answered with a fault.
    #[error("Server {0}")]
    Fault(Fault),
}

impl From<XmlRpcError> for TransportError {
    fn from(err: XmlRpcError) -> Self {
        match err {
            XmlRpcError::Fault(fault) => Self::Fault(fault),
            XmlRpcError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                Self::Connection(e.to_string())
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}
