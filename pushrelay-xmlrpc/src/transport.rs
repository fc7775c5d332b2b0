//! XML-RPC over HTTP transport.

use async_trait::async_trait;
use pushrelay_core::{ClientConfig, PushError, Transport, TransportError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::codec::{MethodResponse, decode_response, encode_call};
use crate::{Result, XmlRpcError};

/// XML-RPC transport posting calls to the relay endpoint.
#[derive(Debug, Clone)]
pub struct XmlRpcTransport {
    client: Client,
    url: String,
}

impl XmlRpcTransport {
    /// Create a transport for `config`.
    ///
    /// The configured timeout bounds each whole request.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("pushrelay-xmlrpc/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.url(),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform one call, returning the decoded result or the server fault.
    pub async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let body = encode_call(method, args);
        debug!(method, url = %self.url, "Sending XML-RPC request");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(XmlRpcError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        match decode_response(&text)? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault(fault) => {
                debug!(method, code = fault.code, "XML-RPC fault");
                Err(XmlRpcError::Fault(fault))
            }
        }
    }
}

#[async_trait]
impl Transport for XmlRpcTransport {
    async fn call(&self, method: &str, args: Vec<Value>) -> std::result::Result<Value, TransportError> {
        self.invoke(method, &args).await.map_err(TransportError::from)
    }
}

/// Connector opening an [`XmlRpcTransport`]; pass it to
/// [`pushrelay_core::PushClient::new`].
pub fn connect(config: &ClientConfig) -> pushrelay_core::Result<Arc<dyn Transport>> {
    let transport =
        XmlRpcTransport::new(config).map_err(|e| PushError::Config(e.to_string()))?;
    Ok(Arc::new(transport))
}
