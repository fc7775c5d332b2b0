//! Remote-procedure transport boundary.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::{ClientConfig, Result, TransportError};

/// Remote-procedure transport to the relay.
///
/// Implementations own connection setup, wire serialization and timeout
/// enforcement. A protocol-level failure is reported as
/// [`TransportError::Fault`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke `method` with positional `args`.
    async fn call(&self, method: &str, args: Vec<Value>) -> std::result::Result<Value, TransportError>;

    /// Invoke `method` from a background task.
    ///
    /// Behaves exactly like [`Transport::call`] unless overridden.
    async fn call_async(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Value, TransportError> {
        self.call(method, args).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, method: &str, args: Vec<Value>) -> std::result::Result<Value, TransportError> {
        (**self).call(method, args).await
    }

    async fn call_async(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Value, TransportError> {
        (**self).call_async(method, args).await
    }
}

/// Builds a transport from connection parameters.
pub trait Connector: Send + Sync {
    /// Open a transport for `config`.
    fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn Transport>>;
}

impl<F> Connector for F
where
    F: Fn(&ClientConfig) -> Result<Arc<dyn Transport>> + Send + Sync,
{
    fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn Transport>> {
        self(config)
    }
}
