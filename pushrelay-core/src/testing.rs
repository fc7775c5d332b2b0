//! In-memory transport for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Fault, Transport, TransportError};

/// A recorded transport invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Remote method name.
    pub method: String,
    /// Positional arguments as sent.
    pub args: Vec<Value>,
}

/// Transport with scripted replies that records every call.
///
/// Methods without a scripted reply answer `null`. Clones share state.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, std::result::Result<Value, TransportError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    connects: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Create a mock answering `null` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` with `value`.
    pub fn respond(self, method: &str, value: Value) -> Self {
        self.replies.lock().insert(method.to_string(), Ok(value));
        self
    }

    /// Answer `method` with a fault.
    pub fn fault(self, method: &str, code: i32, message: &str) -> Self {
        self.replies
            .lock()
            .insert(method.to_string(), Err(Fault::new(code, message).into()));
        self
    }

    /// Answer `method` with a non-fault transport failure.
    pub fn fail(self, method: &str, error: TransportError) -> Self {
        self.replies.lock().insert(method.to_string(), Err(error));
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls made to `method`.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of times a connector handed out this transport.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Connector handing out this transport, counting connections.
    pub fn connector(&self) -> impl crate::Connector + 'static {
        let transport = self.clone();
        move |_: &crate::ClientConfig| -> crate::Result<Arc<dyn Transport>> {
            transport.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(transport.clone()))
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, method: &str, args: Vec<Value>) -> std::result::Result<Value, TransportError> {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            args,
        });

        self.replies
            .lock()
            .get(method)
            .cloned()
            .unwrap_or(Ok(Value::Null))
    }
}
