//! # Push Relay Core
//!
//! Call dispatch for a push-notification relay reached over a
//! remote-procedure transport.
//!
//! ## Features
//!
//! - **Flexible arguments**: named bundles, positional lists or typed structs
//! - **Payload normalization**: notifications reduced to a canonical wire form
//! - **Foreground or background calls**: await the result or get a callback
//! - **Typed errors**: relay fault codes mapped to a stable error enum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pushrelay_core::{ClientConfig, Notification, NotifyArgs, PushClient};
//! use pushrelay_core::testing::MockTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PushClient::with_transport(MockTransport::new());
//!     client.configure(ClientConfig::default()).await?;
//!
//!     let note = Notification::new("New message").badge(1);
//!     client.notify(NotifyArgs::single("my-app", "device-token", note)).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod client;
mod config;
mod error;
mod fault;
mod feedback;
pub mod notification;
pub mod testing;
mod transport;

pub use args::{
    CallArgs, Environment, FeedbackArgs, NotifyArgs, Operation, ProvisionArgs, normalize,
};
pub use client::{Callback, Dispatch, PushClient};
pub use config::{ClientConfig, ClientConfigBuilder, InitialApp};
pub use error::{PushError, Result};
pub use fault::{Fault, TransportError};
pub use feedback::FeedbackEntry;
pub use notification::Notification;
pub use transport::{Connector, Transport};

/// Fault codes the client translates.
pub mod codes {
    pub use crate::fault::{INVALID_ENVIRONMENT, SERVER_TIMEOUT, UNKNOWN_APP_ID};
}

/// Prelude for common imports.
///
/// ```
/// use pushrelay_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::args::{CallArgs, Environment, FeedbackArgs, NotifyArgs, Operation, ProvisionArgs};
    pub use crate::client::{Dispatch, PushClient};
    pub use crate::config::{ClientConfig, InitialApp};
    pub use crate::error::{PushError, Result};
    pub use crate::fault::{Fault, TransportError};
    pub use crate::feedback::FeedbackEntry;
    pub use crate::notification::Notification;
    pub use crate::transport::{Connector, Transport};
}
