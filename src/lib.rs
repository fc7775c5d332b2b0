// Push Relay - client for a push-notification relay service
//
// Provisions apps, sends notifications and collects inactive-device feedback
// through a relay reached over XML-RPC.

// Re-export core functionality
pub use pushrelay_core::*;
pub use serde_json::{Value, json};

// Re-export optional crates
#[cfg(feature = "xmlrpc")]
pub use pushrelay_xmlrpc;

#[cfg(feature = "log")]
pub use pushrelay_log;

/// Create a client that talks XML-RPC to the relay and configure it.
///
/// Apps listed in `config.initial` are provisioned before this returns.
///
/// ```rust,no_run
/// use pushrelay::prelude::*;
///
/// # async fn run() -> pushrelay::Result<()> {
/// let client = pushrelay::connect(ClientConfig::builder().port(7077).build()).await?;
/// client
///     .notify(NotifyArgs::single("my-app", "device-token", Notification::new("hi")))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "xmlrpc")]
pub async fn connect(config: ClientConfig) -> Result<PushClient> {
    let client = PushClient::new(pushrelay_xmlrpc::connect);
    client.configure(config).await?;
    Ok(client)
}

// Prelude for common imports
pub mod prelude {
    pub use pushrelay_core::prelude::*;

    #[cfg(feature = "xmlrpc")]
    pub use crate::connect;
}
