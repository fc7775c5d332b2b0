//! # Push Relay XML-RPC
//!
//! XML-RPC over HTTP transport for [`pushrelay_core::PushClient`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pushrelay_core::{ClientConfig, PushClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PushClient::new(pushrelay_xmlrpc::connect);
//!     client.configure(ClientConfig::default()).await?;
//!
//!     let inactive = client.feedback_entries("my-app").await?;
//!     println!("{} inactive tokens", inactive.len());
//!     Ok(())
//! }
//! ```

mod codec;
mod error;
mod transport;

pub use codec::{MethodResponse, decode_response, encode_call};
pub use error::{Result, XmlRpcError};
pub use transport::{XmlRpcTransport, connect};
