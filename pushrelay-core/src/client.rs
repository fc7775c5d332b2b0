//! Relay client: configuration holder and call dispatcher.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::args::normalize;
use crate::notification::encode_batch;
use crate::{
    CallArgs, ClientConfig, Connector, FeedbackEntry, Operation, PushError, Result, Transport,
};

/// Completion callback for background dispatch.
pub type Callback = Box<dyn FnOnce(Result<Value>) + Send + 'static>;

/// Outcome of [`PushClient::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// The call ran in the foreground and produced this result.
    Completed(Value),
    /// The call runs on a background task that reports to the callback.
    /// Dropping the handle detaches the task.
    Spawned(JoinHandle<()>),
}

/// Established relay connection.
struct Connection {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Connection {
    async fn call(&self, operation: Operation, args: Vec<Value>) -> Result<Value> {
        debug!(operation = %operation, "Calling relay");
        let result = self.transport.call(operation.method(), args).await;
        result.map_err(PushError::from)
    }
}

/// Client for the push relay.
///
/// Starts unconfigured; [`PushClient::configure`] connects exactly once and
/// later calls are no-ops. Clones share the same configuration.
///
/// Every operation comes in two forms. The plain form (`provision`,
/// `notify`, `feedback`) awaits the relay and returns its result. The `_with`
/// form validates in the caller, then runs the call on a spawned tokio task
/// and hands the outcome, success or error, to the callback.
#[derive(Clone)]
pub struct PushClient {
    connector: Arc<dyn Connector>,
    connection: Arc<OnceCell<Connection>>,
}

impl PushClient {
    /// Create an unconfigured client that opens transports with `connector`.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            connection: Arc::new(OnceCell::new()),
        }
    }

    /// Create an unconfigured client that will use `transport` as is.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Self::new(move |_: &ClientConfig| -> Result<Arc<dyn Transport>> { Ok(transport.clone()) })
    }

    /// Connect and provision `config.initial`, in order.
    ///
    /// Only the first successful call has any effect. Concurrent first calls
    /// wait for the one that runs. If connecting or any initial provisioning
    /// fails, the error is returned, the remaining records are skipped and the
    /// client stays unconfigured.
    pub async fn configure(&self, config: ClientConfig) -> Result<&Self> {
        if self.is_configured() {
            debug!("Client already configured, ignoring new options");
            return Ok(self);
        }

        let connector = &self.connector;
        self.connection
            .get_or_try_init(move || async move {
                info!(url = %config.url(), initial = config.initial.len(), "Configuring relay client");

                let transport = connector.connect(&config)?;
                let connection = Connection { config, transport };

                for app in &connection.config.initial {
                    debug!(app_id = %app.app_id, "Provisioning initial app");
                    let args = normalize(Operation::Provision, app.into())?;
                    connection.call(Operation::Provision, args).await?;
                }

                Ok::<_, PushError>(connection)
            })
            .await?;

        Ok(self)
    }

    /// Check whether configuration has completed.
    pub fn is_configured(&self) -> bool {
        self.connection.initialized()
    }

    /// Active configuration, once configured.
    pub fn config(&self) -> Option<&ClientConfig> {
        self.connection.get().map(|c| &c.config)
    }

    /// Dispatch `operation` in the foreground, or in the background when
    /// `on_complete` is given.
    ///
    /// Fails with [`PushError::NotConfigured`] before looking at the
    /// arguments, and with [`PushError::InvalidArguments`] before contacting
    /// the relay.
    pub async fn dispatch(
        &self,
        operation: Operation,
        args: CallArgs,
        on_complete: Option<Callback>,
    ) -> Result<Dispatch> {
        match on_complete {
            Some(callback) => self.spawn(operation, args, callback).map(Dispatch::Spawned),
            None => self.call(operation, args).await.map(Dispatch::Completed),
        }
    }

    /// Provision an app id: `app_id`, `cert`, `env`, `timeout`.
    pub async fn provision(&self, args: impl Into<CallArgs>) -> Result<Value> {
        self.call(Operation::Provision, args.into()).await
    }

    /// Provision in the background.
    pub fn provision_with<F>(&self, args: impl Into<CallArgs>, on_complete: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        self.spawn(Operation::Provision, args.into(), Box::new(on_complete))
    }

    /// Send notifications: `app_id`, `tokens`, `notifications`.
    pub async fn notify(&self, args: impl Into<CallArgs>) -> Result<Value> {
        self.call(Operation::Notify, args.into()).await
    }

    /// Send notifications in the background.
    pub fn notify_with<F>(&self, args: impl Into<CallArgs>, on_complete: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        self.spawn(Operation::Notify, args.into(), Box::new(on_complete))
    }

    /// Fetch inactive tokens: `app_id`. Returns the raw relay result.
    pub async fn feedback(&self, args: impl Into<CallArgs>) -> Result<Value> {
        self.call(Operation::Feedback, args.into()).await
    }

    /// Fetch inactive tokens in the background.
    pub fn feedback_with<F>(&self, args: impl Into<CallArgs>, on_complete: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        self.spawn(Operation::Feedback, args.into(), Box::new(on_complete))
    }

    /// Fetch inactive tokens and decode them.
    pub async fn feedback_entries(&self, args: impl Into<CallArgs>) -> Result<Vec<FeedbackEntry>> {
        let result = self.feedback(args).await?;
        FeedbackEntry::parse_list(&result)
    }

    async fn call(&self, operation: Operation, args: CallArgs) -> Result<Value> {
        let connection = self.connection()?;
        let args = prepare(operation, args)?;
        connection.call(operation, args).await
    }

    fn spawn(&self, operation: Operation, args: CallArgs, on_complete: Callback) -> Result<JoinHandle<()>> {
        let transport = self.connection()?.transport.clone();
        let args = prepare(operation, args)?;

        debug!(operation = %operation, "Dispatching relay call in background");
        Ok(tokio::spawn(async move {
            let result = transport
                .call_async(operation.method(), args)
                .await
                .map_err(PushError::from);
            if let Err(e) = &result {
                debug!(operation = %operation, error = %e, "Background relay call failed");
            }
            on_complete(result);
        }))
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .get()
            .ok_or_else(|| PushError::NotConfigured("The client is not configured.".to_string()))
    }
}

impl fmt::Debug for PushClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushClient")
            .field("configured", &self.is_configured())
            .field("config", &self.config())
            .finish()
    }
}

/// Normalize arguments and, for `notify`, encode the payloads.
fn prepare(operation: Operation, args: CallArgs) -> Result<Vec<Value>> {
    let mut values = normalize(operation, args)?;

    if operation == Operation::Notify {
        let notifications = values.pop().unwrap_or_default();
        let tokens = values.pop().unwrap_or_default();
        let (tokens, notifications) = encode_batch(tokens, notifications)?;
        values.push(tokens);
        values.push(notifications);
    }

    Ok(values)
}
