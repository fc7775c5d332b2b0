//! Client configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::{CallArgs, PushError, Result};

/// Default relay host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default relay port.
pub const DEFAULT_PORT: u16 = 7077;
/// Default relay path.
pub const DEFAULT_PATH: &str = "/";
/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Prefix of the environment variables read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "PUSHRELAY";

/// Relay connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay host.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Path of the RPC endpoint.
    pub path: String,
    /// Transport timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Apps provisioned while configuring, in order.
    pub initial: Vec<InitialApp>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            initial: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read a loose option map. Keys are matched case-insensitively, so
    /// `host`, `HOST` and `Host` are equivalent; missing keys take defaults.
    pub fn from_options(options: Value) -> Result<Self> {
        let Value::Object(map) = options else {
            return Err(PushError::Config("options must be a mapping".to_string()));
        };

        let mut map = lowercase_keys(map);
        if let Some(Value::Array(initial)) = map.get_mut("initial") {
            for entry in initial.iter_mut() {
                if let Value::Object(fields) = entry {
                    *fields = lowercase_keys(std::mem::take(fields));
                }
            }
        }

        serde_json::from_value(Value::Object(map)).map_err(|e| PushError::Config(e.to_string()))
    }

    /// Read `PUSHRELAY_HOST`, `PUSHRELAY_PORT`, `PUSHRELAY_PATH` and
    /// `PUSHRELAY_TIMEOUT`, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(host) = env_var("HOST") {
            config.host = host;
        }
        if let Some(port) = env_var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| PushError::Config(format!("invalid {ENV_PREFIX}_PORT: {port}")))?;
        }
        if let Some(path) = env_var("PATH") {
            config.path = path;
        }
        if let Some(timeout) = env_var("TIMEOUT") {
            let secs: u64 = timeout.parse().map_err(|_| {
                PushError::Config(format!("invalid {ENV_PREFIX}_TIMEOUT: {timeout}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// URL of the RPC endpoint.
    pub fn url(&self) -> String {
        if self.path.starts_with('/') {
            format!("http://{}:{}{}", self.host, self.port, self.path)
        } else {
            format!("http://{}:{}/{}", self.host, self.port, self.path)
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{key}"))
        .ok()
        .filter(|v| !v.is_empty())
}

fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

/// App provisioned as part of configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialApp {
    /// App id.
    pub app_id: String,
    /// Certificate path or PEM contents.
    pub cert: String,
    /// Environment name.
    #[serde(alias = "environment")]
    pub env: String,
    /// Relay-side timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

impl InitialApp {
    /// Create an initial app with the default timeout.
    pub fn new(app_id: impl Into<String>, cert: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            cert: cert.into(),
            env: env.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<&InitialApp> for CallArgs {
    fn from(app: &InitialApp) -> Self {
        CallArgs::Positional(vec![
            Value::from(app.app_id.as_str()),
            Value::from(app.cert.as_str()),
            Value::from(app.env.as_str()),
            Value::from(app.timeout),
        ])
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Builder for client configuration.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the relay host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the relay port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the RPC endpoint path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Provision an app while configuring.
    pub fn initial(mut self, app: InitialApp) -> Self {
        self.config.initial.push(app);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
