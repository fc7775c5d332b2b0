//! Push Relay Logging
//!
//! Installs a `tracing` subscriber configured from the environment, for
//! binaries that embed the push relay client. The client crates themselves
//! only emit `tracing` events.
//!
//! # Usage
//!
//! ```rust
//! pushrelay_log::init();
//! tracing::info!(app_id = "cf", "Relay client ready");
//! ```
//!
//! # Environment Variables
//!
//! - `PUSHRELAY_DEBUG=1` - Enable debug logging
//! - `PUSHRELAY_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PUSHRELAY_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `PUSHRELAY_LOG_COLOR=1|0` - Enable/disable colors
//! - `RUST_LOG` - Full filter directives, overriding the level

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as layer_fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of events that are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
    /// No logging
    Off,
}

impl Level {
    /// Filter directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output
    Compact,
    /// JSON lines
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether ANSI colors are written
    pub color: bool,
    /// Whether event targets (module paths) are written
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            target: true,
        }
    }
}

impl LogConfig {
    /// Read configuration from `PUSHRELAY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        let debug = flag("PUSHRELAY_DEBUG").unwrap_or(false);
        let level = lookup("PUSHRELAY_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });
        let format = lookup("PUSHRELAY_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);
        let color = flag("PUSHRELAY_LOG_COLOR")
            .unwrap_or_else(|| format != Format::Json && lookup("NO_COLOR").is_none());

        Self {
            debug,
            level,
            format,
            color,
            target: true,
        }
    }
}

/// Get the environment-derived configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Subscriber
// ============================================================================

/// Build a subscriber for `config`. `RUST_LOG` overrides the level.
pub fn subscriber(config: &LogConfig) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        Format::Pretty => Box::new(
            registry.with(
                layer_fmt::layer()
                    .pretty()
                    .with_ansi(config.color)
                    .with_target(config.target),
            ),
        ),
        Format::Compact => Box::new(
            registry.with(
                layer_fmt::layer()
                    .compact()
                    .with_ansi(config.color)
                    .with_target(config.target),
            ),
        ),
        #[cfg(feature = "json")]
        Format::Json => Box::new(
            registry.with(
                layer_fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(config.target),
            ),
        ),
        #[cfg(not(feature = "json"))]
        Format::Json => Box::new(
            registry.with(
                layer_fmt::layer()
                    .compact()
                    .with_ansi(false)
                    .with_target(config.target),
            ),
        ),
    }
}

/// Install the environment-configured subscriber as the global default.
///
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    tracing::subscriber::set_global_default(subscriber(config())).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
