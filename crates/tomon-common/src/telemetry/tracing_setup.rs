//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the preset's directives apply.

use crate::config::Environment;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Directives used in development: the bot's own crates at debug
const DEV_DIRECTIVES: &str = "info,tomon_gateway=debug,tomon_http=debug";

/// Directives used in production; socket internals stay quiet
const PROD_DIRECTIVES: &str = "info,tungstenite=warn,tokio_tungstenite=warn";

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Subscriber options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub directives: String,
    pub format: LogFormat,
    /// Log span open/close (connection attempts, hook stages)
    pub span_events: bool,
    /// Include source file and line
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            directives: "info".to_string(),
            format: LogFormat::Text,
            span_events: false,
            file_line: false,
        }
    }
}

impl TracingConfig {
    /// Verbose text output for local runs
    #[must_use]
    pub fn development() -> Self {
        Self {
            directives: DEV_DIRECTIVES.to_string(),
            format: LogFormat::Text,
            span_events: false,
            file_line: true,
        }
    }

    /// JSON output for log collectors
    #[must_use]
    pub fn production() -> Self {
        Self {
            directives: PROD_DIRECTIVES.to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line: false,
        }
    }

    /// Preset for the deployment environment
    #[must_use]
    pub fn for_env(env: Environment) -> Self {
        match env {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
    }

    #[must_use]
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = directives.into();
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.directives))
    }
}

/// Install the global subscriber
///
/// Fails instead of panicking when a subscriber is already set, so tests and
/// embedding applications can call it freely.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(config.filter());
    let installed = match config.format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };

    installed.map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
