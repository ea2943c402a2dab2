//! Bot configuration
//!
//! Loads configuration from environment variables, with builder-style
//! overrides for programmatic use.

use std::env;
use std::time::Duration;

/// Default gateway endpoint
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.tomon.co";

/// Default REST API root
pub const DEFAULT_API_ROOT: &str = "https://beta.tomon.co/api/v1";

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub env: Environment,
    /// Account identifier used for login
    pub username: String,
    /// Account secret used for login
    pub password: String,
    /// Pre-issued token; skips login when present
    pub token: Option<String>,
    /// Timeout for REST requests and for the gateway handshake
    pub timeout: Duration,
    /// Delay between a connection failure and the next attempt
    pub reconnect_cooldown: Duration,
    /// Interval between outbound heartbeats
    pub heartbeat_interval: Duration,
    pub gateway_url: String,
    pub api_root: String,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

// Default value functions
fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_reconnect_cooldown() -> Duration {
    Duration::from_secs(3)
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(10)
}

impl BotConfig {
    /// Create a configuration that logs in with account credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            env: Environment::default(),
            username: username.into(),
            password: password.into(),
            token: None,
            timeout: default_timeout(),
            reconnect_cooldown: default_reconnect_cooldown(),
            heartbeat_interval: default_heartbeat_interval(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            api_root: DEFAULT_API_ROOT.to_string(),
        }
    }

    /// Create a configuration from a pre-issued token
    #[must_use]
    pub fn with_token_only(token: impl Into<String>) -> Self {
        Self::new("", "").with_token(token)
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reconnect_cooldown(mut self, cooldown: Duration) -> Self {
        self.reconnect_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into();
        self
    }

    /// Whether login credentials are available
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Check that either a token or login credentials are configured and
    /// that the heartbeat interval is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "TOMON_HEARTBEAT_INTERVAL_SECS",
                "0".to_string(),
            ));
        }
        if self.token.is_some() {
            return Ok(());
        }
        if self.username.is_empty() {
            return Err(ConfigError::MissingVar("TOMON_USERNAME"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingVar("TOMON_PASSWORD"));
        }
        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if neither a token nor login credentials are set,
    /// or if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
        }

        let config = Self {
            env: env::var("APP_ENV")
                .ok()
                .and_then(|s| Environment::parse(&s))
                .unwrap_or_default(),
            username: env::var("TOMON_USERNAME").unwrap_or_default(),
            password: env::var("TOMON_PASSWORD").unwrap_or_default(),
            token: env::var("TOMON_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout: secs_var("TOMON_TIMEOUT_SECS")?.unwrap_or_else(default_timeout),
            reconnect_cooldown: secs_var("TOMON_RECONNECT_COOLDOWN_SECS")?
                .unwrap_or_else(default_reconnect_cooldown),
            heartbeat_interval: secs_var("TOMON_HEARTBEAT_INTERVAL_SECS")?
                .unwrap_or_else(default_heartbeat_interval),
            gateway_url: env::var("TOMON_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            api_root: env::var("TOMON_API_ROOT").unwrap_or_else(|_| DEFAULT_API_ROOT.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

fn secs_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_secs(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_secs(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue(name, raw.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
