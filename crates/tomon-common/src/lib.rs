//! # tomon-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{BotConfig, ConfigError, Environment};
pub use error::{Error, Result};
pub use telemetry::{try_init_tracing, LogFormat, TracingConfig, TracingError};

/// Nonce attached to every outbound message.
///
/// Inbound gateway events carrying this nonce are echoes of our own actions
/// and are dropped before dispatch.
pub const SENTINEL_NONCE: &str = "202020200";
