//! Reconnect supervisor
//!
//! Restarts the gateway connection forever. Attempts that fail with a
//! transport reset are logged and retried after a fixed cooldown; attempts
//! that return normally are retried at once, having already waited inside
//! the connection.

use crate::connection::GatewayConnection;
use crate::error::GatewayError;
use async_trait::async_trait;
use std::time::Duration;
use tomon_http::CredentialsProvider;
use tracing::{error, warn};

/// Something the supervisor can restart
#[async_trait]
pub trait Reconnectable: Send + Sync {
    /// Run one attempt until it ends
    async fn attempt(&self) -> Result<(), GatewayError>;
}

#[async_trait]
impl<P> Reconnectable for GatewayConnection<P>
where
    P: CredentialsProvider + ?Sized + 'static,
{
    async fn attempt(&self) -> Result<(), GatewayError> {
        self.run_once().await
    }
}

/// Outer reconnect loop
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    cooldown: Duration,
}

impl Supervisor {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Run `target` forever; never returns
    pub async fn run<T: Reconnectable + ?Sized>(&self, target: &T) {
        loop {
            self.step(target).await;
        }
    }

    /// One iteration: an attempt, plus the cooldown if it failed
    async fn step<T: Reconnectable + ?Sized>(&self, target: &T) {
        if let Err(e) = target.attempt().await {
            error!(error = %e, "Gateway connection failed");
            warn!(
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Retrying gateway connection after cooldown"
            );
            tokio::time::sleep(self.cooldown).await;
        }
    }
}
