//! Connection state tracking

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Gateway connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No socket; next attempt not started
    Disconnected,
    /// Opening the transport
    Connecting,
    /// Socket open, waiting for HELLO
    AwaitingHello,
    /// HELLO received; logging in and identifying
    Authenticating,
    /// Identified; heartbeat and read loop running
    Ready,
    /// Attempt over, waiting out the cooldown
    Reconnecting,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the current state; observers subscribe through a watch channel
#[derive(Debug)]
pub struct StateTracker {
    tx: watch::Sender<ConnectionState>,
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx }
    }

    /// Current state
    #[must_use]
    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Move to `next`, logging the transition
    pub fn set(&self, next: ConnectionState) {
        let prev = self.tx.send_replace(next);
        if prev != next {
            tracing::info!(from = %prev, to = %next, "Gateway connection state changed");
        }
    }

    /// Observe state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
