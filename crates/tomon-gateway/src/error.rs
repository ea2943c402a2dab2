//! Gateway error types

use crate::protocol::OpCode;

/// Errors produced by a gateway connection attempt
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),

    /// The server closed the socket
    #[error("Connection closed with code {code}")]
    Closed { code: u16 },

    /// HELLO or the IDENTIFY acknowledgement did not arrive in time
    #[error("Timed out waiting for the gateway handshake")]
    HandshakeTimeout,

    /// A handshake step received the wrong frame
    #[error("Unexpected opcode during handshake: expected {expected}, got {actual}")]
    UnexpectedOpcode { expected: OpCode, actual: OpCode },

    /// A handshake frame could not be decoded
    #[error("Failed to decode gateway frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// REST call made during the handshake failed
    #[error(transparent)]
    Api(#[from] tomon_common::Error),
}

impl GatewayError {
    /// Whether the peer ended the session (close frame or dropped stream)
    #[must_use]
    pub fn is_closed(&self) -> bool {
        use tokio_tungstenite::tungstenite::error::{Error as WsError, ProtocolError};

        match self {
            Self::Closed { .. } => true,
            Self::Transport(e) => matches!(
                **e,
                WsError::ConnectionClosed
                    | WsError::AlreadyClosed
                    | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
            ),
            _ => false,
        }
    }

    /// Whether the failure is a lost or refused transport
    #[must_use]
    pub fn is_transport_reset(&self) -> bool {
        match self {
            Self::Transport(_) => !self.is_closed(),
            Self::Api(e) => e.is_network(),
            _ => false,
        }
    }

    /// Whether a REST login step could not reach the server
    ///
    /// Together with a failed socket open, the only failure that surfaces to
    /// the supervisor. Everything after the socket opens ends in a reconnect
    /// inside the connection.
    #[must_use]
    pub fn is_login_unreachable(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_network())
    }

    /// Close code reported by the server, if any
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        match self {
            Self::Closed { code } => Some(*code),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
