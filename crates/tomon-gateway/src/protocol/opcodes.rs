//! Gateway operation codes

use serde::{Deserialize, Serialize};

/// Protocol role of a frame, carried as the integer `op`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OpCode {
    /// Business event pushed by the server
    Dispatch = 0,
    /// Keepalive sent by the client
    Heartbeat = 1,
    /// Authenticates the socket; the server answers with the same op
    Identify = 2,
    /// First frame after the socket opens
    Hello = 3,
    HeartbeatAck = 4,
    Voice = 5,
}

/// An `op` value outside the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown op code {0}")]
pub struct UnknownOpCode(pub u8);

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            3 => Self::Hello,
            4 => Self::HeartbeatAck,
            5 => Self::Voice,
            other => return Err(UnknownOpCode(other)),
        })
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl OpCode {
    /// Connection upkeep rather than an event
    #[must_use]
    pub const fn is_keepalive(self) -> bool {
        matches!(self, Self::Heartbeat | Self::HeartbeatAck)
    }

    /// What the op is for, as shown in per-event log lines
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Dispatch => "business event dispatch",
            Self::Heartbeat => "heartbeat ping",
            Self::Identify => "socket authentication",
            Self::Hello => "server hello",
            Self::HeartbeatAck => "heartbeat pong",
            Self::Voice => "voice signalling",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}({})", u8::from(*self))
    }
}
