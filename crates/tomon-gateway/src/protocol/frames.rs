//! Gateway frame format
//!
//! Every text message on the socket is a JSON object
//! `{ "op": integer, "d": object, ["t": string] }`.

use super::{IdentifyPayload, OpCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tomon_common::SENTINEL_NONCE;

/// A single gateway frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayFrame {
    // === Client Frames ===

    /// Create an Identify frame (op=2) carrying the bearer token
    #[must_use]
    pub fn identify(token: impl Into<String>) -> Self {
        Self {
            op: OpCode::Identify,
            t: None,
            d: serde_json::to_value(IdentifyPayload::new(token)).ok(),
        }
    }

    /// Create a Heartbeat frame (op=1); it carries no data
    #[must_use]
    pub fn heartbeat() -> Self {
        Self {
            op: OpCode::Heartbeat,
            t: None,
            d: None,
        }
    }

    // === Server Frames ===

    /// Create a Hello frame (op=3)
    #[must_use]
    pub fn hello() -> Self {
        Self {
            op: OpCode::Hello,
            t: None,
            d: Some(Value::Object(serde_json::Map::new())),
        }
    }

    /// Create a Dispatch frame (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            d: Some(data),
        }
    }

    /// Create a Heartbeat ACK frame (op=4)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck,
            t: None,
            d: None,
        }
    }

    // === Inspection ===

    /// The `nonce` field of the data payload, if present and a string
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.d.as_ref()?.get("nonce")?.as_str()
    }

    /// Whether this frame echoes one of our own outbound actions
    ///
    /// Any frame whose `d.nonce` equals the reserved sentinel matches,
    /// regardless of who actually originated it.
    #[must_use]
    pub fn is_echo(&self) -> bool {
        self.nonce() == Some(SENTINEL_NONCE)
    }

    /// Decode the data payload into a typed structure
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    ///
    /// Fails for non-JSON text, a missing `op`, or an unknown op code.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.t {
            Some(t) => write!(f, "GatewayFrame(op={}, t={t})", self.op),
            None => write!(f, "GatewayFrame(op={})", self.op),
        }
    }
}
