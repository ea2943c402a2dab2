//! Client payload definitions

use serde::{Deserialize, Serialize};

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bearer token issued by login
    pub token: String,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}
