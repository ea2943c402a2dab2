//! REST payload models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user profile
///
/// Returned by login (with `token`), by `/users/@me`, and as the data of the
/// gateway's IDENTIFY acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub discriminator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Bearer token (login responses only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Display tag in the form `username#discriminator(id)`
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{}#{}({})", self.username, self.discriminator, self.id)
    }
}

/// Mention markup for a user, prepended to message content
#[must_use]
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}
