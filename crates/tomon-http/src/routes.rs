//! REST endpoint paths, relative to the API root

/// Account login
pub const LOGIN: &str = "/auth/login";

/// Profile of the authenticated user
pub const CURRENT_USER: &str = "/users/@me";

/// Message collection of a channel (text and attachments)
#[must_use]
pub fn channel_messages(channel_id: &str) -> String {
    format!("/channels/{channel_id}/messages")
}
