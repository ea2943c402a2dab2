//! Outbound REST actions

use serde::Serialize;
use std::path::PathBuf;

/// An outbound call to the REST API
///
/// This is also the context handed to `send` hooks before the call is made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiAction {
    /// Post a text message to a channel
    SendText { channel_id: String, content: String },

    /// Upload an image to a channel, with optional caption and mention
    SendImage {
        channel_id: String,
        file_path: PathBuf,
        #[serde(skip_serializing_if = "String::is_empty")]
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        at_user: Option<String>,
    },

    /// Fetch the authenticated user's profile
    GetUserInfo,
}

impl ApiAction {
    /// Create a text message action
    #[must_use]
    pub fn send_text(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::SendText {
            channel_id: channel_id.into(),
            content: content.into(),
        }
    }

    /// Create an image upload action without caption
    #[must_use]
    pub fn send_image(channel_id: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self::SendImage {
            channel_id: channel_id.into(),
            file_path: file_path.into(),
            content: String::new(),
            at_user: None,
        }
    }

    /// Set the caption of an image action (no-op for other actions)
    #[must_use]
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        if let Self::SendImage { content, .. } = &mut self {
            *content = text.into();
        }
        self
    }

    /// Mention a user in an image action (no-op for other actions)
    #[must_use]
    pub fn with_mention(mut self, user_id: impl Into<String>) -> Self {
        if let Self::SendImage { at_user, .. } = &mut self {
            *at_user = Some(user_id.into());
        }
        self
    }

    /// Action name, as used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SendText { .. } => "send_text",
            Self::SendImage { .. } => "send_image",
            Self::GetUserInfo => "get_user_info",
        }
    }

    /// Bus event name under the `send` namespace
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SendText { .. } => "send.text",
            Self::SendImage { .. } => "send.image",
            Self::GetUserInfo => "send.user_info",
        }
    }

    /// Target channel, if the action posts to one
    #[must_use]
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::SendText { channel_id, .. } | Self::SendImage { channel_id, .. } => {
                Some(channel_id)
            }
            Self::GetUserInfo => None,
        }
    }
}

impl std::fmt::Display for ApiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channel_id() {
            Some(cid) => write!(f, "{}(channel={cid})", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}
