//! Seams between the gateway and the REST boundary

use crate::action::ApiAction;
use crate::models::UserProfile;
use async_trait::async_trait;
use serde_json::Value;
use tomon_common::Result;

/// Source of the bearer token and user profile used by the gateway handshake
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Currently stored token, if any
    fn token(&self) -> Option<String>;

    /// Currently stored user profile, if any
    fn profile(&self) -> Option<UserProfile>;

    /// Log in with the configured account and store the issued token
    async fn login(&self) -> Result<UserProfile>;

    /// Fetch the profile of the token's owner and store it
    async fn current_user(&self) -> Result<UserProfile>;
}

/// Full REST surface used by the bot
#[async_trait]
pub trait RestApi: CredentialsProvider {
    /// Perform an outbound action and return the decoded response body
    async fn execute(&self, action: &ApiAction) -> Result<Value>;
}
