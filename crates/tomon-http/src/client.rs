//! HTTP implementation of the REST boundary

use crate::action::ApiAction;
use crate::attachment::Attachment;
use crate::models::{mention, UserProfile};
use crate::provider::{CredentialsProvider, RestApi};
use crate::routes;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use tomon_common::{BotConfig, Error, Result, SENTINEL_NONCE};

/// Token and profile obtained from login or configuration
#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    profile: Option<UserProfile>,
}

/// REST client for the chat platform
pub struct HttpApi {
    client: Client,
    api_root: String,
    username: String,
    password: String,
    session: RwLock<SessionState>,
}

impl HttpApi {
    /// Create a client from bot configuration
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::network)?;

        Ok(Self {
            client,
            api_root: config.api_root.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: RwLock::new(SessionState {
                token: config.token.clone(),
                profile: None,
            }),
        })
    }

    /// API root all routes are resolved against
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Post a text message to a channel
    pub async fn send_text(&self, channel_id: &str, content: &str) -> Result<Value> {
        require("channel_id", channel_id)?;

        let body = json!({ "content": content, "nonce": SENTINEL_NONCE });
        let request = self
            .client
            .post(self.url(&routes::channel_messages(channel_id)))
            .json(&body);

        self.send(request).await
    }

    /// Upload a jpg/png image to a channel
    ///
    /// `at_user` prefixes the caption with a mention of that user.
    pub async fn send_image(
        &self,
        channel_id: &str,
        file_path: &Path,
        content: &str,
        at_user: Option<&str>,
    ) -> Result<Value> {
        require("channel_id", channel_id)?;
        if file_path.as_os_str().is_empty() {
            return Err(Error::MissingParameter("file_path"));
        }

        let (attachment, bytes) = Attachment::load(file_path).await?;
        let caption = match at_user {
            Some(user_id) => format!("{}{content}", mention(user_id)),
            None => content.to_string(),
        };
        let payload = json!({ "nonce": SENTINEL_NONCE, "content": caption });

        let file = Part::bytes(bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(attachment.content_type)
            .map_err(Error::network)?;
        let form = Form::new()
            .part("files", file)
            .text("payload_json", payload.to_string());

        tracing::debug!(
            channel_id = %channel_id,
            file_name = %attachment.file_name,
            "Uploading image"
        );

        let request = self
            .client
            .post(self.url(&routes::channel_messages(channel_id)))
            .multipart(form);

        self.send(request).await
    }

    /// Fetch the authenticated user's profile
    pub async fn get_user_info(&self) -> Result<UserProfile> {
        let request = self.client.get(self.url(routes::CURRENT_USER));
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.read().token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode a 2xx JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorize(request).send().await.map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %response.url(), "REST request failed");
            return Err(Error::HttpFailed {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(map_transport)
    }
}

fn require(name: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::MissingParameter(name))
    } else {
        Ok(())
    }
}

fn map_transport(err: reqwest::Error) -> Error {
    if err.is_builder() {
        Error::network(format!("Api parsing error, please check the root URL: {err}"))
    } else if err.is_decode() {
        Error::network(format!("Malformed response body: {err}"))
    } else {
        Error::network(err)
    }
}

#[async_trait]
impl CredentialsProvider for HttpApi {
    fn token(&self) -> Option<String> {
        self.session.read().token.clone()
    }

    fn profile(&self) -> Option<UserProfile> {
        self.session.read().profile.clone()
    }

    async fn login(&self) -> Result<UserProfile> {
        tracing::info!(username = %self.username, "Logging in");

        let body = json!({ "full_name": self.username, "password": self.password });
        let request = self.client.post(self.url(routes::LOGIN)).json(&body);
        let profile: UserProfile = self.send(request).await?;

        let token = profile
            .token
            .clone()
            .ok_or_else(|| Error::network("Login response did not contain a token"))?;

        {
            let mut session = self.session.write();
            session.token = Some(token);
            session.profile = Some(profile.clone());
        }

        tracing::info!(user = %profile.tag(), "Login succeeded");
        Ok(profile)
    }

    async fn current_user(&self) -> Result<UserProfile> {
        let profile = self.get_user_info().await?;
        self.session.write().profile = Some(profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl RestApi for HttpApi {
    async fn execute(&self, action: &ApiAction) -> Result<Value> {
        match action {
            ApiAction::SendText {
                channel_id,
                content,
            } => self.send_text(channel_id, content).await,
            ApiAction::SendImage {
                channel_id,
                file_path,
                content,
                at_user,
            } => {
                self.send_image(channel_id, file_path, content, at_user.as_deref())
                    .await
            }
            ApiAction::GetUserInfo => Ok(serde_json::to_value(self.get_user_info().await?)?),
        }
    }
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("api_root", &self.api_root)
            .field("username", &self.username)
            .field("has_token", &self.session.read().token.is_some())
            .finish()
    }
}
