//! # tomon-http
//!
//! REST boundary of the bot: account login, outbound messages and user
//! lookups. The gateway consumes it through [`CredentialsProvider`] and
//! [`RestApi`].

pub mod action;
pub mod attachment;
pub mod client;
pub mod models;
pub mod provider;
pub mod routes;

pub use action::ApiAction;
pub use attachment::Attachment;
pub use client::HttpApi;
pub use models::{mention, UserProfile};
pub use provider::{CredentialsProvider, RestApi};
