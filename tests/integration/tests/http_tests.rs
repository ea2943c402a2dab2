//! REST Integration Tests
//!
//! Exercise the HTTP client and the bot's outbound path against a mock
//! REST server on a loopback socket.
//!
//! Run with: cargo test -p integration-tests --test http_tests

use std::sync::Arc;

use axum::http::StatusCode;
use integration_tests::*;
use parking_lot::Mutex;
use serde_json::json;
use tomon_common::{Error, SENTINEL_NONCE};
use tomon_gateway::{Bot, Handler};
use tomon_http::{ApiAction, CredentialsProvider, HttpApi};

fn config(rest: &MockRest) -> tomon_common::BotConfig {
    test_config("ws://127.0.0.1:9", &rest.api_root())
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_login_stores_token_and_profile() {
    let rest = MockRest::start().await.unwrap();
    let api = HttpApi::new(&config(&rest)).unwrap();
    assert!(api.token().is_none());

    let profile = api.login().await.unwrap();

    assert_eq!(profile.tag(), format!("testbot#0001({BOT_ID})"));
    assert_eq!(api.token().as_deref(), Some(TEST_TOKEN));
    assert_eq!(api.profile().map(|p| p.id), Some(BOT_ID.to_string()));
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let rest = MockRest::start().await.unwrap();
    let api = HttpApi::new(&config(&rest)).unwrap();

    let err = api.get_user_info().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    api.login().await.unwrap();
    let profile = api.get_user_info().await.unwrap();
    assert_eq!(profile.username, "testbot");
    assert!(profile.token.is_none());
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_send_text_posts_content_with_nonce() {
    let rest = MockRest::start().await.unwrap();
    let api = HttpApi::new(&config(&rest).with_token(TEST_TOKEN)).unwrap();

    let reply = api.send_text("300", "hello").await.unwrap();
    assert_eq!(reply["channel_id"], "300");

    let requests = rest.requests_to("/channels/300/messages");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        json!({ "content": "hello", "nonce": SENTINEL_NONCE })
    );
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn test_send_image_uploads_multipart() {
    let rest = MockRest::start().await.unwrap();
    let api = HttpApi::new(&config(&rest).with_token(TEST_TOKEN)).unwrap();
    let path = temp_file("png");

    api.send_image("300", &path, "look", Some("42")).await.unwrap();

    let requests = rest.requests_to("/channels/300/messages");
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert_eq!(body["files"]["content_type"], "image/png");
    assert_eq!(
        body["files"]["file_name"],
        path.file_name().unwrap().to_str().unwrap()
    );
    assert_eq!(
        body["payload_json"],
        json!({ "nonce": SENTINEL_NONCE, "content": "<@42>look" })
    );

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_send_image_rejects_other_types_without_request() {
    let rest = MockRest::start().await.unwrap();
    let api = HttpApi::new(&config(&rest).with_token(TEST_TOKEN)).unwrap();
    let path = temp_file("gif");

    let err = api.send_image("300", &path, "", None).await.unwrap_err();
    assert!(matches!(err, Error::FileType(ref ext) if ext == "gif"));
    assert!(rest.requests().is_empty());

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_non_success_status_is_http_failed() {
    let rest = MockRest::failing(StatusCode::FORBIDDEN).await.unwrap();
    let api = HttpApi::new(&config(&rest).with_token(TEST_TOKEN)).unwrap();

    let err = api.send_text("300", "hello").await.unwrap_err();
    assert!(matches!(err, Error::HttpFailed { status: 403 }));
}

#[tokio::test]
async fn test_unreachable_api_is_network_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let config = test_config("ws://127.0.0.1:9", &format!("http://{addr}")).with_token(TEST_TOKEN);
    let api = HttpApi::new(&config).unwrap();

    let err = api.send_text("300", "hello").await.unwrap_err();
    assert!(err.is_network());
}

// ============================================================================
// Bot outbound path
// ============================================================================

#[tokio::test]
async fn test_bot_send_runs_hooks_then_posts() {
    let rest = MockRest::start().await.unwrap();
    let bot = Bot::new(config(&rest).with_token(TEST_TOKEN)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        bot.on_send_before(Handler::unit(move |action: Arc<ApiAction>| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(action.to_string());
                Ok(())
            }
        }))
        .unwrap();
    }

    bot.send_text("300", "from the bot").await.unwrap();

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(rest.requests_to("/channels/300/messages").len(), 1);
}

#[tokio::test]
async fn test_bot_send_error_is_returned() {
    let rest = MockRest::failing(StatusCode::PAYLOAD_TOO_LARGE).await.unwrap();
    let bot = Bot::new(config(&rest).with_token(TEST_TOKEN)).unwrap();

    let err = bot.send_text("300", "too big").await.unwrap_err();
    assert_eq!(err.status(), Some(413));
}

#[tokio::test]
async fn test_bot_get_user_info() {
    let rest = MockRest::start().await.unwrap();
    let bot = Bot::new(config(&rest).with_token(TEST_TOKEN)).unwrap();

    let profile = bot.get_user_info().await.unwrap();
    assert_eq!(profile.id, BOT_ID);
    assert_eq!(rest.requests_to("/users/@me").len(), 1);
}
