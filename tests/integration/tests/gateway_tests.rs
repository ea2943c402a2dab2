//! Gateway Integration Tests
//!
//! Drive the client against a scripted WebSocket server and a mock REST
//! API on loopback sockets. No external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use parking_lot::Mutex;
use tokio::time::Instant;
use tomon_gateway::protocol::{GatewayFrame, OpCode};
use tomon_gateway::{
    Bot, ConnectionSettings, ConnectionState, EventBus, GatewayConnection, GatewayEvent, Handler,
};

const WAIT: Duration = Duration::from_secs(5);

/// Handler that appends `label` to `log`
fn recorder<C: Send + Sync + 'static>(log: &Arc<Mutex<Vec<String>>>, label: &str) -> Handler<C> {
    let log = Arc::clone(log);
    let label = label.to_string();
    Handler::unit(move |_ctx| {
        let log = Arc::clone(&log);
        let label = label.clone();
        async move {
            log.lock().push(label);
            Ok(())
        }
    })
}

fn connection(
    gateway: &MockGateway,
    bus: &Arc<EventBus<GatewayEvent>>,
    tweak: impl FnOnce(ConnectionSettings) -> ConnectionSettings,
) -> Arc<GatewayConnection<StaticCredentials>> {
    let config = test_config(&gateway.url(), "http://127.0.0.1:9");
    Arc::new(GatewayConnection::new(
        tweak(ConnectionSettings::from(&config)),
        Arc::new(StaticCredentials),
        Arc::clone(bus),
    ))
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_login_handshake_then_dispatch() {
    let rest = MockRest::start().await.unwrap();
    let gateway = MockGateway::start(handshake_then(vec![Step::frame(&message_create(
        "300", "hello there",
    ))]))
    .await
    .unwrap();

    let bot = Bot::new(test_config(&gateway.url(), &rest.api_root())).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    bot.on_message(&["channel"], recorder(&log, "message.channel")).unwrap();
    bot.on(&["message"], recorder(&log, "message")).unwrap();
    bot.on_ws_startup(recorder(&log, "ws_startup"));

    let running = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.run().await })
    };

    assert!(wait_until(WAIT, || log.lock().len() == 3).await);
    assert_eq!(*log.lock(), vec!["ws_startup", "message.channel", "message"]);
    assert_eq!(bot.state(), ConnectionState::Ready);

    // Login happened once, with the configured account
    let logins = rest.requests_to("/auth/login");
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].body["full_name"], "testbot");
    assert_eq!(logins[0].body["password"], "TestPass123!");

    // The profile came with the login, so no lookup was needed
    assert!(rest.requests_to("/users/@me").is_empty());

    // IDENTIFY carried the issued token
    let identify = &gateway.received()[0].frame;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(identify.d.as_ref().unwrap()["token"], TEST_TOKEN);

    running.abort();
}

#[tokio::test]
async fn test_configured_token_skips_login() {
    let rest = MockRest::start().await.unwrap();
    let gateway = MockGateway::start(handshake_then(vec![])).await.unwrap();

    let config = test_config(&gateway.url(), &rest.api_root()).with_token(TEST_TOKEN);
    let bot = Bot::new(config).unwrap();
    let profiles = Arc::new(Mutex::new(Vec::new()));
    {
        let profiles = Arc::clone(&profiles);
        bot.on_ws_startup(Handler::unit(move |profile: Arc<tomon_http::UserProfile>| {
            let profiles = Arc::clone(&profiles);
            async move {
                profiles.lock().push(profile.tag());
                Ok(())
            }
        }));
    }

    let running = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.run().await })
    };

    assert!(wait_until(WAIT, || !profiles.lock().is_empty()).await);
    assert_eq!(profiles.lock()[0], format!("testbot#0001({BOT_ID})"));

    assert!(rest.requests_to("/auth/login").is_empty());
    let lookups = rest.requests_to("/users/@me");
    assert_eq!(lookups.len(), 1);
    assert_eq!(
        lookups[0].authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );

    running.abort();
}

#[tokio::test]
async fn test_dispatch_before_identify_ack_abandons_session() {
    let gateway = MockGateway::start(vec![
        Step::frame(&GatewayFrame::hello()),
        Step::Expect,
        Step::frame(&message_create("300", "too early")),
    ])
    .await
    .unwrap();

    let bus = EventBus::new_shared();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe("message", recorder(&log, "message")).unwrap();

    let conn = connection(&gateway, &bus, |mut s| {
        s.reconnect_cooldown = Duration::from_millis(500);
        s
    });
    let attempt = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.run_once().await })
    };

    assert!(wait_until(WAIT, || conn.state() == ConnectionState::Reconnecting).await);
    assert!(attempt.await.unwrap().is_ok());

    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(log.lock().is_empty());
    assert_eq!(gateway.ops(0), vec![OpCode::Identify]);
}

#[tokio::test]
async fn test_handshake_timeout_waits_cooldown() {
    // HELLO, then silence
    let gateway = MockGateway::start(vec![Step::frame(&GatewayFrame::hello())])
        .await
        .unwrap();

    let bus = EventBus::new_shared();
    let conn = connection(&gateway, &bus, |mut s| {
        s.handshake_timeout = Duration::from_millis(200);
        s.reconnect_cooldown = Duration::from_millis(100);
        s
    });

    let started = Instant::now();
    let result = conn.run_once().await;

    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(gateway.ops(0), vec![OpCode::Identify]);
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_transport_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let bus = EventBus::new_shared();
    let config = test_config(&format!("ws://{addr}"), "http://127.0.0.1:9");
    let conn = GatewayConnection::new(
        ConnectionSettings::from(&config),
        Arc::new(StaticCredentials),
        bus,
    );

    let err = conn.run_once().await.unwrap_err();
    assert!(err.is_transport_reset());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

// ============================================================================
// Ready session
// ============================================================================

#[tokio::test]
async fn test_heartbeats_start_after_identify() {
    let gateway = MockGateway::start(handshake_then(vec![
        Step::Sleep(Duration::from_millis(550)),
        Step::Close(1000),
    ]))
    .await
    .unwrap();

    let bus = EventBus::new_shared();
    let conn = connection(&gateway, &bus, |s| s);
    assert!(conn.run_once().await.is_ok());
    let returned = Instant::now();
    let beats_at_return = gateway.ops(0).len();

    // The heartbeat task is gone once the attempt returns
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(gateway.ops(0).len(), beats_at_return);
    assert!(gateway.received().iter().all(|r| r.at <= returned));

    let ops = gateway.ops(0);
    assert_eq!(ops[0], OpCode::Identify);
    assert!(ops[1..].iter().all(|op| *op == OpCode::Heartbeat));
    assert!(ops.len() - 1 >= 3, "expected at least 3 heartbeats, got {ops:?}");

    let beats: Vec<_> = gateway
        .received()
        .into_iter()
        .filter(|r| r.frame == GatewayFrame::heartbeat())
        .map(|r| r.at)
        .collect();
    for pair in beats.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(50));
    }
}

#[tokio::test]
async fn test_echo_garbage_and_keepalive_frames_are_not_dispatched() {
    let gateway = MockGateway::start(handshake_then(vec![
        Step::frame(&echo_message("300", "our own message")),
        Step::frame(&GatewayFrame::heartbeat_ack()),
        Step::Send("not json at all".to_string()),
        Step::Send(r#"{"op":42,"d":{}}"#.to_string()),
        Step::frame(&message_create("300", "from alice")),
    ]))
    .await
    .unwrap();

    let bus = EventBus::new_shared();
    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in ["message", "notice", "other"] {
        let seen = Arc::clone(&seen);
        bus.subscribe(
            name,
            Handler::unit(move |event: Arc<GatewayEvent>| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().push(event.context.content.clone().unwrap_or_default());
                    Ok(())
                }
            }),
        )
        .unwrap();
    }

    let conn = connection(&gateway, &bus, |s| s);
    let attempt = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.run_once().await })
    };

    assert!(wait_until(WAIT, || !seen.lock().is_empty()).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*seen.lock(), vec!["from alice".to_string()]);

    attempt.abort();
}

#[tokio::test]
async fn test_presence_routes_to_notice_online() {
    let gateway = MockGateway::start(handshake_then(vec![Step::frame(&presence_update(
        "200000000000000002",
        "online",
    ))]))
    .await
    .unwrap();

    let bus = EventBus::new_shared();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe("notice.online", recorder(&log, "notice.online")).unwrap();
    bus.subscribe("notice", recorder(&log, "notice")).unwrap();
    bus.subscribe("message", recorder(&log, "message")).unwrap();

    let conn = connection(&gateway, &bus, |s| s);
    let attempt = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.run_once().await })
    };

    assert!(wait_until(WAIT, || log.lock().len() == 2).await);
    assert_eq!(*log.lock(), vec!["notice.online", "notice"]);

    attempt.abort();
}

// ============================================================================
// Reconnect
// ============================================================================

#[tokio::test]
async fn test_server_close_leads_to_new_session() {
    let rest = MockRest::start().await.unwrap();
    let gateway = MockGateway::start(handshake_then(vec![Step::Close(4000)]))
        .await
        .unwrap();

    let config = test_config(&gateway.url(), &rest.api_root()).with_token(TEST_TOKEN);
    let bot = Bot::new(config).unwrap();

    let ready = Arc::new(AtomicUsize::new(0));
    {
        let ready = Arc::clone(&ready);
        bot.on_ws_startup(Handler::unit(move |_profile| {
            let ready = Arc::clone(&ready);
            async move {
                ready.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));
    }

    let running = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.run().await })
    };

    assert!(wait_until(WAIT, || gateway.sessions() >= 3).await);
    assert!(wait_until(WAIT, || ready.load(Ordering::SeqCst) >= 2).await);

    // Every session identified with the same token
    for session in 0..2 {
        assert_eq!(gateway.ops(session)[0], OpCode::Identify);
    }
    let tokens: Vec<_> = gateway
        .received()
        .into_iter()
        .filter(|r| r.frame.op == OpCode::Identify)
        .map(|r| r.frame.d.unwrap()["token"].clone())
        .collect();
    assert!(tokens.iter().all(|t| t == TEST_TOKEN));

    running.abort();
}
