//! Gateway connection state machine
//!
//! One call to [`GatewayConnection::run_once`] is one connection attempt:
//! connect, wait for HELLO, log in if needed, identify, then heartbeat and
//! read until the session ends.

use super::heartbeat::spawn_heartbeat;
use super::state::{ConnectionState, StateTracker};
use super::transport::{self, Incoming, OUTBOUND_BUFFER, WRITER_FLUSH};
use crate::bot::StageHooks;
use crate::bus::EventBus;
use crate::error::{GatewayError, GatewayResult};
use crate::events::{GatewayEvent, InboundEvent};
use crate::protocol::{GatewayFrame, OpCode};
use futures_util::{Sink, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tomon_common::BotConfig;
use tomon_http::{CredentialsProvider, UserProfile};
use tracing::{debug, info, trace, warn};

/// Connection timing and endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Gateway WebSocket URL
    pub gateway_url: String,
    /// Bound on the whole handshake
    pub handshake_timeout: Duration,
    /// Interval between heartbeats
    pub heartbeat_interval: Duration,
    /// Pause before the next attempt
    pub reconnect_cooldown: Duration,
}

impl From<&BotConfig> for ConnectionSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            gateway_url: config.gateway_url.clone(),
            handshake_timeout: config.timeout,
            heartbeat_interval: config.heartbeat_interval,
            reconnect_cooldown: config.reconnect_cooldown,
        }
    }
}

/// Client side of the gateway session
///
/// Decoded events go to the inbound bus; each emission runs as its own
/// detached task and keeps running if the connection drops.
pub struct GatewayConnection<P: ?Sized> {
    settings: ConnectionSettings,
    credentials: Arc<P>,
    bus: Arc<EventBus<GatewayEvent>>,
    ws_startup: Arc<StageHooks<UserProfile>>,
    state: StateTracker,
}

impl<P> GatewayConnection<P>
where
    P: CredentialsProvider + ?Sized + 'static,
{
    #[must_use]
    pub fn new(
        settings: ConnectionSettings,
        credentials: Arc<P>,
        bus: Arc<EventBus<GatewayEvent>>,
    ) -> Self {
        Self {
            settings,
            credentials,
            bus,
            ws_startup: Arc::new(StageHooks::new("on_ws_startup")),
            state: StateTracker::new(),
        }
    }

    /// Hooks run after every successful handshake, before the read loop
    #[must_use]
    pub fn with_ws_startup(mut self, hooks: Arc<StageHooks<UserProfile>>) -> Self {
        self.ws_startup = hooks;
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Observe state transitions
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Run one connection attempt to completion
    ///
    /// Once the socket is open, every ending (closure, reset, handshake
    /// violation, timeout) waits out the cooldown here and returns `Ok`.
    /// A failed socket open or an unreachable login returns `Err` without
    /// waiting.
    pub async fn run_once(&self) -> GatewayResult<()> {
        self.state.set(ConnectionState::Connecting);
        info!(url = %self.settings.gateway_url, "Connecting to gateway");

        let (ws, _response) = match connect_async(self.settings.gateway_url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => {
                self.state.set(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };
        let (mut writer, mut reader) = ws.split();
        self.state.set(ConnectionState::AwaitingHello);

        let handshake = self.handshake(&mut writer, &mut reader);
        let profile = match tokio::time::timeout(self.settings.handshake_timeout, handshake).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => return self.fail_handshake(e).await,
            Err(_) => return self.abandon(GatewayError::HandshakeTimeout).await,
        };

        self.state.set(ConnectionState::Ready);
        info!(user = %profile.tag(), "Gateway session ready");

        self.ws_startup.run(Arc::new(profile)).await;

        self.run_session(writer, &mut reader).await
    }

    /// Heartbeat and read until the session ends, then wait out the cooldown
    ///
    /// Heartbeat and writer tasks are stopped before this returns.
    async fn run_session<W, R>(&self, writer: W, reader: &mut R) -> GatewayResult<()>
    where
        W: Sink<Message, Error = WsError> + Unpin + Send + 'static,
        R: Stream<Item = Result<Message, WsError>> + Unpin,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let heartbeat = spawn_heartbeat(self.settings.heartbeat_interval, outbound_tx.clone());
        let mut writer_task = transport::spawn_writer(writer, outbound_rx);

        let ended = self.read_loop(reader).await;

        heartbeat.abort();
        drop(outbound_tx);
        if tokio::time::timeout(WRITER_FLUSH, &mut writer_task).await.is_err() {
            writer_task.abort();
        }

        self.abandon(ended).await
    }

    /// Drive the handshake up to the IDENTIFY acknowledgement
    async fn handshake<W, R>(&self, writer: &mut W, reader: &mut R) -> GatewayResult<UserProfile>
    where
        W: Sink<Message, Error = WsError> + Unpin,
        R: Stream<Item = Result<Message, WsError>> + Unpin,
    {
        transport::expect_frame(reader, OpCode::Hello).await?;
        info!("Gateway hello received");
        self.state.set(ConnectionState::Authenticating);

        let token = match self.credentials.token() {
            Some(token) => {
                info!("Token configured, identifying directly");
                token
            }
            None => {
                info!("Requesting token");
                let profile = self.credentials.login().await?;
                profile
                    .token
                    .or_else(|| self.credentials.token())
                    .ok_or_else(|| tomon_common::Error::network("login response carried no token"))?
            }
        };

        transport::send_frame(writer, &GatewayFrame::identify(token)).await?;
        let ack = transport::expect_frame(reader, OpCode::Identify).await?;
        debug!(session = ?ack.d, "Identify acknowledged");

        let profile = match self.credentials.profile() {
            Some(profile) => profile,
            None => self.credentials.current_user().await?,
        };

        Ok(profile)
    }

    /// Read frames until the session ends, returning why it ended
    async fn read_loop<R>(&self, reader: &mut R) -> GatewayError
    where
        R: Stream<Item = Result<Message, WsError>> + Unpin,
    {
        loop {
            match transport::next_text(reader).await {
                Incoming::Text(text) => self.handle_text(&text),
                Incoming::Closed(e) => return e,
            }
        }
    }

    /// Decode one message and dispatch it unless filtered
    fn handle_text(&self, text: &str) {
        let frame = match GatewayFrame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        if frame.op.is_keepalive() {
            trace!(op = %frame.op, "Keepalive frame");
            return;
        }

        let Some(inbound) = InboundEvent::from_frame(frame) else {
            trace!("Dropping echo of an outbound action");
            return;
        };

        let event = GatewayEvent::from_inbound(inbound);
        info!("[ {} ]: {}", event.op.description(), event.describe());

        let bus = Arc::clone(&self.bus);
        tokio::spawn(async move {
            let name = event.name();
            bus.emit(name, event).await;
        });
    }

    /// Route a handshake failure
    ///
    /// An unreachable login goes back to the caller; anything else is a
    /// reconnect.
    async fn fail_handshake(&self, reason: GatewayError) -> GatewayResult<()> {
        if reason.is_login_unreachable() {
            self.state.set(ConnectionState::Disconnected);
            return Err(reason);
        }
        self.abandon(reason).await
    }

    /// End an opened session after `reason` and wait out the cooldown
    async fn abandon(&self, reason: GatewayError) -> GatewayResult<()> {
        match reason.close_code() {
            Some(code) => warn!(code, "Gateway connection closed"),
            None => warn!(error = %reason, "Gateway session failed"),
        }

        self.state.set(ConnectionState::Reconnecting);
        info!(
            cooldown_ms = self.settings.reconnect_cooldown.as_millis() as u64,
            "Reconnecting after cooldown"
        );
        tokio::time::sleep(self.settings.reconnect_cooldown).await;
        self.state.set(ConnectionState::Disconnected);

        Ok(())
    }
}

impl<P: ?Sized> std::fmt::Debug for GatewayConnection<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConnection")
            .field("settings", &self.settings)
            .field("state", &self.state.get())
            .finish()
    }
}
