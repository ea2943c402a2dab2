//! Bot handle
//!
//! `Bot` ties the pieces together: the inbound event bus, the outbound
//! `send` bus, the REST client, lifecycle hooks, plugins and the gateway
//! connection. Clones share all of it.

use super::lifecycle::StageHooks;
use super::plugin::{Plugin, PluginRegistry};
use crate::bus::{Emission, EventBus, Handler};
use crate::connection::{ConnectionSettings, ConnectionState, GatewayConnection};
use crate::events::{names, GatewayEvent};
use crate::supervisor::Supervisor;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tomon_common::{BotConfig, Result};
use tomon_http::{ApiAction, HttpApi, RestApi, UserProfile};

struct BotInner {
    config: BotConfig,
    api: Arc<dyn RestApi>,
    events: Arc<EventBus<GatewayEvent>>,
    sends: EventBus<ApiAction>,
    startup: StageHooks<()>,
    ws_startup: Arc<StageHooks<UserProfile>>,
    plugins: RwLock<PluginRegistry>,
    connection: GatewayConnection<dyn RestApi>,
}

/// Shared handle to a bot instance
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

/// Builder for [`Bot`]
pub struct BotBuilder {
    config: BotConfig,
    api: Option<Arc<dyn RestApi>>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl BotBuilder {
    /// Use a custom REST client instead of [`HttpApi`]
    #[must_use]
    pub fn api(mut self, api: Arc<dyn RestApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Add a plugin to be loaded before the first connection
    #[must_use]
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn build(self) -> Result<Bot> {
        self.config.validate()?;

        let api: Arc<dyn RestApi> = match self.api {
            Some(api) => api,
            None => Arc::new(HttpApi::new(&self.config)?),
        };

        let events = EventBus::new_shared();
        let ws_startup = Arc::new(StageHooks::new("on_ws_startup"));
        let connection = GatewayConnection::new(
            ConnectionSettings::from(&self.config),
            Arc::clone(&api),
            Arc::clone(&events),
        )
        .with_ws_startup(Arc::clone(&ws_startup));

        let mut plugins = PluginRegistry::default();
        for plugin in self.plugins {
            plugins.add(plugin);
        }

        Ok(Bot {
            inner: Arc::new(BotInner {
                config: self.config,
                api,
                events,
                sends: EventBus::new(),
                startup: StageHooks::new("on_startup"),
                ws_startup,
                plugins: RwLock::new(plugins),
                connection,
            }),
        })
    }
}

impl Bot {
    /// Start building a bot from configuration
    #[must_use]
    pub fn builder(config: BotConfig) -> BotBuilder {
        BotBuilder {
            config,
            api: None,
            plugins: Vec::new(),
        }
    }

    /// Bot with the default HTTP client
    pub fn new(config: BotConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// REST client used for outbound actions
    #[must_use]
    pub fn api(&self) -> &Arc<dyn RestApi> {
        &self.inner.api
    }

    /// Inbound event bus
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus<GatewayEvent>> {
        &self.inner.events
    }

    /// Current gateway connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    /// Observe gateway connection state transitions
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.watch_state()
    }

    // === Event registration ===

    pub fn subscribe(&self, name: &str, handler: Handler<GatewayEvent>) -> Result<()> {
        self.inner.events.subscribe(name, handler)
    }

    pub fn unsubscribe(&self, name: &str, handler: &Handler<GatewayEvent>) -> bool {
        self.inner.events.unsubscribe(name, handler)
    }

    pub fn hook_before(&self, name: &str, handler: Handler<GatewayEvent>) -> Result<()> {
        self.inner.events.hook_before(name, handler)
    }

    pub fn unhook_before(&self, name: &str, handler: &Handler<GatewayEvent>) -> bool {
        self.inner.events.unhook_before(name, handler)
    }

    /// Subscribe one handler to several event names
    pub fn on(&self, names: &[&str], handler: Handler<GatewayEvent>) -> Result<()> {
        for name in names {
            self.subscribe(name, handler.clone())?;
        }
        Ok(())
    }

    /// Subscribe to `message`, or to `message.<sub>` for each given sub-event
    pub fn on_message(&self, subs: &[&str], handler: Handler<GatewayEvent>) -> Result<()> {
        for name in namespaced(names::MESSAGE, subs) {
            self.subscribe(&name, handler.clone())?;
        }
        Ok(())
    }

    /// Hook one handler before several event names
    pub fn before(&self, names: &[&str], handler: Handler<GatewayEvent>) -> Result<()> {
        for name in names {
            self.hook_before(name, handler.clone())?;
        }
        Ok(())
    }

    /// Hook before `message`, or before `message.<sub>` for each given sub-event
    pub fn before_message(&self, subs: &[&str], handler: Handler<GatewayEvent>) -> Result<()> {
        for name in namespaced(names::MESSAGE, subs) {
            self.hook_before(&name, handler.clone())?;
        }
        Ok(())
    }

    /// Deliver an event to local handlers as if it came from the gateway
    pub async fn emit(&self, event: GatewayEvent) -> Emission {
        let name = event.name();
        self.inner.events.emit(name, event).await
    }

    // === Lifecycle ===

    /// Run once before the first connection attempt
    pub fn on_startup(&self, hook: Handler<()>) {
        self.inner.startup.add(hook);
    }

    /// Run after every successful handshake, before events are read
    pub fn on_ws_startup(&self, hook: Handler<UserProfile>) {
        self.inner.ws_startup.add(hook);
    }

    /// Run before every outbound REST action
    pub fn on_send_before(&self, hook: Handler<ApiAction>) -> Result<()> {
        self.inner.sends.hook_before(names::SEND, hook)
    }

    /// Run before one kind of outbound action (`send.text`, `send.image`, ...)
    pub fn on_send_before_action(&self, name: &str, hook: Handler<ApiAction>) -> Result<()> {
        self.inner.sends.hook_before(name, hook)
    }

    // === Outbound actions ===

    /// Run the `send` hooks for `action`, then perform it
    ///
    /// REST failures are returned unchanged.
    pub async fn call_action(&self, action: ApiAction) -> Result<Value> {
        let action = Arc::new(action);
        let hook_errors = self
            .inner
            .sends
            .run_hooks(action.event_name(), Arc::clone(&action))
            .await;

        tracing::debug!(action = %action, hook_errors = hook_errors.len(), "Calling API");
        self.inner.api.execute(&action).await
    }

    /// Post a text message to a channel
    pub async fn send_text(&self, channel_id: &str, content: &str) -> Result<Value> {
        self.call_action(ApiAction::send_text(channel_id, content)).await
    }

    /// Upload a jpg/png image to a channel
    pub async fn send_image(
        &self,
        channel_id: &str,
        file_path: impl Into<PathBuf>,
        content: Option<&str>,
        at_user: Option<&str>,
    ) -> Result<Value> {
        let mut action = ApiAction::send_image(channel_id, file_path);
        if let Some(content) = content {
            action = action.with_content(content);
        }
        if let Some(user_id) = at_user {
            action = action.with_mention(user_id);
        }
        self.call_action(action).await
    }

    /// Fetch the bot account's own profile
    pub async fn get_user_info(&self) -> Result<UserProfile> {
        let value = self.call_action(ApiAction::GetUserInfo).await?;
        Ok(serde_json::from_value(value)?)
    }

    // === Plugins ===

    /// Add a plugin; it is registered by [`Bot::load_plugins`] or [`Bot::run`]
    pub fn add_plugin(&self, plugin: impl Plugin + 'static) -> bool {
        self.inner.plugins.write().add(Arc::new(plugin))
    }

    /// Keep a plugin from being loaded
    pub fn exclude_plugin(&self, name: &str) {
        self.inner.plugins.write().exclude(name);
    }

    /// Register every pending plugin
    ///
    /// Returns the names loaded by this call. A failing plugin stops the load.
    pub fn load_plugins(&self) -> Result<Vec<String>> {
        let pending = self.inner.plugins.read().pending();

        let mut loaded = Vec::with_capacity(pending.len());
        for plugin in pending {
            plugin.register(self)?;
            self.inner.plugins.write().mark_loaded(plugin.name());
            loaded.push(plugin.name().to_string());
        }

        Ok(loaded)
    }

    /// Names of loaded plugins
    #[must_use]
    pub fn loaded_plugins(&self) -> Vec<String> {
        self.inner.plugins.read().loaded().to_vec()
    }

    // === Run ===

    /// Load plugins, run startup hooks, then keep the gateway connected forever
    ///
    /// Only a plugin registration failure returns.
    pub async fn run(&self) -> Result<()> {
        self.load_plugins()?;

        self.inner.startup.run(Arc::new(())).await;

        for name in self.loaded_plugins() {
            tracing::info!(plugin = %name, "Life cycle [on_load_plugin]: plugin loaded");
        }

        tracing::info!("Opening gateway connection");
        Supervisor::new(self.inner.config.reconnect_cooldown)
            .run(&self.inner.connection)
            .await;

        Ok(())
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("connection", &self.inner.connection)
            .field("plugins", &*self.inner.plugins.read())
            .finish()
    }
}

/// `root` alone for no subs, otherwise `root.<sub>` per sub
fn namespaced(root: &str, subs: &[&str]) -> Vec<String> {
    if subs.is_empty() {
        return vec![root.to_string()];
    }
    subs.iter().map(|sub| format!("{root}.{sub}")).collect()
}
