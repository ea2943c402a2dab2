//! Plugins
//!
//! A plugin is a named bundle of registrations. It receives the bot handle
//! explicitly and registers its subscribers and hooks through it.

use super::Bot;
use std::collections::HashSet;
use std::sync::Arc;
use tomon_common::Result;

/// A unit of bot behaviour loaded at startup
pub trait Plugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &str;

    /// Register handlers on the bot
    fn register(&self, bot: &Bot) -> Result<()>;
}

/// Plugins known to a bot and which of them are loaded
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    excluded: HashSet<String>,
    loaded: Vec<String>,
}

impl PluginRegistry {
    /// Add a plugin; a second plugin with the same name is ignored
    pub fn add(&mut self, plugin: Arc<dyn Plugin>) -> bool {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            tracing::warn!(plugin = plugin.name(), "Plugin already added");
            return false;
        }
        self.plugins.push(plugin);
        true
    }

    /// Keep a plugin from being loaded
    pub fn exclude(&mut self, name: &str) {
        self.excluded.insert(name.to_string());
    }

    /// Plugins that are neither loaded nor excluded
    #[must_use]
    pub fn pending(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins
            .iter()
            .filter(|p| !self.excluded.contains(p.name()) && !self.is_loaded(p.name()))
            .cloned()
            .collect()
    }

    pub fn mark_loaded(&mut self, name: &str) {
        if !self.is_loaded(name) {
            self.loaded.push(name.to_string());
        }
    }

    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|n| n == name)
    }

    /// Names of loaded plugins, in load order
    #[must_use]
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("excluded", &self.excluded)
            .field("loaded", &self.loaded)
            .finish()
    }
}
