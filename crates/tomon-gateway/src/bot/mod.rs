//! Bot handle, lifecycle stages and plugins

mod bot;
mod lifecycle;
mod plugin;

pub use bot::{Bot, BotBuilder};
pub use lifecycle::StageHooks;
pub use plugin::{Plugin, PluginRegistry};
