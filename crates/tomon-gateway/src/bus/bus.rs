//! Hierarchical event bus
//!
//! Event names are dot-segmented namespace paths (`message.channel`). An
//! event emitted under a path reaches the hooks and subscribers of that path
//! and of every ancestor path, most specific first. Within one level all
//! handlers run concurrently; levels run one after another.

use super::{Handler, HandlerResult};
use dashmap::DashMap;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tomon_common::{Error, Result};

/// Hierarchical publish/subscribe registry
pub struct EventBus<C> {
    /// Subscribers by exact event name
    subscribers: DashMap<String, Vec<Handler<C>>>,

    /// Pre-processing hooks by exact event name
    hooks: DashMap<String, Vec<Handler<C>>>,
}

/// Everything one `emit` produced
#[derive(Debug, Default)]
pub struct Emission {
    /// Subscriber results, most specific level first
    pub results: Vec<HandlerResult>,

    /// Errors raised by hooks; they never stop dispatch
    pub hook_errors: Vec<anyhow::Error>,
}

impl Emission {
    /// Values returned by subscribers, skipping empty results and failures
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok().and_then(Option::as_ref))
            .collect()
    }

    /// Subscriber failures
    pub fn errors(&self) -> impl Iterator<Item = &anyhow::Error> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    /// Number of subscriber invocations
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.results.len()
    }
}

/// Namespace path from `name` up to its root segment
///
/// `a.b.c` yields `a.b.c`, `a.b`, `a`.
pub fn levels(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |&level| level.rsplit_once('.').map(|(parent, _)| parent))
}

/// Reject names that cannot form a namespace path
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(Error::operation(format!("invalid event name '{name}'")));
    }
    Ok(())
}

fn register<C>(map: &DashMap<String, Vec<Handler<C>>>, name: &str, handler: Handler<C>) -> bool {
    let mut handlers = map.entry(name.to_string()).or_default();
    if handlers.iter().any(|h| h.same(&handler)) {
        return false;
    }
    handlers.push(handler);
    true
}

fn deregister<C>(map: &DashMap<String, Vec<Handler<C>>>, name: &str, handler: &Handler<C>) -> bool {
    let removed = match map.get_mut(name) {
        Some(mut handlers) => {
            let before = handlers.len();
            handlers.retain(|h| !h.same(handler));
            handlers.len() != before
        }
        None => false,
    };

    map.remove_if(name, |_, handlers| handlers.is_empty());
    removed
}

fn snapshot<C>(map: &DashMap<String, Vec<Handler<C>>>, name: &str) -> Vec<Handler<C>> {
    map.get(name).map(|h| h.value().clone()).unwrap_or_default()
}

impl<C: Send + Sync + 'static> EventBus<C> {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            hooks: DashMap::new(),
        }
    }

    /// Create an empty bus wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a subscriber under `name`
    ///
    /// Registering the same handler twice under one name is a no-op.
    pub fn subscribe(&self, name: &str, handler: Handler<C>) -> Result<()> {
        validate_name(name)?;
        if register(&self.subscribers, name, handler) {
            tracing::debug!(event = name, "Subscriber registered");
        }
        Ok(())
    }

    /// Remove a subscriber; absent handlers are ignored
    ///
    /// Returns whether anything was removed.
    pub fn unsubscribe(&self, name: &str, handler: &Handler<C>) -> bool {
        deregister(&self.subscribers, name, handler)
    }

    /// Register a hook under `name`
    pub fn hook_before(&self, name: &str, handler: Handler<C>) -> Result<()> {
        validate_name(name)?;
        if register(&self.hooks, name, handler) {
            tracing::debug!(event = name, "Hook registered");
        }
        Ok(())
    }

    /// Remove a hook; absent handlers are ignored
    pub fn unhook_before(&self, name: &str, handler: &Handler<C>) -> bool {
        deregister(&self.hooks, name, handler)
    }

    /// Number of subscribers registered exactly at `name`
    #[must_use]
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers.get(name).map_or(0, |h| h.len())
    }

    /// Number of hooks registered exactly at `name`
    #[must_use]
    pub fn hook_count(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, |h| h.len())
    }

    /// Run the hooks of `name` and every ancestor, most specific first
    ///
    /// Failures are logged and collected; every level still runs.
    pub async fn run_hooks(&self, name: &str, ctx: Arc<C>) -> Vec<anyhow::Error> {
        let mut errors = Vec::new();

        for level in levels(name) {
            let hooks = snapshot(&self.hooks, level);
            if hooks.is_empty() {
                continue;
            }

            let outcomes = join_all(hooks.iter().map(|h| h.call(Arc::clone(&ctx)))).await;
            for outcome in outcomes {
                if let Err(e) = outcome {
                    tracing::warn!(event = name, namespace = level, error = %e, "Hook failed");
                    errors.push(e);
                }
            }
        }

        errors
    }

    /// Deliver an event to hooks and then subscribers along its namespace path
    pub async fn emit(&self, name: &str, ctx: impl Into<Arc<C>>) -> Emission {
        let ctx = ctx.into();
        let hook_errors = self.run_hooks(name, Arc::clone(&ctx)).await;

        let mut results = Vec::new();
        for level in levels(name) {
            let subscribers = snapshot(&self.subscribers, level);
            if subscribers.is_empty() {
                continue;
            }

            let outcomes = join_all(subscribers.iter().map(|h| h.call(Arc::clone(&ctx)))).await;
            for outcome in &outcomes {
                if let Err(e) = outcome {
                    tracing::warn!(event = name, namespace = level, error = %e, "Subscriber failed");
                }
            }
            results.extend(outcomes);
        }

        tracing::trace!(event = name, delivered = results.len(), "Event emitted");

        Emission {
            results,
            hook_errors,
        }
    }
}

impl<C: Send + Sync + 'static> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
