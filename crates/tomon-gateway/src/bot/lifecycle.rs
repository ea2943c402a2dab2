//! Lifecycle hook stages

use crate::bus::Handler;
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;

/// Hooks attached to one lifecycle stage
///
/// All hooks of a stage run concurrently; failures are logged and returned,
/// they never abort the stage.
pub struct StageHooks<C> {
    stage: &'static str,
    hooks: RwLock<Vec<Handler<C>>>,
}

impl<C: Send + Sync + 'static> StageHooks<C> {
    #[must_use]
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Attach a hook; attaching the same handler twice is a no-op
    pub fn add(&self, hook: Handler<C>) {
        let mut hooks = self.hooks.write();
        if !hooks.iter().any(|h| h.same(&hook)) {
            hooks.push(hook);
        }
    }

    /// Detach a hook
    pub fn remove(&self, hook: &Handler<C>) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|h| !h.same(hook));
        hooks.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    /// Run every hook of the stage with `ctx`
    pub async fn run(&self, ctx: Arc<C>) -> Vec<anyhow::Error> {
        let hooks = self.hooks.read().clone();
        if hooks.is_empty() {
            return Vec::new();
        }

        tracing::info!(stage = self.stage, "Life cycle stage started");
        let outcomes = join_all(hooks.iter().map(|h| h.call(Arc::clone(&ctx)))).await;

        let errors: Vec<anyhow::Error> = outcomes.into_iter().filter_map(Result::err).collect();
        for e in &errors {
            tracing::warn!(stage = self.stage, error = %e, "Life cycle hook failed");
        }
        tracing::info!(stage = self.stage, failed = errors.len(), "Life cycle stage finished");

        errors
    }
}

impl<C> std::fmt::Debug for StageHooks<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageHooks")
            .field("stage", &self.stage)
            .field("hooks", &self.hooks.read().len())
            .finish()
    }
}
