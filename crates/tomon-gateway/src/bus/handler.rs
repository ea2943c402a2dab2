//! Bus handler type

use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outcome of one handler invocation
///
/// `Ok(None)` means the handler ran but produced nothing worth returning.
pub type HandlerResult = anyhow::Result<Option<Value>>;

type HandlerFn<C> = dyn Fn(Arc<C>) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// An asynchronous event handler
///
/// Handlers are compared by identity: clones of one `Handler` are equal,
/// two handlers built from identical closures are not. Keep the value
/// returned by [`Handler::new`] to unsubscribe later.
pub struct Handler<C> {
    inner: Arc<HandlerFn<C>>,
}

impl<C: Send + Sync + 'static> Handler<C> {
    /// Wrap an async function
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let inner: Arc<HandlerFn<C>> = Arc::new(move |ctx: Arc<C>| {
            Box::pin(f(ctx)) as BoxFuture<'static, HandlerResult>
        });
        Self { inner }
    }

    /// Wrap an async function that returns no value
    pub fn unit<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(move |ctx| {
            let fut = f(ctx);
            async move { fut.await.map(|()| None) }
        })
    }
}

impl<C> Handler<C> {
    /// Start the handler for one event
    pub fn call(&self, ctx: Arc<C>) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(ctx)
    }

    /// Whether both values refer to the same registration
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.inner).cast::<()>() == Arc::as_ptr(&other.inner).cast::<()>()
    }
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> PartialEq for Handler<C> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<C> Eq for Handler<C> {}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}
