//! Cancellable background task scopes.
//!
//! Every delayed or fire-and-forget unit the bridge starts runs under a
//! [`CancellationToken`] from this hierarchy:
//!
//! ```text
//! root (start..stop)
//!  ├── reconnect (one pending reconnect delay)
//!  └── connection (one connection attempt)
//!       └── channel (one channel attachment)
//! ```
//!
//! Cancelling a scope stops everything below it. Tasks still re-check bridge
//! state before acting, since cancellation may land after a timer has fired.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Owner of the root scope. Replaced on restart after a stop.
#[derive(Debug, Default)]
pub(crate) struct TaskScope {
    root: Mutex<CancellationToken>,
    reconnect: Mutex<Option<CancellationToken>>,
}

impl TaskScope {
    pub(crate) fn root(&self) -> CancellationToken {
        self.root.lock().clone()
    }

    /// A new connection scope under the root.
    pub(crate) fn connection_scope(&self) -> CancellationToken {
        self.root.lock().child_token()
    }

    /// A new reconnect scope under the root. Cancels the previous one.
    pub(crate) fn reconnect_scope(&self) -> CancellationToken {
        let token = self.root.lock().child_token();
        if let Some(previous) = self.reconnect.lock().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel the pending reconnect, if any.
    pub(crate) fn cancel_reconnect(&self) {
        if let Some(token) = self.reconnect.lock().take() {
            token.cancel();
        }
    }

    /// Cancel everything.
    pub(crate) fn cancel_all(&self) {
        self.root.lock().cancel();
    }

    /// Install a fresh root if the current one was cancelled.
    pub(crate) fn renew(&self) {
        let mut root = self.root.lock();
        if root.is_cancelled() {
            *root = CancellationToken::new();
        }
    }
}

/// Run `fut` until it completes or `token` is cancelled.
pub(crate) fn spawn_scoped<F>(token: &CancellationToken, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = fut => {}
        }
    });
}

/// Run `fut` after `delay`, unless `token` is cancelled first.
pub(crate) fn spawn_after<F>(token: &CancellationToken, delay: Duration, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = sleep(delay) => {}
        }
        fut.await;
    });
}
