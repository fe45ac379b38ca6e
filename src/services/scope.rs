// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task scope tied to the lifetime of a screen or session.
//!
//! Work spawned in a scope stops at its next suspension point once the
//! scope is cancelled or dropped, so late results never land in state that
//! has already been torn down.

use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owner of a group of background tasks.
#[derive(Debug, Default)]
pub struct TaskScope {
    token: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope cancelled together with this one.
    pub fn child(&self) -> TaskScope {
        TaskScope {
            token: self.token.child_token(),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Token observed by every task in the scope.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` until it completes or the scope is cancelled.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = fut => {}
            }
        });

        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Cancel all tasks and wait for them to stop.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            guard.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Scoped task panicked");
                }
            }
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.token.cancel();
        let handles = self.handles.get_mut().unwrap_or_else(|e| e.into_inner());
        for handle in handles.drain(..) {
            handle.abort();
        }
    }
}
