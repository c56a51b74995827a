// src/profile_gate/scheduler.rs
//! Cancelable delayed tasks for debounced UI effects

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A delayed action that is aborted on `cancel()` or when the handle is dropped
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `action` after `delay` unless cancelled first
    pub fn after<F>(delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        Self { handle }
    }

    /// Run `work` immediately; used for one-shot effects that own their own delays
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(work),
        }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
