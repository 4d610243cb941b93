//! Trailing-edge debounce on the tokio runtime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs the most recently scheduled action once `delay` has passed without
/// another schedule.
///
/// Only the waiting phase is cancellable: once the delay elapses the action is
/// handed to its own task, so a later `schedule`/`cancel`/drop never aborts an
/// action that already started.
#[derive(Debug)]
pub struct Debouncer {
    /// Quiet period required before firing.
    delay: Duration,
    /// Timer task of the pending action, if any.
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// What: Restart the timer with `action` as the thing to run.
    ///
    /// Details:
    /// - Any previously scheduled, not yet fired action is dropped.
    /// - Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        }));
    }

    /// Drop the pending action. Returns whether one was waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether an action is waiting for its timer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
