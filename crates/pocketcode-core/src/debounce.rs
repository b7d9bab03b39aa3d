//! Cancellable delayed messages.
//!
//! Each session owns one [`DebounceTimer`]. Scheduling again before the delay
//! elapses replaces the pending message, so a burst of edits yields a single
//! check. Dropping the timer (closing the session) cancels it.
//!
//! ## Learning: Cancellation by Abort
//!
//! A tokio task stops at its next `.await` once its `JoinHandle` is aborted.
//! Keeping the handle inside the session ties the timer's lifetime to the
//! session's: no message can outlive the session it was scheduled for.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A single pending delayed message.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    /// Creates an idle timer.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Sends `message` on `tx` after `delay`, replacing any pending send.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<T: Send + 'static>(
        &mut self,
        delay: Duration,
        tx: mpsc::UnboundedSender<T>,
        message: T,
    ) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message);
        }));
    }

    /// Cancels the pending send, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns true while a send is scheduled and has not happened yet.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
