//! Countdown for timed exams.
//!
//! The timer is a cancellable scheduled callback: it fires once at its
//! deadline unless cancelled or dropped first. It holds no session state; the
//! callback is expected to feed an [`Action::Timeout`](crate::session::Action)
//! into whatever owns the session.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A pending timeout on the tokio runtime.
#[derive(Debug)]
pub struct ExamTimer {
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl ExamTimer {
    /// Run `callback` once at `deadline`. Must be called inside a tokio runtime.
    pub fn schedule<F>(deadline: Instant, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tracing::debug!("exam timer expired");
            callback();
        });
        Self { deadline, handle }
    }

    /// Run `callback` once after `limit` has elapsed.
    ///
    /// Returns `None` without scheduling anything when `limit` is too long to
    /// express as a deadline.
    pub fn start<F>(limit: Duration, callback: F) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now().checked_add(limit)?;
        Some(Self::schedule(deadline, callback))
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the callback has run (or the timer was cancelled).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the timer. The callback will not run if it has not already.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
