//! Cooperative cancellation for work units.
//!
//! Each unit gets its own token. The token expires when its deadline passes
//! or when [`CancelToken::cancel`] is called. Algorithms are expected to
//! poll it in their main loops; the runner also checks it between stages.

use crate::error::SearchError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug)]
struct CancelInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that only expires when cancelled explicitly.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A token that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// A token expiring `timeout` from now, or never for `None` or a
    /// timeout too large to represent.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self::build(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                deadline,
            }),
        }
    }

    /// Expire the token immediately.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Whether the token was cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Err(SearchError::Cancelled)` once the token has expired.
    ///
    /// Intended for `?` inside search loops.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}
