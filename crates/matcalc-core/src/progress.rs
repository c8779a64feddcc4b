//! Progress tracking types and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::multiplier::MatError;

/// Progress update sent from multipliers to observers.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Multiplier index (for multi-algorithm runs).
    pub calc_index: usize,
    /// Name of the algorithm producing this update.
    pub algorithm: &'static str,
    /// Current progress as a fraction in [0.0, 1.0].
    pub progress: f64,
    /// Completed top-level branches.
    pub current_step: u64,
    /// Total top-level branches.
    pub total_steps: u64,
    /// Whether this is the final update.
    pub done: bool,
}

impl ProgressUpdate {
    /// Create a new progress update.
    #[must_use]
    pub fn new(
        calc_index: usize,
        algorithm: &'static str,
        progress: f64,
        current: u64,
        total: u64,
    ) -> Self {
        Self {
            calc_index,
            algorithm,
            progress,
            current_step: current,
            total_steps: total,
            done: false,
        }
    }

    /// Create a completion update.
    #[must_use]
    pub fn done(calc_index: usize, algorithm: &'static str) -> Self {
        Self {
            calc_index,
            algorithm,
            progress: 1.0,
            current_step: 0,
            total_steps: 0,
            done: true,
        }
    }
}

/// Cooperative cancellation token.
///
/// The recursion checks the token at frame entry; tripping it aborts the
/// whole top-level call while every frame unwinds and releases its arena.
///
/// # Example
/// ```
/// use matcalc_core::progress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check_cancelled().is_err());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check for cancellation, returning an error if cancelled.
    pub fn check_cancelled(&self) -> Result<(), MatError> {
        if self.is_cancelled() {
            Err(MatError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A cancellation token with an absolute deadline.
///
/// The token is considered cancelled if either `cancel()` was called or the
/// deadline has passed. The algorithm itself carries no timeout; callers
/// wrap the entire multiplication with one of these.
#[derive(Clone)]
pub struct TimeoutCancellationToken {
    inner: CancellationToken,
    deadline: Instant,
}

impl TimeoutCancellationToken {
    /// Create a new token that expires after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: CancellationToken::new(),
            deadline: Instant::now() + timeout,
        }
    }

    /// Check if cancellation has been requested (manual or deadline).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Request manual cancellation.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Check for cancellation, distinguishing deadline expiry.
    pub fn check_cancelled(&self) -> Result<(), MatError> {
        if self.inner.is_cancelled() {
            return Err(MatError::Cancelled);
        }
        if Instant::now() >= self.deadline {
            return Err(MatError::Timeout("deadline reached".to_string()));
        }
        Ok(())
    }

    /// Remaining time before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Inner `CancellationToken` for APIs without deadline support.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.inner
    }
}
