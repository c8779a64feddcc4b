//! Observer pattern for progress tracking.
//!
//! `FrozenObserver` is a lock-free snapshot used in hot loops: it stores the
//! last reported progress atomically, so branch completions from concurrent
//! workers can throttle their own reporting without locks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::progress::ProgressUpdate;

/// Observer trait for receiving progress updates.
pub trait ProgressObserver: Send + Sync {
    /// Receive a progress update.
    fn on_progress(&self, update: &ProgressUpdate);

    /// Create a frozen snapshot for lock-free access in hot loops.
    fn freeze(&self) -> FrozenObserver;
}

/// A frozen observer that can be consulted without locks.
pub struct FrozenObserver {
    progress: Arc<AtomicU64>,
    threshold: f64,
}

impl FrozenObserver {
    /// Create a new frozen observer with the given reporting threshold.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            progress: Arc::new(AtomicU64::new(0)),
            threshold,
        }
    }

    /// Check if progress has changed enough to warrant reporting.
    #[inline]
    #[must_use]
    pub fn should_report(&self, new_progress: f64) -> bool {
        let current = f64::from_bits(self.progress.load(Ordering::Relaxed));
        (new_progress - current) >= self.threshold
    }

    /// Update the stored progress value.
    pub fn update(&self, new_progress: f64) {
        self.progress
            .store(new_progress.to_bits(), Ordering::Relaxed);
    }

    /// Get the current progress value.
    #[must_use]
    pub fn current(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Relaxed))
    }
}
