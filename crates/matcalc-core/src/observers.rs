//! Concrete observer implementations.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::constants::PROGRESS_REPORT_THRESHOLD;
use crate::observer::{FrozenObserver, ProgressObserver};
use crate::progress::ProgressUpdate;

/// Null object pattern — discards all progress updates.
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for NoOpObserver {
    fn on_progress(&self, _update: &ProgressUpdate) {
        // Intentionally empty
    }

    fn freeze(&self) -> FrozenObserver {
        FrozenObserver::new(1.0) // Never reports
    }
}

/// Observer that logs progress updates through `tracing`.
pub struct LoggingObserver {
    last_reported: AtomicU64,
}

impl LoggingObserver {
    /// Create a new logging observer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_reported: AtomicU64::new(0),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        let last = f64::from_bits(self.last_reported.load(Ordering::Relaxed));
        if update.done {
            info!(algorithm = %update.algorithm, "multiplication complete");
            self.last_reported
                .store(update.progress.to_bits(), Ordering::Relaxed);
        } else if (update.progress - last) >= PROGRESS_REPORT_THRESHOLD {
            debug!(
                algorithm = %update.algorithm,
                progress = format!("{:.1}%", update.progress * 100.0),
                branch = update.current_step,
                total = update.total_steps,
                "progress update"
            );
            self.last_reported
                .store(update.progress.to_bits(), Ordering::Relaxed);
        }
    }

    fn freeze(&self) -> FrozenObserver {
        FrozenObserver::new(PROGRESS_REPORT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_observer_does_nothing() {
        let observer = NoOpObserver::new();
        observer.on_progress(&ProgressUpdate::new(0, "test", 0.5, 1, 7));
        // No assertion needed — just ensure it doesn't panic
    }

    #[test]
    fn noop_observer_freeze_never_reports() {
        let observer = NoOpObserver::new();
        let frozen = observer.freeze();
        assert!(!frozen.should_report(0.5));
        assert!(!frozen.should_report(0.99));
        assert!(frozen.should_report(1.0));
    }

    #[test]
    fn logging_observer_tracks_reported_progress() {
        let observer = LoggingObserver::new();
        observer.on_progress(&ProgressUpdate::new(0, "test", 0.5, 3, 7));
        let last = f64::from_bits(observer.last_reported.load(Ordering::Relaxed));
        assert!((last - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn logging_observer_throttles_small_increments() {
        let observer = LoggingObserver::new();
        observer.on_progress(&ProgressUpdate::new(0, "test", 0.5, 3, 7));
        observer.on_progress(&ProgressUpdate::new(0, "test", 0.501, 4, 7));
        let last = f64::from_bits(observer.last_reported.load(Ordering::Relaxed));
        assert!((last - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn logging_observer_done_always_records() {
        let observer = LoggingObserver::new();
        observer.on_progress(&ProgressUpdate::new(0, "test", 0.99, 6, 7));
        observer.on_progress(&ProgressUpdate::done(0, "test"));
        let last = f64::from_bits(observer.last_reported.load(Ordering::Relaxed));
        assert!((last - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn logging_observer_freeze_uses_threshold() {
        let observer = LoggingObserver::new();
        let frozen = observer.freeze();
        assert!(frozen.should_report(PROGRESS_REPORT_THRESHOLD));
        assert!(!frozen.should_report(PROGRESS_REPORT_THRESHOLD / 2.0));
    }
}
