//! Progress reporting
//!
//! The estimator reports how many `(frequency, phase)` evaluations have
//! completed. Reporting is purely observational: sinks are called from the
//! worker threads between sub-passes and must return quickly. Counts handed to
//! a sink strictly increase within one estimation call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Receiver of best-effort progress counts
pub trait ProgressSink: Send + Sync {
    /// `completed` never decreases between calls of the same estimation
    fn report(&self, completed: u64, total: u64);
}

/// Logs progress through `tracing` every `percent_step` percent
#[derive(Debug)]
pub struct TracingProgress {
    percent_step: u64,
    last_logged: AtomicU64,
}

impl TracingProgress {
    pub fn new(percent_step: u64) -> Self {
        Self {
            percent_step: percent_step.clamp(1, 100),
            last_logged: AtomicU64::new(0),
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for TracingProgress {
    fn report(&self, completed: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = completed.saturating_mul(100) / total;
        let bucket = percent / self.percent_step * self.percent_step;
        if bucket > 0 && self.last_logged.fetch_max(bucket, Ordering::Relaxed) < bucket {
            info!(completed, total, percent = bucket, "spectral scan progress");
        }
    }
}

/// Keeps the latest reported count; handy for polling from another thread
#[derive(Debug, Default)]
pub struct CountingProgress {
    completed: AtomicU64,
    total: AtomicU64,
    reports: AtomicU64,
}

impl CountingProgress {
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of times the sink was called
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }
}

impl ProgressSink for CountingProgress {
    fn report(&self, completed: u64, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.fetch_max(completed, Ordering::Relaxed);
        self.reports.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared counter one estimation call advances once per bin and sub-pass
pub(crate) struct ProgressTracker {
    sink: Option<Arc<dyn ProgressSink>>,
    total: u64,
    completed: AtomicU64,
    last_reported: Mutex<u64>,
}

impl ProgressTracker {
    pub fn new(sink: Option<Arc<dyn ProgressSink>>, total: u64) -> Self {
        Self {
            sink,
            total,
            completed: AtomicU64::new(0),
            last_reported: Mutex::new(0),
        }
    }

    /// Record `evaluations` more completed candidates.
    ///
    /// Never waits: if another worker is reporting, this update is skipped and
    /// a later one (or [`Self::finish`]) carries the count.
    pub fn advance(&self, evaluations: u64) {
        let Some(sink) = &self.sink else {
            return;
        };
        let now = self.completed.fetch_add(evaluations, Ordering::Relaxed) + evaluations;
        if let Ok(mut last) = self.last_reported.try_lock() {
            if now > *last {
                *last = now;
                sink.report(now, self.total);
            }
        }
    }

    /// Deliver the final count if a skipped update left it unreported
    pub fn finish(&self) {
        let Some(sink) = &self.sink else {
            return;
        };
        let now = self.completed.load(Ordering::Relaxed);
        let mut last = self.last_reported.lock().unwrap_or_else(PoisonError::into_inner);
        if now > *last {
            *last = now;
            sink.report(now, self.total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_without_sink_is_noop() {
        let tracker = ProgressTracker::new(None, 100);
        tracker.advance(10);
        assert_eq!(tracker.completed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_tracker_forwards_counts() {
        let sink = Arc::new(CountingProgress::default());
        let shared: Arc<dyn ProgressSink> = sink.clone();
        let tracker = ProgressTracker::new(Some(shared), 30);
        tracker.advance(10);
        tracker.advance(10);
        tracker.advance(10);
        tracker.finish();
        assert_eq!(sink.completed(), 30);
        assert_eq!(sink.total(), 30);
        assert_eq!(sink.reports(), 3);
    }

    #[test]
    fn test_tracing_progress_buckets() {
        let sink = TracingProgress::new(25);
        sink.report(10, 100);
        assert_eq!(sink.last_logged.load(Ordering::Relaxed), 0);
        sink.report(30, 100);
        assert_eq!(sink.last_logged.load(Ordering::Relaxed), 25);
        sink.report(100, 100);
        assert_eq!(sink.last_logged.load(Ordering::Relaxed), 100);
        sink.report(0, 0);
    }
}
