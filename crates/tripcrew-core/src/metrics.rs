//! Process-wide counters for crew runs.
//!
//! Counters are bumped at the call site; [`Metrics::flush`] emits the current
//! values as one `tracing::info!` event, typically once a run has finished.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    crews_started: AtomicU64,
    tasks_completed: AtomicU64,
    sections_missing: AtomicU64,
    engine_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            crews_started: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            sections_missing: AtomicU64::new(0),
            engine_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_crews_started(&self) {
        self.crews_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "crews_started", "counter incremented");
    }

    pub fn inc_tasks_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tasks_completed", "counter incremented");
    }

    pub fn inc_sections_missing(&self) {
        self.sections_missing.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "sections_missing", "counter incremented");
    }

    pub fn inc_engine_failures(&self) {
        self.engine_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "engine_failures", "counter incremented");
    }

    /// Emit all counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            crews_started = self.crews_started(),
            tasks_completed = self.tasks_completed(),
            sections_missing = self.sections_missing(),
            engine_failures = self.engine_failures(),
        );
    }

    pub fn crews_started(&self) -> u64 {
        self.crews_started.load(Ordering::Relaxed)
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    pub fn sections_missing(&self) -> u64 {
        self.sections_missing.load(Ordering::Relaxed)
    }

    pub fn engine_failures(&self) -> u64 {
        self.engine_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.crews_started.store(0, Ordering::Relaxed);
        self.tasks_completed.store(0, Ordering::Relaxed);
        self.sections_missing.store(0, Ordering::Relaxed);
        self.engine_failures.store(0, Ordering::Relaxed);
    }
}
