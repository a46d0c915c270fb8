//! Progress tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

pub struct ProgressTracker {
    total: AtomicUsize,
    found: AtomicUsize,
    not_found: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            total: AtomicUsize::new(0),
            found: AtomicUsize::new(0),
            not_found: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn increment_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Hosts whose probe has finished, whatever the result.
    pub fn completed(&self) -> usize {
        self.found.load(Ordering::Relaxed)
            + self.not_found.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
    }

    pub fn print_summary(&self) {
        let total = self.total();
        let found = self.found.load(Ordering::Relaxed);
        let not_found = self.not_found.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        info!("Scan Summary:");
        info!("  Total hosts: {}", total);
        info!("  Guard open: {}", found);
        info!("  Guard closed: {}", not_found);
        info!("  Failed: {}", failed);
        if total > 0 {
            info!("  Completion: {:.1}%", (self.completed() as f64 / total as f64) * 100.0);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
