//! Result collection
//!
//! Drains per-host outcomes as tasks finish and turns them into a
//! deterministic report.

use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::progress::ProgressTracker;
use tumbler_common::{ProbeStatus, ScanOutcome, ScanReport};

#[derive(Default)]
pub struct ResultCollector {
    found: Vec<Ipv4Addr>,
    probed: usize,
    not_found: usize,
    failed: usize,
    progress: Option<Arc<ProgressTracker>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror every recorded outcome into `progress`.
    pub fn with_progress(mut self, progress: Arc<ProgressTracker>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn record(&mut self, outcome: ScanOutcome) {
        self.probed += 1;
        match outcome.status {
            ProbeStatus::Found => {
                self.found.push(outcome.host);
                if let Some(p) = &self.progress {
                    p.increment_found();
                }
            }
            ProbeStatus::NotFound => {
                self.not_found += 1;
                if let Some(p) = &self.progress {
                    p.increment_not_found();
                }
            }
            ProbeStatus::Failed(reason) => {
                debug!("Excluding {} from results: {}", outcome.host, reason);
                self.failed += 1;
                if let Some(p) = &self.progress {
                    p.increment_failed();
                }
            }
        }
    }

    /// Consume outcomes until every sender is gone.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ScanOutcome>) -> ScanReport {
        while let Some(outcome) = rx.recv().await {
            self.record(outcome);
        }
        self.finish()
    }

    /// Found hosts come out in ascending address order.
    pub fn finish(mut self) -> ScanReport {
        self.found.sort_unstable();
        self.found.dedup();
        ScanReport {
            found: self.found,
            probed: self.probed,
            not_found: self.not_found,
            failed: self.failed,
            ..Default::default()
        }
    }
}
