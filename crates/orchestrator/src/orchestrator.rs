// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - fans a host probe out over an address range

use anyhow::{Context, Result};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, instrument, warn};

use crate::collector::ResultCollector;
use crate::progress::ProgressTracker;
use tumbler_common::{HostProbe, ScanOutcome, ScanReport};

/// Orchestrator runs one task per host, bounded by a semaphore, and
/// collects outcomes over a bounded channel.
pub struct Orchestrator {
    probe: Arc<dyn HostProbe>,
    progress: Arc<ProgressTracker>,
    concurrency: usize,
    channel_capacity: usize,
}

impl Orchestrator {
    /// Create an orchestrator that keeps at most `concurrency` probes in flight.
    pub fn new(probe: Arc<dyn HostProbe>, concurrency: usize) -> Self {
        let concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            probe,
            progress: Arc::new(ProgressTracker::new()),
            concurrency,
            channel_capacity: concurrency,
        }
    }

    /// Override the outcome channel size (defaults to the concurrency limit).
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Probe every host and wait for all of them before building the report.
    #[instrument(skip(self, hosts))]
    pub async fn scan<I>(&self, hosts: I) -> Result<ScanReport>
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let started = Instant::now();
        let hosts: Vec<Ipv4Addr> = hosts.into_iter().collect();
        self.progress.set_total(hosts.len());

        info!(
            "Starting knock scan of {} host(s), max {} in flight",
            hosts.len(),
            self.concurrency
        );

        // Collector drains while tasks are still producing, so a channel
        // smaller than the host count cannot stall the launch loop.
        let (tx, rx) = mpsc::channel::<ScanOutcome>(self.channel_capacity);
        let collector = tokio::spawn(
            ResultCollector::new()
                .with_progress(self.progress.clone())
                .run(rx),
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(hosts.len());

        for host in hosts {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("probe semaphore closed")?;
            let probe = self.probe.clone();
            let tx = tx.clone();

            let task = tokio::spawn(async move {
                let outcome = probe.probe(host).await;
                if tx.send(outcome).await.is_err() {
                    warn!("Result collector gone, dropping outcome for {}", host);
                }
                drop(permit);
            });
            tasks.push((host, task));
        }

        for (host, task) in tasks {
            if let Err(e) = task.await {
                warn!("Probe task for {} did not complete: {}", host, e);
                let outcome = ScanOutcome::failed(host, format!("probe task aborted: {}", e));
                if tx.send(outcome).await.is_err() {
                    warn!("Result collector gone, dropping outcome for {}", host);
                }
            }
        }
        drop(tx);

        let report = collector.await.context("result collector task failed")?;
        self.progress.print_summary();

        Ok(report.with_elapsed(started.elapsed()))
    }
}
