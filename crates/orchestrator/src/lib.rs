//! Orchestrator - host fan-out and result collection

mod collector;
mod orchestrator;
mod progress;

pub use collector::ResultCollector;
pub use orchestrator::Orchestrator;
pub use progress::ProgressTracker;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use tumbler_common::{HostProbe, ScanOutcome};

    struct NeverFound;

    #[async_trait]
    impl HostProbe for NeverFound {
        async fn probe(&self, host: Ipv4Addr) -> ScanOutcome {
            ScanOutcome::not_found(host)
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    #[tokio::test]
    async fn orchestrator_run_without_hits() {
        // Low concurrency, nothing found
        let orch = Orchestrator::new(Arc::new(NeverFound), 1);
        let hosts = (1..=4u8).map(|d| Ipv4Addr::new(10, 0, 0, d));

        let report = orch.scan(hosts).await.unwrap();
        assert_eq!(report.probed, 4);
        assert_eq!(report.found_count(), 0);
    }
}
