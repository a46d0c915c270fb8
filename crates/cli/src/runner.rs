// runner.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tumbler_common::{KnockOptions, KnockPlan, LocalEndpoint, ScanReport};
use tumbler_orchestrator::Orchestrator;
use tumbler_scanner_syn::{DatalinkInjector, Injector, KnockSequencer};
use tumbler_scanner_tcp::TcpGuard;
use tumbler_target_resolver::{AddressRange, TargetResolver};

use crate::output::print_report;

/// Everything `scan` was invoked with, before validation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub start: String,
    pub end: String,
    pub ports: String,
    pub iface: String,
    pub concurrency: usize,
    pub knock_delay: Duration,
    pub guard_timeout: Duration,
    pub dest_mac: [u8; 6],
    pub output_format: String,
}

pub async fn run_scan(config: ScanConfig) -> Result<()> {
    info!("Starting scan...");
    info!("Range: {} - {}", config.start, config.end);
    info!("Knock sequence: {}", config.ports);
    info!("Interface: {}", config.iface);
    info!("Concurrency: {}", config.concurrency);

    let (range, plan, options) = prepare(&config)?;

    let local = TargetResolver::resolve_local(&config.iface)
        .with_context(|| format!("Failed to resolve local address on {}", config.iface))?;
    info!("Local endpoint: {}", local);

    // A single-port plan never touches the raw socket. A failed check is
    // only a hint: each host still reports its own handle failure.
    if !plan.knock_ports().is_empty() && tumbler_scanner_syn::init(&local.interface).is_err() {
        warn!("Continuing without a working injection handle; knocked hosts will be reported as failed");
    }

    let report = execute(range, plan, local, options, Arc::new(DatalinkInjector::new())).await?;
    print_report(&report, &config.output_format)?;
    Ok(())
}

/// Validate the range, knock plan and timing settings. Nothing here
/// touches the network.
fn prepare(config: &ScanConfig) -> Result<(AddressRange, KnockPlan, KnockOptions)> {
    let range = TargetResolver::resolve_range(&config.start, &config.end)
        .context("Invalid address range")?;
    let plan = TargetResolver::resolve_plan(&config.ports).context("Invalid port list")?;

    let options = KnockOptions::default()
        .with_knock_delay(config.knock_delay)
        .with_guard_timeout(config.guard_timeout)
        .with_max_concurrency(config.concurrency)
        .with_dest_mac(config.dest_mac);
    options.validate().context("Invalid scan options")?;

    if range.is_empty() {
        warn!(
            "Range {} - {} is reversed, no hosts will be probed",
            range.start(),
            range.end()
        );
    }

    info!("Hosts in range: {}", range.len());
    info!(
        "Knock ports: {:?}, guard port: {}",
        plan.knock_ports(),
        plan.guard_port()
    );

    Ok((range, plan, options))
}

/// Wire the knock sequencer into the orchestrator and run it over the range.
async fn execute(
    range: AddressRange,
    plan: KnockPlan,
    local: LocalEndpoint,
    options: KnockOptions,
    injector: Arc<dyn Injector>,
) -> Result<ScanReport> {
    let guard = TcpGuard::new().with_timeout(options.guard_timeout);
    let concurrency = options.max_concurrency;
    let sequencer = KnockSequencer::new(plan, local, injector, Arc::new(guard)).with_options(options);

    let orchestrator = Orchestrator::new(Arc::new(sequencer), concurrency);
    let report = orchestrator.scan(range.hosts()).await?;

    info!(
        "Scan finished in {:?}: {} found, {} failed",
        report.elapsed,
        report.found_count(),
        report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use tumbler_common::TumblerError;
    use tumbler_scanner_syn::{FrameSink, SynError};

    /// Refuses every handle, like an unprivileged run.
    struct DeniedInjector;

    impl Injector for DeniedInjector {
        fn open(&self, interface: &str) -> Result<Box<dyn FrameSink>, SynError> {
            Err(SynError::NotPermitted(interface.to_string()))
        }
    }

    fn config(start: &str, end: &str, ports: &str) -> ScanConfig {
        ScanConfig {
            start: start.to_string(),
            end: end.to_string(),
            ports: ports.to_string(),
            iface: "lo".to_string(),
            concurrency: 8,
            knock_delay: Duration::from_millis(1),
            guard_timeout: Duration::from_millis(500),
            dest_mac: [0xff; 6],
            output_format: "text".to_string(),
        }
    }

    /// Counts frames instead of putting them on the wire.
    #[derive(Default)]
    struct CountingInjector {
        opened: AtomicUsize,
        frames: Arc<AtomicUsize>,
    }

    struct CountingSink(Arc<AtomicUsize>);

    impl FrameSink for CountingSink {
        fn send_frame(&mut self, _frame: &[u8]) -> Result<(), SynError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Injector for CountingInjector {
        fn open(&self, _interface: &str) -> Result<Box<dyn FrameSink>, SynError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSink(self.frames.clone())))
        }
    }

    #[test]
    fn test_prepare_valid() {
        let (range, plan, options) = prepare(&config("192.168.1.10", "192.168.1.12", "7000,8000,9000")).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(plan.knock_ports(), &[7000, 8000]);
        assert_eq!(plan.guard_port(), 9000);
        assert_eq!(options.max_concurrency, 8);
    }

    #[test]
    fn test_prepare_subnet_mismatch() {
        let err = prepare(&config("10.0.0.5", "10.1.0.5", "7000,8000")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TumblerError>(),
            Some(TumblerError::SubnetMismatch { .. })
        ));
    }

    #[test]
    fn test_prepare_invalid_port() {
        let err = prepare(&config("10.0.0.1", "10.0.0.5", "abc,80")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TumblerError>(),
            Some(TumblerError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_prepare_invalid_address() {
        let err = prepare(&config("10.0.0.256", "10.0.0.5", "80")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TumblerError>(),
            Some(TumblerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_prepare_zero_concurrency() {
        let mut cfg = config("10.0.0.1", "10.0.0.5", "80");
        cfg.concurrency = 0;
        assert!(prepare(&cfg).is_err());
    }

    #[test]
    fn test_prepare_reversed_range_is_empty() {
        let (range, _, _) = prepare(&config("10.0.0.9", "10.0.0.1", "80")).unwrap();
        assert!(range.is_empty());
    }

    #[tokio::test]
    async fn test_loopback_scan() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let guard_port = listener.local_addr().unwrap().port();

        let ports = format!("7000,8000,{}", guard_port);
        let (range, plan, options) = prepare(&config("127.0.0.1", "127.0.0.3", &ports)).unwrap();
        let local = LocalEndpoint::new("lo", Ipv4Addr::LOCALHOST);
        let injector = Arc::new(CountingInjector::default());

        let report = execute(range, plan, local, options, injector.clone()).await.unwrap();

        // Only 127.0.0.1 has the listener; the other loopback addresses refuse.
        assert_eq!(report.found, vec![Ipv4Addr::LOCALHOST]);
        assert_eq!(report.probed, 3);
        assert_eq!(report.not_found, 2);
        assert_eq!(injector.opened.load(Ordering::SeqCst), 3);
        assert_eq!(injector.frames.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_guard_only_plan_skips_injection() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let guard_port = listener.local_addr().unwrap().port();

        let (range, plan, options) =
            prepare(&config("127.0.0.1", "127.0.0.1", &guard_port.to_string())).unwrap();
        let injector = Arc::new(CountingInjector::default());

        let report = execute(
            range,
            plan,
            LocalEndpoint::new("lo", Ipv4Addr::LOCALHOST),
            options,
            injector.clone(),
        )
        .await
        .unwrap();

        assert_eq!(report.found, vec![Ipv4Addr::LOCALHOST]);
        assert_eq!(injector.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_denied_injection_does_not_abort_scan() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let guard_port = listener.local_addr().unwrap().port();

        let ports = format!("7000,{}", guard_port);
        let (range, plan, options) = prepare(&config("127.0.0.1", "127.0.0.3", &ports)).unwrap();

        let report = execute(
            range,
            plan,
            LocalEndpoint::new("lo", Ipv4Addr::LOCALHOST),
            options,
            Arc::new(DeniedInjector),
        )
        .await
        .unwrap();

        // The listener is up, but no host got its knock.
        assert!(report.found.is_empty());
        assert_eq!(report.probed, 3);
        assert_eq!(report.failed, report.probed);
    }
}
