//! Core data types for the tumbler knock scanner
//!
//! Everything here is either immutable for the duration of a run
//! (`KnockPlan`, `LocalEndpoint`, `KnockOptions`) or produced once per
//! host and consumed once by the collector (`ScanOutcome`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::{TumblerError, TumblerResult};

/// Ordered knock sequence. The last port is the guard port, every port
/// before it is a knock port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct KnockPlan {
    ports: Vec<u16>,
}

impl KnockPlan {
    /// Build a plan from an ordered port list. Order and duplicates are kept.
    pub fn new(ports: Vec<u16>) -> TumblerResult<Self> {
        if ports.is_empty() {
            return Err(TumblerError::EmptyPortList);
        }
        if let Some(pos) = ports.iter().position(|&p| p == 0) {
            return Err(TumblerError::InvalidPort(format!(
                "port 0 at position {} is out of range (1-65535)",
                pos + 1
            )));
        }
        Ok(Self { ports })
    }

    /// Ports that receive a raw SYN, in send order.
    #[inline]
    #[must_use]
    pub fn knock_ports(&self) -> &[u16] {
        &self.ports[..self.ports.len() - 1]
    }

    /// Port checked with a full TCP handshake after the knock.
    #[inline]
    #[must_use]
    pub fn guard_port(&self) -> u16 {
        self.ports[self.ports.len() - 1]
    }

    #[inline]
    #[must_use]
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Always false; a plan holds at least the guard port.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl TryFrom<Vec<u16>> for KnockPlan {
    type Error = TumblerError;

    fn try_from(ports: Vec<u16>) -> TumblerResult<Self> {
        Self::new(ports)
    }
}

impl From<KnockPlan> for Vec<u16> {
    fn from(plan: KnockPlan) -> Self {
        plan.ports
    }
}

impl fmt::Display for KnockPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, port) in self.ports.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", port)?;
        }
        Ok(())
    }
}

/// Local side of every probe, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEndpoint {
    pub interface: String,
    pub ip: Ipv4Addr,
    /// Hardware address of the interface, when it has one.
    pub mac: Option<[u8; 6]>,
}

impl LocalEndpoint {
    #[inline]
    #[must_use]
    pub fn new(interface: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            interface: interface.into(),
            ip,
            mac: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_mac(mut self, mac: [u8; 6]) -> Self {
        self.mac = Some(mac);
        self
    }
}

impl fmt::Display for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.interface, self.ip)
    }
}

/// How a single host probe ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Guard port accepted a connection after the knock.
    Found,
    /// Knock sent, guard port refused or timed out.
    NotFound,
    /// The probe could not run to completion.
    Failed(String),
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Found => f.write_str("found"),
            ProbeStatus::NotFound => f.write_str("not found"),
            ProbeStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Result of probing one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub host: Ipv4Addr,
    #[serde(flatten)]
    pub status: ProbeStatus,
}

impl ScanOutcome {
    #[inline]
    #[must_use]
    pub fn found(host: Ipv4Addr) -> Self {
        Self { host, status: ProbeStatus::Found }
    }

    #[inline]
    #[must_use]
    pub fn not_found(host: Ipv4Addr) -> Self {
        Self { host, status: ProbeStatus::NotFound }
    }

    #[inline]
    #[must_use]
    pub fn failed(host: Ipv4Addr, reason: impl Into<String>) -> Self {
        Self {
            host,
            status: ProbeStatus::Failed(reason.into()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self.status, ProbeStatus::Found)
    }

    #[inline]
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, ProbeStatus::Failed(_))
    }
}

/// Knock timing and fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockOptions {
    /// Pause after each knock frame.
    pub knock_delay: Duration,
    /// Upper bound on the guard port connect.
    pub guard_timeout: Duration,
    /// Maximum number of hosts probed at the same time.
    pub max_concurrency: usize,
    /// Ethernet destination for knock frames.
    pub dest_mac: [u8; 6],
}

impl Default for KnockOptions {
    fn default() -> Self {
        Self {
            knock_delay: Duration::from_millis(100),
            guard_timeout: Duration::from_secs(1),
            max_concurrency: 256,
            dest_mac: [0xff; 6],
        }
    }
}

impl KnockOptions {
    #[inline]
    #[must_use]
    pub fn with_knock_delay(mut self, delay: Duration) -> Self {
        self.knock_delay = delay;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_guard_timeout(mut self, timeout: Duration) -> Self {
        self.guard_timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_dest_mac(mut self, mac: [u8; 6]) -> Self {
        self.dest_mac = mac;
        self
    }

    /// Reject settings that would stall the scan.
    pub fn validate(&self) -> TumblerResult<()> {
        if self.max_concurrency == 0 {
            return Err(TumblerError::Config("concurrency must be at least 1".into()));
        }
        if self.guard_timeout.is_zero() {
            return Err(TumblerError::Config("guard timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Final, deterministic summary of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Hosts whose guard port opened, ascending.
    pub found: Vec<Ipv4Addr>,
    pub probed: usize,
    pub not_found: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl ScanReport {
    #[inline]
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    #[inline]
    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knock_plan_splits_guard() {
        let plan = KnockPlan::new(vec![7000, 8000, 9000]).unwrap();
        assert_eq!(plan.knock_ports(), &[7000, 8000]);
        assert_eq!(plan.guard_port(), 9000);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.to_string(), "7000,8000,9000");
    }

    #[test]
    fn single_port_plan_has_no_knocks() {
        let plan = KnockPlan::new(vec![22]).unwrap();
        assert!(plan.knock_ports().is_empty());
        assert_eq!(plan.guard_port(), 22);
    }

    #[test]
    fn knock_plan_keeps_order_and_duplicates() {
        let plan = KnockPlan::new(vec![3000, 13, 3000, 1337]).unwrap();
        assert_eq!(plan.knock_ports(), &[3000, 13, 3000]);
    }

    #[test]
    fn knock_plan_rejects_empty_and_zero() {
        assert!(matches!(KnockPlan::new(vec![]), Err(TumblerError::EmptyPortList)));
        assert!(matches!(
            KnockPlan::new(vec![80, 0, 443]),
            Err(TumblerError::InvalidPort(_))
        ));
    }

    #[test]
    fn outcome_predicates() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        assert!(ScanOutcome::found(ip).is_found());
        assert!(!ScanOutcome::not_found(ip).is_found());
        let failed = ScanOutcome::failed(ip, "write failed");
        assert!(failed.is_failed());
        assert!(!failed.is_found());
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = ScanOutcome::failed(Ipv4Addr::new(10, 0, 0, 1), "no handle");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["host"], "10.0.0.1");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "no handle");
    }

    #[test]
    fn options_defaults_and_validation() {
        let opts = KnockOptions::default();
        assert_eq!(opts.knock_delay, Duration::from_millis(100));
        assert_eq!(opts.guard_timeout, Duration::from_secs(1));
        assert_eq!(opts.dest_mac, [0xff; 6]);
        assert!(opts.validate().is_ok());

        assert!(KnockOptions::default().with_max_concurrency(0).validate().is_err());
        assert!(KnockOptions::default()
            .with_guard_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn knock_plan_deserialize_is_validated() {
        let plan: KnockPlan = serde_json::from_str("[7000,8000,9000]").unwrap();
        assert_eq!(plan.guard_port(), 9000);
        assert!(serde_json::from_str::<KnockPlan>("[]").is_err());
        assert!(serde_json::from_str::<KnockPlan>("[80,0]").is_err());
    }
}
