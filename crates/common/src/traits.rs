//! Core traits for tumbler components
//!
//! `HostProbe` is what the orchestrator fans out over an address range;
//! `GuardProbe` is the final handshake check the knock sequencer runs.

use crate::types::ScanOutcome;
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Probe a single host end to end.
///
/// Implementations never fail the whole scan: anything that goes wrong
/// for one host is reported through `ProbeStatus::Failed`.
#[async_trait]
pub trait HostProbe: Send + Sync {
    async fn probe(&self, host: Ipv4Addr) -> ScanOutcome;

    /// Probe name/identifier
    fn name(&self) -> &str;

    /// Whether this probe requires root/CAP_NET_RAW
    fn requires_root(&self) -> bool {
        false
    }
}

/// Check whether a TCP service accepts connections.
#[async_trait]
pub trait GuardProbe: Send + Sync {
    /// True when a full handshake with `addr` succeeds.
    async fn is_open(&self, addr: SocketAddrV4) -> bool;
}
