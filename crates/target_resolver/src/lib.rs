//! Target Resolver - /24 range expansion, knock port parsing and local
//! interface lookup
//!
//! Turns the raw operator input into the validated pieces a scan needs:
//! - start/end IPv4 pair: "192.168.1.10" .. "192.168.1.20" (same /24)
//! - ordered knock list: "7000,8000,9000" (last entry is the guard port)
//! - interface name: "eth0" -> first non-loopback IPv4 address + MAC
//!
//! Every failure here is a configuration error and is raised before any
//! packet is sent.

mod local;
mod ports;
mod range;

pub use local::{pick_local_endpoint, resolve_local_endpoint, InterfaceAddrs};
pub use ports::parse_ports;
pub use range::AddressRange;

use tumbler_common::{KnockPlan, LocalEndpoint, TumblerResult};

pub struct TargetResolver;

impl TargetResolver {
    pub fn new() -> Self { Self }

    /// Validate a start/end pair into an `AddressRange`.
    pub fn resolve_range(start: &str, end: &str) -> TumblerResult<AddressRange> {
        AddressRange::parse(start, end)
    }

    /// Parse a comma-separated port list into a `KnockPlan`.
    pub fn resolve_plan(ports: &str) -> TumblerResult<KnockPlan> {
        parse_ports(ports)
    }

    /// Look up the local IPv4 endpoint for `interface`.
    pub fn resolve_local(interface: &str) -> TumblerResult<LocalEndpoint> {
        resolve_local_endpoint(interface)
    }
}

impl Default for TargetResolver { fn default() -> Self { Self::new() } }
