//! Local interface lookup.

use pnet_datalink::{MacAddr, NetworkInterface};
use std::net::IpAddr;
use tracing::debug;
use tumbler_common::{LocalEndpoint, TumblerError, TumblerResult};

/// Name, hardware address and assigned IPs of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddrs {
    pub name: String,
    pub mac: Option<[u8; 6]>,
    pub ips: Vec<IpAddr>,
}

impl From<&NetworkInterface> for InterfaceAddrs {
    fn from(iface: &NetworkInterface) -> Self {
        Self {
            name: iface.name.clone(),
            mac: iface.mac.filter(|m| !m.is_zero()).map(mac_octets),
            ips: iface.ips.iter().map(|net| net.ip()).collect(),
        }
    }
}

fn mac_octets(mac: MacAddr) -> [u8; 6] {
    let MacAddr(a, b, c, d, e, f) = mac;
    [a, b, c, d, e, f]
}

/// Resolve `interface` against the system interface table.
pub fn resolve_local_endpoint(interface: &str) -> TumblerResult<LocalEndpoint> {
    let candidates: Vec<InterfaceAddrs> = pnet_datalink::interfaces()
        .iter()
        .map(InterfaceAddrs::from)
        .collect();
    pick_local_endpoint(interface, &candidates)
}

/// First non-loopback IPv4 address of the named interface.
pub fn pick_local_endpoint(
    interface: &str,
    candidates: &[InterfaceAddrs],
) -> TumblerResult<LocalEndpoint> {
    let iface = candidates
        .iter()
        .find(|c| c.name == interface)
        .ok_or_else(|| TumblerError::Interface(format!("interface {} not found", interface)))?;

    let ip = iface
        .ips
        .iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(*v4),
            _ => None,
        })
        .ok_or_else(|| TumblerError::NoLocalAddress(interface.to_string()))?;

    debug!("Resolved {} -> {} (mac: {:?})", interface, ip, iface.mac);

    let endpoint = LocalEndpoint::new(interface, ip);
    Ok(match iface.mac {
        Some(mac) => endpoint.with_mac(mac),
        None => endpoint,
    })
}
