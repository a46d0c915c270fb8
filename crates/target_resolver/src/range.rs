//! Inclusive host range confined to one /24 network.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use tumbler_common::{TumblerError, TumblerResult};

/// Closed interval `[start.d, end.d]` of last octets inside one /24.
///
/// A start octet above the end octet is accepted and yields no hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    network: Ipv4Net,
    first: u8,
    last: u8,
}

impl AddressRange {
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> TumblerResult<Self> {
        let network = Ipv4Net::new(start, 24)
            .map_err(|e| TumblerError::Config(e.to_string()))?
            .trunc();
        if !network.contains(&end) {
            return Err(TumblerError::SubnetMismatch {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            network,
            first: start.octets()[3],
            last: end.octets()[3],
        })
    }

    /// Parse and validate two dotted-quad strings.
    pub fn parse(start: &str, end: &str) -> TumblerResult<Self> {
        let start_ip = parse_ipv4(start)?;
        let end_ip = parse_ipv4(end)?;
        Self::new(start_ip, end_ip)
    }

    /// The shared /24.
    #[inline]
    #[must_use]
    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        if self.first > self.last {
            0
        } else {
            (self.last - self.first) as usize + 1
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Host addresses in ascending order of the last octet.
    pub fn hosts(&self) -> impl ExactSizeIterator<Item = Ipv4Addr> {
        let [a, b, c, _] = self.network.network().octets();
        (self.first..=self.last).map(move |d| Ipv4Addr::new(a, b, c, d))
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> Ipv4Addr {
        self.with_last_octet(self.first)
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> Ipv4Addr {
        self.with_last_octet(self.last)
    }

    fn with_last_octet(&self, d: u8) -> Ipv4Addr {
        let [a, b, c, _] = self.network.network().octets();
        Ipv4Addr::new(a, b, c, d)
    }
}

fn parse_ipv4(s: &str) -> TumblerResult<Ipv4Addr> {
    let t = s.trim();
    t.parse::<Ipv4Addr>()
        .map_err(|_| TumblerError::InvalidAddress(t.to_string()))
}
