// crates/scanner_tcp/src/guard.rs
//! Guard port check: a plain TCP connect bounded by a timeout

use anyhow::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{instrument, trace};

use tumbler_common::GuardProbe;

/// Completes a real handshake with the guard port. No retries: a refused
/// or timed out connect is a negative result.
pub struct TcpGuard {
    timeout: Duration,
}

impl TcpGuard {
    /// Create a guard with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip(self))]
    async fn try_connect(&self, addr: SocketAddr) -> Result<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused => {
                    Err(anyhow::Error::from(e).context("Connection refused"))
                }
                _ => Err(anyhow::Error::from(e)),
            },
            Err(_) => Err(anyhow::anyhow!("Connection timeout after {:?}", self.timeout)),
        }
    }
}

impl Default for TcpGuard {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl GuardProbe for TcpGuard {
    async fn is_open(&self, addr: SocketAddrV4) -> bool {
        match self.try_connect(SocketAddr::V4(addr)).await {
            // Dropping the stream closes the connection right away.
            Ok(_stream) => true,
            Err(e) => {
                trace!("Guard {} unreachable: {:#}", addr, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    fn v4(addr: SocketAddr) -> SocketAddrV4 {
        match addr {
            SocketAddr::V4(a) => a,
            SocketAddr::V6(_) => panic!("expected IPv4"),
        }
    }

    #[tokio::test]
    async fn test_open_port() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = v4(listener.local_addr().unwrap());

        let guard = TcpGuard::new();
        assert!(guard.is_open(addr).await);
    }

    #[tokio::test]
    async fn test_closed_port() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = v4(listener.local_addr().unwrap());
        drop(listener);

        let guard = TcpGuard::new().with_timeout(Duration::from_millis(500));
        assert!(!guard.is_open(addr).await);
    }

    #[tokio::test]
    async fn test_timeout_is_negative() {
        // TEST-NET-1 is never routed; either the timeout fires or the
        // connect fails outright.
        let guard = TcpGuard::new().with_timeout(Duration::from_millis(50));
        let addr = SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, 1), 9);
        assert!(!guard.is_open(addr).await);
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(TcpGuard::default().timeout, Duration::from_secs(1));
    }
}
