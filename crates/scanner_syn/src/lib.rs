//! Raw SYN knock sender
//!
//! This crate builds and injects the knock half of a port-knocking probe.
//!
//! Key pieces:
//! - Hand-built IPv4/TCP SYN datagrams with Ethernet framing (`packet`)
//! - One exclusively owned datalink handle per host probe (`inject`)
//! - Ordered, paced knock sequence followed by a guard check (`knock`)

pub mod error;
pub mod inject;
pub mod knock;
pub mod packet;

pub use error::SynError;
pub use inject::{DatalinkInjector, FrameSink, InjectionHandle, Injector};
pub use knock::{KnockSequencer, KnockSession};

// Re-export commonly used types
pub use packet::{build_knock_frame, build_syn_packet, tcp_flags, PacketDescriptor};

/// Initialize the knock subsystem
///
/// Call once at startup, before any host is probed, to verify that raw
/// injection works on `interface`.
pub fn init(interface: &str) -> Result<(), SynError> {
    if let Err(e) = inject::is_injection_available(&DatalinkInjector, interface) {
        tracing::warn!("Raw packet injection unavailable on {}: {}", interface, e);
        tracing::warn!("  Run with sudo or grant CAP_NET_RAW: sudo setcap cap_net_raw+ep /path/to/binary");
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_unknown_interface() {
        assert!(matches!(
            init("tumbler-no-such-if0"),
            Err(SynError::InterfaceNotFound(_))
        ));
    }
}
