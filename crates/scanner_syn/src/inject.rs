//! Link-layer injection handles
//!
//! One handle per in-flight host probe. The handle owns the datalink
//! channel and closes it on drop, so every exit path out of a knock
//! sequence releases it.

use crate::error::SynError;
use pnet::datalink::{self, Channel, DataLinkReceiver, DataLinkSender, NetworkInterface};
use std::io;
use tracing::debug;

/// Exclusive send capability on one interface.
pub trait FrameSink: Send {
    /// Transmit one complete link-layer frame.
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SynError>;
}

/// Opens fresh injection handles.
pub trait Injector: Send + Sync {
    fn open(&self, interface: &str) -> Result<Box<dyn FrameSink>, SynError>;
}

/// `Injector` backed by a pnet datalink channel (AF_PACKET on Linux).
#[derive(Debug, Default, Clone, Copy)]
pub struct DatalinkInjector;

impl DatalinkInjector {
    pub fn new() -> Self {
        Self
    }

    fn find_interface(name: &str) -> Result<NetworkInterface, SynError> {
        datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| SynError::InterfaceNotFound(name.to_string()))
    }
}

impl Injector for DatalinkInjector {
    fn open(&self, interface: &str) -> Result<Box<dyn FrameSink>, SynError> {
        let iface = Self::find_interface(interface)?;

        let (tx, rx) = match datalink::channel(&iface, Default::default()) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err(SynError::UnsupportedChannel(interface.to_string())),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(SynError::NotPermitted(interface.to_string()))
            }
            Err(source) => {
                return Err(SynError::ChannelOpen {
                    interface: interface.to_string(),
                    source,
                })
            }
        };

        debug!("Opened injection handle on {}", interface);
        Ok(Box::new(InjectionHandle {
            interface: interface.to_string(),
            tx,
            _rx: rx,
            frames_sent: 0,
        }))
    }
}

/// Live datalink channel. Dropping it closes the underlying socket.
pub struct InjectionHandle {
    interface: String,
    tx: Box<dyn DataLinkSender>,
    // Never read; held so the channel is torn down together with `tx`.
    _rx: Box<dyn DataLinkReceiver>,
    frames_sent: usize,
}

impl FrameSink for InjectionHandle {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SynError> {
        match self.tx.send_to(frame, None) {
            Some(Ok(())) => {
                self.frames_sent += 1;
                Ok(())
            }
            Some(Err(e)) => Err(SynError::Send(e)),
            None => Err(SynError::Send(io::Error::new(
                io::ErrorKind::Other,
                "datalink sender has no buffer space",
            ))),
        }
    }
}

impl Drop for InjectionHandle {
    fn drop(&mut self) {
        debug!(
            "Closing injection handle on {} after {} frame(s)",
            self.interface, self.frames_sent
        );
    }
}

/// Check that a handle can be opened on `interface` at all.
pub fn is_injection_available(injector: &dyn Injector, interface: &str) -> Result<(), SynError> {
    injector.open(interface).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_interface() {
        let r = DatalinkInjector::new().open("tumbler-no-such-if0");
        assert!(matches!(r, Err(SynError::InterfaceNotFound(_))));
    }

    #[test]
    fn test_availability_check_propagates_error() {
        let r = is_injection_available(&DatalinkInjector, "tumbler-no-such-if0");
        assert!(r.is_err());
    }
}
