//! Per-host knock sequencer
//!
//! Sends the knock ports of a plan as raw SYN frames, strictly in plan
//! order and paced by a fixed delay, then checks the guard port with a
//! real TCP handshake.

use crate::error::SynError;
use crate::inject::{FrameSink, Injector};
use crate::packet::{build_knock_frame, PacketDescriptor, KNOCK_FRAME_LEN};
use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tumbler_common::{GuardProbe, HostProbe, KnockOptions, KnockPlan, LocalEndpoint, ScanOutcome};

/// Lowest ephemeral source port (inclusive).
pub const EPHEMERAL_PORT_MIN: u16 = 1024;
/// Highest ephemeral source port (exclusive).
pub const EPHEMERAL_PORT_MAX: u16 = 65535;

/// Source port and initial sequence number shared by every frame sent to
/// one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnockSession {
    pub src_port: u16,
    pub seq: u32,
}

impl KnockSession {
    /// Draw both values from the OS CSPRNG.
    pub fn random() -> Self {
        let mut rng = OsRng;
        Self {
            src_port: rng.gen_range(EPHEMERAL_PORT_MIN..EPHEMERAL_PORT_MAX),
            seq: rng.next_u32(),
        }
    }
}

pub struct KnockSequencer {
    plan: KnockPlan,
    local: LocalEndpoint,
    options: KnockOptions,
    injector: Arc<dyn Injector>,
    guard: Arc<dyn GuardProbe>,
}

impl KnockSequencer {
    pub fn new(
        plan: KnockPlan,
        local: LocalEndpoint,
        injector: Arc<dyn Injector>,
        guard: Arc<dyn GuardProbe>,
    ) -> Self {
        Self {
            plan,
            local,
            options: KnockOptions::default(),
            injector,
            guard,
        }
    }

    pub fn with_options(mut self, options: KnockOptions) -> Self {
        self.options = options;
        self
    }

    /// Knock on `target` and report whether its guard port opened.
    pub async fn knock(&self, target: Ipv4Addr) -> ScanOutcome {
        let session = KnockSession::random();

        if let Err(e) = self.send_knocks(target, session).await {
            warn!("Knock sequence to {} aborted: {}", target, e);
            return ScanOutcome::failed(target, e.to_string());
        }

        let guard_addr = SocketAddrV4::new(target, self.plan.guard_port());
        if self.guard.is_open(guard_addr).await {
            info!("Guard port open after knock: {}", guard_addr);
            ScanOutcome::found(target)
        } else {
            debug!("Guard port closed: {}", guard_addr);
            ScanOutcome::not_found(target)
        }
    }

    /// Transmit every knock port once, in plan order. The injection handle
    /// lives only for the duration of this call.
    async fn send_knocks(&self, target: Ipv4Addr, session: KnockSession) -> Result<usize, SynError> {
        let knock_ports = self.plan.knock_ports();
        if knock_ports.is_empty() {
            return Ok(0);
        }

        let mut handle = self.open_handle().await?;
        let src_mac = self.local.mac.unwrap_or([0; 6]);
        let mut frame = [0u8; KNOCK_FRAME_LEN];

        for &port in knock_ports {
            let desc = PacketDescriptor::syn(self.local.ip, target, session.src_port, port, session.seq);
            let len = build_knock_frame(&mut frame, src_mac, self.options.dest_mac, &desc)?;
            handle.send_frame(&frame[..len])?;
            debug!(
                "SYN {}:{} -> {}:{} seq={}",
                self.local.ip, session.src_port, target, port, session.seq
            );
            tokio::time::sleep(self.options.knock_delay).await;
        }

        Ok(knock_ports.len())
    }

    /// Interface lookup and socket setup block, so they run on the
    /// blocking pool instead of a runtime worker.
    async fn open_handle(&self) -> Result<Box<dyn FrameSink>, SynError> {
        let injector = self.injector.clone();
        let interface = self.local.interface.clone();
        tokio::task::spawn_blocking(move || injector.open(&interface))
            .await
            .map_err(|e| SynError::HandleTask(e.to_string()))?
    }
}

#[async_trait]
impl HostProbe for KnockSequencer {
    async fn probe(&self, host: Ipv4Addr) -> ScanOutcome {
        self.knock(host).await
    }

    fn name(&self) -> &str {
        "knock"
    }

    fn requires_root(&self) -> bool {
        !self.plan.knock_ports().is_empty()
    }
}
