//! SYN packet building with hand-rolled headers
//!
//! - Caller-provided buffers (no per-packet allocations)
//! - IPv4 header checksum and TCP pseudo-header checksum computed inline
//! - Ethernet II framing for link-layer injection

use crate::error::SynError;
use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::util::MacAddr;
use std::net::Ipv4Addr;

/// TCP flag constants
pub mod tcp_flags {
    pub const SYN: u8 = 0x02;
    pub const ACK: u8 = 0x10;
}

/// Advertised window on every knock segment.
pub const TCP_WINDOW: u16 = 14600;

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const IPV4_HEADER_LEN: usize = 20;
pub const TCP_HEADER_LEN: usize = 20;
/// IPv4 + TCP, no options.
pub const SYN_PACKET_LEN: usize = IPV4_HEADER_LEN + TCP_HEADER_LEN;
/// Ethernet + IPv4 + TCP.
pub const KNOCK_FRAME_LEN: usize = ETHERNET_HEADER_LEN + SYN_PACKET_LEN;

const IP_PROTO_TCP: u8 = 6;
const IP_FLAG_DF: u16 = 0x4000;
const DEFAULT_TTL: u8 = 64;

/// Everything that varies between knock segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketDescriptor {
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub flags: u8,
    pub seq: u32,
    pub window: u16,
}

impl PacketDescriptor {
    /// SYN-only segment with the fixed knock window.
    #[inline]
    #[must_use]
    pub fn syn(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, src_port: u16, dst_port: u16, seq: u32) -> Self {
        Self {
            src_ip,
            dst_ip,
            src_port,
            dst_port,
            flags: tcp_flags::SYN,
            seq,
            window: TCP_WINDOW,
        }
    }
}

/// Build an IPv4 + TCP SYN datagram into `buf`.
/// Returns the number of bytes written (always `SYN_PACKET_LEN`).
pub fn build_syn_packet(buf: &mut [u8], desc: &PacketDescriptor) -> Result<usize, SynError> {
    if buf.len() < SYN_PACKET_LEN {
        return Err(SynError::Serialization(format!(
            "buffer of {} bytes cannot hold a {} byte SYN datagram",
            buf.len(),
            SYN_PACKET_LEN
        )));
    }
    let buf = &mut buf[..SYN_PACKET_LEN];

    // IPv4 Header (20 bytes)
    buf[0] = 0x45; // Version 4, IHL 5
    buf[1] = 0x00; // DSCP/ECN
    buf[2..4].copy_from_slice(&(SYN_PACKET_LEN as u16).to_be_bytes()); // Total length
    buf[4..6].copy_from_slice(&[0, 0]); // ID, atomic datagram
    buf[6..8].copy_from_slice(&IP_FLAG_DF.to_be_bytes());
    buf[8] = DEFAULT_TTL;
    buf[9] = IP_PROTO_TCP;
    buf[10..12].copy_from_slice(&[0, 0]); // Checksum placeholder
    buf[12..16].copy_from_slice(&desc.src_ip.octets());
    buf[16..20].copy_from_slice(&desc.dst_ip.octets());

    let ip_checksum = checksum(&buf[..IPV4_HEADER_LEN]);
    buf[10..12].copy_from_slice(&ip_checksum.to_be_bytes());

    // TCP Header (20 bytes)
    buf[20..22].copy_from_slice(&desc.src_port.to_be_bytes());
    buf[22..24].copy_from_slice(&desc.dst_port.to_be_bytes());
    buf[24..28].copy_from_slice(&desc.seq.to_be_bytes());
    buf[28..32].copy_from_slice(&0u32.to_be_bytes()); // ACK = 0
    buf[32] = ((TCP_HEADER_LEN / 4) as u8) << 4; // Data offset
    buf[33] = desc.flags;
    buf[34..36].copy_from_slice(&desc.window.to_be_bytes());
    buf[36..38].copy_from_slice(&[0, 0]); // Checksum placeholder
    buf[38..40].copy_from_slice(&[0, 0]); // Urgent pointer

    let tcp_checksum = tcp_checksum_v4(&desc.src_ip, &desc.dst_ip, &buf[IPV4_HEADER_LEN..]);
    buf[36..38].copy_from_slice(&tcp_checksum.to_be_bytes());

    Ok(SYN_PACKET_LEN)
}

/// Build an Ethernet II frame carrying the SYN datagram for `desc`.
pub fn build_knock_frame(
    buf: &mut [u8],
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    desc: &PacketDescriptor,
) -> Result<usize, SynError> {
    if buf.len() < KNOCK_FRAME_LEN {
        return Err(SynError::Serialization(format!(
            "buffer of {} bytes cannot hold a {} byte knock frame",
            buf.len(),
            KNOCK_FRAME_LEN
        )));
    }

    {
        let mut eth = MutableEthernetPacket::new(&mut buf[..ETHERNET_HEADER_LEN])
            .ok_or_else(|| SynError::Serialization("ethernet header".to_string()))?;
        eth.set_destination(to_mac(dst_mac));
        eth.set_source(to_mac(src_mac));
        eth.set_ethertype(EtherTypes::Ipv4);
    }

    let ip_len = build_syn_packet(&mut buf[ETHERNET_HEADER_LEN..], desc)?;
    Ok(ETHERNET_HEADER_LEN + ip_len)
}

/// True when the IPv4 header at the start of `packet` carries a valid checksum.
pub fn verify_ipv4_checksum(packet: &[u8]) -> bool {
    if packet.len() < IPV4_HEADER_LEN {
        return false;
    }
    let ihl = (packet[0] & 0x0f) as usize * 4;
    if ihl < IPV4_HEADER_LEN || packet.len() < ihl {
        return false;
    }
    checksum(&packet[..ihl]) == 0
}

/// True when the TCP segment inside the IPv4 datagram `packet` carries a
/// valid pseudo-header checksum.
pub fn verify_tcp_checksum(packet: &[u8]) -> bool {
    if packet.len() < SYN_PACKET_LEN || packet[9] != IP_PROTO_TCP {
        return false;
    }
    let ihl = (packet[0] & 0x0f) as usize * 4;
    let total = u16::from_be_bytes([packet[2], packet[3]]) as usize;
    if ihl < IPV4_HEADER_LEN || total < ihl + TCP_HEADER_LEN || packet.len() < total {
        return false;
    }
    let src = Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]);
    let dst = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
    tcp_checksum_v4(&src, &dst, &packet[ihl..total]) == 0
}

#[inline]
fn to_mac(octets: [u8; 6]) -> MacAddr {
    let [a, b, c, d, e, f] = octets;
    MacAddr::new(a, b, c, d, e, f)
}

#[inline]
fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !sum as u16
}

#[inline]
fn sum_words(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut i = 0;

    while i + 1 < data.len() {
        sum += u16::from_be_bytes([data[i], data[i + 1]]) as u32;
        i += 2;
    }

    if i < data.len() {
        sum += (data[i] as u32) << 8;
    }

    sum
}

/// Internet checksum (RFC 1071)
#[inline(always)]
fn checksum(data: &[u8]) -> u16 {
    fold(sum_words(data))
}

/// TCP checksum with IPv4 pseudo-header
#[inline(always)]
fn tcp_checksum_v4(src: &Ipv4Addr, dst: &Ipv4Addr, tcp_data: &[u8]) -> u16 {
    let mut sum = sum_words(&src.octets());
    sum += sum_words(&dst.octets());
    sum += IP_PROTO_TCP as u32;
    sum += tcp_data.len() as u32;
    sum += sum_words(tcp_data);
    fold(sum)
}
