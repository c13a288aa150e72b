//! Frame-to-binding extraction.
//!
//! Recognizes ARP packets and IPv6 Duplicate Address Detection probes in
//! raw Ethernet frames, unwrapping at most one 802.1Q tag.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::packet::ethernet::{EtherType, EtherTypes};

use crate::capture::RawFrame;
use crate::domain::{Binding, ExtractionOutcome, HardwareAddress};

/// Ethernet header: destination (6) + source (6) + type (2)
const ETHERNET_HEADER_LEN: usize = 14;

/// Ethernet header field offsets
mod ethernet {
    pub const SOURCE: usize = 6;
    pub const ETHERTYPE: usize = 12;
}

/// 802.1Q tag inserted before the inner EtherType
const VLAN_TAG_LEN: usize = 4;

/// ARP packet for IPv4 over Ethernet
mod arp {
    pub const PACKET_LEN: usize = 28;
    /// htype (2) + ptype (2) + hlen (1) + plen (1) + oper (2) + sha (6)
    pub const SENDER_PROTO_ADDR: usize = 14;
}

/// IPv6 fixed header
mod ipv6 {
    pub const HEADER_LEN: usize = 40;
    pub const SOURCE: usize = 8;
}

/// ICMPv6 Neighbor Solicitation body
mod neighbor_solicit {
    /// type (1) + code (1) + checksum (2) + reserved (4) + target (16)
    pub const BODY_LEN: usize = 24;
    pub const TARGET: usize = 8;
}

/// Extracts address bindings from captured Ethernet frames.
///
/// Stateless: every call owns its output, so a single extractor can be
/// shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingExtractor;

impl BindingExtractor {
    /// Create a new binding extractor.
    pub fn new() -> Self {
        Self
    }

    /// Inspect a captured frame.
    pub fn extract(&self, frame: &RawFrame) -> ExtractionOutcome {
        self.extract_bytes(frame.bytes())
    }

    /// Inspect raw frame bytes.
    ///
    /// The hardware address of any binding is always the outermost
    /// Ethernet source, never a field from inside the payload.
    pub fn extract_bytes(&self, data: &[u8]) -> ExtractionOutcome {
        if data.len() < ETHERNET_HEADER_LEN {
            return malformed(ETHERNET_HEADER_LEN, data.len());
        }

        let Some(hardware) = HardwareAddress::from_slice(&data[ethernet::SOURCE..]) else {
            return malformed(ETHERNET_HEADER_LEN, data.len());
        };

        // Offset of the (possibly inner) Ethernet header
        let mut cursor = 0;
        let mut ethertype = read_ethertype(data, ethernet::ETHERTYPE);

        if ethertype == Some(EtherTypes::Vlan) {
            cursor = VLAN_TAG_LEN;
            ethertype = read_ethertype(data, cursor + ethernet::ETHERTYPE);
        }

        let Some(ethertype) = ethertype else {
            return malformed(cursor + ETHERNET_HEADER_LEN, data.len());
        };

        let payload = cursor + ETHERNET_HEADER_LEN;

        match ethertype {
            EtherTypes::Arp => extract_arp(data, payload, hardware),
            EtherTypes::Ipv6 => extract_dad(data, payload, hardware),
            _ => ExtractionOutcome::NotABindingEvent,
        }
    }
}

/// ARP request or reply: the sender protocol address is claimed.
///
/// Opcode and the sender hardware address inside the payload are not
/// consulted.
fn extract_arp(data: &[u8], payload: usize, hardware: HardwareAddress) -> ExtractionOutcome {
    let needed = payload + arp::PACKET_LEN;
    if data.len() < needed {
        return malformed(needed, data.len());
    }

    let Some(sender) = read_array::<4>(data, payload + arp::SENDER_PROTO_ADDR) else {
        return malformed(needed, data.len());
    };

    ExtractionOutcome::Binding(Binding::new(hardware, IpAddr::V4(Ipv4Addr::from(sender))))
}

/// IPv6 DAD probe: an unspecified source claims the NS target address.
///
/// The next header is assumed to be a Neighbor Solicitation; neither the
/// next-header field nor the ICMPv6 type is checked.
fn extract_dad(data: &[u8], payload: usize, hardware: HardwareAddress) -> ExtractionOutcome {
    let needed = payload + ipv6::HEADER_LEN + neighbor_solicit::BODY_LEN;
    if data.len() < needed {
        return malformed(needed, data.len());
    }

    let (Some(source), Some(target)) = (
        read_array::<16>(data, payload + ipv6::SOURCE),
        read_array::<16>(data, payload + ipv6::HEADER_LEN + neighbor_solicit::TARGET),
    ) else {
        return malformed(needed, data.len());
    };

    if !Ipv6Addr::from(source).is_unspecified() {
        return ExtractionOutcome::NotABindingEvent;
    }

    ExtractionOutcome::Binding(Binding::new(hardware, IpAddr::V6(Ipv6Addr::from(target))))
}

fn read_ethertype(data: &[u8], offset: usize) -> Option<EtherType> {
    read_array::<2>(data, offset).map(|bytes| EtherType::new(u16::from_be_bytes(bytes)))
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    data.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

fn malformed(needed: usize, actual: usize) -> ExtractionOutcome {
    ExtractionOutcome::Malformed { needed, actual }
}
