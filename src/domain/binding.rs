//! Address bindings and extraction outcomes.

use std::fmt;
use std::net::IpAddr;

use super::HardwareAddress;

/// How a binding was announced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// ARP sender protocol address (request or reply)
    Arp,
    /// IPv6 Duplicate Address Detection probe target
    Dad,
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arp => write!(f, "ARP"),
            Self::Dad => write!(f, "DAD"),
        }
    }
}

/// A hardware address asserting ownership of exactly one network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub hardware: HardwareAddress,
    pub address: IpAddr,
}

impl Binding {
    pub fn new(hardware: HardwareAddress, address: impl Into<IpAddr>) -> Self {
        Self {
            hardware,
            address: address.into(),
        }
    }

    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// IPv4 claims only come from ARP, IPv6 claims only from DAD probes.
    pub fn claim_kind(&self) -> ClaimKind {
        match self.address {
            IpAddr::V4(_) => ClaimKind::Arp,
            IpAddr::V6(_) => ClaimKind::Dad,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} claims {}", self.hardware, self.address)
    }
}

/// Result of inspecting a single captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The frame asserts a binding.
    Binding(Binding),
    /// The frame is readable but is not an address claim.
    NotABindingEvent,
    /// The frame is too short for the fields its protocol branch requires.
    Malformed { needed: usize, actual: usize },
}

impl ExtractionOutcome {
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            Self::Binding(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
