//! Link-layer address type.

use std::fmt;
use std::str::FromStr;

use macaddr::MacAddr6;

use crate::error::AddressError;

/// A 6-byte Ethernet hardware address.
///
/// Renders as six lower-case hex octets joined by colons
/// (`aa:bb:cc:dd:ee:ff`), regardless of how it was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Read an address from the first six bytes of `bytes`.
    ///
    /// Returns `None` if fewer than six bytes are available.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.get(..6)?.try_into().ok()?;
        Some(Self::new(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn as_mac(&self) -> MacAddr6 {
        let [a, b, c, d, e, f] = self.0;
        MacAddr6::new(a, b, c, d, e, f)
    }
}

impl From<MacAddr6> for HardwareAddress {
    fn from(mac: MacAddr6) -> Self {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(mac.as_bytes());
        Self(octets)
    }
}

impl From<[u8; 6]> for HardwareAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self::new(octets)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.octets();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for HardwareAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<MacAddr6>()
            .map(Self::from)
            .map_err(|_| AddressError::InvalidMac(s.to_string()))
    }
}
