//! Address table keyed by hardware address.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::domain::{Binding, HardwareAddress};

/// Which hardware addresses the table records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// Only addresses registered with `track`
    #[default]
    Watched,
    /// Every hardware address seen
    All,
}

/// Network addresses last claimed by a hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KnownAddresses {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl KnownAddresses {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }
}

/// Why a binding did not change the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The hardware address is not being tracked
    Untracked,
    /// A link-local claim never replaces a known IPv6 address
    LinkLocalOverExisting,
}

/// Effect of applying a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Unchanged,
    Ignored(IgnoreReason),
}

#[derive(Debug, Default)]
pub struct AddressTable {
    mode: TrackingMode,
    entries: HashMap<HardwareAddress, KnownAddresses>,
}

impl AddressTable {
    pub fn new(mode: TrackingMode) -> Self {
        Self {
            mode,
            entries: HashMap::new(),
        }
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Start tracking a hardware address with no known addresses.
    ///
    /// Tracking an address again clears whatever it had learned.
    pub fn track(&mut self, mac: HardwareAddress) {
        self.entries.insert(mac, KnownAddresses::default());
    }

    /// Stop tracking a hardware address, forgetting its addresses.
    pub fn untrack(&mut self, mac: &HardwareAddress) -> bool {
        self.entries.remove(mac).is_some()
    }

    /// Forget every tracked hardware address.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn lookup(&self, mac: &HardwareAddress) -> Option<KnownAddresses> {
        self.entries.get(mac).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by hardware address.
    pub fn snapshot(&self) -> Vec<(HardwareAddress, KnownAddresses)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(mac, ips)| (*mac, *ips)).collect();
        entries.sort_by_key(|(mac, _)| *mac);
        entries
    }

    /// Record a binding.
    pub fn apply(&mut self, binding: &Binding) -> Applied {
        let known = match self.mode {
            TrackingMode::All => self.entries.entry(binding.hardware).or_default(),
            TrackingMode::Watched => match self.entries.get_mut(&binding.hardware) {
                Some(known) => known,
                None => return Applied::Ignored(IgnoreReason::Untracked),
            },
        };

        match binding.address {
            IpAddr::V4(ip) => replace(&mut known.ipv4, ip),
            IpAddr::V6(ip) => {
                if known.ipv6.is_some() && is_link_local(&ip) {
                    return Applied::Ignored(IgnoreReason::LinkLocalOverExisting);
                }
                replace(&mut known.ipv6, ip)
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> Applied {
    if slot.as_ref() == Some(&value) {
        return Applied::Unchanged;
    }
    *slot = Some(value);
    Applied::Updated
}

/// Addresses whose text form starts with `fe80`.
fn is_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] == 0xfe80
}
