//! IP/MAC learning.
//!
//! Keeps the latest network addresses claimed by each hardware address,
//! fed by a background listener.

mod ip_mac_learner;
mod table;

pub use ip_mac_learner::IpMacLearner;
pub use table::{AddressTable, Applied, IgnoreReason, KnownAddresses, TrackingMode};
