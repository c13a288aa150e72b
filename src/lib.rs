//! ipmac - passive IP/MAC learner.
//!
//! Watches ARP traffic and IPv6 Duplicate Address Detection probes on an
//! interface and infers which hardware address claims which network
//! address, without sending anything.
//!
//! The pipeline is `capture` → `extractor` → `reporter`, with an optional
//! `learner` table keyed by hardware address.

pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod learner;
pub mod listener;
pub mod reporter;

pub use capture::{FrameSource, PnetCapture, RawFrame, ReplayCapture};
pub use config::Config;
pub use domain::{Binding, BindingEvent, ClaimKind, ExtractionOutcome, HardwareAddress};
pub use error::{AddressError, CaptureError, ConfigError, LearnerError};
pub use extractor::BindingExtractor;
pub use learner::{AddressTable, IpMacLearner, KnownAddresses, TrackingMode};
pub use listener::{BindingListener, ListenerStats};
pub use reporter::{BindingReporter, CollectingReporter, ConsoleReporter};
