//! Domain models for passive IP/MAC learning.
//!
//! These types describe what a captured frame asserts, independent of
//! how frames are captured or how bindings are reported.

mod address;
mod binding;
mod events;

pub use address::HardwareAddress;
pub use binding::{Binding, ClaimKind, ExtractionOutcome};
pub use events::BindingEvent;
