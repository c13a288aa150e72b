//! Domain events for address-claim monitoring.

use std::time::SystemTime;

use super::Binding;

/// A binding observed on the network at a point in time.
///
/// This is the primary event handed to reporters.
#[derive(Debug, Clone)]
pub struct BindingEvent {
    /// Capture timestamp of the frame, or the extraction time if the
    /// frame source did not supply one
    pub timestamp: SystemTime,
    /// The inferred binding
    pub binding: Binding,
}

impl BindingEvent {
    pub fn new(binding: Binding, timestamp: Option<SystemTime>) -> Self {
        Self {
            timestamp: timestamp.unwrap_or_else(SystemTime::now),
            binding,
        }
    }
}
