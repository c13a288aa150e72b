//! Reporting module for binding events.
//!
//! This module defines the `BindingReporter` trait and provides
//! implementations for different sinks.

mod collecting_reporter;
mod console_reporter;

pub use collecting_reporter::CollectingReporter;
pub use console_reporter::ConsoleReporter;

use crate::domain::BindingEvent;

/// Trait for binding sinks.
///
/// Reporters receive bindings in the order frames were extracted. They
/// only handle output, not filtering or deduplication.
pub trait BindingReporter: Send {
    /// Report a binding event.
    fn report(&self, event: &BindingEvent);

    /// Called when the listener starts.
    fn on_start(&self, interface: &str);

    /// Called when the listener stops.
    fn on_stop(&self);
}
