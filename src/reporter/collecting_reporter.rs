//! In-memory binding reporter.

use std::sync::{Arc, Mutex};

use crate::domain::BindingEvent;
use crate::reporter::BindingReporter;

/// Keeps every reported event in a shared list.
///
/// Clones share the same list, so a clone can be handed to a listener
/// while the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    events: Arc<Mutex<Vec<BindingEvent>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events reported so far.
    pub fn events(&self) -> Vec<BindingEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BindingReporter for CollectingReporter {
    fn report(&self, event: &BindingEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }

    fn on_start(&self, interface: &str) {
        tracing::debug!(interface, "collecting bindings");
    }

    fn on_stop(&self) {}
}
