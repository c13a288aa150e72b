//! Console-based binding reporter.

use std::io::{self, Write};
use std::time::UNIX_EPOCH;

use crate::domain::BindingEvent;
use crate::reporter::BindingReporter;

/// Reports bindings to the console, one line per claim.
pub struct ConsoleReporter {
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable or disable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn format_event(&self, event: &BindingEvent) -> String {
        let binding = &event.binding;
        let mut output = format!(
            "[{}] MAC: {} | IP: {}",
            binding.claim_kind(),
            binding.hardware,
            binding.address
        );

        if self.verbose {
            // Pre-epoch clocks are reported as zero
            let seen = event.timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
            output.push_str(&format!(
                " | Seen: {}.{:03}",
                seen.as_secs(),
                seen.subsec_millis()
            ));
        }

        output
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingReporter for ConsoleReporter {
    fn report(&self, event: &BindingEvent) {
        let output = self.format_event(event);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
    }

    fn on_start(&self, interface: &str) {
        println!("Listening for address claims on interface: {}", interface);
        println!("Press Ctrl+C to stop.\n");
    }

    fn on_stop(&self) {
        println!("\nStopping address listener.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Binding, HardwareAddress};
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    fn event(binding: Binding) -> BindingEvent {
        BindingEvent::new(
            binding,
            Some(UNIX_EPOCH + Duration::from_millis(1_700_000_000_042)),
        )
    }

    fn mac() -> HardwareAddress {
        HardwareAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
    }

    #[test]
    fn test_format_arp_claim() {
        let reporter = ConsoleReporter::new();
        let line = reporter.format_event(&event(Binding::new(mac(), Ipv4Addr::new(192, 168, 1, 5))));
        assert_eq!(line, "[ARP] MAC: 02:00:00:00:00:01 | IP: 192.168.1.5");
    }

    #[test]
    fn test_format_dad_claim() {
        let reporter = ConsoleReporter::new();
        let target: Ipv6Addr = "fe80::1".parse().unwrap();
        let line = reporter.format_event(&event(Binding::new(mac(), target)));
        assert_eq!(line, "[DAD] MAC: 02:00:00:00:00:01 | IP: fe80::1");
    }

    #[test]
    fn test_verbose_adds_timestamp() {
        let reporter = ConsoleReporter::new().with_verbose(true);
        let line = reporter.format_event(&event(Binding::new(mac(), Ipv4Addr::new(10, 0, 0, 1))));
        assert!(line.ends_with(" | Seen: 1700000000.042"), "{line}");
    }
}
