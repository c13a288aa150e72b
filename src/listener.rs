//! Capture loop wiring a frame source to the extractor and a reporter.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::capture::FrameSource;
use crate::domain::{BindingEvent, ExtractionOutcome};
use crate::error::LearnerError;
use crate::extractor::BindingExtractor;
use crate::learner::{AddressTable, Applied};
use crate::reporter::BindingReporter;

/// Per-run frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub frames: u64,
    pub bindings: u64,
    pub not_binding: u64,
    pub malformed: u64,
}

/// Feeds captured frames through the extractor in capture order.
///
/// Every binding goes to the reporter; when a table is attached it is
/// also applied there.
pub struct BindingListener {
    source: Box<dyn FrameSource>,
    reporter: Box<dyn BindingReporter>,
    extractor: BindingExtractor,
    table: Option<Arc<Mutex<AddressTable>>>,
}

impl BindingListener {
    pub fn new(source: Box<dyn FrameSource>, reporter: Box<dyn BindingReporter>) -> Self {
        Self {
            source,
            reporter,
            extractor: BindingExtractor::new(),
            table: None,
        }
    }

    /// Apply bindings to a shared address table.
    pub fn with_table(mut self, table: Arc<Mutex<AddressTable>>) -> Self {
        self.table = Some(table);
        self
    }

    /// Share a running flag with the source; clearing it ends `run`.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.source.set_running(running);
        self
    }

    pub fn interface_name(&self) -> &str {
        self.source.interface_name()
    }

    /// Run until the source reports end of capture.
    pub fn run(&mut self) -> Result<ListenerStats, LearnerError> {
        let interface = self.source.interface_name().to_string();
        let mut stats = ListenerStats::default();

        let frames = self.source.frames()?;
        self.reporter.on_start(&interface);
        tracing::info!(interface = %interface, "listening for address claims");

        let mut failure = None;

        for frame in frames {
            stats.frames += 1;

            match self.extractor.extract(&frame) {
                ExtractionOutcome::Binding(binding) => {
                    stats.bindings += 1;
                    tracing::debug!(mac = %binding.hardware, ip = %binding.address, "got mac/ip pair");

                    if let Some(table) = &self.table {
                        let Ok(mut table) = table.lock() else {
                            failure = Some(LearnerError::Poisoned);
                            break;
                        };
                        if let Applied::Ignored(reason) = table.apply(&binding) {
                            tracing::trace!(mac = %binding.hardware, ?reason, "binding not recorded");
                        }
                    }

                    self.reporter
                        .report(&BindingEvent::new(binding, frame.timestamp));
                }
                ExtractionOutcome::NotABindingEvent => stats.not_binding += 1,
                ExtractionOutcome::Malformed { needed, actual } => {
                    stats.malformed += 1;
                    tracing::trace!(needed, actual, "malformed frame");
                }
            }
        }

        self.reporter.on_stop();

        if let Some(err) = failure {
            tracing::error!(error = %err, "capture aborted");
            return Err(err);
        }

        tracing::info!(
            frames = stats.frames,
            bindings = stats.bindings,
            malformed = stats.malformed,
            "capture ended"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{RawFrame, ReplayCapture};
    use crate::domain::HardwareAddress;
    use crate::learner::TrackingMode;
    use crate::reporter::CollectingReporter;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::Ordering;
    use std::time::{Duration, SystemTime};

    const MAC_A: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x0a];
    const MAC_B: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x0b];

    fn arp_frame(src: [u8; 6], sender_ip: [u8; 4]) -> RawFrame {
        let mut data = vec![0xff; 6];
        data.extend_from_slice(&src);
        data.extend_from_slice(&[0x08, 0x06]);
        data.extend_from_slice(&[0, 1, 0x08, 0x00, 6, 4, 0, 1]);
        data.extend_from_slice(&src);
        data.extend_from_slice(&sender_ip);
        data.extend_from_slice(&[0; 10]);
        RawFrame::new(data)
    }

    fn ipv4_frame(src: [u8; 6]) -> RawFrame {
        let mut data = vec![0xff; 6];
        data.extend_from_slice(&src);
        data.extend_from_slice(&[0x08, 0x00]);
        data.extend_from_slice(&[0x45; 40]);
        RawFrame::new(data)
    }

    fn listener(frames: Vec<RawFrame>, reporter: &CollectingReporter) -> BindingListener {
        BindingListener::new(
            Box::new(ReplayCapture::new("replay0", frames)),
            Box::new(reporter.clone()),
        )
    }

    #[test]
    fn test_counts_every_outcome() {
        let reporter = CollectingReporter::new();
        let frames = vec![
            arp_frame(MAC_A, [10, 0, 0, 1]),
            ipv4_frame(MAC_A),
            RawFrame::new(vec![0u8; 6]),
            arp_frame(MAC_B, [10, 0, 0, 2]),
        ];

        let stats = listener(frames, &reporter).run().unwrap();

        assert_eq!(
            stats,
            ListenerStats {
                frames: 4,
                bindings: 2,
                not_binding: 1,
                malformed: 1,
            }
        );
    }

    #[test]
    fn test_reports_bindings_in_capture_order() {
        let reporter = CollectingReporter::new();
        let frames = vec![arp_frame(MAC_B, [10, 0, 0, 2]), arp_frame(MAC_A, [10, 0, 0, 1])];

        listener(frames, &reporter).run().unwrap();

        let macs: Vec<_> = reporter.events().iter().map(|e| e.binding.hardware).collect();
        assert_eq!(macs, vec![HardwareAddress::new(MAC_B), HardwareAddress::new(MAC_A)]);
    }

    #[test]
    fn test_event_keeps_frame_timestamp() {
        let reporter = CollectingReporter::new();
        let ts = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let frames = vec![arp_frame(MAC_A, [10, 0, 0, 1]).with_timestamp(ts)];

        listener(frames, &reporter).run().unwrap();

        assert_eq!(reporter.events()[0].timestamp, ts);
    }

    #[test]
    fn test_applies_bindings_to_table() {
        let reporter = CollectingReporter::new();
        let mut table = AddressTable::new(TrackingMode::Watched);
        table.track(HardwareAddress::new(MAC_A));
        let table = Arc::new(Mutex::new(table));

        let frames = vec![arp_frame(MAC_A, [10, 0, 0, 1]), arp_frame(MAC_B, [10, 0, 0, 2])];
        listener(frames, &reporter)
            .with_table(Arc::clone(&table))
            .run()
            .unwrap();

        // Reporter still sees untracked claims
        assert_eq!(reporter.len(), 2);

        let table = table.lock().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(&HardwareAddress::new(MAC_A)).unwrap().ipv4,
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
    }

    #[test]
    fn test_cleared_running_flag_stops_immediately() {
        let reporter = CollectingReporter::new();
        let running = Arc::new(AtomicBool::new(false));
        let frames = vec![arp_frame(MAC_A, [10, 0, 0, 1])];

        let stats = listener(frames, &reporter)
            .with_running(Arc::clone(&running))
            .run()
            .unwrap();

        assert_eq!(stats.frames, 0);
        assert!(reporter.is_empty());
        assert!(!running.load(Ordering::SeqCst));
    }

    /// Records whether the listener signalled the end of capture.
    struct StopTracker(Arc<AtomicBool>);

    impl BindingReporter for StopTracker {
        fn report(&self, _event: &BindingEvent) {}
        fn on_start(&self, _interface: &str) {}
        fn on_stop(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_poisoned_table_still_stops_reporter() {
        let table = Arc::new(Mutex::new(AddressTable::new(TrackingMode::All)));
        let poisoner = Arc::clone(&table);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the table");
        })
        .join();
        assert!(table.is_poisoned());

        let stopped = Arc::new(AtomicBool::new(false));
        let frames = vec![arp_frame(MAC_A, [10, 0, 0, 1]), arp_frame(MAC_B, [10, 0, 0, 2])];
        let result = BindingListener::new(
            Box::new(ReplayCapture::new("replay0", frames)),
            Box::new(StopTracker(Arc::clone(&stopped))),
        )
        .with_table(table)
        .run();

        assert!(matches!(result, Err(LearnerError::Poisoned)));
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_reported_address() {
        let reporter = CollectingReporter::new();
        listener(vec![arp_frame(MAC_A, [192, 168, 1, 5])], &reporter)
            .run()
            .unwrap();
        assert_eq!(
            reporter.events()[0].binding.address,
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5))
        );
    }
}
