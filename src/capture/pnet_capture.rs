//! pnet-based live frame capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pnet::datalink::{self, Channel, Config, NetworkInterface};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};

use super::{FrameSource, RawFrame};
use crate::error::CaptureError;

/// Read timeout so the running flag is polled regularly.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Receive errors in a row (timeouts excluded) before the capture ends.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Frame capture using the pnet library.
pub struct PnetCapture {
    interface: NetworkInterface,
    prefilter: bool,
    running: Arc<AtomicBool>,
}

impl PnetCapture {
    /// Create a new capture on the specified interface.
    pub fn new(interface_name: &str) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface_name.to_string()))?;

        Ok(Self::from_interface(interface))
    }

    /// Create a capture on the first suitable interface.
    ///
    /// Looks for an interface that is up and not a loopback.
    pub fn on_default_interface() -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
            .ok_or_else(|| {
                CaptureError::InterfaceNotFound("no suitable interface found".to_string())
            })?;

        Ok(Self::from_interface(interface))
    }

    fn from_interface(interface: NetworkInterface) -> Self {
        Self {
            interface,
            prefilter: true,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Enable or disable the EtherType pre-filter.
    ///
    /// With the filter on, only ARP, IPv6 and 802.1Q tagged frames (and
    /// frames too short to carry an EtherType) are handed out.
    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let mac = iface
                    .mac
                    .map(|mac| mac.to_string())
                    .unwrap_or_else(|| "no MAC".to_string());
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "{}: {} {} [{}]",
                    iface.name,
                    status,
                    mac,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }
}

impl FrameSource for PnetCapture {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError> {
        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            promiscuous: true,
            ..Config::default()
        };

        let (_tx, rx) = match datalink::channel(&self.interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("permission") || msg.contains("Operation not permitted") {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        tracing::debug!(
            interface = %self.interface.name,
            prefilter = self.prefilter,
            "capture channel open"
        );

        Ok(Box::new(FrameIterator::new(rx, self.prefilter, Arc::clone(&self.running))))
    }

    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = running;
    }
}

/// Iterator that yields frames from the network until stopped.
///
/// Ends early once the receiver fails `MAX_CONSECUTIVE_ERRORS` times in a
/// row, e.g. when the interface goes away.
struct FrameIterator {
    rx: Box<dyn datalink::DataLinkReceiver>,
    prefilter: bool,
    running: Arc<AtomicBool>,
    errors: u32,
}

impl FrameIterator {
    fn new(
        rx: Box<dyn datalink::DataLinkReceiver>,
        prefilter: bool,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            rx,
            prefilter,
            running,
            errors: 0,
        }
    }
}

impl Iterator for FrameIterator {
    type Item = RawFrame;

    fn next(&mut self) -> Option<Self::Item> {
        while self.running.load(Ordering::SeqCst) {
            match self.rx.next() {
                Ok(packet) => {
                    self.errors = 0;
                    if self.prefilter && !is_candidate_frame(packet) {
                        continue;
                    }
                    return Some(RawFrame::new(packet.to_vec()).with_timestamp(SystemTime::now()));
                }
                Err(e) => {
                    // Timeout is expected, continue
                    if e.kind() == std::io::ErrorKind::TimedOut {
                        continue;
                    }
                    self.errors += 1;
                    tracing::warn!(error = %e, attempt = self.errors, "capture receive failed");
                    if self.errors >= MAX_CONSECUTIVE_ERRORS {
                        tracing::error!("too many capture errors, stopping");
                        return None;
                    }
                }
            }
        }
        None
    }
}

/// Cheap stand-in for `arp or (icmp6 and ip6[40] == 135)`.
fn is_candidate_frame(data: &[u8]) -> bool {
    let Some(ethernet) = EthernetPacket::new(data) else {
        // Let the extractor classify runt frames
        return true;
    };

    matches!(
        ethernet.get_ethertype(),
        EtherTypes::Arp | EtherTypes::Ipv6 | EtherTypes::Vlan
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_ethertype(ethertype: u16) -> Vec<u8> {
        let mut frame = vec![0u8; 60];
        frame[12..14].copy_from_slice(&ethertype.to_be_bytes());
        frame
    }

    #[test]
    fn test_prefilter_accepts_claim_protocols() {
        assert!(is_candidate_frame(&frame_with_ethertype(0x0806)));
        assert!(is_candidate_frame(&frame_with_ethertype(0x86dd)));
        assert!(is_candidate_frame(&frame_with_ethertype(0x8100)));
    }

    #[test]
    fn test_prefilter_rejects_ipv4() {
        assert!(!is_candidate_frame(&frame_with_ethertype(0x0800)));
    }

    #[test]
    fn test_prefilter_passes_runt_frames() {
        assert!(is_candidate_frame(&[0u8; 5]));
    }

    mod frame_iterator_tests {
        use super::*;
        use std::collections::VecDeque;
        use std::io;

        /// Receiver that plays back a fixed script, then fails forever.
        struct ScriptedReceiver {
            script: VecDeque<io::Result<Vec<u8>>>,
            current: Vec<u8>,
            calls: Arc<std::sync::atomic::AtomicUsize>,
        }

        impl ScriptedReceiver {
            fn new(script: Vec<io::Result<Vec<u8>>>) -> Self {
                Self {
                    script: script.into(),
                    current: Vec::new(),
                    calls: Arc::default(),
                }
            }
        }

        impl datalink::DataLinkReceiver for ScriptedReceiver {
            fn next(&mut self) -> io::Result<&[u8]> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match self.script.pop_front() {
                    Some(Ok(frame)) => {
                        self.current = frame;
                        Ok(&self.current)
                    }
                    Some(Err(e)) => Err(e),
                    None => Err(io::Error::new(io::ErrorKind::NotConnected, "interface gone")),
                }
            }
        }

        fn iterator(rx: ScriptedReceiver) -> FrameIterator {
            FrameIterator::new(Box::new(rx), true, Arc::new(AtomicBool::new(true)))
        }

        #[test]
        fn test_timeouts_are_not_errors() {
            let rx = ScriptedReceiver::new(vec![
                Err(io::Error::from(io::ErrorKind::TimedOut)),
                Err(io::Error::from(io::ErrorKind::TimedOut)),
                Ok(frame_with_ethertype(0x0806)),
            ]);
            let mut frames = iterator(rx);
            assert!(frames.next().is_some());
            assert_eq!(frames.errors, 0);
        }

        #[test]
        fn test_repeated_errors_end_capture() {
            let rx = ScriptedReceiver::new(Vec::new());
            let calls = Arc::clone(&rx.calls);
            let mut frames = iterator(rx);

            assert!(frames.next().is_none());
            assert_eq!(calls.load(Ordering::SeqCst), MAX_CONSECUTIVE_ERRORS as usize);
        }

        #[test]
        fn test_frame_resets_error_count() {
            let mut script: Vec<_> = (0..MAX_CONSECUTIVE_ERRORS - 1)
                .map(|_| Err(io::Error::from(io::ErrorKind::Interrupted)))
                .collect();
            script.push(Ok(frame_with_ethertype(0x86dd)));
            let mut frames = iterator(ScriptedReceiver::new(script));

            assert!(frames.next().is_some());
            assert_eq!(frames.errors, 0);
            assert!(frames.next().is_none());
        }

        #[test]
        fn test_prefiltered_frames_are_skipped() {
            let rx = ScriptedReceiver::new(vec![
                Ok(frame_with_ethertype(0x0800)),
                Ok(frame_with_ethertype(0x0806)),
            ]);
            let frame = iterator(rx).next().unwrap();
            assert_eq!(&frame.bytes()[12..14], &[0x08, 0x06]);
        }
    }
}
