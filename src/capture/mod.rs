//! Frame capture abstraction.
//!
//! This module defines the `FrameSource` trait and provides a pnet-based
//! live implementation plus an in-memory replay source. The extractor only
//! ever sees `RawFrame` values, so sources can be swapped freely.

mod pnet_capture;
mod replay;

pub use pnet_capture::PnetCapture;
pub use replay::ReplayCapture;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::CaptureError;

/// A raw link-layer frame as captured from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// The captured bytes
    pub data: Vec<u8>,
    /// Number of bytes actually captured
    pub captured_len: usize,
    /// Wall-clock capture time, if the source supplies one
    pub timestamp: Option<SystemTime>,
}

impl RawFrame {
    /// Create a frame from captured bytes, without a timestamp.
    pub fn new(data: Vec<u8>) -> Self {
        let captured_len = data.len();
        Self {
            data,
            captured_len,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The bytes available for inspection.
    pub fn bytes(&self) -> &[u8] {
        let len = self.captured_len.min(self.data.len());
        &self.data[..len]
    }
}

/// Trait for frame sources.
///
/// Implementations own the capture handle and any upstream filtering.
/// The iterator returned by `frames` ending means end of capture.
pub trait FrameSource: Send {
    /// Start capturing and return an iterator over raw frames.
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError>;

    /// Get the name of the interface being captured.
    fn interface_name(&self) -> &str;

    /// Set the running flag for graceful shutdown.
    /// When set to false, the frame iterator should stop.
    fn set_running(&mut self, running: Arc<AtomicBool>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_captures_everything() {
        let frame = RawFrame::new(vec![1, 2, 3, 4]);
        assert_eq!(frame.captured_len, 4);
        assert_eq!(frame.bytes(), &[1, 2, 3, 4]);
        assert!(frame.timestamp.is_none());
    }

    #[test]
    fn test_bytes_respects_captured_len() {
        let mut frame = RawFrame::new(vec![1, 2, 3, 4]);
        frame.captured_len = 2;
        assert_eq!(frame.bytes(), &[1, 2]);
    }

    #[test]
    fn test_bytes_never_exceeds_data() {
        let mut frame = RawFrame::new(vec![1, 2]);
        frame.captured_len = 64;
        assert_eq!(frame.bytes(), &[1, 2]);
    }
}
