//! In-memory frame source for offline replays and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{FrameSource, RawFrame};
use crate::error::CaptureError;

/// Replays a fixed list of frames, then ends the capture.
pub struct ReplayCapture {
    name: String,
    frames: VecDeque<RawFrame>,
    running: Arc<AtomicBool>,
}

impl ReplayCapture {
    pub fn new(name: impl Into<String>, frames: Vec<RawFrame>) -> Self {
        Self {
            name: name.into(),
            frames: frames.into(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Number of frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplayCapture {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError> {
        let running = Arc::clone(&self.running);
        let frames = &mut self.frames;
        Ok(Box::new(std::iter::from_fn(move || {
            if !running.load(Ordering::SeqCst) {
                return None;
            }
            frames.pop_front()
        })))
    }

    fn interface_name(&self) -> &str {
        &self.name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = running;
    }
}
