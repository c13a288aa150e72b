//! Error types for the IP/MAC learner.
//!
//! Frame extraction never fails with an error: frames that cannot be read
//! are reported as `ExtractionOutcome::Malformed`. The types here cover the
//! collaborators around the extractor.

use thiserror::Error;

/// Errors raised while opening or reading a capture device.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Failed to create capture channel: {0}")]
    ChannelCreation(String),

    #[error("Insufficient permissions to capture packets (try running as root)")]
    InsufficientPermissions,
}

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors raised when parsing textual addresses.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid MAC address format: {0}")]
    InvalidMac(String),
}

/// Errors raised by the background learner.
#[derive(Error, Debug)]
pub enum LearnerError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Failed to spawn learner thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Address table lock poisoned")]
    Poisoned,

    #[error("Learner worker thread panicked")]
    WorkerPanicked,
}
