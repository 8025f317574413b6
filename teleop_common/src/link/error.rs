//! Error types for the byte sink and the input source seams.

use thiserror::Error;

/// Failure of the outbound byte sink (LinkWriteFailure).
///
/// Never fatal to the control loop: a missed frame is superseded by the
/// next one, so the loop logs the error and retries on a later cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Opening or configuring the sink failed.
    #[error("failed to open link {device}: {reason}")]
    Open { device: String, reason: String },

    /// Writing a frame failed or was short.
    #[error("link write failed: {0}")]
    Write(String),

    /// The sink has been closed.
    #[error("link closed")]
    Closed,
}

/// Failure of the polled input source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The controller is gone.
    #[error("input source disconnected")]
    Disconnected,

    /// A sample could not be decoded or does not fit the sample buffers.
    #[error("malformed input sample: {0}")]
    Malformed(String),

    /// A finite source has no more samples.
    #[error("input source exhausted")]
    Exhausted,
}
