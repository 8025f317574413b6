//! Outbound byte sinks.
//!
//! A sink receives whole frames. Each call writes one frame as a single
//! uninterrupted sequence; there is no acknowledgment channel.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use teleop_common::link::config::SerialConfig;
use teleop_common::link::error::LinkError;

/// Write timeout of the serial port.
const SERIAL_WRITE_TIMEOUT: Duration = Duration::from_millis(50);

/// Single-writer frame sink.
pub trait ByteSink {
    /// Write one complete frame.
    ///
    /// # Errors
    /// `LinkError::Write` or `LinkError::Closed`. The caller retries on a
    /// later cycle.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError>;
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        (**self).write_frame(frame)
    }
}

/// Serial port sink.
pub struct SerialSink {
    device: String,
    port: Box<dyn serialport::SerialPort>,
}

impl SerialSink {
    /// Open the configured device.
    ///
    /// # Errors
    /// `LinkError::Open` when the port cannot be opened or configured.
    pub fn open(config: &SerialConfig) -> Result<Self, LinkError> {
        let port = serialport::new(config.device.as_str(), config.baud_rate)
            .timeout(SERIAL_WRITE_TIMEOUT)
            .open()
            .map_err(|e| LinkError::Open {
                device: config.device.clone(),
                reason: e.to_string(),
            })?;
        info!(device = %config.device, baud = config.baud_rate, "serial link open");
        Ok(Self {
            device: config.device.clone(),
            port,
        })
    }
}

impl std::fmt::Debug for SerialSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSink")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl ByteSink for SerialSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.port
            .write_all(frame)
            .and_then(|()| self.port.flush())
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
                    LinkError::Closed
                }
                _ => LinkError::Write(e.to_string()),
            })
    }
}

/// In-memory sink recording every frame.
///
/// Used by tests and by `--dry-run`, where frames are logged and counted
/// instead of written to a port.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<Vec<u8>>,
    bytes: usize,
    fail_next: usize,
    dry_run: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that logs each frame at debug level and keeps only counts.
    pub fn logging() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Fail the next `count` writes with `LinkError::Write`.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes
    }
}

impl ByteSink for MemorySink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(LinkError::Write("injected failure".to_string()));
        }
        self.bytes += frame.len();
        if self.dry_run {
            debug!(frame = ?frame, "dry-run frame");
        } else {
            self.frames.push(frame.to_vec());
        }
        Ok(())
    }
}
