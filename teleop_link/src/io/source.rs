//! Polled input sources.
//!
//! The physical controller is external; these sources feed recorded or
//! scripted samples through the same contract.

use std::collections::VecDeque;
use std::io::BufRead;

use teleop_common::link::error::InputError;
use teleop_common::link::types::InputSample;

/// Source of one [`InputSample`] per control cycle.
pub trait InputSource {
    /// Return the current controller state.
    ///
    /// # Errors
    /// Any [`InputError`]. The control loop keeps using the last good
    /// sample, so a source that stays broken ends in the watchdog DEAD
    /// state.
    fn poll(&mut self) -> Result<InputSample, InputError>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn poll(&mut self) -> Result<InputSample, InputError> {
        (**self).poll()
    }
}

/// Samples as JSON lines: `{"axes":[0.0,-0.5],"buttons":[false,true]}`.
///
/// One line is consumed per poll. Blank lines are skipped. At end of
/// input the last sample repeats forever, which a live link reads as a
/// frozen controller.
#[derive(Debug)]
pub struct ReplaySource<R> {
    reader: R,
    line: String,
    line_no: usize,
    last: Option<InputSample>,
    finished: bool,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            last: None,
            finished: false,
        }
    }

    /// Whether the underlying reader hit end of input.
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Load the next non-blank line into `self.line`. `false` at end of input.
    fn next_line(&mut self) -> Result<bool, InputError> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|_| InputError::Disconnected)?;
            if read == 0 {
                return Ok(false);
            }
            self.line_no += 1;
            if !self.line.trim().is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> InputSource for ReplaySource<R> {
    fn poll(&mut self) -> Result<InputSample, InputError> {
        if !self.finished {
            if self.next_line()? {
                let line_no = self.line_no;
                let sample = serde_json::from_str::<InputSample>(self.line.trim())
                    .map_err(|e| InputError::Malformed(format!("line {line_no}: {e}")))?;
                self.last = Some(sample.clone());
                return Ok(sample);
            }
            self.finished = true;
        }
        self.last.clone().ok_or(InputError::Exhausted)
    }
}

/// Fixed list of samples, one per poll, then `Exhausted`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    samples: VecDeque<Result<InputSample, InputError>>,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = InputSample>) -> Self {
        Self {
            samples: samples.into_iter().map(Ok).collect(),
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: InputSample) {
        self.samples.push_back(Ok(sample));
    }

    /// Append a failed poll.
    pub fn push_error(&mut self, error: InputError) {
        self.samples.push_back(Err(error));
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self) -> Result<InputSample, InputError> {
        self.samples.pop_front().unwrap_or(Err(InputError::Exhausted))
    }
}
