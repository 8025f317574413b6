//! Link watchdog: detects a frozen input source.
//!
//! A live operator produces at least sensor noise; a controller that
//! stopped reporting repeats the same sample forever. If no axis or
//! button changes within the dead interval, the link is DEAD and the
//! caller must send neutral instead of shaping stale input.
//!
//! Axes compare bitwise so a NaN reading equals itself.

use std::time::{Duration, Instant};

use teleop_common::link::types::InputSample;

/// Watchdog verdict for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Alive,
    Dead,
}

/// Result of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub status: LinkStatus,
    /// Status differs from the previous observation.
    pub edge: bool,
}

#[derive(Debug, Clone)]
pub struct LinkWatchdog {
    dead_interval: Duration,
    last_sample: InputSample,
    last_change: Instant,
    status: LinkStatus,
}

impl LinkWatchdog {
    /// Start watching at `now`. The first sample always counts as a change.
    pub fn new(dead_interval: Duration, now: Instant) -> Self {
        Self {
            dead_interval,
            last_sample: InputSample::default(),
            last_change: now,
            status: LinkStatus::Alive,
        }
    }

    #[inline]
    pub const fn status(&self) -> LinkStatus {
        self.status
    }

    #[inline]
    pub const fn last_change(&self) -> Instant {
        self.last_change
    }

    /// Compare `sample` with the last one seen and update the verdict.
    pub fn observe(&mut self, sample: &InputSample, now: Instant) -> Observation {
        if differs(&self.last_sample, sample) {
            self.last_sample.clone_from(sample);
            self.last_change = now;
        }

        let quiet = now.saturating_duration_since(self.last_change);
        let status = if quiet >= self.dead_interval {
            LinkStatus::Dead
        } else {
            LinkStatus::Alive
        };
        let edge = status != self.status;
        self.status = status;
        Observation { status, edge }
    }
}

fn differs(a: &InputSample, b: &InputSample) -> bool {
    a.axes.len() != b.axes.len()
        || a.buttons.len() != b.buttons.len()
        || a
            .axes
            .iter()
            .zip(b.axes.iter())
            .any(|(x, y)| x.to_bits() != y.to_bits())
        || a.buttons.iter().zip(b.buttons.iter()).any(|(x, y)| x != y)
}
