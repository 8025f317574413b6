//! Transmission scheduling.
//!
//! Once per cycle, in priority order:
//!
//! 1. Stop request: one neutral frame, then the loop ends.
//! 2. Link DEAD: neutral burst on the first DEAD cycle and again each
//!    time the quiet interval elapses. Repeats are abandoned.
//! 3. Forced repeat running: the last frame again, byte for byte.
//! 4. Queued event (mode edge, reset, gains): its signal frame, which
//!    then repeats until it has gone out `resend_count` times.
//! 5. Ordinary frame when any value changed or the quiet interval elapsed.
//!
//! [`TransmissionScheduler::decide`] only plans. The caller reports a
//! successful write through [`TransmissionScheduler::record_sent`]; a
//! failed write leaves the state untouched so the next cycle retries.

use std::time::{Duration, Instant};

use heapless::Deque;
use tracing::warn;

use teleop_common::link::config::TimingConfig;
use teleop_common::link::profile::DriveChannels;
use teleop_common::link::types::{ReservedBand, ReservedSignal};

use crate::control::shaper::DriveCommand;
use crate::protocol::framer::CommandSet;
use crate::safety::watchdog::LinkStatus;

/// Capacity of the pending event queue.
pub const EVENT_QUEUE_LEN: usize = 4;

/// Why a frame is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Values changed.
    Ordinary,
    /// Nothing changed but the quiet interval elapsed.
    KeepAlive,
    /// First transmission of a signal frame.
    Event(ReservedSignal),
    /// Forced resend of the previous frame.
    Repeat,
    /// Neutral burst while the link is DEAD.
    DeadBurst,
    /// Final neutral frame before shutdown.
    Stop,
}

/// A frame to write this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub set: CommandSet,
    pub kind: FrameKind,
    /// Back-to-back copies to write.
    pub copies: u8,
}

impl Plan {
    #[inline]
    pub const fn new(set: CommandSet, kind: FrameKind, copies: u8) -> Self {
        Self { set, kind, copies }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to send.
    Idle,
    Send(Plan),
    /// Send and terminate.
    Stop(Plan),
}

/// Everything the scheduler looks at in one cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleView<'a> {
    pub now: Instant,
    pub link: LinkStatus,
    pub stop: bool,
    /// Ordinary command set computed this cycle (ignored while DEAD).
    pub ordinary: CommandSet,
    /// Current drive values, carried by event frames.
    pub drive: DriveCommand,
    /// Events raised this cycle, highest priority first.
    pub events: &'a [ReservedSignal],
}

#[derive(Debug)]
pub struct TransmissionScheduler {
    band: ReservedBand,
    channels: DriveChannels,
    max_quiet: Duration,
    resend_count: u8,
    dead_repeat_count: u8,

    last_sent: Option<CommandSet>,
    last_sent_at: Option<Instant>,
    repeats_remaining: u8,
    pending: Deque<ReservedSignal, EVENT_QUEUE_LEN>,
    dead: bool,
    dead_burst_sent: bool,
    dropped_events: u64,
}

impl TransmissionScheduler {
    pub fn new(timing: &TimingConfig, band: ReservedBand, channels: DriveChannels) -> Self {
        Self {
            band,
            channels,
            max_quiet: timing.max_quiet(),
            resend_count: timing.resend_count,
            dead_repeat_count: timing.dead_repeat_count,
            last_sent: None,
            last_sent_at: None,
            repeats_remaining: 0,
            pending: Deque::new(),
            dead: false,
            dead_burst_sent: false,
            dropped_events: 0,
        }
    }

    #[inline]
    pub const fn repeats_remaining(&self) -> u8 {
        self.repeats_remaining
    }

    #[inline]
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub const fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Neutral command set for this drive layout.
    #[inline]
    pub const fn neutral(&self) -> CommandSet {
        CommandSet::neutral(self.channels)
    }

    /// Plan this cycle's transmission.
    pub fn decide(&mut self, view: &CycleView<'_>) -> Decision {
        if view.stop {
            return Decision::Stop(Plan::new(self.neutral(), FrameKind::Stop, 1));
        }

        for &event in view.events {
            self.enqueue(event);
        }

        match view.link {
            LinkStatus::Dead => return self.decide_dead(view.now),
            LinkStatus::Alive => self.dead = false,
        }

        if let Some(last) = self.last_sent.filter(|_| self.repeats_remaining > 0) {
            return Decision::Send(Plan::new(last, FrameKind::Repeat, 1));
        }

        if let Some(&signal) = self.pending.front() {
            let set = CommandSet::signal(view.drive, signal, &self.band);
            return Decision::Send(Plan::new(set, FrameKind::Event(signal), 1));
        }

        let changed = self.last_sent != Some(view.ordinary);
        if changed {
            Decision::Send(Plan::new(view.ordinary, FrameKind::Ordinary, 1))
        } else if self.quiet_elapsed(view.now) {
            Decision::Send(Plan::new(view.ordinary, FrameKind::KeepAlive, 1))
        } else {
            Decision::Idle
        }
    }

    /// Commit a plan after the sink accepted it.
    pub fn record_sent(&mut self, plan: &Plan, now: Instant) {
        self.last_sent = Some(plan.set);
        self.last_sent_at = Some(now);
        match plan.kind {
            FrameKind::Repeat => {
                self.repeats_remaining = self.repeats_remaining.saturating_sub(1);
            }
            FrameKind::Event(_) => {
                self.pending.pop_front();
                self.repeats_remaining = self.resend_count.saturating_sub(1);
            }
            FrameKind::DeadBurst => self.dead_burst_sent = true,
            FrameKind::Ordinary | FrameKind::KeepAlive | FrameKind::Stop => {}
        }
    }

    fn decide_dead(&mut self, now: Instant) -> Decision {
        if !self.dead {
            self.dead = true;
            self.dead_burst_sent = false;
            self.repeats_remaining = 0;
        }
        if !self.dead_burst_sent || self.quiet_elapsed(now) {
            Decision::Send(Plan::new(
                self.neutral(),
                FrameKind::DeadBurst,
                self.dead_repeat_count,
            ))
        } else {
            Decision::Idle
        }
    }

    fn enqueue(&mut self, event: ReservedSignal) {
        if self.pending.push_back(event).is_err() {
            self.dropped_events += 1;
            warn!(
                ?event,
                dropped = self.dropped_events,
                "event queue full, event dropped"
            );
        }
    }

    fn quiet_elapsed(&self, now: Instant) -> bool {
        self.last_sent_at
            .is_none_or(|at| now.saturating_duration_since(at) >= self.max_quiet)
    }
}
