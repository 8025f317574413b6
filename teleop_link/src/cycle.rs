//! Fixed-period control cycle: read → process → write.
//!
//! One cycle polls the input source, runs the watchdog, shapes the
//! drive and arm commands, lets the scheduler pick at most one frame and
//! writes it. Write failures are counted and retried on a later cycle;
//! only an encoding failure ends the loop with an error.
//!
//! When the loop ends (stop request, cycle limit or interrupt) a final
//! neutral frame is written so the receiver does not keep the last
//! motion command.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use heapless::Vec;
use thiserror::Error;
use tracing::{debug, info, warn};

use teleop_common::link::config::LinkConfig;
use teleop_common::link::profile::DriveConfig;
use teleop_common::link::types::{InputSample, ReservedBand, ReservedSignal};

use crate::command::input::{ControllerDecoder, OperatorRequests};
use crate::command::scheduler::{CycleView, Decision, Plan, TransmissionScheduler};
use crate::control::shaper::{DriveCommand, mix_arcade};
use crate::io::sink::ByteSink;
use crate::io::source::InputSource;
use crate::protocol::framer::{CommandSet, FrameError, ProtocolFramer};
use crate::safety::watchdog::{LinkStatus, LinkWatchdog};
use crate::state::arm::ArmModeStateMachine;

/// Events one cycle can raise: mode edge, reset, gains.
const MAX_CYCLE_EVENTS: usize = 3;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-run counters. Updated every cycle with no allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Frames accepted by the sink, burst copies included.
    pub frames_sent: u64,
    /// Bytes accepted by the sink.
    pub bytes_sent: u64,
    /// Failed sink writes.
    pub write_failures: u64,
    /// Failed input polls.
    pub input_errors: u64,
    /// Cycles spent with the link DEAD.
    pub dead_cycles: u64,
    /// Cycles that took longer than the configured period.
    pub overruns: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            frames_sent: 0,
            bytes_sent: 0,
            write_failures: 0,
            input_errors: 0,
            dead_cycles: 0,
            overruns: 0,
            last_cycle_ns: 0,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
        }
    }

    /// Record a cycle duration.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        self.sum_cycle_ns.checked_div(self.cycle_count).unwrap_or(0)
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("frame encoding failed: {0}")]
    Frame(#[from] FrameError),
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    /// The operator requested a stop; the neutral frame has been handed
    /// to the sink.
    Stopped,
}

/// Why [`ControlLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    StopRequested,
    Interrupted,
    CycleLimit,
}

// ─── Control Loop ───────────────────────────────────────────────────

/// Owns every per-link component and the two I/O endpoints.
pub struct ControlLoop<S, K> {
    source: S,
    sink: K,
    drive: DriveConfig,
    band: ReservedBand,
    cycle_period: Duration,
    decoder: ControllerDecoder,
    arm: ArmModeStateMachine,
    watchdog: LinkWatchdog,
    scheduler: TransmissionScheduler,
    framer: ProtocolFramer,
    last_sample: InputSample,
    input_failing: bool,
    stats: CycleStats,
}

impl<S: InputSource, K: ByteSink> ControlLoop<S, K> {
    /// Build the loop from a validated configuration. The watchdog starts
    /// counting at `now`.
    pub fn new(config: &LinkConfig, source: S, sink: K, now: Instant) -> Self {
        let band = config.protocol;
        Self {
            source,
            sink,
            drive: config.drive,
            band,
            cycle_period: config.timing.cycle_period(),
            decoder: ControllerDecoder::new(config.mapping, config.arm),
            arm: ArmModeStateMachine::new(config.arm.presets),
            watchdog: LinkWatchdog::new(config.timing.dead_interval(), now),
            scheduler: TransmissionScheduler::new(&config.timing, band, config.drive.channels),
            framer: ProtocolFramer::new(band, config.gains.clone()),
            last_sample: InputSample::default(),
            input_failing: false,
            stats: CycleStats::new(),
        }
    }

    pub const fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub const fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub const fn arm(&self) -> &ArmModeStateMachine {
        &self.arm
    }

    pub const fn link_status(&self) -> LinkStatus {
        self.watchdog.status()
    }

    pub const fn scheduler(&self) -> &TransmissionScheduler {
        &self.scheduler
    }

    /// Execute one cycle at `now`.
    ///
    /// # Errors
    /// `CycleError::Frame` when a command set cannot be encoded.
    pub fn step(&mut self, now: Instant) -> Result<CycleOutcome, CycleError> {
        // ═══ READ ═══
        self.read_input();

        let observation = self.watchdog.observe(&self.last_sample, now);
        if observation.edge {
            match observation.status {
                LinkStatus::Dead => {
                    warn!("input frozen, link DEAD; sending neutral");
                    self.arm.force_manual();
                }
                LinkStatus::Alive => info!("input moving again, link ALIVE"),
            }
        }

        // ═══ PROCESS ═══
        let decoded = self.decoder.decode(&self.last_sample);
        let stop = decoded.requests.contains(OperatorRequests::STOP);
        let mut events: Vec<ReservedSignal, MAX_CYCLE_EVENTS> = Vec::new();

        let (drive, ordinary) = match observation.status {
            LinkStatus::Alive => {
                let drive = mix_arcade(&decoded.drive, &self.drive);
                let arm = self.arm.step(&decoded.arm);
                if arm.transitioned {
                    info!(mode = ?arm.mode, "arm mode changed");
                    queue_event(&mut events, ReservedSignal::entering(arm.mode));
                }
                if decoded.requests.contains(OperatorRequests::RESET_POSITION) {
                    info!("arm position reset requested");
                    queue_event(&mut events, ReservedSignal::ResetPosition);
                }
                if decoded.requests.contains(OperatorRequests::SEND_GAINS) {
                    info!("gain update requested");
                    queue_event(&mut events, ReservedSignal::SetGains);
                }
                (drive, CommandSet::ordinary(drive, arm.command, &self.band))
            }
            LinkStatus::Dead => {
                self.stats.dead_cycles += 1;
                let neutral = self.scheduler.neutral();
                (DriveCommand::neutral(self.drive.channels), neutral)
            }
        };

        let view = CycleView {
            now,
            link: observation.status,
            stop,
            ordinary,
            drive,
            events: &events,
        };

        // ═══ WRITE ═══
        match self.scheduler.decide(&view) {
            Decision::Idle => Ok(CycleOutcome::Continue),
            Decision::Send(plan) => {
                self.transmit(&plan, now)?;
                Ok(CycleOutcome::Continue)
            }
            Decision::Stop(plan) => {
                info!("stop requested by operator");
                self.transmit(&plan, now)?;
                Ok(CycleOutcome::Stopped)
            }
        }
    }

    /// Run cycles until a stop request, `max_cycles`, or `running` going
    /// false, then write a final neutral frame.
    ///
    /// # Errors
    /// See [`ControlLoop::step`].
    pub fn run(
        &mut self,
        running: &AtomicBool,
        max_cycles: Option<u64>,
    ) -> Result<RunEnd, CycleError> {
        info!(period_ms = self.cycle_period.as_millis() as u64, "control loop started");

        let end = loop {
            if !running.load(Ordering::SeqCst) {
                break RunEnd::Interrupted;
            }
            if max_cycles.is_some_and(|max| self.stats.cycle_count >= max) {
                break RunEnd::CycleLimit;
            }

            let cycle_start = Instant::now();
            let outcome = self.step(cycle_start)?;
            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed.as_nanos() as u64);

            if outcome == CycleOutcome::Stopped {
                break RunEnd::StopRequested;
            }

            match self.cycle_period.checked_sub(elapsed) {
                Some(remaining) => std::thread::sleep(remaining),
                None => {
                    self.stats.overruns += 1;
                    debug!(elapsed_us = elapsed.as_micros() as u64, "cycle overrun");
                }
            }
        };

        if end != RunEnd::StopRequested {
            self.send_neutral()?;
        }
        info!(
            ?end,
            cycles = self.stats.cycle_count,
            frames = self.stats.frames_sent,
            bytes = self.stats.bytes_sent,
            write_failures = self.stats.write_failures,
            input_errors = self.stats.input_errors,
            dead_cycles = self.stats.dead_cycles,
            dropped_events = self.scheduler.dropped_events(),
            avg_cycle_us = self.stats.avg_cycle_ns() / 1000,
            "control loop finished"
        );
        Ok(end)
    }

    /// Write one neutral frame, outside of the scheduler.
    ///
    /// # Errors
    /// See [`ControlLoop::step`]. A sink failure is logged, not returned.
    pub fn send_neutral(&mut self) -> Result<(), CycleError> {
        let frame = self.framer.encode(&self.scheduler.neutral())?;
        match self.sink.write_frame(frame.as_bytes()) {
            Ok(()) => {
                self.stats.frames_sent += 1;
                self.stats.bytes_sent += frame.len() as u64;
                info!("neutral frame sent");
            }
            Err(e) => {
                self.stats.write_failures += 1;
                warn!(error = %e, "final neutral frame could not be written");
            }
        }
        Ok(())
    }

    fn read_input(&mut self) {
        match self.source.poll() {
            Ok(sample) => {
                if self.input_failing {
                    info!("input source recovered");
                    self.input_failing = false;
                }
                self.last_sample = sample;
            }
            Err(e) => {
                self.stats.input_errors += 1;
                if self.input_failing {
                    debug!(error = %e, "input poll failed");
                } else {
                    warn!(error = %e, "input poll failed, reusing last sample");
                    self.input_failing = true;
                }
            }
        }
    }

    /// Encode `plan` and write every copy. The scheduler is only told on
    /// full success; a partial burst is retried whole.
    fn transmit(&mut self, plan: &Plan, now: Instant) -> Result<(), CycleError> {
        let frame = self.framer.encode(&plan.set)?;
        for _ in 0..plan.copies {
            if let Err(e) = self.sink.write_frame(frame.as_bytes()) {
                self.stats.write_failures += 1;
                warn!(
                    error = %e,
                    kind = ?plan.kind,
                    failures = self.stats.write_failures,
                    "frame write failed, retrying next cycle"
                );
                return Ok(());
            }
            self.stats.frames_sent += 1;
            self.stats.bytes_sent += frame.len() as u64;
        }
        self.scheduler.record_sent(plan, now);
        debug!(
            kind = ?plan.kind,
            copies = plan.copies,
            left = plan.set.left,
            right = plan.set.right,
            mid = ?plan.set.mid,
            arm = plan.set.arm_value(&self.band),
            "frame sent"
        );
        Ok(())
    }
}

impl<S, K: std::fmt::Debug> std::fmt::Debug for ControlLoop<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("sink", &self.sink)
            .field("link", &self.watchdog.status())
            .field("arm", &self.arm.mode())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Queue an event for this cycle; a full queue drops it with a warning.
fn queue_event(events: &mut Vec<ReservedSignal, MAX_CYCLE_EVENTS>, signal: ReservedSignal) {
    debug_assert!(
        !events.is_full(),
        "more than {MAX_CYCLE_EVENTS} events in one cycle"
    );
    if let Err(dropped) = events.push(signal) {
        warn!(?dropped, "cycle event queue full");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
